//! Nigerian mobile phone number.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PhoneNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// The number does not start with `+234` or `0`.
    #[error("phone number must start with +234 or 0")]
    Prefix,
    /// The subscriber part is not exactly ten ASCII digits.
    #[error("phone number must have 10 digits after the prefix")]
    Length,
    /// The network code is not one of the mobile ranges (70/71, 80/81, 90/91).
    #[error("phone number must use a 70, 71, 80, 81, 90 or 91 network code")]
    NetworkCode,
}

/// A Nigerian mobile number in local (`0…`) or international (`+234…`) form.
///
/// The accepted shape is `(+234|0)[789][01]` followed by eight digits. The
/// number is stored exactly as entered.
///
/// ```
/// use native_delight_core::PhoneNumber;
///
/// assert!(PhoneNumber::parse("08012345678").is_ok());
/// assert!(PhoneNumber::parse("+2348199999999").is_ok());
/// assert!(PhoneNumber::parse("0912345678").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Parse a phone number.
    ///
    /// # Errors
    ///
    /// Returns an error if the input has the wrong prefix, the wrong number of
    /// digits, or a network code outside the mobile ranges.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let subscriber = s
            .strip_prefix("+234")
            .or_else(|| s.strip_prefix('0'))
            .ok_or(PhoneError::Prefix)?;

        if subscriber.len() != 10 || !subscriber.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PhoneError::Length);
        }

        let mut digits = subscriber.bytes();
        let network = (digits.next(), digits.next());
        if !matches!(network, (Some(b'7' | b'8' | b'9'), Some(b'0' | b'1'))) {
            return Err(PhoneError::NetworkCode);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the number as entered.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for PhoneNumber {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = PhoneError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PhoneNumber> for String {
    fn from(phone: PhoneNumber) -> Self {
        phone.0
    }
}
