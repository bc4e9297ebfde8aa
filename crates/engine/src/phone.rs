//! Phone number normalization.
//!
//! Only North American numbers are dialable: ten digits get the `+1` calling
//! code, eleven digits must already start with `1`. Everything else is
//! rejected.

use thiserror::Error;

/// Why a raw phone value could not be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhoneRejection {
    #[error("phone number is missing")]
    Missing,

    #[error("phone number has {0} digits, expected 10, or 11 starting with 1")]
    UnusableDigits(usize),
}

/// A dialable phone number such as `+14045550100`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalPhone(String);

impl CanonicalPhone {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Digits-only form, used as the recipient's dedup key.
    pub fn dedup_key(&self) -> String {
        digits_of(&self.0)
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for CanonicalPhone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Keep only ASCII digits.
pub fn digits_of(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Normalize free-form phone text into a [`CanonicalPhone`].
pub fn normalize(raw: Option<&str>) -> Result<CanonicalPhone, PhoneRejection> {
    let raw = raw.ok_or(PhoneRejection::Missing)?;
    let digits = digits_of(raw);

    match digits.len() {
        0 => Err(PhoneRejection::Missing),
        11 if digits.starts_with('1') => Ok(CanonicalPhone(format!("+{}", digits))),
        10 => Ok(CanonicalPhone(format!("+1{}", digits))),
        n => Err(PhoneRejection::UnusableDigits(n)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ten_digits_get_country_code() {
        let phone = normalize(Some("4045550100")).unwrap();
        assert_eq!(phone.as_str(), "+14045550100");
        assert_eq!(phone.dedup_key(), "14045550100");
    }

    #[test]
    fn test_eleven_digits_with_leading_one() {
        assert_eq!(
            normalize(Some("1-404-555-0100")).unwrap().as_str(),
            "+14045550100"
        );
        assert_eq!(
            normalize(Some("+1 (404) 555 0100")).unwrap().as_str(),
            "+14045550100"
        );
    }

    #[test]
    fn test_formatting_is_stripped() {
        assert_eq!(
            normalize(Some("(404) 555-0100")).unwrap().as_str(),
            "+14045550100"
        );
        assert_eq!(
            normalize(Some("404.555.0100 ext")).unwrap().as_str(),
            "+14045550100"
        );
    }

    #[test]
    fn test_every_ten_digit_string_is_prefixed() {
        for d in ["0000000000", "9999999999", "1234567890", "5551234567"] {
            assert_eq!(normalize(Some(d)).unwrap().as_str(), format!("+1{}", d));
        }
    }

    #[test]
    fn test_eleven_digits_not_starting_with_one() {
        assert_eq!(
            normalize(Some("24045550100")),
            Err(PhoneRejection::UnusableDigits(11))
        );
    }

    #[test]
    fn test_other_lengths_rejected() {
        assert_eq!(
            normalize(Some("555-0100")),
            Err(PhoneRejection::UnusableDigits(7))
        );
        assert_eq!(
            normalize(Some("+44 20 7946 0958")),
            Err(PhoneRejection::UnusableDigits(12))
        );
    }

    #[test]
    fn test_missing_and_empty_rejected() {
        assert_eq!(normalize(None), Err(PhoneRejection::Missing));
        assert_eq!(normalize(Some("")), Err(PhoneRejection::Missing));
        assert_eq!(normalize(Some("n/a")), Err(PhoneRejection::Missing));
    }

    #[test]
    fn test_non_ascii_digits_ignored() {
        // Arabic-Indic digits are not dialable digits
        assert_eq!(normalize(Some("٤٠٤٥٥٥٠١٠٠")), Err(PhoneRejection::Missing));
    }
}
