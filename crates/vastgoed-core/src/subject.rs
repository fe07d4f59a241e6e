//! Analysis subjects and the address parsing rules shared by every provider.
//!
//! A run analyses exactly one [`Subject`]: either a single address
//! ([`IndividualSubject`]) or every listing in a postal-code area
//! ([`AreaSubject`]). Both are validated once at construction so the provider
//! clients never have to re-check required fields.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::CoreError;

static POSTAL_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}[A-Z]{2}$").expect("valid regex"));

// The area search endpoint rejects codes with a leading zero.
static AREA_POSTAL_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[1-9][0-9]{3}[A-Z]{2}$").expect("valid regex"));

/// A Dutch postal code in canonical form: four digits followed by two
/// uppercase letters, no whitespace (e.g. `1015MN`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PostalCode(String);

impl PostalCode {
    /// Parses a user-entered postal code, stripping all whitespace and
    /// uppercasing before validation. `"1015 mn"` becomes `1015MN`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidPostalCode`] if the cleaned value is not
    /// four digits followed by two letters.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let cleaned: String = raw
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_uppercase();

        if POSTAL_CODE_RE.is_match(&cleaned) {
            Ok(Self(cleaned))
        } else {
            Err(CoreError::InvalidPostalCode(raw.to_owned()))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the area listing search accepts this code.
    #[must_use]
    pub fn is_area_searchable(&self) -> bool {
        AREA_POSTAL_CODE_RE.is_match(&self.0)
    }
}

impl TryFrom<String> for PostalCode {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PostalCode> for String {
    fn from(value: PostalCode) -> Self {
        value.0
    }
}

impl std::fmt::Display for PostalCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A house number split into the fields the energy-label registry expects.
///
/// At most one of `letter` and `suffix` is set: a single-letter addition is a
/// `letter` (stored uppercased), anything else (digits, `bis`, `2h`) is a
/// `suffix`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HouseNumber {
    pub number: u32,
    pub letter: Option<String>,
    pub suffix: Option<String>,
}

impl HouseNumber {
    /// Parses a composite house number and optional addition.
    ///
    /// The leading digit run of `number` is the base number. When `addition`
    /// is empty or absent, any remainder of `number` after the digits (such as
    /// the `A` in `"72A"` or the `1` in `"72-1"`) is used as the addition.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidHouseNumber`] when `number` does not start
    /// with a digit or the digit run overflows.
    pub fn parse(number: &str, addition: Option<&str>) -> Result<Self, CoreError> {
        let trimmed = number.trim();
        let digit_len = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        if digit_len == 0 {
            return Err(CoreError::InvalidHouseNumber(number.to_owned()));
        }

        let base = trimmed[..digit_len]
            .parse::<u32>()
            .map_err(|_| CoreError::InvalidHouseNumber(number.to_owned()))?;

        let trailing = trimmed[digit_len..]
            .trim_start_matches(['-', ' '])
            .trim();
        let addition = addition
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .or_else(|| (!trailing.is_empty()).then_some(trailing));

        let (letter, suffix) = match addition {
            Some(a) if a.len() == 1 && a.chars().all(|c| c.is_ascii_alphabetic()) => {
                (Some(a.to_ascii_uppercase()), None)
            }
            Some(a) => (None, Some(a.to_owned())),
            None => (None, None),
        };

        Ok(Self {
            number: base,
            letter,
            suffix,
        })
    }

    /// The addition as a single token, whichever of letter or suffix is set.
    #[must_use]
    pub fn addition(&self) -> Option<&str> {
        self.letter.as_deref().or(self.suffix.as_deref())
    }
}

impl std::fmt::Display for HouseNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.addition() {
            Some(a) => write!(f, "{}-{a}", self.number),
            None => write!(f, "{}", self.number),
        }
    }
}

/// One property address, validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndividualSubject {
    pub street: String,
    pub house_number: HouseNumber,
    pub city: String,
    pub postal_code: PostalCode,
}

impl IndividualSubject {
    /// Validates wizard input into a subject.
    ///
    /// Postal code and house number are required; street and city are kept
    /// as given (trimmed) because no provider keys on them.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MissingField`] for an empty postal code or house
    /// number, otherwise the parse error of the offending field.
    pub fn new(
        street: &str,
        house_number: &str,
        addition: Option<&str>,
        city: &str,
        postal_code: &str,
    ) -> Result<Self, CoreError> {
        if postal_code.trim().is_empty() {
            return Err(CoreError::MissingField("postal code"));
        }
        if house_number.trim().is_empty() {
            return Err(CoreError::MissingField("house number"));
        }

        Ok(Self {
            street: street.trim().to_owned(),
            house_number: HouseNumber::parse(house_number, addition)?,
            city: city.trim().to_owned(),
            postal_code: PostalCode::parse(postal_code)?,
        })
    }

    /// Renders `"{street} {number}[-{addition}], {postal code} {city}"`.
    #[must_use]
    pub fn display_address(&self) -> String {
        format!(
            "{} {}, {} {}",
            self.street, self.house_number, self.postal_code, self.city
        )
        .trim()
        .to_owned()
    }
}

/// Every listing within one postal code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaSubject {
    pub postal_code: PostalCode,
}

impl AreaSubject {
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidPostalCode`] if the code is malformed or
    /// not accepted by the area search (leading zero).
    pub fn new(postal_code: &str) -> Result<Self, CoreError> {
        let postal_code = PostalCode::parse(postal_code)?;
        if !postal_code.is_area_searchable() {
            return Err(CoreError::InvalidPostalCode(postal_code.into()));
        }
        Ok(Self { postal_code })
    }
}

/// The subject of one analysis run. The variant fixes the run's mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Subject {
    Individual(IndividualSubject),
    Area(AreaSubject),
}

impl Subject {
    #[must_use]
    pub fn postal_code(&self) -> &PostalCode {
        match self {
            Subject::Individual(s) => &s.postal_code,
            Subject::Area(s) => &s.postal_code,
        }
    }
}

#[cfg(test)]
#[path = "subject_test.rs"]
mod tests;
