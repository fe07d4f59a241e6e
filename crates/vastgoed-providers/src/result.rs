//! The tagged outcome every provider call is reduced to.

use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// Outcome of one provider call.
///
/// `Absent` is an explicit "no record" answer from the upstream and is not an
/// error: it is never shown as a warning and never counts against an error
/// budget. `Failure` is a genuine fault with a human-readable message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum ProviderResult<T> {
    Success(T),
    Absent,
    Failure(String),
}

impl<T> ProviderResult<T> {
    /// Folds a fetch outcome for a provider with no "absent" case: every
    /// error, 404 included, is a `Failure`.
    pub(crate) fn from_fetch(result: Result<T, ProviderError>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(err) => Self::Failure(err.to_string()),
        }
    }

    /// Folds an energy-label fetch outcome: 404s and "not found" messages
    /// become `Absent`, everything else that failed is a `Failure`.
    pub(crate) fn from_energy_label_fetch(result: Result<T, ProviderError>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(err) if err.indicates_absence() => Self::Absent,
            Err(err) => Self::Failure(err.to_string()),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    #[must_use]
    pub fn success(&self) -> Option<&T> {
        match self {
            Self::Success(value) => Some(value),
            Self::Absent | Self::Failure(_) => None,
        }
    }

    #[must_use]
    pub fn failure_message(&self) -> Option<&str> {
        match self {
            Self::Failure(message) => Some(message),
            Self::Success(_) | Self::Absent => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> ProviderResult<U> {
        match self {
            Self::Success(value) => ProviderResult::Success(f(value)),
            Self::Absent => ProviderResult::Absent,
            Self::Failure(message) => ProviderResult::Failure(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn not_found() -> ProviderError {
        ProviderError::NotFound("Geen energielabel gevonden voor dit adres".to_owned())
    }

    #[test]
    fn energy_label_404_is_absent() {
        let result: ProviderResult<()> = ProviderResult::from_energy_label_fetch(Err(not_found()));
        assert_eq!(result, ProviderResult::Absent);
    }

    #[test]
    fn other_provider_404_is_failure() {
        let result: ProviderResult<()> = ProviderResult::from_fetch(Err(not_found()));
        assert!(result.is_failure());
        assert_eq!(
            result.failure_message(),
            Some("Geen energielabel gevonden voor dit adres")
        );
    }

    #[test]
    fn energy_label_auth_error_is_failure() {
        let result: ProviderResult<()> =
            ProviderResult::from_energy_label_fetch(Err(ProviderError::Auth));
        assert_eq!(
            result,
            ProviderResult::Failure("API authentication failed".to_owned())
        );
    }

    #[test]
    fn serializes_with_status_tag() {
        let ok = serde_json::to_value(ProviderResult::Success(5)).unwrap();
        assert_eq!(ok, serde_json::json!({"status": "success", "data": 5}));

        let absent = serde_json::to_value(ProviderResult::<u8>::Absent).unwrap();
        assert_eq!(absent, serde_json::json!({"status": "absent"}));

        let failed = serde_json::to_value(ProviderResult::<u8>::Failure("x".into())).unwrap();
        assert_eq!(failed, serde_json::json!({"status": "failure", "data": "x"}));
    }

    #[test]
    fn map_preserves_variant() {
        assert_eq!(
            ProviderResult::Success(2).map(|v| v * 2),
            ProviderResult::Success(4)
        );
        assert_eq!(
            ProviderResult::<u8>::Absent.map(|v| v * 2),
            ProviderResult::Absent
        );
    }
}
