//! Single-address fan-out.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use vastgoed_core::IndividualSubject;
use vastgoed_providers::{
    provider, EnergyLabelData, EnergyLabelRequest, LocationData, PropertyDataSource,
    ProviderResult, ReferenceData, WozData,
};

/// Merged provider results for one address. Every field is always present,
/// whatever the individual calls returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyFacts {
    pub location: ProviderResult<LocationData>,
    pub reference: ProviderResult<ReferenceData>,
    pub valuation: ProviderResult<WozData>,
    pub energy_label: ProviderResult<EnergyLabelData>,
    /// Providers whose result is a success.
    pub sources_used: BTreeSet<String>,
}

impl PropertyFacts {
    #[must_use]
    pub fn new(
        location: ProviderResult<LocationData>,
        reference: ProviderResult<ReferenceData>,
        valuation: ProviderResult<WozData>,
        energy_label: ProviderResult<EnergyLabelData>,
    ) -> Self {
        let sources_used = [
            (provider::LOCATION, location.is_success()),
            (provider::REFERENCE, reference.is_success()),
            (provider::VALUATION, valuation.is_success()),
            (provider::ENERGY_LABEL, energy_label.is_success()),
        ]
        .into_iter()
        .filter(|(_, ok)| *ok)
        .map(|(name, _)| name.to_owned())
        .collect();

        Self {
            location,
            reference,
            valuation,
            energy_label,
            sources_used,
        }
    }

    /// `(provider, message)` for every field that failed. Absences are not
    /// failures.
    #[must_use]
    pub fn failures(&self) -> Vec<(&'static str, &str)> {
        [
            (provider::LOCATION, self.location.failure_message()),
            (provider::REFERENCE, self.reference.failure_message()),
            (provider::VALUATION, self.valuation.failure_message()),
            (provider::ENERGY_LABEL, self.energy_label.failure_message()),
        ]
        .into_iter()
        .filter_map(|(name, message)| message.map(|m| (name, m)))
        .collect()
    }

    /// The address lookup itself failed.
    #[must_use]
    pub fn subject_failed(&self) -> bool {
        self.location.is_failure()
    }
}

/// Runs the four single-address lookups concurrently and waits for all of
/// them. A failure in one never cancels or delays the others.
pub async fn run_individual<S: PropertyDataSource>(
    source: &S,
    subject: &IndividualSubject,
) -> PropertyFacts {
    tracing::info!(
        postal_code = %subject.postal_code,
        house_number = %subject.house_number,
        "starting individual analysis fan-out"
    );

    let label_request = EnergyLabelRequest::from_subject(subject);
    let (location, reference, valuation, energy_label) = tokio::join!(
        source.fetch_location(subject),
        source.fetch_reference(subject),
        source.fetch_valuation(subject),
        source.fetch_energy_label(&label_request),
    );

    let facts = PropertyFacts::new(location, reference, valuation, energy_label);
    tracing::info!(
        sources_used = facts.sources_used.len(),
        failures = facts.failures().len(),
        "individual fan-out settled"
    );
    facts
}
