//! The seam between the orchestrators and the provider clients.

use std::future::Future;

use vastgoed_core::{AreaSubject, IndividualSubject};

use crate::client::{EnergyLabelRequest, ProviderClient};
use crate::data::{AreaListing, EnergyLabelData, LocationData, ReferenceData, WozData};
use crate::result::ProviderResult;

/// Everything the orchestrators need from the upstream providers.
///
/// Each method issues at most one upstream call and never fails: faults come
/// back as [`ProviderResult::Failure`]. [`ProviderClient`] is the production
/// implementation; tests substitute in-memory stubs.
pub trait PropertyDataSource: Send + Sync {
    fn fetch_location(
        &self,
        subject: &IndividualSubject,
    ) -> impl Future<Output = ProviderResult<LocationData>> + Send;

    fn fetch_reference(
        &self,
        subject: &IndividualSubject,
    ) -> impl Future<Output = ProviderResult<ReferenceData>> + Send;

    fn fetch_valuation(
        &self,
        subject: &IndividualSubject,
    ) -> impl Future<Output = ProviderResult<WozData>> + Send;

    fn fetch_energy_label(
        &self,
        request: &EnergyLabelRequest,
    ) -> impl Future<Output = ProviderResult<EnergyLabelData>> + Send;

    fn fetch_area_listings(
        &self,
        subject: &AreaSubject,
    ) -> impl Future<Output = ProviderResult<Vec<AreaListing>>> + Send;
}

impl PropertyDataSource for ProviderClient {
    async fn fetch_location(&self, subject: &IndividualSubject) -> ProviderResult<LocationData> {
        ProviderClient::fetch_location(self, subject).await
    }

    async fn fetch_reference(&self, subject: &IndividualSubject) -> ProviderResult<ReferenceData> {
        ProviderClient::fetch_reference(self, subject).await
    }

    async fn fetch_valuation(&self, subject: &IndividualSubject) -> ProviderResult<WozData> {
        ProviderClient::fetch_valuation(self, subject).await
    }

    async fn fetch_energy_label(
        &self,
        request: &EnergyLabelRequest,
    ) -> ProviderResult<EnergyLabelData> {
        ProviderClient::fetch_energy_label(self, request).await
    }

    async fn fetch_area_listings(&self, subject: &AreaSubject) -> ProviderResult<Vec<AreaListing>> {
        ProviderClient::fetch_area_listings(self, subject).await
    }
}
