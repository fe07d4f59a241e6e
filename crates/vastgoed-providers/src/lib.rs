//! Provider clients for the Dutch property data upstreams.
//!
//! [`ProviderClient`] issues one HTTP call per fetch and reduces every
//! outcome to a [`ProviderResult`]. The orchestrators depend on the
//! [`PropertyDataSource`] trait rather than the client directly.

pub mod client;
pub mod data;
pub mod error;
pub mod normalize;
pub mod result;
pub mod source;
pub mod types;

pub use client::{provider, EnergyLabelRequest, ProviderClient, ProviderSettings};
pub use data::{
    AreaListing, ComparableSale, Coordinates, EnergyLabelData, LocationData, PriceRange,
    ReferenceData, ReferenceSummary, WozData, WozGrowth, WozValue,
};
pub use error::{is_absence_message, ProviderError};
pub use result::ProviderResult;
pub use source::PropertyDataSource;
pub use types::ComparisonWeights;
