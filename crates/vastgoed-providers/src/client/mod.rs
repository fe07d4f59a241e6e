//! HTTP client for the property data providers.
//!
//! One [`ProviderClient`] talks to both upstreams: the Altum endpoints
//! (location, comparable-sales reference, WOZ, area search) and the
//! EP-Online energy-label registry. Every public fetch method issues exactly
//! one request, never retries, and folds its outcome into a
//! [`ProviderResult`] before returning.

mod altum;
mod ep_online;

use std::time::Duration;

use reqwest::{Client, Url};
use vastgoed_core::AppConfig;

use crate::error::ProviderError;
use crate::result::ProviderResult;
use crate::types::ComparisonWeights;

pub use ep_online::EnergyLabelRequest;

const DEFAULT_ALTUM_BASE_URL: &str = "https://api.altum.ai";
const DEFAULT_EP_ONLINE_BASE_URL: &str = "https://public.ep-online.nl/api/v5";
const DEFAULT_USER_AGENT: &str = "vastgoed/0.1 (property-analysis)";

/// Provider names as they appear in logs and in `sources_used`.
pub mod provider {
    pub const LOCATION: &str = "location";
    pub const REFERENCE: &str = "reference";
    pub const VALUATION: &str = "valuation";
    pub const ENERGY_LABEL: &str = "energy_label";
    pub const AREA_SEARCH: &str = "area_search";
}

/// Connection and request parameters for [`ProviderClient`].
#[derive(Clone)]
pub struct ProviderSettings {
    /// Production Altum key. Always used for the area search.
    pub altum_api_key: String,
    pub altum_sandbox_api_key: Option<String>,
    pub use_sandbox: bool,
    pub altum_base_url: String,
    pub ep_online_api_key: String,
    pub ep_online_base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub area_result_limit: u32,
    pub area_sort: String,
    pub weights: ComparisonWeights,
}

impl ProviderSettings {
    /// Settings against the production endpoints with default limits.
    #[must_use]
    pub fn new(altum_api_key: &str, ep_online_api_key: &str) -> Self {
        Self {
            altum_api_key: altum_api_key.to_owned(),
            altum_sandbox_api_key: None,
            use_sandbox: false,
            altum_base_url: DEFAULT_ALTUM_BASE_URL.to_owned(),
            ep_online_api_key: ep_online_api_key.to_owned(),
            ep_online_base_url: DEFAULT_EP_ONLINE_BASE_URL.to_owned(),
            timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            area_result_limit: 15,
            area_sort: "datum".to_owned(),
            weights: ComparisonWeights::default(),
        }
    }

    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            altum_api_key: config.altum_api_key.clone(),
            altum_sandbox_api_key: config.altum_sandbox_api_key.clone(),
            use_sandbox: config.use_sandbox,
            altum_base_url: config.altum_base_url.clone(),
            ep_online_api_key: config.ep_online_api_key.clone(),
            ep_online_base_url: config.ep_online_base_url.clone(),
            timeout_secs: config.provider_timeout_secs,
            user_agent: config.user_agent.clone(),
            area_result_limit: config.area_result_limit,
            area_sort: config.area_sort.clone(),
            weights: ComparisonWeights::default(),
        }
    }

    /// Points both upstreams at custom base URLs (for testing with wiremock).
    #[must_use]
    pub fn with_base_urls(mut self, altum_base_url: &str, ep_online_base_url: &str) -> Self {
        altum_base_url.clone_into(&mut self.altum_base_url);
        ep_online_base_url.clone_into(&mut self.ep_online_base_url);
        self
    }

    /// Key for the per-address Altum endpoints, honouring the sandbox switch.
    fn property_api_key(&self) -> &str {
        if self.use_sandbox {
            self.altum_sandbox_api_key
                .as_deref()
                .unwrap_or(&self.altum_api_key)
        } else {
            &self.altum_api_key
        }
    }
}

impl std::fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("altum_api_key", &"[redacted]")
            .field("use_sandbox", &self.use_sandbox)
            .field("altum_base_url", &self.altum_base_url)
            .field("ep_online_api_key", &"[redacted]")
            .field("ep_online_base_url", &self.ep_online_base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("area_result_limit", &self.area_result_limit)
            .field("area_sort", &self.area_sort)
            .finish_non_exhaustive()
    }
}

/// Client for the property data providers.
///
/// Use [`ProviderClient::new`] with settings from [`ProviderSettings::from_app_config`]
/// in production, or [`ProviderSettings::with_base_urls`] to point at a mock
/// server in tests.
#[derive(Debug)]
pub struct ProviderClient {
    client: Client,
    settings: ProviderSettings,
    altum_base: Url,
    ep_online_base: Url,
}

impl ProviderClient {
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ProviderError::BadRequest`] if a base URL
    /// does not parse.
    pub fn new(settings: ProviderSettings) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&settings.user_agent)
            .build()?;

        let altum_base = parse_base_url(&settings.altum_base_url)?;
        let ep_online_base = parse_base_url(&settings.ep_online_base_url)?;

        Ok(Self {
            client,
            settings,
            altum_base,
            ep_online_base,
        })
    }

    #[must_use]
    pub fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    fn transport_error(&self, provider: &'static str, err: reqwest::Error) -> ProviderError {
        ProviderError::transport(provider, self.settings.timeout_secs, err)
    }

    /// Joins `segments` onto `base`, keeping any path the base already has.
    fn endpoint(base: &Url, segments: &[&str]) -> Url {
        let mut url = base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

/// Normalise: exactly one trailing slash, so joined segments append rather
/// than replace the last path segment.
fn parse_base_url(raw: &str) -> Result<Url, ProviderError> {
    let normalised = format!("{}/", raw.trim_end_matches('/'));
    Url::parse(&normalised)
        .map_err(|e| ProviderError::BadRequest(format!("invalid base URL '{raw}': {e}")))
}

/// Folds a fetch outcome into a [`ProviderResult`], logging it.
///
/// `absence_allowed` selects the energy-label classification, where a 404 or
/// "not found" message is `Absent` rather than a `Failure`.
fn settle<T>(
    provider: &'static str,
    result: Result<T, ProviderError>,
    absence_allowed: bool,
) -> ProviderResult<T> {
    let settled = if absence_allowed {
        ProviderResult::from_energy_label_fetch(result)
    } else {
        ProviderResult::from_fetch(result)
    };

    match &settled {
        ProviderResult::Success(_) => tracing::debug!(provider, "provider call succeeded"),
        ProviderResult::Absent => tracing::debug!(provider, "provider reported no record"),
        ProviderResult::Failure(error) => {
            tracing::warn!(provider, error = %error, "provider call failed");
        }
    }
    settled
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
