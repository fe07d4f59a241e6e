//! Altum endpoints: location, interactive reference, WOZ, and area search.

use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use vastgoed_core::{AreaSubject, IndividualSubject};

use super::{provider, settle, ProviderClient};
use crate::data::{AreaListing, LocationData, ReferenceData, WozData};
use crate::error::ProviderError;
use crate::normalize::{normalize_listings, normalize_location, normalize_reference, normalize_woz};
use crate::result::ProviderResult;
use crate::types::{
    AddressRequest, AutosearchListing, LocationOutput, ReferenceRequest, ReferenceResponse,
    WozRequest, WozResponse,
};

const ADDRESS_NOT_FOUND: &str = "address not found";
const NO_WOZ_VALUE: &str = "no WOZ value for this address";

impl ProviderClient {
    /// Looks up property attributes for one address.
    ///
    /// In sandbox mode this calls the sandbox AVM endpoint instead of
    /// `location-data`; both answer with the same `Output` object.
    pub async fn fetch_location(&self, subject: &IndividualSubject) -> ProviderResult<LocationData> {
        settle(provider::LOCATION, self.try_fetch_location(subject).await, false)
    }

    /// Fetches the comparable-sales reference set for one address using the
    /// configured [`crate::ComparisonWeights`].
    pub async fn fetch_reference(
        &self,
        subject: &IndividualSubject,
    ) -> ProviderResult<ReferenceData> {
        settle(provider::REFERENCE, self.try_fetch_reference(subject).await, false)
    }

    /// Fetches the WOZ valuation history for one address.
    pub async fn fetch_valuation(&self, subject: &IndividualSubject) -> ProviderResult<WozData> {
        settle(provider::VALUATION, self.try_fetch_valuation(subject).await, false)
    }

    /// Lists properties in a postal-code area.
    ///
    /// Always hits the production endpoint with the production key. A 404 is
    /// an empty area, not a failure.
    pub async fn fetch_area_listings(
        &self,
        subject: &AreaSubject,
    ) -> ProviderResult<Vec<AreaListing>> {
        settle(
            provider::AREA_SEARCH,
            self.try_fetch_area_listings(subject).await,
            false,
        )
    }

    async fn try_fetch_location(
        &self,
        subject: &IndividualSubject,
    ) -> Result<LocationData, ProviderError> {
        let body = AddressRequest {
            postcode: subject.postal_code.as_str(),
            housenumber: subject.house_number.number,
            houseaddition: subject.house_number.addition(),
        };
        let url = self.property_url(if self.settings.use_sandbox {
            "avm"
        } else {
            "location-data"
        });

        let json = self
            .post_altum(provider::LOCATION, url, &body, ADDRESS_NOT_FOUND)
            .await?;
        let output = match json {
            Value::Object(mut map) if map.contains_key("Output") => {
                map.remove("Output").unwrap_or(Value::Null)
            }
            other => other,
        };
        if !output.is_object() {
            return Err(ProviderError::UnexpectedShape(provider::LOCATION));
        }

        let parsed: LocationOutput =
            serde_json::from_value(output).map_err(|e| ProviderError::Deserialize {
                context: format!("location({})", subject.postal_code),
                source: e,
            })?;
        Ok(normalize_location(parsed))
    }

    async fn try_fetch_reference(
        &self,
        subject: &IndividualSubject,
    ) -> Result<ReferenceData, ProviderError> {
        let body = ReferenceRequest {
            postcode: subject.postal_code.as_str(),
            housenumber: subject.house_number.number,
            houseaddition: subject.house_number.addition(),
            weights: &self.settings.weights,
        };
        let url = self.property_url("interactive-reference");

        let json = self
            .post_altum(provider::REFERENCE, url, &body, ADDRESS_NOT_FOUND)
            .await?;
        let parsed: ReferenceResponse =
            serde_json::from_value(json).map_err(|e| ProviderError::Deserialize {
                context: format!("interactive-reference({})", subject.postal_code),
                source: e,
            })?;
        Ok(normalize_reference(parsed.reference_data))
    }

    async fn try_fetch_valuation(
        &self,
        subject: &IndividualSubject,
    ) -> Result<WozData, ProviderError> {
        let body = WozRequest {
            postcode: subject.postal_code.as_str(),
            housenumber: subject.house_number.number.to_string(),
            addition: subject.house_number.addition(),
            index: 1,
            cache: 1,
        };
        let url = self.property_url("woz");

        let json = self
            .post_altum(provider::VALUATION, url, &body, NO_WOZ_VALUE)
            .await?;
        let parsed: WozResponse =
            serde_json::from_value(json).map_err(|e| ProviderError::Deserialize {
                context: format!("woz({})", subject.postal_code),
                source: e,
            })?;
        Ok(normalize_woz(parsed.output))
    }

    async fn try_fetch_area_listings(
        &self,
        subject: &AreaSubject,
    ) -> Result<Vec<AreaListing>, ProviderError> {
        let postal_code = subject.postal_code.as_str();
        let mut url = Self::endpoint(&self.altum_base, &["autosearch"]);
        url.query_pairs_mut()
            .append_pair("search", postal_code)
            .append_pair("sort", &self.settings.area_sort)
            .append_pair("limit", &self.settings.area_result_limit.to_string());

        tracing::debug!(provider = provider::AREA_SEARCH, %postal_code, "searching area listings");

        let response = self
            .client
            .get(url)
            .header("x-api-key", &self.settings.altum_api_key)
            .send()
            .await
            .map_err(|e| self.transport_error(provider::AREA_SEARCH, e))?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!(%postal_code, "area search returned 404, treating as empty area");
            return Ok(Vec::new());
        }
        let json = self
            .read_altum_json(provider::AREA_SEARCH, response, ADDRESS_NOT_FOUND)
            .await?;

        let raw: Vec<AutosearchListing> = match json {
            Value::Array(_) => {
                serde_json::from_value(json).map_err(|e| ProviderError::Deserialize {
                    context: format!("autosearch({postal_code})"),
                    source: e,
                })?
            }
            Value::Null => Vec::new(),
            _ => return Err(ProviderError::UnexpectedShape(provider::AREA_SEARCH)),
        };
        Ok(normalize_listings(raw, postal_code))
    }

    /// URL for a per-address endpoint, under `/sandbox` when the sandbox
    /// switch is on.
    pub(super) fn property_url(&self, endpoint: &str) -> reqwest::Url {
        if self.settings.use_sandbox {
            Self::endpoint(&self.altum_base, &["sandbox", endpoint])
        } else {
            Self::endpoint(&self.altum_base, &[endpoint])
        }
    }

    async fn post_altum<B: Serialize + Sync>(
        &self,
        provider: &'static str,
        url: reqwest::Url,
        body: &B,
        bad_request_fallback: &str,
    ) -> Result<Value, ProviderError> {
        let response = self
            .client
            .post(url)
            .header("x-api-key", self.settings.property_api_key())
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(provider, e))?;

        self.read_altum_json(provider, response, bad_request_fallback)
            .await
    }

    /// Maps the Altum status codes shared by every endpoint and parses a 2xx
    /// body as JSON.
    ///
    /// # Errors
    ///
    /// - [`ProviderError::Auth`] on 401 or 403.
    /// - [`ProviderError::BadRequest`] on 400, with the provider's `Output`
    ///   message when the body carries one, else `bad_request_fallback`.
    /// - [`ProviderError::InvalidAddress`] on 422.
    /// - [`ProviderError::UnexpectedStatus`] on any other non-2xx.
    async fn read_altum_json(
        &self,
        provider: &'static str,
        response: reqwest::Response,
        bad_request_fallback: &str,
    ) -> Result<Value, ProviderError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(provider, e))?;

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ProviderError::Auth);
        }
        if status == StatusCode::BAD_REQUEST {
            let message = output_message(&body).unwrap_or_else(|| bad_request_fallback.to_owned());
            return Err(ProviderError::BadRequest(message));
        }
        if status == StatusCode::UNPROCESSABLE_ENTITY {
            return Err(ProviderError::InvalidAddress);
        }
        if !status.is_success() {
            return Err(ProviderError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| ProviderError::Deserialize {
            context: provider.to_owned(),
            source: e,
        })
    }
}

/// The human-readable message in an Altum error body: `Output` at the top
/// level or under `detail`.
pub(super) fn output_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    json.get("Output")
        .or_else(|| json.get("detail").and_then(|d| d.get("Output")))
        .and_then(Value::as_str)
        .filter(|m| !m.trim().is_empty())
        .map(str::to_owned)
}
