//! EP-Online energy-label registry.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use vastgoed_core::{CoreError, HouseNumber, IndividualSubject, PostalCode};

use super::{provider, settle, ProviderClient};
use crate::data::{AreaListing, EnergyLabelData};
use crate::error::ProviderError;
use crate::normalize::normalize_energy_label;
use crate::result::ProviderResult;
use crate::types::EnergyLabelRecord;

const NO_LABEL_MESSAGE: &str = "Geen energielabel gevonden voor dit adres";

/// Address fields the registry keys on. At most one of `letter` and `suffix`
/// is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnergyLabelRequest {
    pub postal_code: PostalCode,
    pub house_number: HouseNumber,
}

impl EnergyLabelRequest {
    #[must_use]
    pub fn from_subject(subject: &IndividualSubject) -> Self {
        Self {
            postal_code: subject.postal_code.clone(),
            house_number: subject.house_number.clone(),
        }
    }

    /// Builds a request from an area listing, splitting its composite house
    /// number and addition into letter or suffix.
    ///
    /// # Errors
    ///
    /// Returns a [`CoreError`] if the listing's postal code or house number
    /// does not parse.
    pub fn from_listing(listing: &AreaListing) -> Result<Self, CoreError> {
        Ok(Self {
            postal_code: PostalCode::parse(&listing.postal_code)?,
            house_number: HouseNumber::parse(&listing.house_number, listing.addition.as_deref())?,
        })
    }
}

impl ProviderClient {
    /// Looks up the registered energy label for one address.
    ///
    /// A 404, an empty result array, or a "not found" message is
    /// [`ProviderResult::Absent`]; every other error is a failure.
    pub async fn fetch_energy_label(
        &self,
        request: &EnergyLabelRequest,
    ) -> ProviderResult<EnergyLabelData> {
        settle(
            provider::ENERGY_LABEL,
            self.try_fetch_energy_label(request).await,
            true,
        )
    }

    pub(super) fn energy_label_url(&self, request: &EnergyLabelRequest) -> reqwest::Url {
        let mut url = Self::endpoint(&self.ep_online_base, &["PandEnergielabel", "Adres"]);
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("postcode", request.postal_code.as_str())
                .append_pair("huisnummer", &request.house_number.number.to_string());
            if let Some(letter) = &request.house_number.letter {
                pairs.append_pair("huisletter", letter);
            }
            if let Some(suffix) = &request.house_number.suffix {
                pairs.append_pair("huisnummertoevoeging", suffix);
            }
        }
        url
    }

    async fn try_fetch_energy_label(
        &self,
        request: &EnergyLabelRequest,
    ) -> Result<EnergyLabelData, ProviderError> {
        let url = self.energy_label_url(request);

        let response = self
            .client
            .get(url)
            .header(reqwest::header::AUTHORIZATION, &self.settings.ep_online_api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| self.transport_error(provider::ENERGY_LABEL, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(provider::ENERGY_LABEL, e))?;

        if status == StatusCode::NOT_FOUND {
            return Err(ProviderError::NotFound(NO_LABEL_MESSAGE.to_owned()));
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ProviderError::Auth);
        }
        if status == StatusCode::BAD_REQUEST {
            return Err(ProviderError::BadRequest(body));
        }
        if !status.is_success() {
            return Err(ProviderError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        let json: Value = serde_json::from_str(&body).map_err(|e| ProviderError::Deserialize {
            context: format!("energy label({})", request.postal_code),
            source: e,
        })?;
        let record = match json {
            Value::Array(items) => items
                .into_iter()
                .next()
                .ok_or_else(|| ProviderError::NotFound(NO_LABEL_MESSAGE.to_owned()))?,
            obj @ Value::Object(_) => obj,
            _ => return Err(ProviderError::UnexpectedShape(provider::ENERGY_LABEL)),
        };

        let record: EnergyLabelRecord =
            serde_json::from_value(record).map_err(|e| ProviderError::Deserialize {
                context: format!("energy label({})", request.postal_code),
                source: e,
            })?;
        Ok(normalize_energy_label(
            record,
            chrono::Utc::now().date_naive(),
        ))
    }
}
