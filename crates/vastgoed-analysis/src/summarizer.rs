//! The AI summarizer: turns gathered facts into a written valuation.
//!
//! [`GeminiSummarizer`] is the production adapter. Whatever it does,
//! [`summarize_or_fallback`] always hands back an [`AnalysisReport`]: a failed
//! or unconfigured summarizer yields a clearly marked fallback report that
//! still carries the locally computed facts.

use std::collections::BTreeSet;
use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use vastgoed_core::{AppConfig, AreaSubject, IndividualSubject};

use crate::area::AreaFacts;
use crate::error::SummarizerError;
use crate::prompt::{area_prompt, individual_prompt, SYSTEM_PROMPT};
use crate::single::PropertyFacts;

/// `model_id` of a report produced without the summarizer.
pub const FALLBACK_MODEL_ID: &str = "fallback";

/// Gemini accepts the key as a header, which keeps it out of request URLs.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Facts of one run, borrowed for summarizing.
#[derive(Debug, Clone, Copy)]
pub enum FactBundle<'a> {
    Individual {
        subject: &'a IndividualSubject,
        facts: &'a PropertyFacts,
    },
    Area {
        subject: &'a AreaSubject,
        facts: &'a AreaFacts,
    },
}

impl FactBundle<'_> {
    #[must_use]
    pub fn sources_used(&self) -> BTreeSet<String> {
        match self {
            Self::Individual { facts, .. } => facts.sources_used.clone(),
            Self::Area { facts, .. } => facts.sources_used(),
        }
    }

    #[must_use]
    pub fn prompt(&self) -> String {
        match self {
            Self::Individual { subject, facts } => individual_prompt(subject, facts),
            Self::Area { subject, facts } => area_prompt(subject, facts),
        }
    }
}

/// The valuation object the model is instructed to answer with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredValuation {
    #[serde(rename = "geschat_verkoopbedrag")]
    pub estimated_sale_price: String,
    #[serde(rename = "zekerheid")]
    pub confidence: String,
    #[serde(rename = "argumentatie", default)]
    pub reasoning: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub raw_text: String,
    pub model_id: String,
    pub timestamp: DateTime<Utc>,
    pub sources_used: BTreeSet<String>,
    /// Present when the model's text contained a valuation object.
    pub structured: Option<StructuredValuation>,
    /// The summarizer could not produce this report.
    pub failed: bool,
    pub error: Option<String>,
}

impl AnalysisReport {
    /// A report built from local facts alone, explaining why the summarizer
    /// result is missing.
    #[must_use]
    pub fn fallback(bundle: &FactBundle<'_>, reason: &str) -> Self {
        let mut raw_text = format!("AI analyse mislukt: {reason}\n\n");
        if let FactBundle::Area { subject, facts } = bundle {
            let stats = &facts.statistics;
            raw_text.push_str(&format!(
                "Gebied analyse voor {}:\n\nSTATISTIEKEN:\n- Totaal {} panden gevonden\n- {} panden met prijsinformatie\n- Gemiddelde vraagprijs: €{}\n\n",
                subject.postal_code,
                stats.total,
                stats.with_price,
                stats.average_price.unwrap_or(0),
            ));
        }
        raw_text.push_str("De verzamelde data is beschikbaar voor handmatige beoordeling.");

        Self {
            raw_text,
            model_id: FALLBACK_MODEL_ID.to_owned(),
            timestamp: Utc::now(),
            sources_used: bundle.sources_used(),
            structured: None,
            failed: true,
            error: Some(reason.to_owned()),
        }
    }
}

/// Produces a report from a fact bundle.
pub trait Summarizer: Send + Sync {
    fn summarize(
        &self,
        bundle: &FactBundle<'_>,
    ) -> impl Future<Output = Result<AnalysisReport, SummarizerError>> + Send;
}

/// Runs `summarizer`, substituting a fallback report on any error.
pub async fn summarize_or_fallback<S: Summarizer>(
    summarizer: &S,
    bundle: &FactBundle<'_>,
) -> AnalysisReport {
    match summarizer.summarize(bundle).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(error = %e, "summarizer failed, using fallback report");
            AnalysisReport::fallback(bundle, &e.to_string())
        }
    }
}

#[derive(Clone)]
pub struct SummarizerSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl SummarizerSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            api_key: config.gemini_api_key.clone(),
            base_url: config.gemini_base_url.clone(),
            model: config.gemini_model.clone(),
            timeout_secs: config.summarizer_timeout_secs,
            user_agent: config.user_agent.clone(),
        }
    }
}

impl std::fmt::Debug for SummarizerSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SummarizerSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Gemini `generateContent` adapter.
#[derive(Debug)]
pub struct GeminiSummarizer {
    client: Client,
    settings: SummarizerSettings,
    base: Url,
}

impl GeminiSummarizer {
    /// # Errors
    ///
    /// Returns [`SummarizerError::Http`] if the HTTP client cannot be built,
    /// or [`SummarizerError::InvalidUrl`] for a malformed base URL.
    pub fn new(settings: SummarizerSettings) -> Result<Self, SummarizerError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&settings.user_agent)
            .build()?;
        let normalised = format!("{}/", settings.base_url.trim_end_matches('/'));
        let base = Url::parse(&normalised)
            .map_err(|e| SummarizerError::InvalidUrl(format!("{}: {e}", settings.base_url)))?;

        Ok(Self {
            client,
            settings,
            base,
        })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.settings.model
    }

    fn generate_url(&self) -> Url {
        let method = format!("{}:generateContent", self.settings.model);
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(["models", method.as_str()]);
        }
        url
    }

    async fn generate(&self, prompt: &str) -> Result<String, SummarizerError> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(SummarizerError::MissingApiKey)?;

        let body = GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: [Part {
                    text: SYSTEM_PROMPT,
                }],
            },
            contents: [Content {
                role: Some("user"),
                parts: [Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(self.generate_url())
            .header(API_KEY_HEADER, api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SummarizerError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await.map_err(|e| self.transport_error(e))?;
        let parsed: GenerateResponse = serde_json::from_slice(&bytes)?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(SummarizerError::EmptyResponse);
        }
        Ok(text)
    }

    fn transport_error(&self, err: reqwest::Error) -> SummarizerError {
        if err.is_timeout() {
            SummarizerError::Timeout {
                secs: self.settings.timeout_secs,
            }
        } else {
            // reqwest errors render the request URL; keep it out of reports.
            SummarizerError::Http(err.without_url())
        }
    }
}

impl Summarizer for GeminiSummarizer {
    async fn summarize(&self, bundle: &FactBundle<'_>) -> Result<AnalysisReport, SummarizerError> {
        let prompt = bundle.prompt();
        tracing::info!(
            model = %self.settings.model,
            prompt_len = prompt.len(),
            "requesting summary"
        );

        let raw_text = self.generate(&prompt).await?;
        let structured = extract_valuation(&raw_text);
        if structured.is_none() {
            tracing::warn!("summarizer text held no valuation object, keeping raw text");
        }

        Ok(AnalysisReport {
            raw_text,
            model_id: self.settings.model.clone(),
            timestamp: Utc::now(),
            sources_used: bundle.sources_used(),
            structured,
            failed: false,
            error: None,
        })
    }
}

/// Finds the first valuation object in model output, ignoring markdown
/// fences and any surrounding prose.
#[must_use]
pub fn extract_valuation(text: &str) -> Option<StructuredValuation> {
    let cleaned = text.replace("```json", "").replace("```", "");
    cleaned.match_indices('{').find_map(|(start, _)| {
        serde_json::Deserializer::from_str(&cleaned[start..])
            .into_iter::<StructuredValuation>()
            .next()
            .and_then(Result::ok)
    })
}
