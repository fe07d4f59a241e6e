//! Run lifecycle: one submitted subject, its facts, warnings and report.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vastgoed_core::{AreaSubject, IndividualSubject, Subject};
use vastgoed_providers::{provider, PropertyDataSource};

use crate::area::{run_area, AreaFacts};
use crate::batch::BatchScheduler;
use crate::error::InvalidTransition;
use crate::single::{run_individual, PropertyFacts};
use crate::summarizer::{summarize_or_fallback, AnalysisReport, FactBundle, Summarizer};

const SUMMARIZER: &str = "summarizer";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    Idle,
    Fetching,
    PartiallyFailed,
    Complete,
    Summarizing,
    Reported,
}

impl RunPhase {
    /// Moves to `next` if the lifecycle allows it. Reset to `Idle` is always
    /// allowed.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTransition`] for any other step.
    pub fn advance(self, next: RunPhase) -> Result<RunPhase, InvalidTransition> {
        use RunPhase::{Complete, Fetching, Idle, PartiallyFailed, Reported, Summarizing};

        let allowed = matches!(
            (self, next),
            (_, Idle)
                | (Idle, Fetching)
                | (Fetching, PartiallyFailed | Complete | Summarizing)
                | (PartiallyFailed | Complete, Summarizing)
                | (Summarizing, Reported)
        );
        if allowed {
            Ok(next)
        } else {
            Err(InvalidTransition {
                from: self,
                to: next,
            })
        }
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::PartiallyFailed => "partially_failed",
            Self::Complete => "complete",
            Self::Summarizing => "summarizing",
            Self::Reported => "reported",
        };
        f.write_str(name)
    }
}

/// Facts of a run, paired with the subject they were gathered for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RunFacts {
    Individual {
        subject: IndividualSubject,
        facts: PropertyFacts,
    },
    Area {
        subject: AreaSubject,
        facts: AreaFacts,
    },
}

impl RunFacts {
    #[must_use]
    pub fn bundle(&self) -> FactBundle<'_> {
        match self {
            Self::Individual { subject, facts } => FactBundle::Individual { subject, facts },
            Self::Area { subject, facts } => FactBundle::Area { subject, facts },
        }
    }

    /// The primary lookup failed, with its message.
    #[must_use]
    pub fn subject_failure(&self) -> Option<String> {
        match self {
            Self::Individual { facts, .. } => facts
                .location
                .failure_message()
                .map(|m| format!("address lookup failed: {m}")),
            Self::Area { facts, .. } => facts
                .search_failure
                .as_deref()
                .map(|m| format!("postal code search failed: {m}")),
        }
    }

    fn has_failures(&self) -> bool {
        match self {
            Self::Individual { facts, .. } => !facts.failures().is_empty(),
            Self::Area { facts, .. } => {
                facts.subject_failed() || facts.energy_labels.error_count > 0
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// A field is missing; the rest of the run is usable.
    Warning,
    /// The subject or the report could not be produced.
    Error,
}

/// A user-visible notice about one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunWarning {
    pub severity: Severity,
    pub source: String,
    pub message: String,
}

impl RunWarning {
    fn new(severity: Severity, source: &str, message: impl Into<String>) -> Self {
        Self {
            severity,
            source: source.to_owned(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRun {
    pub phase: RunPhase,
    pub started_at: DateTime<Utc>,
    #[serde(flatten)]
    pub facts: RunFacts,
    warnings: Vec<RunWarning>,
    pub report: Option<AnalysisReport>,
}

impl AnalysisRun {
    fn with_facts(started_at: DateTime<Utc>, facts: RunFacts) -> Self {
        let phase = if facts.has_failures() {
            RunPhase::PartiallyFailed
        } else {
            RunPhase::Complete
        };
        let mut run = Self {
            phase,
            started_at,
            facts,
            warnings: Vec::new(),
            report: None,
        };
        run.warnings = run.derive_warnings();
        run
    }

    #[must_use]
    pub fn subject(&self) -> Subject {
        match &self.facts {
            RunFacts::Individual { subject, .. } => Subject::Individual(subject.clone()),
            RunFacts::Area { subject, .. } => Subject::Area(subject.clone()),
        }
    }

    /// Absences never appear here.
    #[must_use]
    pub fn warnings(&self) -> &[RunWarning] {
        &self.warnings
    }

    fn derive_warnings(&self) -> Vec<RunWarning> {
        let mut warnings = Vec::new();
        let subject_failure = self.facts.subject_failure();

        match &self.facts {
            RunFacts::Individual { facts, .. } => {
                if let Some(message) = &subject_failure {
                    warnings.push(RunWarning::new(Severity::Error, provider::LOCATION, message));
                }
                warnings.extend(
                    facts
                        .failures()
                        .into_iter()
                        .filter(|(name, _)| *name != provider::LOCATION)
                        .map(|(name, message)| RunWarning::new(Severity::Warning, name, message)),
                );
            }
            RunFacts::Area { facts, .. } => {
                if let Some(message) = &subject_failure {
                    warnings.push(RunWarning::new(
                        Severity::Error,
                        provider::AREA_SEARCH,
                        message,
                    ));
                }
                if let Some(message) = facts.energy_labels.warning() {
                    warnings.push(RunWarning::new(
                        Severity::Warning,
                        provider::ENERGY_LABEL,
                        message,
                    ));
                }
            }
        }

        if subject_failure.is_none() {
            if let Some(AnalysisReport {
                failed: true,
                error,
                ..
            }) = &self.report
            {
                warnings.push(RunWarning::new(
                    Severity::Error,
                    SUMMARIZER,
                    error.as_deref().unwrap_or("summary unavailable"),
                ));
            }
        }
        warnings
    }

    /// Produces the run's report.
    ///
    /// When the primary lookup failed the summarizer is not called and a
    /// degraded report naming that failure is attached instead.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTransition`] unless the run has finished fetching and
    /// has no report yet.
    pub async fn summarize<M: Summarizer>(
        &mut self,
        summarizer: &M,
    ) -> Result<(), InvalidTransition> {
        self.phase = self.phase.advance(RunPhase::Summarizing)?;

        let bundle = self.facts.bundle();
        let report = match self.facts.subject_failure() {
            Some(reason) => {
                tracing::warn!(%reason, "primary lookup failed, attaching degraded report");
                AnalysisReport::fallback(&bundle, &reason)
            }
            None => summarize_or_fallback(summarizer, &bundle).await,
        };

        self.report = Some(report);
        self.phase = self.phase.advance(RunPhase::Reported)?;
        self.warnings = self.derive_warnings();
        Ok(())
    }
}

/// Gathers the facts for `subject` without summarizing them.
pub async fn collect_facts<S: PropertyDataSource>(
    source: &S,
    scheduler: &BatchScheduler,
    subject: Subject,
) -> AnalysisRun {
    let started_at = Utc::now();
    let facts = match subject {
        Subject::Individual(subject) => {
            let facts = run_individual(source, &subject).await;
            RunFacts::Individual { subject, facts }
        }
        Subject::Area(subject) => {
            let facts = run_area(source, &subject, scheduler).await;
            RunFacts::Area { subject, facts }
        }
    };

    let run = AnalysisRun::with_facts(started_at, facts);
    tracing::info!(
        phase = %run.phase,
        warnings = run.warnings().len(),
        "facts collected"
    );
    run
}

/// Gathers facts and summarizes them into a reported run.
pub async fn analyze<S: PropertyDataSource, M: Summarizer>(
    source: &S,
    scheduler: &BatchScheduler,
    summarizer: &M,
    subject: Subject,
) -> AnalysisRun {
    let mut run = collect_facts(source, scheduler, subject).await;
    if let Err(e) = run.summarize(summarizer).await {
        // A fresh run is always ready to summarize.
        tracing::error!(error = %e, "unexpected run lifecycle state");
    }
    run
}

/// Holds at most one run. Each submit replaces the previous run wholesale.
#[derive(Debug, Default)]
pub struct Session {
    current: Option<AnalysisRun>,
}

impl Session {
    #[must_use]
    pub fn phase(&self) -> RunPhase {
        self.current.as_ref().map_or(RunPhase::Idle, |run| run.phase)
    }

    #[must_use]
    pub fn current(&self) -> Option<&AnalysisRun> {
        self.current.as_ref()
    }

    /// Runs a new analysis, summarizing it when `summarizer` is given.
    pub async fn submit<S: PropertyDataSource, M: Summarizer>(
        &mut self,
        source: &S,
        scheduler: &BatchScheduler,
        summarizer: Option<&M>,
        subject: Subject,
    ) -> &AnalysisRun {
        self.current = None;
        let run = match summarizer {
            Some(summarizer) => analyze(source, scheduler, summarizer, subject).await,
            None => collect_facts(source, scheduler, subject).await,
        };
        self.current.insert(run)
    }

    /// Drops the current run and returns it.
    pub fn reset(&mut self) -> Option<AnalysisRun> {
        self.current.take()
    }
}

#[cfg(test)]
#[path = "run_test.rs"]
mod tests;
