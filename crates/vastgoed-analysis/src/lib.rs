//! Analysis orchestration for the vastgoed workspace.
//!
//! Runs the provider lookups for one address ([`run_individual`]) or one
//! postal-code area ([`run_area`], with energy labels resolved in paced
//! chunks by [`BatchScheduler`]), then hands the gathered facts to a
//! [`Summarizer`]. No provider failure aborts a run: every outcome is data.

pub mod area;
pub mod batch;
pub mod error;
pub mod prompt;
pub mod run;
pub mod single;
pub mod summarizer;

#[cfg(test)]
mod testing;

pub use area::{run_area, AreaFacts, AreaStatistics};
pub use batch::{resolve_energy_labels, BatchScheduler, EnergyLabelBatchResult};
pub use error::{InvalidTransition, SummarizerError};
pub use run::{
    analyze, collect_facts, AnalysisRun, RunFacts, RunPhase, RunWarning, Session, Severity,
};
pub use single::{run_individual, PropertyFacts};
pub use summarizer::{
    summarize_or_fallback, AnalysisReport, FactBundle, GeminiSummarizer, StructuredValuation,
    Summarizer, SummarizerSettings,
};
