//! Chunked, paced execution of per-listing energy-label lookups.

use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use vastgoed_core::AppConfig;
use vastgoed_providers::{
    provider, AreaListing, EnergyLabelData, EnergyLabelRequest, PropertyDataSource, ProviderResult,
};

/// Default number of concurrent calls per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 3;
/// Default pause between consecutive chunks.
pub const DEFAULT_CHUNK_DELAY: Duration = Duration::from_millis(200);

/// Runs a list of async jobs in fixed-size chunks.
///
/// Jobs within a chunk run concurrently. Chunk `k + 1` starts only after
/// every job in chunk `k` has settled, followed by the pacing delay. There is
/// no delay after the final chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchScheduler {
    chunk_size: usize,
    delay: Duration,
}

impl Default for BatchScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_DELAY)
    }
}

impl BatchScheduler {
    /// A chunk size of 0 is treated as 1.
    #[must_use]
    pub fn new(chunk_size: usize, delay: Duration) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            delay,
        }
    }

    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self::new(
            config.energy_label_batch_size,
            Duration::from_millis(config.energy_label_batch_delay_ms),
        )
    }

    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Number of chunks needed for `items` jobs.
    #[must_use]
    pub fn chunk_count(&self, items: usize) -> usize {
        items.div_ceil(self.chunk_size)
    }

    /// Runs `job` for every item and returns the outputs in input order.
    pub async fn run<'a, I, T, F, Fut>(&self, items: &'a [I], job: F) -> Vec<T>
    where
        F: Fn(&'a I) -> Fut,
        Fut: Future<Output = T>,
    {
        let mut outputs = Vec::with_capacity(items.len());
        let total_chunks = self.chunk_count(items.len());

        for (index, chunk) in items.chunks(self.chunk_size).enumerate() {
            tracing::debug!(
                chunk = index + 1,
                total_chunks,
                size = chunk.len(),
                "starting chunk"
            );
            outputs.extend(join_all(chunk.iter().map(&job)).await);

            if index + 1 < total_chunks && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
        }

        outputs
    }
}

/// Energy-label outcomes for one area run, keyed by listing id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnergyLabelBatchResult {
    pub labels: BTreeMap<String, ProviderResult<EnergyLabelData>>,
    pub success_count: usize,
    pub absent_count: usize,
    pub error_count: usize,
}

impl EnergyLabelBatchResult {
    fn record(&mut self, id: String, result: ProviderResult<EnergyLabelData>) {
        match &result {
            ProviderResult::Success(_) => self.success_count += 1,
            ProviderResult::Absent => self.absent_count += 1,
            ProviderResult::Failure(_) => self.error_count += 1,
        }
        self.labels.insert(id, result);
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.success_count + self.absent_count + self.error_count
    }

    /// More than half of the lookups failed. Absent labels never count.
    #[must_use]
    pub fn exceeds_error_threshold(&self) -> bool {
        self.error_count * 2 > self.total()
    }

    /// The aggregate warning to show, if any.
    #[must_use]
    pub fn warning(&self) -> Option<String> {
        self.exceeds_error_threshold().then(|| {
            format!(
                "many energy labels could not be fetched ({}/{})",
                self.error_count,
                self.total()
            )
        })
    }

    #[must_use]
    pub fn get(&self, listing_id: &str) -> Option<&ProviderResult<EnergyLabelData>> {
        self.labels.get(listing_id)
    }
}

/// Resolves the energy label of every listing under `scheduler`'s chunking.
///
/// A listing whose address cannot be turned into a registry request is a
/// `Failure` and issues no call.
pub async fn resolve_energy_labels<S: PropertyDataSource>(
    source: &S,
    listings: &[AreaListing],
    scheduler: &BatchScheduler,
) -> EnergyLabelBatchResult {
    let outcomes = scheduler
        .run(listings, |listing| async move {
            let result = match EnergyLabelRequest::from_listing(listing) {
                Ok(request) => source.fetch_energy_label(&request).await,
                Err(e) => ProviderResult::Failure(e.to_string()),
            };
            (listing.id.clone(), result)
        })
        .await;

    let mut batch = EnergyLabelBatchResult::default();
    for (id, result) in outcomes {
        batch.record(id, result);
    }

    tracing::info!(
        provider = provider::ENERGY_LABEL,
        total = batch.total(),
        success = batch.success_count,
        absent = batch.absent_count,
        errors = batch.error_count,
        "energy label batch complete"
    );
    if let Some(warning) = batch.warning() {
        tracing::warn!(
            provider = provider::ENERGY_LABEL,
            %warning,
            "energy label error budget exceeded"
        );
    }

    batch
}

#[cfg(test)]
#[path = "batch_test.rs"]
mod tests;
