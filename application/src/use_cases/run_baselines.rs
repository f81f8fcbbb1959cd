//! Baseline batch driver
//!
//! Fans baseline generation out over a bounded pool of blocking workers.
//! Workers never touch the index: each returns its report and this driver,
//! the single owner of the [`ToolIndex`], applies the updates.

use super::generate_baseline::{
    BaselineError, BaselineOutcome, BaselineReport, GenerateBaselineUseCase,
};
use crate::config::BatchParams;
use crate::ports::capturer::Capturer;
use crate::ports::progress::{BaselineProgressNotifier, NoProgress};
use crate::ports::tool_store::ToolStore;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use warden_domain::{CommandSequence, ToolIndex};

/// Everything a batch produced, sorted by tool id
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub reports: Vec<BaselineReport>,
    pub failures: Vec<BaselineError>,
}

impl BatchSummary {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn count(&self, outcome: BaselineOutcome) -> usize {
        self.reports.iter().filter(|r| r.outcome == outcome).count()
    }

    pub fn total(&self) -> usize {
        self.reports.len() + self.failures.len()
    }
}

/// Use case for running many baselines concurrently
pub struct RunBaselinesUseCase<C: Capturer + 'static, S: ToolStore + 'static> {
    generator: Arc<GenerateBaselineUseCase<C, S>>,
    params: BatchParams,
}

impl<C: Capturer + 'static, S: ToolStore + 'static> RunBaselinesUseCase<C, S> {
    pub fn new(generator: Arc<GenerateBaselineUseCase<C, S>>, params: BatchParams) -> Self {
        Self { generator, params }
    }

    /// Execute with default (no-op) progress
    pub async fn execute(
        &self,
        sequences: Vec<CommandSequence>,
        index: &mut ToolIndex,
    ) -> BatchSummary {
        self.execute_with_progress(sequences, index, &NoProgress)
            .await
    }

    /// Generate or verify every sequence, then apply updates to `index`.
    ///
    /// Returns only after every worker has been joined. Saving the index is
    /// left to the caller.
    pub async fn execute_with_progress(
        &self,
        sequences: Vec<CommandSequence>,
        index: &mut ToolIndex,
        progress: &dyn BaselineProgressNotifier,
    ) -> BatchSummary {
        let mut seen = BTreeSet::new();
        let sequences: Vec<CommandSequence> = sequences
            .into_iter()
            .filter(|s| seen.insert(s.tool_id()))
            .collect();

        info!(
            "Generating {} baselines with {} workers",
            sequences.len(),
            self.params.max_workers()
        );
        progress.on_batch_start(sequences.len());

        let semaphore = Arc::new(Semaphore::new(self.params.max_workers()));
        let mut join_set = JoinSet::new();
        let mut pending: BTreeSet<String> = BTreeSet::new();

        for sequence in sequences {
            let generator = Arc::clone(&self.generator);
            let semaphore = Arc::clone(&semaphore);
            let current = index.lookup(&sequence);
            let tool_id = sequence.tool_id();
            pending.insert(tool_id.clone());

            join_set.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => {
                        return Err(BaselineError::Aborted {
                            tool_id,
                            reason: e.to_string(),
                        });
                    }
                };

                let job = tokio::task::spawn_blocking(move || {
                    generator.generate_or_verify(&sequence, current)
                });
                match job.await {
                    Ok(result) => result,
                    Err(e) => Err(BaselineError::Aborted {
                        tool_id,
                        reason: e.to_string(),
                    }),
                }
            });
        }

        let mut summary = BatchSummary::default();

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(Ok(report)) => {
                    pending.remove(&report.tool_id);
                    if report.outcome == BaselineOutcome::Updated {
                        index.record(&report.sequence, report.fingerprint);
                    }
                    debug!("{}: {}", report.tool_id, report.outcome);
                    progress.on_tool_complete(&report.tool_id, true, report.outcome.as_str());
                    summary.reports.push(report);
                }
                Ok(Err(e)) => {
                    pending.remove(e.tool_id());
                    warn!("{}", e);
                    progress.on_tool_complete(e.tool_id(), false, &e.to_string());
                    summary.failures.push(e);
                }
                Err(e) => {
                    warn!("Task join error: {}", e);
                }
            }
        }

        // Workers whose wrapper task died never reported back.
        for tool_id in pending {
            let e = BaselineError::Aborted {
                tool_id,
                reason: "worker task was lost".to_string(),
            };
            progress.on_tool_complete(e.tool_id(), false, &e.to_string());
            summary.failures.push(e);
        }

        summary.reports.sort_by(|a, b| a.tool_id.cmp(&b.tool_id));
        summary
            .failures
            .sort_by(|a, b| a.tool_id().cmp(b.tool_id()));

        progress.on_batch_complete(summary.reports.len(), summary.failures.len());
        info!(
            "Baseline batch finished: {} updated, {} up to date, {} failed",
            summary.count(BaselineOutcome::Updated),
            summary.count(BaselineOutcome::UpToDate),
            summary.failures.len()
        );

        summary
    }
}
