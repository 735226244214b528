//! Batch transcription orchestration.
//!
//! Runs one engine over a list of media items sequentially. A failing item
//! is recorded and the batch moves on; only engine construction failures
//! abort a run before it starts.

use crate::config::{Config, OutputFormat};
use crate::discover::MediaItem;
use crate::engine::{self, Transcriber, Transcription};
use crate::error::{Error, Result};
use crate::normalize;
use crate::output;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Where transcripts are written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OutputPolicy {
    /// Write next to each input file.
    #[default]
    Alongside,
    /// Write all transcripts into one directory.
    Directory(PathBuf),
    /// Write a single input's transcript to an explicit path.
    File(PathBuf),
    /// Do not write files; results stay in memory.
    Suppress,
}

/// Options controlling a batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub output: OutputPolicy,
    /// Skip items whose transcript already exists at the target path.
    pub skip_existing: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            output: OutputPolicy::Alongside,
            skip_existing: true,
        }
    }
}

/// Outcome of one media item.
#[derive(Debug)]
pub struct ItemReport {
    pub item: MediaItem,
    pub status: ItemStatus,
    /// Where the transcript was (or would have been) written.
    pub output_path: Option<PathBuf>,
}

#[derive(Debug)]
pub enum ItemStatus {
    Transcribed(Transcription),
    Skipped,
    Failed(Error),
}

impl ItemStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, ItemStatus::Transcribed(_) | ItemStatus::Skipped)
    }
}

/// Aggregate view over a finished batch.
pub struct BatchSummary<'a> {
    pub total: usize,
    pub transcribed: usize,
    pub skipped: usize,
    pub failed: Vec<&'a ItemReport>,
}

impl BatchSummary<'_> {
    /// Items that ended in a usable transcript, including ones skipped
    /// because a transcript already existed.
    pub fn successful(&self) -> usize {
        self.transcribed + self.skipped
    }

    /// True when the batch ran and produced nothing usable.
    pub fn all_failed(&self) -> bool {
        self.total > 0 && self.successful() == 0
    }
}

/// Summarize a finished batch.
pub fn summarize(reports: &[ItemReport]) -> BatchSummary<'_> {
    let mut summary = BatchSummary {
        total: reports.len(),
        transcribed: 0,
        skipped: 0,
        failed: Vec::new(),
    };
    for report in reports {
        match report.status {
            ItemStatus::Transcribed(_) => summary.transcribed += 1,
            ItemStatus::Skipped => summary.skipped += 1,
            ItemStatus::Failed(_) => summary.failed.push(report),
        }
    }
    summary
}

/// Compute the transcript path for one input under an output policy.
///
/// Returns `None` when output is suppressed.
pub fn target_path(input: &Path, policy: &OutputPolicy, format: OutputFormat) -> Option<PathBuf> {
    let extension = format.extension();
    match policy {
        OutputPolicy::Alongside => Some(input.with_extension(extension)),
        OutputPolicy::Directory(dir) => {
            let name = PathBuf::from(input.file_name()?).with_extension(extension);
            Some(dir.join(name))
        }
        OutputPolicy::File(path) => Some(path.clone()),
        OutputPolicy::Suppress => None,
    }
}

/// Drives one engine over a batch of media items.
pub struct BatchRunner {
    engine: Box<dyn Transcriber>,
    config: Config,
}

impl BatchRunner {
    /// Create a runner for the configured engine.
    pub async fn new(config: Config) -> Result<Self> {
        let engine = engine::create_engine(&config).await?;
        Ok(Self { engine, config })
    }

    /// Create a runner with an explicit engine.
    pub fn with_engine(config: Config, engine: Box<dyn Transcriber>) -> Self {
        Self { engine, config }
    }

    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    /// Process every item in order, reporting progress after each one.
    ///
    /// Individual failures are captured in the returned reports; the run
    /// itself always completes. `on_progress` receives the number of items
    /// finished so far, the total, and the item just finished, whatever its
    /// outcome was.
    pub async fn run(
        &mut self,
        items: Vec<MediaItem>,
        options: &BatchOptions,
        mut on_progress: impl FnMut(usize, usize, &MediaItem),
    ) -> Vec<ItemReport> {
        let total = items.len();
        info!(total, engine = self.engine.name(), "starting batch");

        let mut reports = Vec::with_capacity(total);
        for (index, item) in items.into_iter().enumerate() {
            let report = self.process_item(item, options).await;
            on_progress(index + 1, total, &report.item);

            match &report.status {
                ItemStatus::Transcribed(t) => info!(
                    file = %report.item.file_name(),
                    duration_secs = t.duration,
                    processing_secs = t.processing_time,
                    "transcribed"
                ),
                ItemStatus::Skipped => debug!(
                    file = %report.item.file_name(),
                    "transcript already exists, skipping"
                ),
                ItemStatus::Failed(e) => warn!(
                    file = %report.item.file_name(),
                    error = %e,
                    "transcription failed"
                ),
            }
            reports.push(report);
        }
        reports
    }

    async fn process_item(&mut self, item: MediaItem, options: &BatchOptions) -> ItemReport {
        let target = target_path(&item.path, &options.output, self.config.output.format);

        if options.skip_existing {
            if let Some(path) = &target {
                if path.exists() {
                    return ItemReport {
                        item,
                        status: ItemStatus::Skipped,
                        output_path: target,
                    };
                }
            }
        }

        let status = match self.transcribe_one(&item, target.as_deref()).await {
            Ok(transcription) => ItemStatus::Transcribed(transcription),
            Err(e) => ItemStatus::Failed(e),
        };

        ItemReport {
            item,
            status,
            output_path: target,
        }
    }

    async fn transcribe_one(
        &mut self,
        item: &MediaItem,
        target: Option<&Path>,
    ) -> Result<Transcription> {
        let mut transcription = self.engine.transcribe(&item.path).await?;

        if self.config.normalize {
            normalize::normalize_transcription(&mut transcription);
        }

        if let Some(target) = target {
            let bytes = output::render(
                &transcription,
                &item.path,
                self.engine.name(),
                self.config.output.format,
                self.config.output.include_timestamps,
            )?;
            output::write_atomic(target, &bytes).await?;
        }

        Ok(transcription)
    }
}

#[cfg(test)]
#[path = "batch_test.rs"]
mod tests;
