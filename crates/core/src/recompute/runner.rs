//! Recompute pass implementation.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use chrono::{SecondsFormat, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::aggregate::aggregate;
use crate::features::{FeatureExtractor, FeatureField, FeatureRecord};
use crate::library::LibrarySource;
use crate::metrics;
use crate::settings::{SettingsStore, LAST_RECOMPUTE_KEY};
use crate::stats::{BucketTally, Scope, StatCategory, StatKey, StatMetric, StatsCache};

use super::catalog::{by_year, status_counts, tag_counts};
use super::config::RecomputeConfig;
use super::types::{
    CancelToken, RecomputeError, RecomputeEvent, RecomputeFailure, RecomputeProgress,
    RecomputeStage, RecomputeSummary, FIXED_STAGE_UNITS,
};

const VIDEO_FIELDS: [FeatureField; 3] = [
    FeatureField::Resolution,
    FeatureField::VideoCodec,
    FeatureField::Container,
];

const AUDIO_FIELDS: [FeatureField; 2] = [FeatureField::AudioCodec, FeatureField::AudioTrackCount];

/// Rebuilds the statistics cache from the catalog.
pub struct StatsRecomputer {
    config: RecomputeConfig,
    library: Arc<dyn LibrarySource>,
    cache: Arc<dyn StatsCache>,
    settings: Arc<dyn SettingsStore>,
    extractor: Arc<FeatureExtractor>,
}

/// Progress bookkeeping for one pass.
struct Pass<'a> {
    run_id: Uuid,
    stage: Option<RecomputeStage>,
    done: u64,
    total: u64,
    partitions_written: usize,
    events: Option<&'a mpsc::Sender<RecomputeEvent>>,
    cancel: &'a CancelToken,
}

impl<'a> Pass<'a> {
    fn fail(&self, error: RecomputeError) -> RecomputeFailure {
        RecomputeFailure {
            run_id: self.run_id,
            stage: self.stage,
            done: self.done,
            total: self.total,
            error,
        }
    }

    /// Enter a stage, stopping first if cancellation was requested.
    fn begin(&mut self, stage: RecomputeStage) -> Result<(), RecomputeFailure> {
        self.stage = Some(stage);
        if self.cancel.is_cancelled() {
            return Err(self.fail(RecomputeError::Cancelled));
        }
        Ok(())
    }

    fn check_cancelled(&self) -> Result<(), RecomputeFailure> {
        if self.cancel.is_cancelled() {
            return Err(self.fail(RecomputeError::Cancelled));
        }
        Ok(())
    }

    async fn emit(&self, event: RecomputeEvent) {
        if let Some(tx) = self.events {
            // A dropped receiver just means nobody is watching.
            let _ = tx.send(event).await;
        }
    }

    async fn report(&self, detail: Option<String>) {
        let Some(stage) = self.stage else {
            return;
        };
        self.emit(RecomputeEvent::Progress(RecomputeProgress {
            run_id: self.run_id,
            stage,
            done: self.done,
            total: self.total,
            detail,
        }))
        .await;
    }

    /// Finish one unit of work and hand control back to the runtime.
    async fn advance(&mut self, detail: Option<String>) {
        self.done += 1;
        self.report(detail).await;
        tokio::task::yield_now().await;
    }
}

impl StatsRecomputer {
    pub fn new(
        config: RecomputeConfig,
        library: Arc<dyn LibrarySource>,
        cache: Arc<dyn StatsCache>,
        settings: Arc<dyn SettingsStore>,
        extractor: Arc<FeatureExtractor>,
    ) -> Self {
        Self {
            config,
            library,
            cache,
            settings,
            extractor,
        }
    }

    pub fn config(&self) -> &RecomputeConfig {
        &self.config
    }

    /// Start a pass on a background task.
    ///
    /// Returns the task handle and the receiving end of its event channel.
    pub fn spawn(
        self: Arc<Self>,
        cancel: CancelToken,
    ) -> (
        JoinHandle<Result<RecomputeSummary, RecomputeFailure>>,
        mpsc::Receiver<RecomputeEvent>,
    ) {
        let (tx, rx) = mpsc::channel(self.config.progress_buffer.max(1));
        let handle = tokio::spawn(async move { self.run(Some(&tx), &cancel).await });
        (handle, rx)
    }

    /// Run a full pass on the current task.
    ///
    /// Emits `Progress` after every unit, then exactly one `Completed` or
    /// `Failed` event.
    pub async fn run(
        &self,
        events: Option<&mpsc::Sender<RecomputeEvent>>,
        cancel: &CancelToken,
    ) -> Result<RecomputeSummary, RecomputeFailure> {
        let mut pass = Pass {
            run_id: Uuid::new_v4(),
            stage: None,
            done: 0,
            total: FIXED_STAGE_UNITS,
            partitions_written: 0,
            events,
            cancel,
        };
        let started = Instant::now();

        let result = self.execute(&mut pass).await;

        let outcome = match &result {
            Ok(_) => "completed",
            Err(f) if f.is_cancelled() => "cancelled",
            Err(_) => "failed",
        };
        metrics::RECOMPUTE_PASSES.with_label_values(&[outcome]).inc();
        metrics::RECOMPUTE_DURATION
            .with_label_values(&[outcome])
            .observe(started.elapsed().as_secs_f64());

        match &result {
            Ok(summary) => {
                info!(
                    "Recompute {} completed: {} titles, {} files in {:.2}s",
                    summary.run_id,
                    summary.titles,
                    summary.files,
                    started.elapsed().as_secs_f64()
                );
                pass.emit(RecomputeEvent::Completed(summary.clone())).await;
            }
            Err(failure) => {
                if failure.is_cancelled() {
                    warn!(
                        "Recompute {} cancelled at {}/{}",
                        failure.run_id, failure.done, failure.total
                    );
                } else {
                    error!("{}", failure);
                }
                pass.emit(failure.to_event()).await;
            }
        }

        result
    }

    async fn execute(&self, pass: &mut Pass<'_>) -> Result<RecomputeSummary, RecomputeFailure> {
        let started_at = Utc::now();
        info!("Starting recompute {}", pass.run_id);

        // Snapshot the catalog before touching any partition.
        pass.check_cancelled()?;
        let titles = self
            .library
            .list_titles()
            .map_err(|e| pass.fail(e.into()))?;
        let videos = self
            .library
            .list_videos()
            .map_err(|e| pass.fail(e.into()))?;
        pass.total = FIXED_STAGE_UNITS + videos.len() as u64;
        debug!(
            "Catalog snapshot: {} titles, {} video files",
            titles.len(),
            videos.len()
        );

        // Stages 1-3: catalog-derived partitions.
        let catalog_stages: [(RecomputeStage, StatCategory, StatMetric, BucketTally); 3] = [
            (
                RecomputeStage::TitlesByYear,
                StatCategory::Titles,
                StatMetric::ByYear,
                by_year(&titles),
            ),
            (
                RecomputeStage::Tags,
                StatCategory::Tags,
                StatMetric::All,
                tag_counts(&titles),
            ),
            (
                RecomputeStage::Statuses,
                StatCategory::Statuses,
                StatMetric::All,
                status_counts(&titles),
            ),
        ];
        for (stage, category, metric, tally) in catalog_stages {
            pass.begin(stage)?;
            info!("{}", stage.label());
            self.write(pass, StatKey::catalog(category, metric), &tally)?;
            pass.advance(None).await;
        }

        // Stage 4: probe every file, in title/display order.
        pass.begin(RecomputeStage::ProbeFiles)?;
        info!("{} ({} files)", RecomputeStage::ProbeFiles.label(), videos.len());
        let mut records: Vec<(i64, FeatureRecord)> = Vec::with_capacity(videos.len());
        for video in &videos {
            pass.check_cancelled()?;
            let record = self.extractor.extract(&video.path).await;
            metrics::FILES_PROBED.inc();
            records.push((video.title_id, record));
            pass.advance(Some(video.path.display().to_string())).await;
        }

        // Stages 5-6: feature partitions in both scopes.
        for (stage, fields) in [
            (RecomputeStage::VideoAggregates, &VIDEO_FIELDS[..]),
            (RecomputeStage::AudioAggregates, &AUDIO_FIELDS[..]),
        ] {
            pass.begin(stage)?;
            info!("{}", stage.label());
            for &field in fields {
                for scope in Scope::BOTH {
                    let tally = aggregate(scope, field, &records);
                    self.write(pass, StatKey::for_feature(field, scope), &tally)?;
                }
            }
            pass.advance(None).await;
        }

        // Stage 7: record completion.
        pass.begin(RecomputeStage::Finalize)?;
        let completed_at = Utc::now();
        self.settings
            .set_setting(
                LAST_RECOMPUTE_KEY,
                &completed_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            )
            .map_err(|e| pass.fail(e.into()))?;
        pass.advance(None).await;

        let titles_with_video = videos
            .iter()
            .map(|v| v.title_id)
            .collect::<HashSet<_>>()
            .len();

        Ok(RecomputeSummary {
            run_id: pass.run_id,
            started_at,
            completed_at,
            titles: titles.len(),
            titles_with_video,
            files: videos.len(),
            partitions_written: pass.partitions_written,
        })
    }

    fn write(
        &self,
        pass: &mut Pass<'_>,
        key: StatKey,
        tally: &BucketTally,
    ) -> Result<(), RecomputeFailure> {
        self.cache
            .replace(&key, tally)
            .map_err(|e| pass.fail(e.into()))?;
        pass.partitions_written += 1;
        debug!("Wrote {} ({} buckets)", key, tally.len());
        Ok(())
    }
}
