//! Autopilot scheduler implementation.
//!
//! Keeps the channel at its publishing quota: a number of short videos per
//! day and long videos per week. Every run counts what is already registered
//! for the current window and produces the missing videos one after another.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use serde::Serialize;
use tokio::sync::{broadcast, Mutex};
use tracing::{error, info, warn};

use crate::clock::Clock;
use crate::events::{EventHandle, PipelineEvent};
use crate::metrics::AUTOPILOT_DEFICIT;
use crate::pipeline::{PipelineError, ProduceRequest, VideoPipeline};
use crate::video::{VideoFilter, VideoLength, VideoStore};

use super::config::AutopilotConfig;
use super::quota::{deficit, series_title, start_of_week};

/// Outcome of one autopilot run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AutopilotReport {
    pub length: VideoLength,
    /// Videos already registered in the quota window.
    pub existing: usize,
    pub deficit: usize,
    /// Keys of the videos produced by this run.
    pub produced: Vec<String>,
}

/// Quota snapshot for the current day and week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AutopilotStatus {
    pub running: bool,
    pub today: NaiveDate,
    pub week_start: NaiveDate,
    pub shorts_today: usize,
    pub daily_short_goal: usize,
    pub longs_this_week: usize,
    pub weekly_long_goal: usize,
    pub next_action: Option<VideoLength>,
}

/// Produces videos until the daily and weekly goals are met.
#[derive(Clone)]
pub struct AutopilotScheduler {
    config: AutopilotConfig,
    pipeline: Arc<VideoPipeline>,
    clock: Arc<dyn Clock>,
    events: Option<EventHandle>,

    // Runtime state
    run_lock: Arc<Mutex<()>>,
    running: Arc<AtomicBool>,
    shutdown_tx: broadcast::Sender<()>,
}

impl AutopilotScheduler {
    pub fn new(
        config: AutopilotConfig,
        pipeline: Arc<VideoPipeline>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            config,
            pipeline,
            clock,
            events: None,
            run_lock: Arc::new(Mutex::new(())),
            running: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
        }
    }

    pub fn with_events(mut self, events: EventHandle) -> Self {
        self.events = Some(events);
        self
    }

    pub fn config(&self) -> &AutopilotConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    fn videos(&self) -> &Arc<dyn VideoStore> {
        self.pipeline.videos()
    }

    fn shorts_today(&self, today: NaiveDate) -> Result<usize, PipelineError> {
        let filter = VideoFilter::new()
            .with_length(VideoLength::Short)
            .on(today);
        Ok(self.videos().scan(&filter)?.len())
    }

    fn longs_this_week(&self, today: NaiveDate) -> Result<usize, PipelineError> {
        let filter = VideoFilter::new()
            .with_length(VideoLength::Long)
            .between(start_of_week(today), today);
        Ok(self.videos().scan(&filter)?.len())
    }

    /// Current counts against the goals.
    pub fn status(&self) -> Result<AutopilotStatus, PipelineError> {
        let today = self.clock.now().date_naive();
        let shorts_today = self.shorts_today(today)?;
        let longs_this_week = self.longs_this_week(today)?;

        let next_action = if shorts_today < self.config.daily_short_goal {
            Some(VideoLength::Short)
        } else if longs_this_week < self.config.weekly_long_goal {
            Some(VideoLength::Long)
        } else {
            None
        };

        Ok(AutopilotStatus {
            running: self.running.load(Ordering::Relaxed),
            today,
            week_start: start_of_week(today),
            shorts_today,
            daily_short_goal: self.config.daily_short_goal,
            longs_this_week,
            weekly_long_goal: self.config.weekly_long_goal,
            next_action,
        })
    }

    /// What a run should produce next: shorts first, then longs.
    pub fn next_action(&self) -> Result<Option<VideoLength>, PipelineError> {
        Ok(self.status()?.next_action)
    }

    /// Fill the quota window for `length`.
    ///
    /// Videos are produced sequentially; the first failing production aborts
    /// the run and its error is returned. Runs never overlap.
    pub async fn run(&self, length: VideoLength) -> Result<AutopilotReport, PipelineError> {
        let _guard = self.run_lock.lock().await;
        let today = self.clock.now().date_naive();

        let report = match length {
            VideoLength::Short => self.run_short(today).await,
            VideoLength::Long => self.run_long(today).await,
        }?;

        info!(
            length = %report.length,
            existing = report.existing,
            deficit = report.deficit,
            produced = report.produced.len(),
            "Autopilot run finished"
        );
        if let Some(events) = &self.events {
            events.emit(PipelineEvent::AutopilotRun {
                length: report.length,
                deficit: report.deficit,
                produced: report.produced.clone(),
            });
        }
        Ok(report)
    }

    async fn run_short(&self, today: NaiveDate) -> Result<AutopilotReport, PipelineError> {
        let existing = self.shorts_today(today)?;
        let missing = deficit(self.config.daily_short_goal, existing);
        record_deficit(VideoLength::Short, missing);

        let mut produced = Vec::with_capacity(missing);
        for _ in 0..missing {
            let request =
                ProduceRequest::new(VideoLength::Short).with_topic(self.config.short_topic.clone());
            produced.push(self.pipeline.produce(request).await?);
        }

        Ok(AutopilotReport {
            length: VideoLength::Short,
            existing,
            deficit: missing,
            produced,
        })
    }

    async fn run_long(&self, today: NaiveDate) -> Result<AutopilotReport, PipelineError> {
        let existing = self.longs_this_week(today)?;
        let missing = deficit(self.config.weekly_long_goal, existing);
        record_deficit(VideoLength::Long, missing);

        let mut produced = Vec::with_capacity(missing);
        if missing > 0 {
            let playlists = self.videos().playlists()?;
            let suggestion = self
                .pipeline
                .collaborators()
                .strategist
                .suggest_series(&playlists)
                .await
                .map_err(PipelineError::SeriesStrategy)?;

            let first_part = if suggestion.is_new_series {
                1
            } else {
                self.videos().count_in_playlist(&suggestion.playlist)? + 1
            };
            info!(
                playlist = %suggestion.playlist,
                new_series = suggestion.is_new_series,
                first_part,
                "Series chosen for long videos"
            );

            for part in first_part..first_part + missing {
                let request = ProduceRequest::new(VideoLength::Long)
                    .with_topic(suggestion.topic.clone())
                    .with_title(series_title(&suggestion.topic, part))
                    .with_playlist(suggestion.playlist.clone());
                produced.push(self.pipeline.produce(request).await?);
            }
        }

        Ok(AutopilotReport {
            length: VideoLength::Long,
            existing,
            deficit: missing,
            produced,
        })
    }

    /// Short run then long run.
    pub async fn run_once(&self) -> Result<Vec<AutopilotReport>, PipelineError> {
        let short = self.run(VideoLength::Short).await?;
        let long = self.run(VideoLength::Long).await?;
        Ok(vec![short, long])
    }

    /// Start the background autopilot loop.
    pub async fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Autopilot already running");
            return;
        }

        info!(interval_secs = self.config.interval_secs, "Starting autopilot");

        let scheduler = self.clone();
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let interval = Duration::from_secs(self.config.interval_secs);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("Autopilot received shutdown signal");
                        break;
                    }
                    _ = tokio::time::sleep(interval) => {
                        if !scheduler.running.load(Ordering::Relaxed) {
                            break;
                        }
                        if let Err(e) = scheduler.run_once().await {
                            error!("Autopilot run failed: {}", e);
                        }
                    }
                }
            }
        });
    }

    /// Stop the background autopilot loop. A run in progress finishes.
    pub async fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            warn!("Autopilot not running");
            return;
        }

        info!("Stopping autopilot");
        let _ = self.shutdown_tx.send(());
    }
}

fn record_deficit(length: VideoLength, missing: usize) {
    AUTOPILOT_DEFICIT
        .with_label_values(&[length.as_str()])
        .set(i64::try_from(missing).unwrap_or(i64::MAX));
}
