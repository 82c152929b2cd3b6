//! Autopilot integration tests.
//!
//! These tests verify quota handling with mock collaborators:
//! - Daily short quota (current UTC day)
//! - Weekly long quota (Sunday to today) and series continuation
//! - Abort on the first failing production
//! - Next action strategy and background loop state

use std::sync::Arc;

use chrono::NaiveDate;

use reelpilot_core::{
    clock::Clock,
    collaborators::SeriesSuggestion,
    events::{EventHandle, PipelineEvent},
    operation::{MemoryOperationTracker, OperationTracker},
    pipeline::{PipelineConfig, PipelineError, VideoPipeline},
    scheduler::{AutopilotConfig, AutopilotScheduler},
    testing::{fixtures, ManualClock, MockCall, MockCollaborators},
    video::{MemoryVideoStore, VideoFilter, VideoLength, VideoStore},
};

struct TestHarness {
    scheduler: AutopilotScheduler,
    mock: MockCollaborators,
    videos: Arc<MemoryVideoStore>,
    events: EventHandle,
}

impl TestHarness {
    fn new() -> Self {
        let videos = Arc::new(MemoryVideoStore::new());
        let clock = Arc::new(ManualClock::new(fixtures::friday_noon()));
        let operations = Arc::new(MemoryOperationTracker::new(
            Arc::clone(&videos) as Arc<dyn VideoStore>,
            Arc::clone(&clock) as Arc<dyn Clock>,
        ));
        let mock = MockCollaborators::new();
        let events = EventHandle::default();
        let collaborators = mock.collaborators();

        let pipeline = Arc::new(
            VideoPipeline::new(
                PipelineConfig::default(),
                Arc::clone(&videos) as Arc<dyn VideoStore>,
                operations as Arc<dyn OperationTracker>,
                collaborators.clone(),
                Arc::clone(&clock) as Arc<dyn Clock>,
            )
            .with_events(events.clone()),
        );
        let scheduler = AutopilotScheduler::new(
            AutopilotConfig::default(),
            pipeline,
            clock as Arc<dyn Clock>,
        )
        .with_events(events.clone());

        Self {
            scheduler,
            mock,
            videos,
            events,
        }
    }

    /// Register a record directly, bypassing the pipeline.
    fn seed(&self, title: &str, length: VideoLength, day: u32, playlist: Option<&str>) {
        let date = october(day);
        let record = match playlist {
            Some(playlist) => fixtures::series_record(title, playlist, length, date),
            None => fixtures::video_record(title, length, date),
        };
        assert!(self.videos.create(record).unwrap());
    }

    fn count(&self, length: VideoLength) -> usize {
        self.videos
            .scan(&VideoFilter::new().with_length(length))
            .unwrap()
            .len()
    }
}

fn october(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, day).unwrap()
}

// =============================================================================
// Short Quota Tests
// =============================================================================

#[tokio::test]
async fn test_short_quota_met_creates_nothing() {
    let harness = TestHarness::new();
    for title in ["s1", "s2", "s3"] {
        harness.seed(title, VideoLength::Short, 16, None);
    }

    let report = harness.scheduler.run(VideoLength::Short).await.unwrap();

    assert_eq!(report.existing, 3);
    assert_eq!(report.deficit, 0);
    assert!(report.produced.is_empty());
    assert_eq!(harness.count(VideoLength::Short), 3);
    assert!(harness.mock.script_requests().await.is_empty());
}

#[tokio::test]
async fn test_short_deficit_is_filled_with_generic_topic() {
    let harness = TestHarness::new();
    harness.seed("s1", VideoLength::Short, 16, None);

    let report = harness.scheduler.run(VideoLength::Short).await.unwrap();

    assert_eq!(report.deficit, 2);
    assert_eq!(report.produced.len(), 2);
    assert_eq!(harness.count(VideoLength::Short), 3);

    let scripts = harness.mock.script_requests().await;
    assert_eq!(scripts.len(), 2);
    for request in &scripts {
        assert_eq!(request.topic.as_deref(), Some("a trending topic"));
        assert_eq!(request.length, VideoLength::Short);
        assert!(request.title.is_none());
    }
    for key in &report.produced {
        assert!(harness.videos.get(key).unwrap().unwrap().playlist.is_none());
    }
}

#[tokio::test]
async fn test_short_quota_only_counts_today() {
    let harness = TestHarness::new();
    for title in ["y1", "y2", "y3"] {
        harness.seed(title, VideoLength::Short, 15, None);
    }
    harness.seed("long today", VideoLength::Long, 16, None);

    let report = harness.scheduler.run(VideoLength::Short).await.unwrap();

    assert_eq!(report.existing, 0);
    assert_eq!(report.produced.len(), 3);
}

#[tokio::test]
async fn test_first_failure_aborts_run() {
    let harness = TestHarness::new();
    harness.mock.fail(MockCall::Optimize, "quota exceeded").await;

    let result = harness.scheduler.run(VideoLength::Short).await;

    assert!(matches!(result, Err(PipelineError::Optimization(_))));
    assert_eq!(harness.mock.script_requests().await.len(), 1);
    assert_eq!(harness.count(VideoLength::Short), 0);
}

// =============================================================================
// Long Quota Tests
// =============================================================================

#[tokio::test]
async fn test_long_deficit_starts_new_series() {
    let harness = TestHarness::new();
    harness.seed("Monday long", VideoLength::Long, 12, None);

    let report = harness.scheduler.run(VideoLength::Long).await.unwrap();

    assert_eq!(report.existing, 1);
    assert_eq!(report.produced, vec!["Deep Sea Creatures - Part 1".to_string()]);
    let record = harness.videos.get(&report.produced[0]).unwrap().unwrap();
    assert_eq!(record.playlist.as_deref(), Some("Deep Sea"));
    assert_eq!(record.length, VideoLength::Long);
}

#[tokio::test]
async fn test_long_deficit_continues_existing_series() {
    let harness = TestHarness::new();
    // Two parts in earlier weeks, one this week
    harness.seed("Ocean Mysteries - Part 1", VideoLength::Long, 1, Some("Ocean Mysteries"));
    harness.seed("Ocean Mysteries - Part 2", VideoLength::Long, 5, Some("Ocean Mysteries"));
    harness.seed("Ocean Mysteries - Part 3", VideoLength::Long, 13, Some("Ocean Mysteries"));
    harness
        .mock
        .set_series(SeriesSuggestion {
            topic: "Ocean Mysteries".to_string(),
            playlist: "Ocean Mysteries".to_string(),
            is_new_series: false,
        })
        .await;

    let report = harness.scheduler.run(VideoLength::Long).await.unwrap();

    assert_eq!(report.existing, 1);
    assert_eq!(report.deficit, 1);
    assert_eq!(report.produced, vec!["Ocean Mysteries - Part 4".to_string()]);
    assert_eq!(
        harness.mock.series_requests().await,
        vec![vec!["Ocean Mysteries".to_string()]]
    );
}

#[tokio::test]
async fn test_long_parts_share_one_series_suggestion() {
    let harness = TestHarness::new();

    let report = harness.scheduler.run(VideoLength::Long).await.unwrap();

    assert_eq!(
        report.produced,
        vec![
            "Deep Sea Creatures - Part 1".to_string(),
            "Deep Sea Creatures - Part 2".to_string(),
        ]
    );
    assert_eq!(harness.mock.series_requests().await.len(), 1);
    assert_eq!(harness.videos.count_in_playlist("Deep Sea").unwrap(), 2);
}

#[tokio::test]
async fn test_long_quota_window_starts_on_sunday() {
    let harness = TestHarness::new();
    harness.seed("Saturday long", VideoLength::Long, 10, None);
    harness.seed("Sunday long", VideoLength::Long, 11, None);
    harness.seed("Friday long", VideoLength::Long, 16, None);

    let report = harness.scheduler.run(VideoLength::Long).await.unwrap();

    assert_eq!(report.existing, 2);
    assert!(report.produced.is_empty());
    assert!(harness.mock.series_requests().await.is_empty());
}

#[tokio::test]
async fn test_series_strategy_failure() {
    let harness = TestHarness::new();
    harness.mock.fail(MockCall::Series, "strategist offline").await;

    let result = harness.scheduler.run(VideoLength::Long).await;

    assert!(matches!(result, Err(PipelineError::SeriesStrategy(_))));
    assert_eq!(harness.count(VideoLength::Long), 0);
}

// =============================================================================
// Strategy and Loop Tests
// =============================================================================

#[tokio::test]
async fn test_next_action_prefers_shorts() {
    let harness = TestHarness::new();
    assert_eq!(harness.scheduler.next_action().unwrap(), Some(VideoLength::Short));

    for title in ["s1", "s2", "s3"] {
        harness.seed(title, VideoLength::Short, 16, None);
    }
    assert_eq!(harness.scheduler.next_action().unwrap(), Some(VideoLength::Long));

    harness.seed("l1", VideoLength::Long, 14, None);
    harness.seed("l2", VideoLength::Long, 16, None);
    assert_eq!(harness.scheduler.next_action().unwrap(), None);

    let status = harness.scheduler.status().unwrap();
    assert_eq!(status.week_start, october(11));
    assert_eq!(status.shorts_today, 3);
    assert_eq!(status.longs_this_week, 2);
}

#[tokio::test]
async fn test_run_once_fills_both_quotas() {
    let harness = TestHarness::new();
    let mut rx = harness.events.subscribe();

    let reports = harness.scheduler.run_once().await.unwrap();

    assert_eq!(reports.len(), 2);
    assert_eq!(harness.count(VideoLength::Short), 3);
    assert_eq!(harness.count(VideoLength::Long), 2);
    assert_eq!(harness.scheduler.next_action().unwrap(), None);

    let mut runs = Vec::new();
    while let Ok(envelope) = rx.try_recv() {
        if let PipelineEvent::AutopilotRun { length, produced, .. } = envelope.event {
            runs.push((length, produced.len()));
        }
    }
    assert_eq!(runs, vec![(VideoLength::Short, 3), (VideoLength::Long, 2)]);
}

#[tokio::test]
async fn test_autopilot_start_stop() {
    let harness = TestHarness::new();
    assert!(!harness.scheduler.status().unwrap().running);

    harness.scheduler.start().await;
    assert!(harness.scheduler.status().unwrap().running);

    harness.scheduler.stop().await;
    assert!(!harness.scheduler.status().unwrap().running);
}
