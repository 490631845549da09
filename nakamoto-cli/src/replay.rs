//! Replays recorded scroll traces through a [`ReadingTracker`]
//!
//! A trace is JSON lines, one scroll sample per line:
//!
//!     {"scroll_top": 420, "document_height": 1100, "viewport_height": 100}
//!     {"scroll_top": 500, "document_height": 1100, "viewport_height": 100, "wait_ms": 31000}
//!
//! `wait_ms` pauses before the sample is fed, which lets a trace exercise the
//! backstop timer. Blank lines and lines starting with `#` are skipped.

use async_trait::async_trait;
use nakamoto_reader::{
    ProgressAck, ProgressReporter, ReadingTracker, ReportError, ScrollSample, SessionSummary,
    TrackerSettings,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// XP the dry-run reporter awards per milestone.
pub const DRY_RUN_XP: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TraceEntry {
    #[serde(flatten)]
    pub sample: ScrollSample,
    #[serde(default)]
    pub wait_ms: u64,
}

#[derive(Debug)]
pub struct TraceError {
    pub line: usize,
    pub message: String,
}

impl fmt::Display for TraceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "trace line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for TraceError {}

pub fn parse_trace(source: &str) -> Result<Vec<TraceEntry>, TraceError> {
    source
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(index, line)| {
            serde_json::from_str(line).map_err(|e| TraceError {
                line: index + 1,
                message: e.to_string(),
            })
        })
        .collect()
}

/// Stands in for the progress API when no endpoint is configured. Every
/// report is logged; XP is awarded once per article for each milestone.
#[derive(Debug)]
pub struct DryRunReporter {
    milestone_step: u8,
    awarded: Mutex<BTreeSet<(String, u8)>>,
}

impl DryRunReporter {
    pub fn new(milestone_step: u8) -> Self {
        Self {
            milestone_step: milestone_step.max(1),
            awarded: Mutex::new(BTreeSet::new()),
        }
    }
}

#[async_trait]
impl ProgressReporter for DryRunReporter {
    async fn report(
        &self,
        article_id: &str,
        read_percentage: u8,
    ) -> Result<ProgressAck, ReportError> {
        let milestone = read_percentage > 0 && read_percentage % self.milestone_step == 0;
        let first_time = milestone
            && self
                .awarded
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert((article_id.to_string(), read_percentage));
        let xp_earned = if first_time { DRY_RUN_XP } else { 0 };

        tracing::info!(
            article = %article_id,
            percentage = read_percentage,
            xp = xp_earned,
            "dry run: progress report"
        );
        Ok(ProgressAck { xp_earned })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub samples: usize,
    pub reporter: String,
    #[serde(flatten)]
    pub summary: SessionSummary,
}

pub async fn replay(
    entries: &[TraceEntry],
    article_id: &str,
    settings: TrackerSettings,
    reporter: Arc<dyn ProgressReporter>,
    reporter_name: &str,
) -> ReplayReport {
    let tracker = ReadingTracker::start(settings, article_id, Some(reporter));

    let mut notifications = tracker.notifications();
    let announcer = tokio::spawn(async move {
        while notifications.changed().await.is_ok() {
            let shown = notifications.borrow_and_update().clone();
            if let Some(shown) = shown {
                eprintln!(
                    "+{} XP at {}% ({} total)",
                    shown.xp_earned, shown.read_percentage, shown.total_xp
                );
            }
        }
    });

    for entry in entries {
        if entry.wait_ms > 0 {
            tokio::time::sleep(Duration::from_millis(entry.wait_ms)).await;
        }
        let stored = tracker.observe(entry.sample);
        tracing::debug!(
            sampled = entry.sample.percentage(),
            stored,
            "scroll sample"
        );
        tokio::task::yield_now().await;
    }

    let summary = tracker.stop().await;
    announcer.abort();

    ReplayReport {
        samples: entries.len(),
        reporter: reporter_name.to_string(),
        summary,
    }
}
