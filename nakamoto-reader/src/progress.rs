//! Scroll sampling and per-article reading state
//!
//! Pure bookkeeping: nothing here touches the network or the clock. The
//! tracker (./tracker.rs) drives a [`ReadingSession`] and decides what to do
//! with the reports it says are due.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One observation of the viewer's scroll position, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollSample {
    pub scroll_top: f64,
    pub document_height: f64,
    pub viewport_height: f64,
}

impl ScrollSample {
    pub fn new(scroll_top: f64, document_height: f64, viewport_height: f64) -> Self {
        Self {
            scroll_top,
            document_height,
            viewport_height,
        }
    }

    /// Scroll depth rounded up to a whole percent in `0..=100`.
    ///
    /// A page that cannot scroll has been read entirely. Garbage input
    /// (NaN, infinities) reads as 0 so it can never move progress.
    pub fn percentage(&self) -> u8 {
        let values = [self.scroll_top, self.document_height, self.viewport_height];
        if values.iter().any(|v| !v.is_finite()) {
            return 0;
        }

        let scrollable = self.document_height - self.viewport_height;
        if scrollable <= 0.0 {
            return 100;
        }

        let raw = (self.scroll_top * 100.0 / scrollable).ceil();
        raw.clamp(0.0, 100.0) as u8
    }
}

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// No sample seen yet
    Idle,
    Sampling,
    /// At least one report is queued or in flight
    Reporting,
    /// The final report was sent, no further samples are accepted
    Flushed,
}

/// When reports become due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportPolicy {
    /// A scroll that lands on a multiple of this is reported
    pub report_step: u8,
    /// The backstop re-reports progress sitting on a multiple of this
    pub milestone_step: u8,
    /// Skip backstop and flush reports the API already acknowledged
    pub suppress_duplicate_reports: bool,
}

impl Default for ReportPolicy {
    fn default() -> Self {
        Self {
            report_step: 5,
            milestone_step: 25,
            suppress_duplicate_reports: true,
        }
    }
}

/// Reading state for one viewer on one article.
#[derive(Debug, Clone)]
pub struct ReadingSession {
    article_id: String,
    policy: ReportPolicy,
    state: SessionState,
    read_percentage: u8,
    xp_earned: u64,
    last_reported: Option<u8>,
    acknowledged: BTreeSet<u8>,
    pending: BTreeSet<u8>,
    failed_reports: usize,
}

impl ReadingSession {
    pub fn new(article_id: impl Into<String>, policy: ReportPolicy) -> Self {
        Self {
            article_id: article_id.into(),
            policy,
            state: SessionState::Idle,
            read_percentage: 0,
            xp_earned: 0,
            last_reported: None,
            acknowledged: BTreeSet::new(),
            pending: BTreeSet::new(),
            failed_reports: 0,
        }
    }

    pub fn article_id(&self) -> &str {
        &self.article_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn read_percentage(&self) -> u8 {
        self.read_percentage
    }

    pub fn xp_earned(&self) -> u64 {
        self.xp_earned
    }

    pub fn last_reported(&self) -> Option<u8> {
        self.last_reported
    }

    pub fn acknowledged(&self) -> impl Iterator<Item = u8> + '_ {
        self.acknowledged.iter().copied()
    }

    pub fn failed_reports(&self) -> usize {
        self.failed_reports
    }

    /// Records a new percentage. Returns the percentage to report if the
    /// stored value moved onto a report step.
    pub fn observe(&mut self, percentage: u8) -> Option<u8> {
        match self.state {
            SessionState::Flushed => return None,
            SessionState::Idle => self.state = SessionState::Sampling,
            SessionState::Sampling | SessionState::Reporting => {}
        }

        let percentage = percentage.min(100);
        if percentage <= self.read_percentage {
            return None;
        }
        self.read_percentage = percentage;

        if percentage % self.policy.report_step.max(1) == 0 && !self.is_duplicate(percentage) {
            Some(percentage)
        } else {
            None
        }
    }

    /// The percentage the backstop timer should re-send, if any.
    pub fn backstop_due(&self) -> Option<u8> {
        let current = self.read_percentage;
        if self.state == SessionState::Flushed || current == 0 {
            return None;
        }
        if current % self.policy.milestone_step.max(1) != 0 {
            return None;
        }
        (!self.is_duplicate(current)).then_some(current)
    }

    /// The percentage the final report should carry, if any.
    pub fn flush_due(&self) -> Option<u8> {
        let current = self.read_percentage;
        if self.state == SessionState::Flushed || current == 0 {
            return None;
        }
        (!self.is_duplicate(current)).then_some(current)
    }

    /// Marks a report as queued.
    pub fn begin_report(&mut self, percentage: u8) {
        self.pending.insert(percentage);
        if self.state != SessionState::Flushed {
            self.state = SessionState::Reporting;
        }
    }

    /// Applies an acknowledgement and returns the new XP total.
    pub fn record_ack(&mut self, percentage: u8, xp_earned: u32) -> u64 {
        self.pending.remove(&percentage);
        self.acknowledged.insert(percentage);
        self.last_reported = Some(self.last_reported.map_or(percentage, |p| p.max(percentage)));
        self.xp_earned += u64::from(xp_earned);
        self.settle();
        self.xp_earned
    }

    /// Forgets a failed report so the percentage stays eligible for a retry.
    pub fn record_failure(&mut self, percentage: u8) {
        self.pending.remove(&percentage);
        self.failed_reports += 1;
        self.settle();
    }

    pub fn finish(&mut self) {
        self.state = SessionState::Flushed;
    }

    fn settle(&mut self) {
        if self.state == SessionState::Reporting && self.pending.is_empty() {
            self.state = SessionState::Sampling;
        }
    }

    fn is_duplicate(&self, percentage: u8) -> bool {
        self.policy.suppress_duplicate_reports
            && (self.acknowledged.contains(&percentage) || self.pending.contains(&percentage))
    }
}
