//! One reading session bound to the runtime
//!
//! A [`ReadingTracker`] owns everything an article view needs while it is on
//! screen: the session state, a backstop timer task and a report worker
//! task. Scroll samples go in through [`ReadingTracker::observe`], which never
//! waits on the network; reports travel through an unbounded queue to the
//! worker, which sends them one at a time in order.
//!
//! Lifecycle:
//!     start()  spawns the backstop and the worker (only with a reporter)
//!     observe  updates the session, queues a report when one is due
//!     stop()   cancels the backstop, queues the final report, closes the
//!              queue and waits for the worker, bounded by `flush_timeout`
//!     drop     cancels both tasks without flushing

use crate::notify::{XpNotification, XpNotifier};
use crate::ports::ProgressReporter;
use crate::progress::{ReadingSession, ReportPolicy, ScrollSample, SessionState};
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerSettings {
    pub report_step: u8,
    pub milestone_step: u8,
    pub backstop_interval: Duration,
    pub notification_duration: Duration,
    pub flush_timeout: Duration,
    pub suppress_duplicate_reports: bool,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            report_step: 5,
            milestone_step: 25,
            backstop_interval: Duration::from_secs(30),
            notification_duration: Duration::from_secs(3),
            flush_timeout: Duration::from_secs(2),
            suppress_duplicate_reports: true,
        }
    }
}

impl TrackerSettings {
    fn policy(&self) -> ReportPolicy {
        ReportPolicy {
            report_step: self.report_step,
            milestone_step: self.milestone_step,
            suppress_duplicate_reports: self.suppress_duplicate_reports,
        }
    }
}

/// What the session looked like when the tracker stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub article_id: String,
    pub read_percentage: u8,
    pub xp_earned: u64,
    pub last_reported: Option<u8>,
    pub acknowledged: Vec<u8>,
    pub failed_reports: usize,
    pub state: SessionState,
}

impl SessionSummary {
    fn of(session: &ReadingSession) -> Self {
        Self {
            article_id: session.article_id().to_string(),
            read_percentage: session.read_percentage(),
            xp_earned: session.xp_earned(),
            last_reported: session.last_reported(),
            acknowledged: session.acknowledged().collect(),
            failed_reports: session.failed_reports(),
            state: session.state(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Scroll,
    Backstop,
    Flush,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Trigger::Scroll => "scroll",
            Trigger::Backstop => "backstop",
            Trigger::Flush => "flush",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy)]
struct ReportJob {
    percentage: u8,
    trigger: Trigger,
}

type SharedSession = Arc<Mutex<ReadingSession>>;

fn lock(session: &Mutex<ReadingSession>) -> MutexGuard<'_, ReadingSession> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct ReadingTracker {
    settings: TrackerSettings,
    session: SharedSession,
    notifier: Arc<XpNotifier>,
    jobs: Option<mpsc::UnboundedSender<ReportJob>>,
    cancel: CancellationToken,
    backstop_cancel: CancellationToken,
    backstop: Option<JoinHandle<()>>,
    worker: Option<JoinHandle<()>>,
}

impl ReadingTracker {
    /// Starts tracking an article. Without a reporter (anonymous viewer)
    /// progress is still sampled but nothing is sent.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(
        settings: TrackerSettings,
        article_id: impl Into<String>,
        reporter: Option<Arc<dyn ProgressReporter>>,
    ) -> Self {
        let session = Arc::new(Mutex::new(ReadingSession::new(
            article_id,
            settings.policy(),
        )));
        let notifier = Arc::new(XpNotifier::new(settings.notification_duration));
        let cancel = CancellationToken::new();
        let backstop_cancel = cancel.child_token();

        let mut tracker = Self {
            settings,
            session,
            notifier,
            jobs: None,
            cancel,
            backstop_cancel,
            backstop: None,
            worker: None,
        };

        if let Some(reporter) = reporter {
            let (tx, rx) = mpsc::unbounded_channel();
            tracker.worker = Some(tokio::spawn(run_worker(
                Arc::clone(&tracker.session),
                reporter,
                Arc::clone(&tracker.notifier),
                rx,
                tracker.cancel.clone(),
            )));
            tracker.backstop = Some(tokio::spawn(run_backstop(
                Arc::clone(&tracker.session),
                tx.clone(),
                tracker.settings.backstop_interval,
                tracker.backstop_cancel.clone(),
            )));
            tracker.jobs = Some(tx);
        }

        tracker
    }

    /// Feeds one scroll sample. Returns the stored progress.
    pub fn observe(&self, sample: ScrollSample) -> u8 {
        self.observe_percentage(sample.percentage())
    }

    pub fn observe_percentage(&self, percentage: u8) -> u8 {
        let mut session = lock(&self.session);
        if let Some(due) = session.observe(percentage) {
            if let Some(jobs) = &self.jobs {
                session.begin_report(due);
                queue(jobs, &mut session, due, Trigger::Scroll);
            }
        }
        session.read_percentage()
    }

    pub fn read_percentage(&self) -> u8 {
        lock(&self.session).read_percentage()
    }

    pub fn xp_earned(&self) -> u64 {
        lock(&self.session).xp_earned()
    }

    pub fn state(&self) -> SessionState {
        lock(&self.session).state()
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary::of(&lock(&self.session))
    }

    pub fn notifications(&self) -> watch::Receiver<Option<XpNotification>> {
        self.notifier.subscribe()
    }

    pub fn current_notification(&self) -> Option<XpNotification> {
        self.notifier.current()
    }

    /// Sends the final report and shuts the tracker down.
    pub async fn stop(mut self) -> SessionSummary {
        self.backstop_cancel.cancel();
        if let Some(backstop) = self.backstop.take() {
            let _ = backstop.await;
        }

        if let Some(jobs) = self.jobs.take() {
            let mut session = lock(&self.session);
            if let Some(due) = session.flush_due() {
                session.begin_report(due);
                queue(&jobs, &mut session, due, Trigger::Flush);
            }
        }

        if let Some(worker) = self.worker.take() {
            if tokio::time::timeout(self.settings.flush_timeout, worker)
                .await
                .is_err()
            {
                tracing::warn!(
                    timeout_ms = self.settings.flush_timeout.as_millis() as u64,
                    "progress reports still pending at shutdown, abandoning them"
                );
                self.cancel.cancel();
            }
        }

        let mut session = lock(&self.session);
        session.finish();
        SessionSummary::of(&session)
    }
}

impl Drop for ReadingTracker {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn queue(
    jobs: &mpsc::UnboundedSender<ReportJob>,
    session: &mut ReadingSession,
    percentage: u8,
    trigger: Trigger,
) -> bool {
    if jobs.send(ReportJob { percentage, trigger }).is_err() {
        session.record_failure(percentage);
        return false;
    }
    true
}

async fn run_backstop(
    session: SharedSession,
    jobs: mpsc::UnboundedSender<ReportJob>,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let mut guard = lock(&session);
                if let Some(due) = guard.backstop_due() {
                    guard.begin_report(due);
                    if !queue(&jobs, &mut guard, due, Trigger::Backstop) {
                        break;
                    }
                }
            }
        }
    }
}

async fn run_worker(
    session: SharedSession,
    reporter: Arc<dyn ProgressReporter>,
    notifier: Arc<XpNotifier>,
    mut jobs: mpsc::UnboundedReceiver<ReportJob>,
    cancel: CancellationToken,
) {
    let article_id = lock(&session).article_id().to_string();

    loop {
        let job = tokio::select! {
            _ = cancel.cancelled() => break,
            job = jobs.recv() => match job {
                Some(job) => job,
                None => break,
            },
        };

        let outcome = tokio::select! {
            _ = cancel.cancelled() => break,
            outcome = reporter.report(&article_id, job.percentage) => outcome,
        };

        match outcome {
            Ok(ack) => {
                let total_xp = lock(&session).record_ack(job.percentage, ack.xp_earned);
                tracing::debug!(
                    article = %article_id,
                    percentage = job.percentage,
                    trigger = %job.trigger,
                    "progress reported"
                );
                if ack.xp_earned > 0 {
                    tracing::info!(
                        article = %article_id,
                        xp = ack.xp_earned,
                        total_xp,
                        "xp earned"
                    );
                    notifier.notify(XpNotification {
                        article_id: article_id.clone(),
                        read_percentage: job.percentage,
                        xp_earned: ack.xp_earned,
                        total_xp,
                    });
                }
            }
            Err(err) => {
                tracing::warn!(
                    article = %article_id,
                    percentage = job.percentage,
                    trigger = %job.trigger,
                    error = %err,
                    "progress report failed"
                );
                lock(&session).record_failure(job.percentage);
            }
        }
    }
}
