//! Reading progress and XP accounting for Nakamoto League articles
//!
//!     While an article is on screen the viewer's scroll position is sampled,
//!     turned into a read percentage and reported to the progress API, which
//!     answers with the XP the viewer earned. Earned XP is surfaced as a short
//!     lived notification.
//!
//!     TLDR:
//!         - Progress only moves forward. Reports go out when it lands on a
//!           multiple of 5, a backstop timer re-sends 25/50/75/100 milestones the
//!           API has not acknowledged yet, and a final report goes out on stop.
//!         - Network failures are logged and never reach the caller.
//!
//! Architecture
//!
//!     .
//!     ├── progress.rs     # ScrollSample -> percentage, ReadingSession state (no IO)
//!     ├── ports.rs        # ProgressReporter trait and wire types
//!     ├── http.rs         # reqwest adapter for ProgressReporter
//!     ├── notify.rs       # XP notifications with auto dismiss
//!     └── tracker.rs      # ReadingTracker: session + backstop timer + report worker
//!
//!     The tracker is a scoped resource: create it with [`ReadingTracker::start`] when
//!     an article view opens and call [`ReadingTracker::stop`] when it closes.
//!     Dropping it cancels its tasks.

pub mod http;
pub mod notify;
pub mod ports;
pub mod progress;
pub mod tracker;

pub use http::{EndpointSettings, HttpProgressReporter};
pub use notify::{XpNotification, XpNotifier};
pub use ports::{ProgressAck, ProgressReport, ProgressReporter, ReportError};
pub use progress::{ReadingSession, ReportPolicy, ScrollSample, SessionState};
pub use tracker::{ReadingTracker, SessionSummary, TrackerSettings};
