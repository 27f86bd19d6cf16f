#![forbid(unsafe_code)]

//! Deterministic test harness for the Waypoint tour engine.
//!
//! # Key Components
//!
//! - [`VirtualPage`] - In-memory page with window and nested-container
//!   scrolling and deferred scroll-into-view
//! - [`RecordingPresenter`] - Presenter that logs every frame it is handed
//! - [`render_ascii`] - Character-grid preview of a frame
//! - [`Scenario`] / [`replay`] - Scripted replays producing JSONL transcripts
//!
//! The `waypoint-harness` binary wraps [`replay`]:
//!
//! ```text
//! waypoint-harness run --scenario tour.toml --format ascii
//! waypoint-harness demo
//! ```

pub mod cli;
pub mod error;
pub mod logging;
pub mod preview;
pub mod recorder;
pub mod scenario;
pub mod transcript;
pub mod virtual_page;

pub use error::{HarnessError, Result};
pub use preview::{PreviewGrid, render_ascii};
pub use recorder::{FrameLog, PresentEvent, RecordingPresenter};
pub use scenario::{Scenario, ScenarioAction};
pub use transcript::{Outcome, Transcript, TranscriptEntry, TranscriptSummary, replay};
pub use virtual_page::{
    SMOOTH_SCROLL_FRAMES, ScrollContainer, ScrollRequest, VirtualElement, VirtualPage,
    aligned_offset,
};
