#![forbid(unsafe_code)]

//! Scenario replay and its transcript.
//!
//! Replay mounts a [`TourEngine`] on a fresh [`VirtualPage`], applies each
//! scripted action, and snapshots the engine and page after every one.
//! Transcripts are deterministic: the same scenario and config always
//! produce the same JSONL and the same checksum.

use std::cell::Cell;
use std::fmt::Write as _;
use std::rc::Rc;

use serde::Serialize;
use waypoint_core::Viewport;
use waypoint_tour::{
    OverlayFrame, Page, TargetState, TourCallbacks, TourConfig, TourEngine, TourStatus, Transition,
};

use crate::preview::{PreviewGrid, render_ascii};
use crate::recorder::{FrameLog, RecordingPresenter};
use crate::scenario::{Scenario, ScenarioAction};
use crate::virtual_page::VirtualPage;

/// How the tour ended, if it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Open,
    Completed,
    Closed,
}

/// State after one action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptEntry {
    pub seq: usize,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition: Option<Transition>,
    pub status: TourStatus,
    pub step: Option<usize>,
    pub target: TargetState,
    pub viewport: Viewport,
    pub scroll: (f64, f64),
    pub pending_scrolls: usize,
    pub listeners: usize,
    /// Frame on screen after the action.
    pub frame: Option<OverlayFrame>,
}

/// Closing line of a JSONL transcript.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptSummary {
    pub scenario: String,
    pub outcome: Outcome,
    pub entries: usize,
    pub frames_presented: usize,
    /// Listeners still registered after the engine was dropped.
    pub leaked_listeners: usize,
    pub checksum: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    pub scenario: String,
    pub entries: Vec<TranscriptEntry>,
    pub outcome: Outcome,
    pub frames_presented: usize,
    pub leaked_listeners: usize,
}

impl Transcript {
    fn entry_lines(&self) -> serde_json::Result<String> {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(&serde_json::to_string(entry)?);
            out.push('\n');
        }
        Ok(out)
    }

    /// `blake3:<hex>` over the entry lines.
    pub fn checksum(&self) -> serde_json::Result<String> {
        let lines = self.entry_lines()?;
        Ok(format!("blake3:{}", blake3::hash(lines.as_bytes()).to_hex()))
    }

    pub fn summary(&self) -> serde_json::Result<TranscriptSummary> {
        Ok(TranscriptSummary {
            scenario: self.scenario.clone(),
            outcome: self.outcome,
            entries: self.entries.len(),
            frames_presented: self.frames_presented,
            leaked_listeners: self.leaked_listeners,
            checksum: self.checksum()?,
        })
    }

    /// One JSON object per entry, then a `{"summary": ...}` line.
    pub fn to_jsonl(&self) -> serde_json::Result<String> {
        let mut out = self.entry_lines()?;
        out.push_str(&serde_json::to_string(&serde_json::json!({
            "summary": self.summary()?,
        }))?);
        out.push('\n');
        Ok(out)
    }

    /// Human-readable replay with a character preview per entry.
    pub fn to_ascii(&self, grid: PreviewGrid, card_height: f64) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            let transition = entry
                .transition
                .map(|t| format!(" -> {t:?}"))
                .unwrap_or_default();
            let _ = writeln!(
                out,
                "#{} {}{} | {:?} | target {}",
                entry.seq,
                entry.action,
                transition,
                entry.status,
                if entry.target.is_resolved() {
                    "resolved"
                } else {
                    "unresolved"
                },
            );
            out.push_str(&render_ascii(
                entry.frame.as_ref(),
                entry.viewport,
                grid,
                card_height,
            ));
        }
        let _ = writeln!(
            out,
            "outcome: {:?}, leaked listeners: {}",
            self.outcome, self.leaked_listeners
        );
        out
    }
}

fn snapshot<R>(
    seq: usize,
    action: String,
    transition: Option<Transition>,
    engine: &TourEngine<VirtualPage, R>,
    page: &VirtualPage,
    log: &FrameLog,
) -> TranscriptEntry
where
    R: waypoint_tour::Presenter + 'static,
{
    TranscriptEntry {
        seq,
        action,
        transition,
        status: engine.status(),
        step: engine.current_index(),
        target: engine.target(),
        viewport: page.viewport(),
        scroll: page.scroll_position(),
        pending_scrolls: page.pending_scrolls(),
        listeners: page.listener_count(),
        frame: log.visible_frame(),
    }
}

/// Replay `scenario` with `config`.
pub fn replay(scenario: &Scenario, config: TourConfig) -> Transcript {
    let page = Rc::new(scenario.build_page());
    let (presenter, log) = RecordingPresenter::new();
    let outcome = Rc::new(Cell::new(Outcome::Open));
    let (closed, completed) = (Rc::clone(&outcome), Rc::clone(&outcome));

    let mut engine = TourEngine::mount(
        Rc::clone(&page),
        presenter,
        scenario.steps.clone(),
        TourCallbacks::new(
            move || closed.set(Outcome::Closed),
            move || completed.set(Outcome::Completed),
        ),
        config,
    );

    let mut entries = vec![snapshot(0, "mount".into(), None, &engine, &page, &log)];
    for (index, action) in scenario.actions.iter().enumerate() {
        let transition = match action {
            ScenarioAction::Next => Some(engine.next()),
            ScenarioAction::Back => Some(engine.back()),
            ScenarioAction::Close => Some(engine.close()),
            ScenarioAction::Refresh => {
                engine.refresh();
                None
            }
            ScenarioAction::SettleScroll => {
                page.settle_scroll();
                None
            }
            ScenarioAction::Resize { width, height } => {
                page.resize(*width, *height);
                None
            }
            ScenarioAction::ScrollWindow { x, y } => {
                page.scroll_window_to(*x, *y);
                None
            }
            ScenarioAction::ScrollContainer { id, left, top } => {
                page.scroll_container_to(id, *left, *top);
                None
            }
            ScenarioAction::Insert(element) => {
                page.insert_element(element.clone());
                None
            }
            ScenarioAction::Remove { id } => {
                page.remove_element(id);
                None
            }
        };
        tracing::debug!(seq = index + 1, %action, ?transition, "scenario action");
        entries.push(snapshot(
            index + 1,
            action.to_string(),
            transition,
            &engine,
            &page,
            &log,
        ));
    }

    drop(engine);
    Transcript {
        scenario: scenario.name.clone(),
        entries,
        outcome: outcome.get(),
        frames_presented: log.frames_presented(),
        leaked_listeners: page.listener_count(),
    }
}
