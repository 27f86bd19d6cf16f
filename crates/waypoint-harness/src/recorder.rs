#![forbid(unsafe_code)]

//! Presenter that records what it was asked to paint.

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;
use waypoint_tour::{OverlayFrame, Presenter};

/// One call into the presenter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PresentEvent {
    Frame(OverlayFrame),
    /// `present(None)`: nothing to show.
    Clear,
    Unmount,
}

/// Shared handle onto a [`RecordingPresenter`]'s log.
///
/// The presenter moves into the engine; keep the handle to inspect it.
#[derive(Debug, Clone, Default)]
pub struct FrameLog(Rc<RefCell<Vec<PresentEvent>>>);

impl FrameLog {
    pub fn events(&self) -> Vec<PresentEvent> {
        self.0.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Most recent event.
    pub fn last(&self) -> Option<PresentEvent> {
        self.0.borrow().last().cloned()
    }

    /// Frame currently on screen, if any.
    pub fn visible_frame(&self) -> Option<OverlayFrame> {
        match self.0.borrow().last() {
            Some(PresentEvent::Frame(frame)) => Some(frame.clone()),
            _ => None,
        }
    }

    /// Number of frames painted.
    pub fn frames_presented(&self) -> usize {
        self.0
            .borrow()
            .iter()
            .filter(|e| matches!(e, PresentEvent::Frame(_)))
            .count()
    }

    pub fn is_unmounted(&self) -> bool {
        matches!(self.0.borrow().last(), Some(PresentEvent::Unmount))
    }

    /// Drain everything recorded so far.
    pub fn take(&self) -> Vec<PresentEvent> {
        std::mem::take(&mut *self.0.borrow_mut())
    }

    fn push(&self, event: PresentEvent) {
        self.0.borrow_mut().push(event);
    }
}

/// [`Presenter`] that appends every call to a [`FrameLog`].
#[derive(Debug)]
pub struct RecordingPresenter {
    log: FrameLog,
}

impl RecordingPresenter {
    /// Create a presenter and a handle onto its log.
    #[must_use]
    pub fn new() -> (Self, FrameLog) {
        let log = FrameLog::default();
        (Self { log: log.clone() }, log)
    }
}

impl Presenter for RecordingPresenter {
    fn present(&mut self, frame: Option<&OverlayFrame>) {
        self.log.push(match frame {
            Some(frame) => PresentEvent::Frame(frame.clone()),
            None => PresentEvent::Clear,
        });
    }

    fn unmount(&mut self) {
        self.log.push(PresentEvent::Unmount);
    }
}
