#![forbid(unsafe_code)]

//! Scripted tour scenarios.
//!
//! A scenario describes a page (viewport, scroll containers, elements), a
//! step list, and a sequence of actions to replay against it. Scenarios
//! load from TOML or JSON, chosen by file extension.
//!
//! ```toml
//! name = "sidebar"
//! viewport = { width = 1024.0, height = 768.0 }
//!
//! [[elements]]
//! id = "rules"
//! rect = { x = 40.0, y = 900.0, width = 400.0, height = 120.0 }
//!
//! [[steps]]
//! targetId = "rules"
//! title = "Rules"
//! content = "Validation rules live here."
//!
//! [[actions]]
//! action = "settle_scroll"
//!
//! [[actions]]
//! action = "next"
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use waypoint_core::{PageRect, Viewport};
use waypoint_tour::{Position, Step};

use crate::error::{HarnessError, Result};
use crate::virtual_page::{ScrollContainer, VirtualElement, VirtualPage};

/// One scripted input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScenarioAction {
    Next,
    Back,
    Close,
    /// Host-initiated re-resolve.
    Refresh,
    /// Let queued scroll-into-view requests run.
    SettleScroll,
    Resize {
        width: f64,
        height: f64,
    },
    ScrollWindow {
        #[serde(default)]
        x: f64,
        y: f64,
    },
    ScrollContainer {
        id: String,
        #[serde(default)]
        left: f64,
        top: f64,
    },
    Insert(VirtualElement),
    Remove {
        id: String,
    },
}

impl fmt::Display for ScenarioAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Next => f.write_str("next"),
            Self::Back => f.write_str("back"),
            Self::Close => f.write_str("close"),
            Self::Refresh => f.write_str("refresh"),
            Self::SettleScroll => f.write_str("settle_scroll"),
            Self::Resize { width, height } => write!(f, "resize {width}x{height}"),
            Self::ScrollWindow { x, y } => write!(f, "scroll_window {x},{y}"),
            Self::ScrollContainer { id, left, top } => {
                write!(f, "scroll_container {id} {left},{top}")
            }
            Self::Insert(element) => write!(f, "insert {}", element.id),
            Self::Remove { id } => write!(f, "remove {id}"),
        }
    }
}

/// A page, a tour, and the inputs to replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,
    pub viewport: Viewport,
    #[serde(default)]
    pub containers: Vec<ScrollContainer>,
    #[serde(default)]
    pub elements: Vec<VirtualElement>,
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default)]
    pub actions: Vec<ScenarioAction>,
}

impl Scenario {
    pub fn from_toml_str(s: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn from_json_str(s: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Load and validate a scenario file (`.json` is JSON, anything else
    /// TOML).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| HarnessError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let parse_error = |message: String| HarnessError::ScenarioParse {
            path: path.to_path_buf(),
            message,
        };
        let scenario = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content).map_err(|e| parse_error(e.to_string()))?,
            _ => Self::from_toml_str(&content).map_err(|e| parse_error(e.to_string()))?,
        };
        scenario.validate()?;
        Ok(scenario)
    }

    /// Reject scenarios that cannot be replayed meaningfully.
    ///
    /// Steps may name elements that never exist; that is a valid tour.
    pub fn validate(&self) -> Result<()> {
        let Viewport { width, height } = self.viewport;
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(HarnessError::invalid(format!(
                "viewport must be positive, got {width}x{height}"
            )));
        }

        let containers: BTreeSet<&str> = self.containers.iter().map(|c| c.id.as_str()).collect();
        let declared = self
            .elements
            .iter()
            .chain(self.actions.iter().filter_map(|action| match action {
                ScenarioAction::Insert(element) => Some(element),
                _ => None,
            }));
        for element in declared {
            if element.id.is_empty() {
                return Err(HarnessError::invalid("element with empty id"));
            }
            if let Some(container) = element.container.as_deref() {
                if !containers.contains(container) {
                    return Err(HarnessError::invalid(format!(
                        "element {} is inside unknown container {container}",
                        element.id
                    )));
                }
            }
        }

        for action in &self.actions {
            if let ScenarioAction::ScrollContainer { id, .. } = action {
                if !containers.contains(id.as_str()) {
                    return Err(HarnessError::invalid(format!(
                        "scroll_container targets unknown container {id}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Build the virtual page this scenario starts on.
    pub fn build_page(&self) -> VirtualPage {
        let page = VirtualPage::new(self.viewport);
        for container in &self.containers {
            page.insert_container(container.clone());
        }
        for element in &self.elements {
            page.insert_element(element.clone());
        }
        page
    }

    /// The schema console's three-step walkthrough.
    ///
    /// The third section sits below the fold, so reaching it exercises the
    /// scroll-into-view path.
    pub fn console_demo() -> Self {
        Self {
            name: "console-demo".into(),
            viewport: Viewport::new(1280.0, 720.0),
            containers: Vec::new(),
            elements: vec![
                VirtualElement::new(
                    "quick-start-section",
                    PageRect::new(40.0, 96.0, 1200.0, 180.0),
                ),
                VirtualElement::new(
                    "validate-file-section",
                    PageRect::new(40.0, 320.0, 1200.0, 240.0),
                ),
                VirtualElement::new("mapping-section", PageRect::new(40.0, 1180.0, 1200.0, 260.0)),
            ],
            steps: vec![
                Step::new(
                    "quick-start-section",
                    "1. Quick Start",
                    "Choose a pre-defined schema to get started instantly. Click \"Register\" to load the Procurement Standard schema.",
                )
                .position(Position::Bottom),
                Step::new(
                    "validate-file-section",
                    "2. Validate Data",
                    "Upload your CSV or JSON file here. The system will check it against the selected schema.",
                )
                .position(Position::Left),
                Step::new(
                    "mapping-section",
                    "3. Fix Issues",
                    "If your data has different column names (e.g., Portuguese headers), define a mapping here to automatically fix it.",
                )
                .position(Position::Top),
            ],
            actions: vec![
                ScenarioAction::Next,
                ScenarioAction::Back,
                ScenarioAction::Next,
                ScenarioAction::Next,
                ScenarioAction::SettleScroll,
                ScenarioAction::Resize {
                    width: 1024.0,
                    height: 768.0,
                },
                ScenarioAction::Next,
            ],
        }
    }
}
