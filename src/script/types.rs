use serde::Deserialize;

use crate::config::types::DurationValue;
use crate::overlay::OverlayZone;
use crate::page::{Focus, ReadyState};

/// A page address plus the sequence of things that happen on it.
#[derive(Debug, Clone, Deserialize)]
pub struct PageScript {
    pub url: String,
    /// Document state when the page opens (and after each `reload`).
    #[serde(default)]
    pub ready: ScriptReadyState,
    #[serde(default)]
    pub steps: Vec<ScriptStep>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptReadyState {
    Loading,
    #[default]
    Interactive,
    Complete,
}

impl From<ScriptReadyState> for ReadyState {
    fn from(value: ScriptReadyState) -> Self {
        match value {
            ScriptReadyState::Loading => ReadyState::Loading,
            ScriptReadyState::Interactive => ReadyState::Interactive,
            ScriptReadyState::Complete => ReadyState::Complete,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScriptStep {
    /// Finishes loading the document.
    Ready,
    AddVideo {
        name: String,
        container: Option<String>,
        rate: Option<f64>,
        width: Option<f64>,
        height: Option<f64>,
    },
    RemoveVideo {
        name: String,
    },
    RestoreVideo {
        name: String,
    },
    MoveVideo {
        name: String,
        container: String,
    },
    RemoveContainer {
        container: String,
    },
    PointerEnter {
        name: String,
        #[serde(default)]
        target: PointerKind,
    },
    PointerLeave {
        name: String,
        #[serde(default)]
        target: PointerKind,
    },
    /// Clicks a zone of the video's overlay, or the video itself without `zone`.
    Click {
        name: String,
        zone: Option<ZoneName>,
    },
    Key {
        key: String,
        #[serde(default)]
        focus: FocusKind,
    },
    Wait {
        duration: DurationValue,
    },
    InvalidateContext,
    FailWrites {
        count: u32,
    },
    Reload,
    Snapshot,
}

impl ScriptStep {
    #[must_use]
    pub const fn action(&self) -> &'static str {
        match self {
            ScriptStep::Ready => "ready",
            ScriptStep::AddVideo { .. } => "add_video",
            ScriptStep::RemoveVideo { .. } => "remove_video",
            ScriptStep::RestoreVideo { .. } => "restore_video",
            ScriptStep::MoveVideo { .. } => "move_video",
            ScriptStep::RemoveContainer { .. } => "remove_container",
            ScriptStep::PointerEnter { .. } => "pointer_enter",
            ScriptStep::PointerLeave { .. } => "pointer_leave",
            ScriptStep::Click { .. } => "click",
            ScriptStep::Key { .. } => "key",
            ScriptStep::Wait { .. } => "wait",
            ScriptStep::InvalidateContext => "invalidate_context",
            ScriptStep::FailWrites { .. } => "fail_writes",
            ScriptStep::Reload => "reload",
            ScriptStep::Snapshot => "snapshot",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerKind {
    #[default]
    Video,
    Overlay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneName {
    Decrease,
    Display,
    Increase,
}

impl From<ZoneName> for OverlayZone {
    fn from(value: ZoneName) -> Self {
        match value {
            ZoneName::Decrease => OverlayZone::Decrease,
            ZoneName::Display => OverlayZone::Display,
            ZoneName::Increase => OverlayZone::Increase,
        }
    }
}

/// Where keyboard focus sits when a `key` step fires.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusKind {
    #[default]
    Document,
    TextInput,
    TextArea,
    ContentEditable,
    Other,
}

impl From<FocusKind> for Focus {
    fn from(value: FocusKind) -> Self {
        match value {
            FocusKind::Document => Focus::Document,
            FocusKind::TextInput => Focus::TextInput,
            FocusKind::TextArea => Focus::TextArea,
            FocusKind::ContentEditable => Focus::ContentEditable,
            FocusKind::Other => Focus::Other,
        }
    }
}
