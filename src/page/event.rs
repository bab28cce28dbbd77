use crate::overlay::OverlayZone;

use super::VideoId;

/// Where a pointer event landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    Video(VideoId),
    /// The overlay bound to `video`; `zone` is `None` for the widget body.
    Overlay {
        video: VideoId,
        zone: Option<OverlayZone>,
    },
}

impl PointerTarget {
    #[must_use]
    pub const fn video(self) -> VideoId {
        match self {
            PointerTarget::Video(video) | PointerTarget::Overlay { video, .. } => video,
        }
    }
}

/// Element holding keyboard focus when a key is pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Document,
    Video(VideoId),
    TextInput,
    TextArea,
    ContentEditable,
    Other,
}

impl Focus {
    /// Targets where a keypress is ordinary typing.
    #[must_use]
    pub const fn accepts_text(self) -> bool {
        matches!(
            self,
            Focus::TextInput | Focus::TextArea | Focus::ContentEditable
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: String,
    pub focus: Focus,
}

impl KeyEvent {
    #[must_use]
    pub fn new(key: impl Into<String>, focus: Focus) -> Self {
        Self {
            key: key.into(),
            focus,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    PointerEnter(PointerTarget),
    PointerLeave(PointerTarget),
    Click(PointerTarget),
    KeyDown(KeyEvent),
}

/// What the session did with an event, for the host to apply to the native one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventResponse {
    pub default_prevented: bool,
    pub propagation_stopped: bool,
}

impl EventResponse {
    #[must_use]
    pub const fn ignored() -> Self {
        Self {
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    #[must_use]
    pub const fn consumed() -> Self {
        Self {
            default_prevented: true,
            propagation_stopped: false,
        }
    }

    #[must_use]
    pub const fn contained() -> Self {
        Self {
            default_prevented: false,
            propagation_stopped: true,
        }
    }
}
