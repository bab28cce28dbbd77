//! Host document boundary.
//!
//! The session never owns page elements. It sees videos through opaque
//! [`VideoId`] handles, reads and writes their playback rate, and asks the
//! document to mount, render, and unmount overlay widgets.
mod event;
mod memory;


use std::fmt;

use tokio::sync::{mpsc, watch};

use crate::overlay::OverlayView;

pub use event::{EventResponse, Focus, KeyEvent, PageEvent, PointerTarget};
pub use memory::{MemoryDocument, MountedOverlay, VideoSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VideoId(u64);

impl VideoId {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "video#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OverlayId(u64);

impl OverlayId {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Loading,
    Interactive,
    Complete,
}

/// Summary of one subtree change; the watcher rescans regardless of content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MutationRecord {
    pub added_nodes: usize,
    pub removed_nodes: usize,
}

/// Laid-out size of an element, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

pub trait Document {
    /// Host part of the page address; the persistence partition key.
    fn hostname(&self) -> String;

    fn ready_state(&self) -> watch::Receiver<ReadyState>;

    /// Subscribes to subtree mutations. The stream closes when the page goes away.
    fn observe_mutations(&self) -> mpsc::UnboundedReceiver<MutationRecord>;

    /// Videos currently attached to the document, in document order.
    fn videos(&self) -> Vec<VideoId>;

    fn contains(&self, video: VideoId) -> bool;

    fn playback_rate(&self, video: VideoId) -> Option<f64>;

    /// Returns `false` if the handle no longer refers to an element.
    fn set_playback_rate(&self, video: VideoId, rate: f64) -> bool;

    fn video_size(&self, video: VideoId) -> Option<Size>;

    /// Attaches a widget next to `video`. `None` when the video has no parent
    /// to host it.
    fn mount_overlay(&self, video: VideoId, view: &OverlayView) -> Option<OverlayId>;

    fn render_overlay(&self, overlay: OverlayId, view: &OverlayView);

    /// Removes the widget; a no-op if the page already dropped it.
    fn unmount_overlay(&self, overlay: OverlayId);
}
