use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

use tokio::sync::{mpsc, watch};

use crate::overlay::OverlayView;

use super::{Document, MutationRecord, OverlayId, ReadyState, Size, VideoId};

const DEFAULT_CONTAINER: &str = "main";
const DEFAULT_SIZE: Size = Size {
    width: 640.0,
    height: 360.0,
};

/// Initial attributes for a video inserted into a [`MemoryDocument`].
#[derive(Debug, Clone, PartialEq)]
pub struct VideoSpec {
    /// Parent element name; `None` for a parentless node.
    pub container: Option<String>,
    pub rate: f64,
    pub size: Size,
}

impl Default for VideoSpec {
    fn default() -> Self {
        Self {
            container: Some(DEFAULT_CONTAINER.to_owned()),
            rate: 1.0,
            size: DEFAULT_SIZE,
        }
    }
}

impl VideoSpec {
    #[must_use]
    pub fn in_container(mut self, container: impl Into<String>) -> Self {
        self.container = Some(container.into());
        self
    }

    #[must_use]
    pub fn detached_parent(mut self) -> Self {
        self.container = None;
        self
    }

    #[must_use]
    pub const fn with_rate(mut self, rate: f64) -> Self {
        self.rate = rate;
        self
    }

    #[must_use]
    pub const fn with_size(mut self, width: f64, height: f64) -> Self {
        self.size = Size { width, height };
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MountedOverlay {
    pub overlay: OverlayId,
    pub video: VideoId,
    pub container: String,
    pub view: OverlayView,
}

#[derive(Debug)]
struct VideoNode {
    container: Option<String>,
    rate: f64,
    size: Size,
}

#[derive(Debug, Default)]
struct State {
    /// Every element ever inserted; removal only detaches.
    elements: BTreeMap<VideoId, VideoNode>,
    /// Attached videos in document order.
    order: Vec<VideoId>,
    overlays: BTreeMap<OverlayId, MountedOverlay>,
    positioned: BTreeSet<String>,
    next_video: u64,
    next_overlay: u64,
    subscribers: Vec<mpsc::UnboundedSender<MutationRecord>>,
}

impl State {
    fn notify(&mut self, record: MutationRecord) {
        self.subscribers
            .retain(|subscriber| subscriber.send(record).is_ok());
    }
}

/// Headless document: a flat list of videos grouped by parent container.
///
/// Mutations made through the inherent methods are reported to every
/// [`Document::observe_mutations`] subscriber, including overlay mounts, the
/// same way a subtree observer on a real page sees injected widgets.
#[derive(Debug)]
pub struct MemoryDocument {
    hostname: String,
    state: RefCell<State>,
    ready: watch::Sender<ReadyState>,
}

impl MemoryDocument {
    /// A document that is already interactive.
    #[must_use]
    pub fn new(hostname: impl Into<String>) -> Self {
        Self::with_ready_state(hostname, ReadyState::Interactive)
    }

    #[must_use]
    pub fn with_ready_state(hostname: impl Into<String>, ready_state: ReadyState) -> Self {
        let (ready, _initial) = watch::channel(ready_state);
        Self {
            hostname: hostname.into(),
            state: RefCell::new(State::default()),
            ready,
        }
    }

    pub fn set_ready_state(&self, ready_state: ReadyState) {
        self.ready.send_replace(ready_state);
    }

    pub fn insert_video(&self, spec: VideoSpec) -> VideoId {
        let mut state = self.state.borrow_mut();
        let video = VideoId::new(state.next_video);
        state.next_video = state.next_video.saturating_add(1);
        state.elements.insert(
            video,
            VideoNode {
                container: spec.container,
                rate: spec.rate,
                size: spec.size,
            },
        );
        state.order.push(video);
        state.notify(MutationRecord {
            added_nodes: 1,
            removed_nodes: 0,
        });
        video
    }

    /// Detaches `video`; the handle stays valid and can be restored.
    pub fn remove_video(&self, video: VideoId) -> bool {
        let mut state = self.state.borrow_mut();
        let before = state.order.len();
        state.order.retain(|attached| *attached != video);
        if state.order.len() == before {
            return false;
        }
        state.notify(MutationRecord {
            added_nodes: 0,
            removed_nodes: 1,
        });
        true
    }

    /// Re-attaches a previously removed video at the end of the document.
    pub fn restore_video(&self, video: VideoId) -> bool {
        let mut state = self.state.borrow_mut();
        if !state.elements.contains_key(&video) || state.order.contains(&video) {
            return false;
        }
        state.order.push(video);
        state.notify(MutationRecord {
            added_nodes: 1,
            removed_nodes: 0,
        });
        true
    }

    /// Moves an attached video to the end of `container` in one mutation.
    pub fn move_video(&self, video: VideoId, container: impl Into<String>) -> bool {
        let mut state = self.state.borrow_mut();
        if !state.order.contains(&video) {
            return false;
        }
        state.order.retain(|attached| *attached != video);
        state.order.push(video);
        if let Some(node) = state.elements.get_mut(&video) {
            node.container = Some(container.into());
        }
        state.notify(MutationRecord {
            added_nodes: 1,
            removed_nodes: 1,
        });
        true
    }

    /// Drops a container wholesale: its videos detach and any overlay mounted
    /// inside it disappears with it. Returns how many videos were detached.
    pub fn remove_container(&self, container: &str) -> usize {
        let mut state = self.state.borrow_mut();
        let State {
            elements,
            order,
            overlays,
            positioned,
            ..
        } = &mut *state;
        let before = order.len();
        order.retain(|video| {
            elements
                .get(video)
                .is_none_or(|node| node.container.as_deref() != Some(container))
        });
        let detached = before.saturating_sub(order.len());
        let overlays_before = overlays.len();
        overlays.retain(|_, mounted| mounted.container != container);
        let dropped = overlays_before.saturating_sub(overlays.len());
        positioned.remove(container);
        let removed_nodes = detached.saturating_add(dropped);
        if removed_nodes > 0 {
            state.notify(MutationRecord {
                added_nodes: 0,
                removed_nodes,
            });
        }
        detached
    }

    pub fn set_video_size(&self, video: VideoId, width: f64, height: f64) -> bool {
        let mut state = self.state.borrow_mut();
        let Some(node) = state.elements.get_mut(&video) else {
            return false;
        };
        node.size = Size { width, height };
        true
    }

    #[must_use]
    pub fn overlays(&self) -> Vec<MountedOverlay> {
        self.state.borrow().overlays.values().cloned().collect()
    }

    #[must_use]
    pub fn overlay_for(&self, video: VideoId) -> Option<MountedOverlay> {
        self.state
            .borrow()
            .overlays
            .values()
            .find(|mounted| mounted.video == video)
            .cloned()
    }

    /// Whether a widget was mounted in `container`, making it a positioning context.
    #[must_use]
    pub fn is_positioned(&self, container: &str) -> bool {
        self.state.borrow().positioned.contains(container)
    }

    #[must_use]
    pub fn container_of(&self, video: VideoId) -> Option<String> {
        self.state
            .borrow()
            .elements
            .get(&video)
            .and_then(|node| node.container.clone())
    }
}

impl Document for MemoryDocument {
    fn hostname(&self) -> String {
        self.hostname.clone()
    }

    fn ready_state(&self) -> watch::Receiver<ReadyState> {
        self.ready.subscribe()
    }

    fn observe_mutations(&self) -> mpsc::UnboundedReceiver<MutationRecord> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.state.borrow_mut().subscribers.push(sender);
        receiver
    }

    fn videos(&self) -> Vec<VideoId> {
        self.state.borrow().order.clone()
    }

    fn contains(&self, video: VideoId) -> bool {
        self.state.borrow().order.contains(&video)
    }

    fn playback_rate(&self, video: VideoId) -> Option<f64> {
        self.state.borrow().elements.get(&video).map(|node| node.rate)
    }

    fn set_playback_rate(&self, video: VideoId, rate: f64) -> bool {
        let mut state = self.state.borrow_mut();
        let Some(node) = state.elements.get_mut(&video) else {
            return false;
        };
        node.rate = rate;
        true
    }

    fn video_size(&self, video: VideoId) -> Option<Size> {
        self.state.borrow().elements.get(&video).map(|node| node.size)
    }

    fn mount_overlay(&self, video: VideoId, view: &OverlayView) -> Option<OverlayId> {
        let mut state = self.state.borrow_mut();
        let container = state.elements.get(&video)?.container.clone()?;
        let overlay = OverlayId::new(state.next_overlay);
        state.next_overlay = state.next_overlay.saturating_add(1);
        state.positioned.insert(container.clone());
        state.overlays.insert(
            overlay,
            MountedOverlay {
                overlay,
                video,
                container,
                view: view.clone(),
            },
        );
        state.notify(MutationRecord {
            added_nodes: 1,
            removed_nodes: 0,
        });
        Some(overlay)
    }

    fn render_overlay(&self, overlay: OverlayId, view: &OverlayView) {
        if let Some(mounted) = self.state.borrow_mut().overlays.get_mut(&overlay) {
            mounted.view = view.clone();
        }
    }

    fn unmount_overlay(&self, overlay: OverlayId) {
        let mut state = self.state.borrow_mut();
        if state.overlays.remove(&overlay).is_some() {
            state.notify(MutationRecord {
                added_nodes: 0,
                removed_nodes: 1,
            });
        }
    }
}
