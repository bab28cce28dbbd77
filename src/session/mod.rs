//! Per-page reconciliation service.
//!
//! A [`PageSession`] owns every piece of mutable state the controller has for
//! one page: the video registry, the active-video pointer, and the watcher
//! state. It is shared through `Rc` with the tasks it spawns and must run
//! inside a `tokio::task::LocalSet`.
mod input;
mod registry;
mod watcher;


use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::Rc;

use tokio::sync::Notify;

use crate::overlay::{Opacity, OverlayControl, OverlaySettings, OverlayView};
use crate::page::{Document, EventResponse, PageEvent, PointerTarget, VideoId};
use crate::persistence::{DEFAULT_KEY_PREFIX, RetryPolicy, SaveOutcome, SpeedStore};
use crate::shutdown::{ShutdownSender, shutdown_channel};
use crate::speed::{SpeedLadder, SpeedOp, format_speed};
use crate::storage::{KeyValueStore, RuntimeContext};

use registry::{EntryState, Registry};

pub use input::{DEFAULT_DECREASE_KEYS, DEFAULT_INCREASE_KEYS, DEFAULT_RESET_KEYS, KeyBindings};
pub use watcher::{ReconcileReport, WatcherState};

/// Validated knobs for a session; see `config::apply_config`.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub ladder: SpeedLadder,
    pub retry: RetryPolicy,
    pub key_prefix: String,
    pub overlay: OverlaySettings,
    pub bindings: KeyBindings,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            ladder: SpeedLadder::default(),
            retry: RetryPolicy::default(),
            key_prefix: DEFAULT_KEY_PREFIX.to_owned(),
            overlay: OverlaySettings::default(),
            bindings: KeyBindings::default(),
        }
    }
}

/// Point-in-time view of one attached video, for drivers and tests.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoSnapshot {
    pub video: VideoId,
    pub rate: Option<f64>,
    pub registered: bool,
    /// `None` while the entry is pending or the widget could not be mounted.
    pub overlay: Option<OverlayView>,
    pub active: bool,
}

#[derive(Debug)]
pub struct PageSession<D, S> {
    document: Rc<D>,
    speeds: SpeedStore<S>,
    ladder: SpeedLadder,
    overlay: OverlaySettings,
    bindings: KeyBindings,
    registry: RefCell<Registry>,
    active: Cell<Option<VideoId>>,
    watcher: Cell<WatcherState>,
    rescan: Cell<bool>,
    inflight: Cell<usize>,
    idle: Notify,
    shutdown: ShutdownSender,
    closed: Cell<bool>,
}

impl<D, S> PageSession<D, S>
where
    D: Document + 'static,
    S: KeyValueStore + 'static,
{
    #[must_use]
    pub fn new(
        document: Rc<D>,
        store: S,
        context: RuntimeContext,
        settings: SessionSettings,
    ) -> Rc<Self> {
        let SessionSettings {
            ladder,
            retry,
            key_prefix,
            overlay,
            bindings,
        } = settings;
        let speeds = SpeedStore::new(store, context)
            .with_retry(retry)
            .with_key_prefix(key_prefix);
        let (shutdown, _receiver) = shutdown_channel();
        Rc::new(Self {
            document,
            speeds,
            ladder,
            overlay,
            bindings,
            registry: RefCell::new(Registry::default()),
            active: Cell::new(None),
            watcher: Cell::new(WatcherState::Idle),
            rescan: Cell::new(false),
            inflight: Cell::new(0),
            idle: Notify::new(),
            shutdown,
            closed: Cell::new(false),
        })
    }

    #[must_use]
    pub fn document(&self) -> &D {
        &self.document
    }

    #[must_use]
    pub const fn speeds(&self) -> &SpeedStore<S> {
        &self.speeds
    }

    #[must_use]
    pub const fn ladder(&self) -> &SpeedLadder {
        &self.ladder
    }

    #[must_use]
    pub fn active_video(&self) -> Option<VideoId> {
        self.active.get()
    }

    #[must_use]
    pub fn is_registered(&self, video: VideoId) -> bool {
        self.registry.borrow().contains(video)
    }

    #[must_use]
    pub fn registered_count(&self) -> usize {
        self.registry.borrow().len()
    }

    #[must_use]
    pub fn overlay_view(&self, video: VideoId) -> Option<OverlayView> {
        self.registry.borrow().control(video).map(OverlayControl::view)
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<VideoSnapshot> {
        let registry = self.registry.borrow();
        let active = self.active.get();
        self.document
            .videos()
            .into_iter()
            .map(|video| VideoSnapshot {
                video,
                rate: self.document.playback_rate(video),
                registered: registry.contains(video),
                overlay: registry
                    .control(video)
                    .filter(|control| control.mount().is_some())
                    .map(OverlayControl::view),
                active: active == Some(video),
            })
            .collect()
    }

    /// Resolves once no persistence load or save is in flight.
    pub async fn settle(&self) {
        while self.inflight.get() > 0 {
            self.idle.notified().await;
        }
    }

    /// Starts tracking `video`. Does nothing if it is already tracked.
    ///
    /// The rate is snapped onto the ladder immediately; the widget appears only
    /// after the stored speed for this host has been applied.
    pub fn register(self: &Rc<Self>, video: VideoId) {
        if self.registry.borrow().contains(video) {
            return;
        }
        let Some(current) = self.document.playback_rate(video) else {
            tracing::debug!("Skipping {}: element handle is gone", video);
            return;
        };
        self.document
            .set_playback_rate(video, self.ladder.closest(current));
        let Some(generation) = self.registry.borrow_mut().insert_pending(video) else {
            return;
        };
        tracing::debug!("Registering {} (generation {})", video, generation);

        let session = Rc::clone(self);
        self.spawn_tracked(async move {
            let hostname = session.document.hostname();
            let restored = session.speeds.load(&hostname).await;
            session.finish_registration(video, generation, restored);
        });
    }

    fn finish_registration(&self, video: VideoId, generation: u64, restored: Option<f64>) {
        if !self.registry.borrow().is_pending(video, generation) {
            tracing::debug!("Discarding stale registration of {}", video);
            return;
        }
        if let Some(speed) = restored {
            self.document.set_playback_rate(video, speed);
        }
        let rate = self
            .document
            .playback_rate(video)
            .unwrap_or_else(|| self.ladder.reset());
        let visible = self
            .document
            .video_size(video)
            .is_some_and(|size| !size.is_empty());
        let opacity = if self.active.get() == Some(video) {
            Opacity::Opaque
        } else {
            Opacity::Dimmed
        };
        let mut control = OverlayControl::new(rate, visible, opacity, &self.overlay);
        control.attach(&*self.document, video);
        if control.mount().is_none() {
            tracing::debug!("{} has no parent; overlay kept unmounted", video);
        }
        let completed = self.registry.borrow_mut().complete(video, generation, control);
        if let Err(control) = completed {
            control.detach(&*self.document);
            return;
        }
        tracing::debug!("Registered {} at {}", video, format_speed(rate));
    }

    /// Stops tracking `video` and removes its widget. Does nothing if untracked.
    pub fn unregister(&self, video: VideoId) {
        let removed = self.registry.borrow_mut().remove(video);
        let Some(entry) = removed else {
            return;
        };
        match entry.state {
            EntryState::Ready(control) => control.detach(&*self.document),
            EntryState::Pending => {}
        }
        tracing::debug!("Unregistered {}", video);
    }

    /// Re-renders the widget label from the video's current rate.
    pub fn update_display(&self, video: VideoId) {
        let Some(rate) = self.document.playback_rate(video) else {
            return;
        };
        if let Some(control) = self.registry.borrow_mut().control_mut(video) {
            control.show_rate(&*self.document, rate);
        }
    }

    /// Applies `op` to the video's rate, refreshes its widget, and saves the
    /// new rate for this host in the background. Returns the applied rate.
    pub fn adjust(self: &Rc<Self>, video: VideoId, op: SpeedOp) -> Option<f64> {
        let current = self.document.playback_rate(video)?;
        let rate = self.ladder.apply(op, current);
        self.document.set_playback_rate(video, rate);
        self.update_display(video);
        tracing::debug!("{} {} -> {}", op.as_str(), video, format_speed(rate));

        let session = Rc::clone(self);
        let hostname = self.document.hostname();
        self.spawn_tracked(async move {
            match session.speeds.save(&hostname, rate).await {
                SaveOutcome::Saved { .. } => {}
                SaveOutcome::Skipped => tracing::debug!("Speed save skipped"),
                SaveOutcome::Failed { error, .. } => {
                    tracing::warn!("Speed save ignored: {}", error);
                }
            }
        });
        Some(rate)
    }

    /// Routes one input event and reports how the native event should be treated.
    pub fn dispatch(self: &Rc<Self>, event: &PageEvent) -> EventResponse {
        match event {
            PageEvent::PointerEnter(target) => {
                let video = target.video();
                self.activate(video);
                self.set_opacity(video, Opacity::Opaque);
                EventResponse::ignored()
            }
            PageEvent::PointerLeave(target) => {
                self.schedule_fade(target.video());
                EventResponse::ignored()
            }
            PageEvent::Click(PointerTarget::Video(video)) => {
                self.activate(*video);
                EventResponse::ignored()
            }
            PageEvent::Click(PointerTarget::Overlay { video, zone }) => {
                self.activate(*video);
                let Some(zone) = zone else {
                    return EventResponse::ignored();
                };
                self.adjust(*video, zone.op());
                EventResponse::contained()
            }
            PageEvent::KeyDown(key) => self.route_key(key),
        }
    }

    fn activate(&self, video: VideoId) {
        if self.active.replace(Some(video)) != Some(video) {
            tracing::debug!("Active video is now {}", video);
        }
    }

    fn set_opacity(&self, video: VideoId, opacity: Opacity) {
        if let Some(control) = self.registry.borrow_mut().control_mut(video) {
            control.set_opacity(&*self.document, opacity);
        }
    }

    fn schedule_fade(self: &Rc<Self>, video: VideoId) {
        let Some(generation) = self.registry.borrow().generation(video) else {
            return;
        };
        let session = Rc::clone(self);
        let delay = self.overlay.fade_delay;
        tokio::task::spawn_local(async move {
            tokio::time::sleep(delay).await;
            if session.active.get() == Some(video)
                || session.registry.borrow().generation(video) != Some(generation)
            {
                return;
            }
            session.set_opacity(video, Opacity::Dimmed);
        });
    }

    fn spawn_tracked<F>(self: &Rc<Self>, task: F)
    where
        F: Future<Output = ()> + 'static,
    {
        self.inflight.set(self.inflight.get().saturating_add(1));
        let session = Rc::clone(self);
        tokio::task::spawn_local(async move {
            task.await;
            let remaining = session.inflight.get().saturating_sub(1);
            session.inflight.set(remaining);
            if remaining == 0 {
                session.idle.notify_waiters();
            }
        });
    }
}
