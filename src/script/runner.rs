use std::collections::BTreeMap;
use std::rc::Rc;

use serde::Serialize;
use tokio::task::JoinHandle;
use url::Url;

use crate::error::{AppError, AppResult, ScriptError};
use crate::page::{
    Document, KeyEvent, MemoryDocument, PageEvent, PointerTarget, ReadyState, VideoId, VideoSpec,
};
use crate::session::{PageSession, SessionSettings};
use crate::storage::{FlakyStore, KeyValueStore, RuntimeContext};

use super::types::{PageScript, PointerKind, ScriptStep};

/// Scheduler turns granted after each step so the watcher can react before
/// persistence is awaited.
const SETTLE_ROUNDS: usize = 4;

/// Overlay state of every attached video at one point of the script.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageSnapshot {
    /// 1-based step that requested the snapshot; `None` for the final one.
    pub step: Option<usize>,
    pub host: String,
    pub videos: Vec<VideoReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoReport {
    pub name: String,
    pub rate: Option<f64>,
    /// Overlay label; `None` while the video has no mounted overlay.
    pub label: Option<String>,
    pub opacity: Option<f64>,
    pub visible: Option<bool>,
    pub active: bool,
}

/// Extracts the persistence partition key from a page address.
///
/// # Errors
///
/// Returns an error when the address does not parse or has no host.
pub fn page_host(url: &str) -> Result<String, ScriptError> {
    let parsed = Url::parse(url).map_err(|err| ScriptError::InvalidUrl {
        url: url.to_owned(),
        source: err,
    })?;
    parsed
        .host_str()
        .map(str::to_owned)
        .ok_or_else(|| ScriptError::MissingHost {
            url: url.to_owned(),
        })
}

/// Plays `script` step by step and returns every snapshot it produced, the
/// final one last. Must run inside a `tokio::task::LocalSet`.
///
/// # Errors
///
/// Returns an error when the address is invalid or a step names a video the
/// page does not have.
pub async fn run_script<S>(
    script: &PageScript,
    store: &Rc<FlakyStore<S>>,
    settings: &SessionSettings,
) -> AppResult<Vec<PageSnapshot>>
where
    S: KeyValueStore + 'static,
{
    let host = page_host(&script.url)?;
    let ready = ReadyState::from(script.ready);
    let mut page = LivePage::open(&host, ready, store, settings);
    let mut snapshots = Vec::new();
    tracing::info!("Opened {} ({} steps)", host, script.steps.len());

    for (index, step) in script.steps.iter().enumerate() {
        let number = index.saturating_add(1);
        tracing::debug!("Step {}: {}", number, step.action());
        match step {
            ScriptStep::Reload => {
                page.close().await?;
                page = LivePage::open(&host, ready, store, settings);
            }
            ScriptStep::FailWrites { count } => store.fail_writes(*count),
            ScriptStep::Snapshot => {
                page.settle().await;
                snapshots.push(page.snapshot(&host, Some(number)));
            }
            ScriptStep::Ready
            | ScriptStep::AddVideo { .. }
            | ScriptStep::RemoveVideo { .. }
            | ScriptStep::RestoreVideo { .. }
            | ScriptStep::MoveVideo { .. }
            | ScriptStep::RemoveContainer { .. }
            | ScriptStep::PointerEnter { .. }
            | ScriptStep::PointerLeave { .. }
            | ScriptStep::Click { .. }
            | ScriptStep::Key { .. }
            | ScriptStep::Wait { .. }
            | ScriptStep::InvalidateContext => page.apply(number, step).await?,
        }
        page.settle().await;
    }

    snapshots.push(page.snapshot(&host, None));
    page.close().await?;
    Ok(snapshots)
}

type ScriptSession<S> = PageSession<MemoryDocument, Rc<FlakyStore<S>>>;

/// One page load: document, session, and the names the script gave its videos.
struct LivePage<S> {
    document: Rc<MemoryDocument>,
    context: RuntimeContext,
    session: Rc<ScriptSession<S>>,
    watcher: JoinHandle<()>,
    names: BTreeMap<String, VideoId>,
}

impl<S> LivePage<S>
where
    S: KeyValueStore + 'static,
{
    fn open(
        host: &str,
        ready: ReadyState,
        store: &Rc<FlakyStore<S>>,
        settings: &SessionSettings,
    ) -> Self {
        let document = Rc::new(MemoryDocument::with_ready_state(host, ready));
        let context = RuntimeContext::new();
        let session = PageSession::new(
            Rc::clone(&document),
            Rc::clone(store),
            context.clone(),
            settings.clone(),
        );
        let watcher = session.start();
        Self {
            document,
            context,
            session,
            watcher,
            names: BTreeMap::new(),
        }
    }

    async fn close(self) -> AppResult<()> {
        self.session.close();
        self.watcher.await?;
        self.session.settle().await;
        Ok(())
    }

    async fn settle(&self) {
        for _ in 0..SETTLE_ROUNDS {
            tokio::task::yield_now().await;
            self.session.settle().await;
        }
    }

    fn video(&self, step: usize, name: &str) -> Result<VideoId, ScriptError> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| ScriptError::UnknownVideo {
                step,
                name: name.to_owned(),
            })
    }

    async fn apply(&mut self, step: usize, action: &ScriptStep) -> AppResult<()> {
        match action {
            ScriptStep::Ready => self.document.set_ready_state(ReadyState::Complete),
            ScriptStep::AddVideo {
                name,
                container,
                rate,
                width,
                height,
            } => {
                if self.names.contains_key(name) {
                    return Err(AppError::script(ScriptError::DuplicateVideo {
                        step,
                        name: name.clone(),
                    }));
                }
                let mut spec = VideoSpec::default();
                if let Some(container) = container {
                    spec = spec.in_container(container.as_str());
                }
                if let Some(rate) = rate {
                    spec = spec.with_rate(*rate);
                }
                let size = spec.size;
                spec = spec.with_size(width.unwrap_or(size.width), height.unwrap_or(size.height));
                let video = self.document.insert_video(spec);
                self.names.insert(name.clone(), video);
            }
            ScriptStep::RemoveVideo { name } => {
                let video = self.video(step, name)?;
                if !self.document.remove_video(video) {
                    tracing::debug!("{} was not attached", name);
                }
            }
            ScriptStep::RestoreVideo { name } => {
                let video = self.video(step, name)?;
                if self.document.contains(video) {
                    return Err(AppError::script(ScriptError::VideoAttached {
                        step,
                        name: name.clone(),
                    }));
                }
                self.document.restore_video(video);
            }
            ScriptStep::MoveVideo { name, container } => {
                let video = self.video(step, name)?;
                if !self.document.move_video(video, container.as_str()) {
                    tracing::debug!("{} is detached; nothing to move", name);
                }
            }
            ScriptStep::RemoveContainer { container } => {
                let detached = self.document.remove_container(container);
                tracing::debug!("Removed {} with {} videos", container, detached);
            }
            ScriptStep::PointerEnter { name, target } => {
                let target = self.pointer_target(step, name, *target)?;
                self.session.dispatch(&PageEvent::PointerEnter(target));
            }
            ScriptStep::PointerLeave { name, target } => {
                let target = self.pointer_target(step, name, *target)?;
                self.session.dispatch(&PageEvent::PointerLeave(target));
            }
            ScriptStep::Click { name, zone } => {
                let video = self.video(step, name)?;
                let target = zone.map_or(PointerTarget::Video(video), |zone| {
                    PointerTarget::Overlay {
                        video,
                        zone: Some(zone.into()),
                    }
                });
                let response = self.session.dispatch(&PageEvent::Click(target));
                tracing::debug!("Click on {} -> {:?}", name, response);
            }
            ScriptStep::Key { key, focus } => {
                let event = KeyEvent::new(key.as_str(), (*focus).into());
                let response = self.session.dispatch(&PageEvent::KeyDown(event));
                tracing::debug!("Key {:?} -> {:?}", key, response);
            }
            ScriptStep::Wait { duration } => {
                let duration = duration.to_duration().map_err(AppError::validation)?;
                tokio::time::sleep(duration).await;
            }
            ScriptStep::InvalidateContext => self.context.invalidate(),
            ScriptStep::FailWrites { .. } | ScriptStep::Reload | ScriptStep::Snapshot => {}
        }
        Ok(())
    }

    fn pointer_target(
        &self,
        step: usize,
        name: &str,
        kind: PointerKind,
    ) -> Result<PointerTarget, ScriptError> {
        let video = self.video(step, name)?;
        Ok(match kind {
            PointerKind::Video => PointerTarget::Video(video),
            PointerKind::Overlay => PointerTarget::Overlay { video, zone: None },
        })
    }

    fn snapshot(&self, host: &str, step: Option<usize>) -> PageSnapshot {
        let names: BTreeMap<VideoId, &str> = self
            .names
            .iter()
            .map(|(name, video)| (*video, name.as_str()))
            .collect();
        let videos = self
            .session
            .snapshot()
            .into_iter()
            .map(|video| VideoReport {
                name: names
                    .get(&video.video)
                    .map_or_else(|| video.video.to_string(), |name| (*name).to_owned()),
                rate: video.rate,
                label: video.overlay.as_ref().map(|view| view.label.clone()),
                opacity: video.overlay.as_ref().map(|view| view.opacity),
                visible: video.overlay.as_ref().map(|view| view.visible),
                active: video.active,
            })
            .collect();
        PageSnapshot {
            step,
            host: host.to_owned(),
            videos,
        }
    }
}
