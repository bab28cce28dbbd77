use std::collections::BTreeSet;
use std::rc::Rc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::page::{Document, ReadyState};
use crate::storage::KeyValueStore;

use super::PageSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    Idle,
    Reconciling,
}

/// What one reconciliation did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub registered: usize,
    pub unregistered: usize,
    pub passes: usize,
    /// Set when the call was folded into a reconciliation already running.
    pub coalesced: bool,
}

impl ReconcileReport {
    fn absorb(&mut self, pass: Self) {
        self.registered = self.registered.saturating_add(pass.registered);
        self.unregistered = self.unregistered.saturating_add(pass.unregistered);
        self.passes = self.passes.saturating_add(1);
    }
}

impl<D, S> PageSession<D, S>
where
    D: Document + 'static,
    S: KeyValueStore + 'static,
{
    #[must_use]
    pub fn watcher_state(&self) -> WatcherState {
        self.watcher.get()
    }

    /// Brings the registry in line with the videos currently in the document.
    ///
    /// A call made while a reconciliation is running only requests one more
    /// pass from the running one.
    pub fn reconcile(self: &Rc<Self>) -> ReconcileReport {
        if self.watcher.get() == WatcherState::Reconciling {
            self.rescan.set(true);
            return ReconcileReport {
                coalesced: true,
                ..ReconcileReport::default()
            };
        }
        self.watcher.set(WatcherState::Reconciling);
        let mut report = ReconcileReport::default();
        loop {
            self.rescan.set(false);
            report.absorb(self.reconcile_pass());
            if !self.rescan.get() {
                break;
            }
        }
        self.watcher.set(WatcherState::Idle);
        if report.registered > 0 || report.unregistered > 0 {
            tracing::debug!(
                "Reconciled: {} registered, {} unregistered",
                report.registered,
                report.unregistered
            );
        }
        report
    }

    fn reconcile_pass(self: &Rc<Self>) -> ReconcileReport {
        let present = self.document.videos();
        let known = self.registry.borrow().videos();
        let present_set: BTreeSet<_> = present.iter().copied().collect();
        let mut pass = ReconcileReport::default();

        for video in present {
            if self.registry.borrow().contains(video) {
                continue;
            }
            self.register(video);
            if self.registry.borrow().contains(video) {
                pass.registered = pass.registered.saturating_add(1);
            }
        }
        for video in known {
            if !present_set.contains(&video) {
                self.unregister(video);
                pass.unregistered = pass.unregistered.saturating_add(1);
            }
        }
        if let Some(active) = self.active.get()
            && !present_set.contains(&active)
        {
            tracing::debug!("Clearing active pointer to removed {}", active);
            self.active.set(None);
        }
        pass
    }

    /// Spawns the document watcher: one pass once the page is interactive,
    /// then one pass per burst of mutations until [`PageSession::close`].
    pub fn start(self: &Rc<Self>) -> JoinHandle<()> {
        let session = Rc::clone(self);
        let mut mutations = self.document.observe_mutations();
        let mut ready = self.document.ready_state();
        let mut shutdown = self.shutdown.subscribe();
        tokio::task::spawn_local(async move {
            if session.closed.get() {
                tracing::debug!("Session already closed; watcher not started");
                return;
            }
            tokio::select! {
                result = ready.wait_for(|state| *state != ReadyState::Loading) => {
                    if result.is_err() {
                        return;
                    }
                }
                _ = shutdown.recv() => return,
            }
            while mutations.try_recv().is_ok() {}
            session.reconcile();

            loop {
                tokio::select! {
                    record = mutations.recv() => {
                        let Some(record) = record else {
                            tracing::debug!("Mutation stream closed; watcher stopping");
                            break;
                        };
                        let mut burst = 1usize;
                        while mutations.try_recv().is_ok() {
                            burst = burst.saturating_add(1);
                        }
                        tracing::trace!(
                            "Mutation burst of {} (+{} -{} in first record)",
                            burst,
                            record.added_nodes,
                            record.removed_nodes
                        );
                        session.reconcile();
                    }
                    signal = shutdown.recv() => {
                        if let Err(broadcast::error::RecvError::Lagged(_)) = signal {
                            continue;
                        }
                        break;
                    }
                }
            }
        })
    }

    /// Stops the watcher task started by [`PageSession::start`]. A session
    /// closed before it is started never runs a watcher.
    pub fn close(&self) {
        self.closed.set(true);
        drop(self.shutdown.send(()));
    }
}
