use std::collections::BTreeMap;

use crate::overlay::OverlayControl;
use crate::page::VideoId;

#[derive(Debug)]
pub(crate) enum EntryState {
    /// Persisted speed is still loading; no widget exists yet.
    Pending,
    Ready(OverlayControl),
}

#[derive(Debug)]
pub(crate) struct Entry {
    pub(crate) generation: u64,
    pub(crate) state: EntryState,
}

/// One entry per tracked video. Generations tell a re-registered video apart
/// from the registration an in-flight load was started for.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    entries: BTreeMap<VideoId, Entry>,
    next_generation: u64,
}

impl Registry {
    pub(crate) fn contains(&self, video: VideoId) -> bool {
        self.entries.contains_key(&video)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn videos(&self) -> Vec<VideoId> {
        self.entries.keys().copied().collect()
    }

    /// Starts a registration; `None` if the video already has an entry.
    pub(crate) fn insert_pending(&mut self, video: VideoId) -> Option<u64> {
        if self.entries.contains_key(&video) {
            return None;
        }
        let generation = self.next_generation;
        self.next_generation = self.next_generation.saturating_add(1);
        self.entries.insert(
            video,
            Entry {
                generation,
                state: EntryState::Pending,
            },
        );
        Some(generation)
    }

    pub(crate) fn is_pending(&self, video: VideoId, generation: u64) -> bool {
        matches!(
            self.entries.get(&video),
            Some(Entry { generation: current, state: EntryState::Pending }) if *current == generation
        )
    }

    /// Finishes the registration started as `generation`, handing the control
    /// back if that registration is gone.
    pub(crate) fn complete(
        &mut self,
        video: VideoId,
        generation: u64,
        control: OverlayControl,
    ) -> Result<(), OverlayControl> {
        match self.entries.get_mut(&video) {
            Some(entry)
                if entry.generation == generation
                    && matches!(entry.state, EntryState::Pending) =>
            {
                entry.state = EntryState::Ready(control);
                Ok(())
            }
            Some(_) | None => Err(control),
        }
    }

    pub(crate) fn remove(&mut self, video: VideoId) -> Option<Entry> {
        self.entries.remove(&video)
    }

    pub(crate) fn generation(&self, video: VideoId) -> Option<u64> {
        self.entries.get(&video).map(|entry| entry.generation)
    }

    pub(crate) fn control(&self, video: VideoId) -> Option<&OverlayControl> {
        match self.entries.get(&video) {
            Some(Entry {
                state: EntryState::Ready(control),
                ..
            }) => Some(control),
            Some(_) | None => None,
        }
    }

    pub(crate) fn control_mut(&mut self, video: VideoId) -> Option<&mut OverlayControl> {
        match self.entries.get_mut(&video) {
            Some(Entry {
                state: EntryState::Ready(control),
                ..
            }) => Some(control),
            Some(_) | None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{EntryState, Registry};
    use crate::overlay::{Opacity, OverlayControl, OverlaySettings};
    use crate::page::VideoId;

    fn control() -> OverlayControl {
        OverlayControl::new(1.0, true, Opacity::Dimmed, &OverlaySettings::default())
    }

    #[test]
    fn insert_pending_is_idempotent() -> Result<(), String> {
        let mut registry = Registry::default();
        let video = VideoId::new(7);
        let generation = registry
            .insert_pending(video)
            .ok_or_else(|| "Expected first insert".to_owned())?;
        if registry.insert_pending(video).is_some() || registry.len() != 1 {
            return Err("Expected duplicate insert to be refused".to_owned());
        }
        if !registry.is_pending(video, generation) {
            return Err("Expected pending entry".to_owned());
        }
        Ok(())
    }

    #[test]
    fn complete_rejects_stale_generation() -> Result<(), String> {
        let mut registry = Registry::default();
        let video = VideoId::new(1);
        let stale = registry
            .insert_pending(video)
            .ok_or_else(|| "Expected insert".to_owned())?;
        registry.remove(video);
        let fresh = registry
            .insert_pending(video)
            .ok_or_else(|| "Expected re-insert".to_owned())?;
        if stale == fresh {
            return Err("Expected a new generation".to_owned());
        }
        if registry.complete(video, stale, control()).is_ok() {
            return Err("Expected stale completion to fail".to_owned());
        }
        if registry.complete(video, fresh, control()).is_err() {
            return Err("Expected fresh completion".to_owned());
        }
        if registry.control(video).is_none() {
            return Err("Expected ready control".to_owned());
        }
        if registry.complete(video, fresh, control()).is_ok() {
            return Err("Expected double completion to fail".to_owned());
        }
        Ok(())
    }

    #[test]
    fn remove_returns_entry_state() -> Result<(), String> {
        let mut registry = Registry::default();
        let video = VideoId::new(3);
        let generation = registry
            .insert_pending(video)
            .ok_or_else(|| "Expected insert".to_owned())?;
        if registry.complete(video, generation, control()).is_err() {
            return Err("Expected completion".to_owned());
        }
        match registry.remove(video) {
            Some(entry) if matches!(entry.state, EntryState::Ready(_)) => {}
            other => return Err(format!("Unexpected removal: {:?}", other)),
        }
        if registry.contains(video) || registry.remove(video).is_some() {
            return Err("Expected entry to be gone".to_owned());
        }
        Ok(())
    }
}
