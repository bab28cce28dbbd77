use std::rc::Rc;

use crate::error::ValidationError;
use crate::page::{Document, EventResponse, KeyEvent, VideoId};
use crate::speed::SpeedOp;
use crate::storage::KeyValueStore;

use super::PageSession;

pub const DEFAULT_DECREASE_KEYS: [&str; 2] = ["[", "-"];
pub const DEFAULT_INCREASE_KEYS: [&str; 2] = ["]", "+"];
pub const DEFAULT_RESET_KEYS: [&str; 1] = ["0"];

/// Keys that trigger each speed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    decrease: Vec<String>,
    increase: Vec<String>,
    reset: Vec<String>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let owned = |keys: &[&str]| keys.iter().map(|key| (*key).to_owned()).collect();
        Self {
            decrease: owned(&DEFAULT_DECREASE_KEYS),
            increase: owned(&DEFAULT_INCREASE_KEYS),
            reset: owned(&DEFAULT_RESET_KEYS),
        }
    }
}

impl KeyBindings {
    /// # Errors
    ///
    /// Returns an error if a command has no keys or a key is bound twice.
    pub fn new(
        decrease: Vec<String>,
        increase: Vec<String>,
        reset: Vec<String>,
    ) -> Result<Self, ValidationError> {
        for (command, keys) in [
            ("decrease", &decrease),
            ("increase", &increase),
            ("reset", &reset),
        ] {
            if keys.iter().all(|key| key.is_empty()) {
                return Err(ValidationError::EmptyKeyBinding { command });
            }
        }
        let mut seen = std::collections::BTreeSet::new();
        for key in decrease.iter().chain(&increase).chain(&reset) {
            if !key.is_empty() && !seen.insert(key.as_str()) {
                return Err(ValidationError::ConflictingKeyBinding { key: key.clone() });
            }
        }
        Ok(Self {
            decrease,
            increase,
            reset,
        })
    }

    #[must_use]
    pub fn decrease(&self) -> &[String] {
        &self.decrease
    }

    #[must_use]
    pub fn increase(&self) -> &[String] {
        &self.increase
    }

    #[must_use]
    pub fn reset(&self) -> &[String] {
        &self.reset
    }

    #[must_use]
    pub fn command_for(&self, key: &str) -> Option<SpeedOp> {
        let bound = |keys: &[String]| keys.iter().any(|candidate| candidate == key);
        if bound(&self.decrease) {
            Some(SpeedOp::Decrease)
        } else if bound(&self.increase) {
            Some(SpeedOp::Increase)
        } else if bound(&self.reset) {
            Some(SpeedOp::Reset)
        } else {
            None
        }
    }
}

impl<D, S> PageSession<D, S>
where
    D: Document + 'static,
    S: KeyValueStore + 'static,
{
    /// Video that keyboard commands apply to: the active one while it is still
    /// in the document, otherwise the first video on the page.
    #[must_use]
    pub fn key_target(&self) -> Option<VideoId> {
        self.active
            .get()
            .filter(|video| self.document.contains(*video))
            .or_else(|| self.document.videos().first().copied())
    }

    pub(super) fn route_key(self: &Rc<Self>, event: &KeyEvent) -> EventResponse {
        if event.focus.accepts_text() {
            return EventResponse::ignored();
        }
        let Some(op) = self.bindings.command_for(&event.key) else {
            return EventResponse::ignored();
        };
        let Some(video) = self.key_target() else {
            return EventResponse::ignored();
        };
        self.adjust(video, op);
        EventResponse::consumed()
    }
}

#[cfg(test)]
mod tests {
    use super::KeyBindings;
    use crate::error::ValidationError;
    use crate::speed::SpeedOp;

    #[test]
    fn default_bindings_cover_bracket_and_sign_keys() -> Result<(), String> {
        let bindings = KeyBindings::default();
        let cases = [
            ("[", Some(SpeedOp::Decrease)),
            ("-", Some(SpeedOp::Decrease)),
            ("]", Some(SpeedOp::Increase)),
            ("+", Some(SpeedOp::Increase)),
            ("0", Some(SpeedOp::Reset)),
            ("k", None),
            ("=", None),
        ];
        for (key, expected) in cases {
            if bindings.command_for(key) != expected {
                return Err(format!("Unexpected command for '{}'", key));
            }
        }
        Ok(())
    }

    #[test]
    fn bindings_reject_empty_and_duplicate_keys() -> Result<(), String> {
        let empty = KeyBindings::new(vec![], vec!["]".to_owned()], vec!["0".to_owned()]);
        if !matches!(
            empty,
            Err(ValidationError::EmptyKeyBinding {
                command: "decrease"
            })
        ) {
            return Err(format!("Expected empty binding error, got {:?}", empty));
        }
        let duplicate = KeyBindings::new(
            vec!["a".to_owned()],
            vec!["a".to_owned()],
            vec!["0".to_owned()],
        );
        if !matches!(
            duplicate,
            Err(ValidationError::ConflictingKeyBinding { .. })
        ) {
            return Err(format!("Expected conflict error, got {:?}", duplicate));
        }
        Ok(())
    }
}
