//! Events emitted by invocations.

use crate::{
    action::{ChangeAction, encode_actions},
    felt::Felt,
    selector::{MODULES_CHANGED, Selector},
};

/// A raw event: indexed keys plus a data payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Indexed keys; the first key is the selector of the event name.
    pub keys: Vec<Felt>,
    /// Unindexed payload.
    pub data: Vec<Felt>,
}

impl Event {
    /// An event keyed by the selector of `name`.
    pub fn named(name: &str, data: Vec<Felt>) -> Self {
        Self {
            keys: vec![Selector::from_name(name).felt()],
            data,
        }
    }

    /// Whether this event was emitted under `name`.
    pub fn is(&self, name: &str) -> bool {
        self.keys.first() == Some(&Selector::from_name(name).felt())
    }
}

/// Summary of one committed batch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModulesChanged {
    /// The actions that were applied, in order.
    pub actions: Vec<ChangeAction>,
}

impl From<ModulesChanged> for Event {
    fn from(summary: ModulesChanged) -> Self {
        Event::named(MODULES_CHANGED, encode_actions(&summary.actions))
    }
}
