//! Per-instance state.
//!
//! An [`InstanceState`] is everything one deployed instance owns: its owner,
//! its selector map, its storage slots and its event log. Module code never
//! owns state of its own; it reads and writes the state of whichever
//! instance is calling it.

use crate::{
    event::Event,
    felt::Felt,
    selector::{Address, Selector},
};
use indexmap::IndexMap;
use std::collections::BTreeMap;

/// Mapping from selector to the module address that serves it.
///
/// Iteration follows registration order. Removing a selector keeps the
/// relative order of the remaining entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorMap {
    entries: IndexMap<Selector, Address>,
}

impl SelectorMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Module currently serving `selector`.
    pub fn get(&self, selector: &Selector) -> Option<Address> {
        self.entries.get(selector).copied()
    }

    /// Whether `selector` is mapped.
    pub fn contains(&self, selector: &Selector) -> bool {
        self.entries.contains_key(selector)
    }

    /// Insert or overwrite, returning the previous address.
    pub fn insert(&mut self, selector: Selector, module: Address) -> Option<Address> {
        self.entries.insert(selector, module)
    }

    /// Unmap `selector`, returning the address it pointed at.
    pub fn remove(&mut self, selector: &Selector) -> Option<Address> {
        self.entries.shift_remove(selector)
    }

    /// Iterate `(selector, module)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (Selector, Address)> + '_ {
        self.entries.iter().map(|(s, a)| (*s, *a))
    }

    /// Number of mapped selectors.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is mapped.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Word-addressed storage. Unwritten slots read as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Storage {
    slots: BTreeMap<Felt, Felt>,
}

impl Storage {
    /// Read a slot.
    pub fn read(&self, key: Felt) -> Felt {
        self.slots.get(&key).copied().unwrap_or(Felt::ZERO)
    }

    /// Write a slot. Writing zero clears it.
    pub fn write(&mut self, key: Felt, value: Felt) {
        if value.is_zero() {
            self.slots.remove(&key);
        } else {
            self.slots.insert(key, value);
        }
    }

    /// Number of non-zero slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether every slot is zero.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Key of a named storage variable.
pub fn storage_var(name: &str) -> Felt {
    Selector::from_name(name).felt()
}

/// Everything owned by one instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceState {
    owner: Address,
    selectors: SelectorMap,
    storage: Storage,
    events: Vec<Event>,
}

impl InstanceState {
    /// Fresh state owned by `owner` with an empty selector map.
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            selectors: SelectorMap::new(),
            storage: Storage::default(),
            events: Vec::new(),
        }
    }

    /// The owning principal.
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// The selector map.
    pub fn selectors(&self) -> &SelectorMap {
        &self.selectors
    }

    /// Mutable selector map.
    pub fn selectors_mut(&mut self) -> &mut SelectorMap {
        &mut self.selectors
    }

    /// Swap in a new selector map, returning the old one.
    pub fn replace_selectors(&mut self, selectors: SelectorMap) -> SelectorMap {
        std::mem::replace(&mut self.selectors, selectors)
    }

    /// Storage slots.
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Mutable storage slots.
    pub fn storage_mut(&mut self) -> &mut Storage {
        &mut self.storage
    }

    /// Every event emitted so far.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Append an event.
    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_map_keeps_registration_order_on_remove() {
        let mut map = SelectorMap::new();
        let (a, b, c) = (
            Selector::from_name("a"),
            Selector::from_name("b"),
            Selector::from_name("c"),
        );
        map.insert(a, Address::from(1u64));
        map.insert(b, Address::from(2u64));
        map.insert(c, Address::from(1u64));
        assert_eq!(map.remove(&b), Some(Address::from(2u64)));

        let keys: Vec<_> = map.iter().map(|(s, _)| s).collect();
        assert_eq!(keys, vec![a, c]);
    }

    #[test]
    fn test_storage_defaults_to_zero() {
        let mut storage = Storage::default();
        let key = storage_var("reference");
        assert_eq!(storage.read(key), Felt::ZERO);

        storage.write(key, Felt::from(42u64));
        assert_eq!(storage.read(key), Felt::from(42u64));

        storage.write(key, Felt::ZERO);
        assert!(storage.is_empty());
    }
}
