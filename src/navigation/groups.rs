//! Open/closed state of collapsible navigation groups

use std::collections::HashMap;

use super::{is_group_active, NavItem};

/// UI state of one group
///
/// Starts closed. The first time one of its children matches the route it
/// opens by itself; after that only the user opens or closes it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupState {
    open: bool,
    auto_opened: bool,
}

impl GroupState {
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Feed the group's active flag for the current route
    pub fn observe(&mut self, child_active: bool) {
        if child_active && !self.auto_opened {
            self.open = true;
            self.auto_opened = true;
        }
    }

    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }
}

/// Group states keyed by the group's stable key
#[derive(Debug, Clone, Default)]
pub struct GroupStates {
    states: HashMap<String, GroupState>,
}

impl GroupStates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount groups that appeared, drop groups that disappeared and apply
    /// the route to every group.
    pub fn sync(&mut self, items: &[NavItem], current_path: &str) {
        self.states
            .retain(|key, _| items.iter().any(|item| item.is_group() && &item.key == key));

        for item in items.iter().filter(|item| item.is_group()) {
            self.states
                .entry(item.key.clone())
                .or_default()
                .observe(is_group_active(current_path, item));
        }
    }

    /// Toggle a mounted group; returns the new open flag, `None` if unknown
    pub fn toggle(&mut self, key: &str) -> Option<bool> {
        self.states.get_mut(key).map(GroupState::toggle)
    }

    pub fn is_open(&self, key: &str) -> bool {
        self.states.get(key).is_some_and(GroupState::is_open)
    }
}
