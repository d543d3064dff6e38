//! Language bar buttons owned by one client.
//!
//! The server adds, changes, and removes buttons by id.  The client keeps
//! every button it has forwarded to the host in a [`ButtonRegistry`] so that
//! later `changeButton`/`removeButton` directives can find it, and so that
//! teardown can remove whatever the server forgot to remove.

use std::collections::BTreeMap;

use crate::protocol::messages::{ButtonDescriptor, ButtonStyle};

/// A button handle owned by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LangBarButton {
    descriptor: ButtonDescriptor,
}

impl LangBarButton {
    /// Creates a button from an `addButton` descriptor.
    ///
    /// Returns `None` when the descriptor has an empty id.
    pub fn from_descriptor(descriptor: ButtonDescriptor) -> Option<Self> {
        if descriptor.id.is_empty() {
            return None;
        }
        Some(Self { descriptor })
    }

    pub fn id(&self) -> &str {
        &self.descriptor.id
    }

    pub fn descriptor(&self) -> &ButtonDescriptor {
        &self.descriptor
    }

    /// Style of the button; plain button when unspecified.
    pub fn style(&self) -> ButtonStyle {
        self.descriptor.style.unwrap_or(ButtonStyle::Button)
    }

    /// Merges the fields present in a `changeButton` descriptor.
    pub fn apply_update(&mut self, update: &ButtonDescriptor) {
        let d = &mut self.descriptor;
        if update.style.is_some() {
            d.style = update.style;
        }
        if update.icon.is_some() {
            d.icon = update.icon.clone();
        }
        if update.command_id.is_some() {
            d.command_id = update.command_id;
        }
        if update.text.is_some() {
            d.text = update.text.clone();
        }
        if update.tooltip.is_some() {
            d.tooltip = update.tooltip.clone();
        }
        if update.enable.is_some() {
            d.enable = update.enable;
        }
        if update.toggled.is_some() {
            d.toggled = update.toggled;
        }
    }
}

/// Mapping from button id to the owned button handle.
#[derive(Debug, Default)]
pub struct ButtonRegistry {
    buttons: BTreeMap<String, LangBarButton>,
}

impl ButtonRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `button`, returning the handle it replaced, if any.
    pub fn insert(&mut self, button: LangBarButton) -> Option<LangBarButton> {
        self.buttons.insert(button.id().to_string(), button)
    }

    pub fn remove(&mut self, id: &str) -> Option<LangBarButton> {
        self.buttons.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&LangBarButton> {
        self.buttons.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut LangBarButton> {
        self.buttons.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.buttons.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.buttons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buttons.is_empty()
    }

    /// Removes and returns every button, ordered by id.
    pub fn drain(&mut self) -> Vec<LangBarButton> {
        std::mem::take(&mut self.buttons).into_values().collect()
    }
}
