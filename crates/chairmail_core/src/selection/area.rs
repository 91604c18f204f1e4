//! "To" area mirror of the explicit selection.
//!
//! # Invariants
//! - Only removals initiated from the area itself (`internal = true`) are
//!   propagated back to the store; store-driven removals just update the
//!   mirror.

use crate::selection::values_input::ValuesInput;

/// Kind of item shown in the recipients area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaItem {
    Entity,
    List,
}

/// Explicitly selected entities and lists, as submitted with the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipientsArea {
    entities: ValuesInput,
    lists: ValuesInput,
}

impl RecipientsArea {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores the area from pre-filled form values (e.g. after a failed
    /// submit re-rendered the page).
    pub fn from_form_values(entities: &str, lists: &str) -> Self {
        Self {
            entities: ValuesInput::parse(entities),
            lists: ValuesInput::parse(lists),
        }
    }

    pub fn add(&mut self, item: AreaItem, id: &str) -> bool {
        self.input_mut(item).add(id)
    }

    /// Removes an item from the mirror.
    ///
    /// Returns `true` only when the removal was initiated in the area and
    /// removed something, i.e. the caller must uncheck `id` in the store.
    pub fn remove(&mut self, item: AreaItem, id: &str, internal: bool) -> bool {
        let removed = self.input_mut(item).remove(id);
        removed && internal
    }

    pub fn has(&self, item: AreaItem, id: &str) -> bool {
        self.input(item).has(id)
    }

    pub fn all(&self, item: AreaItem) -> &[String] {
        self.input(item).all()
    }

    /// Comma-joined form value for `item`.
    pub fn form_value(&self, item: AreaItem) -> String {
        self.input(item).value()
    }

    fn input(&self, item: AreaItem) -> &ValuesInput {
        match item {
            AreaItem::Entity => &self.entities,
            AreaItem::List => &self.lists,
        }
    }

    fn input_mut(&mut self, item: AreaItem) -> &mut ValuesInput {
        match item {
            AreaItem::Entity => &mut self.entities,
            AreaItem::List => &mut self.lists,
        }
    }
}
