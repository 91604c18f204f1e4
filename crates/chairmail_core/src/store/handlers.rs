//! Store change notification handlers.
//!
//! # Invariants
//! - Each handler fires once per state-changing call, synchronously.
//! - List toggles never fire entity handlers for the list's members.

use crate::model::entity::EntityId;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt::{Debug, Formatter};
use std::rc::Rc;

type EntityHandler = Box<dyn FnMut(&EntityId)>;
type ListHandler = Box<dyn FnMut(&str)>;
type LoadedHandler = Box<dyn FnMut()>;

/// Selection change observed by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionEvent {
    EntityChecked(EntityId),
    EntityUnchecked(EntityId),
    ListChecked(String),
    ListUnchecked(String),
}

/// Single-threaded FIFO of selection events shared between the store's
/// handlers and their consumer.
pub type EventQueue = Rc<RefCell<VecDeque<SelectionEvent>>>;

/// Callbacks injected into the store at construction.
#[derive(Default)]
pub struct StoreHandlers {
    on_entity_checked: Option<EntityHandler>,
    on_entity_unchecked: Option<EntityHandler>,
    on_list_checked: Option<ListHandler>,
    on_list_unchecked: Option<ListHandler>,
    on_loaded: Option<LoadedHandler>,
}

impl StoreHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds handlers that push every selection change into `queue`.
    pub fn forward_to(queue: &EventQueue) -> Self {
        let entity_checked = Rc::clone(queue);
        let entity_unchecked = Rc::clone(queue);
        let list_checked = Rc::clone(queue);
        let list_unchecked = Rc::clone(queue);
        Self::new()
            .on_entity_checked(move |id| {
                entity_checked
                    .borrow_mut()
                    .push_back(SelectionEvent::EntityChecked(id.clone()));
            })
            .on_entity_unchecked(move |id| {
                entity_unchecked
                    .borrow_mut()
                    .push_back(SelectionEvent::EntityUnchecked(id.clone()));
            })
            .on_list_checked(move |id| {
                list_checked
                    .borrow_mut()
                    .push_back(SelectionEvent::ListChecked(id.to_string()));
            })
            .on_list_unchecked(move |id| {
                list_unchecked
                    .borrow_mut()
                    .push_back(SelectionEvent::ListUnchecked(id.to_string()));
            })
    }

    pub fn on_entity_checked(mut self, handler: impl FnMut(&EntityId) + 'static) -> Self {
        self.on_entity_checked = Some(Box::new(handler));
        self
    }

    pub fn on_entity_unchecked(mut self, handler: impl FnMut(&EntityId) + 'static) -> Self {
        self.on_entity_unchecked = Some(Box::new(handler));
        self
    }

    pub fn on_list_checked(mut self, handler: impl FnMut(&str) + 'static) -> Self {
        self.on_list_checked = Some(Box::new(handler));
        self
    }

    pub fn on_list_unchecked(mut self, handler: impl FnMut(&str) + 'static) -> Self {
        self.on_list_unchecked = Some(Box::new(handler));
        self
    }

    /// Fired after both load stages and the membership rebuild succeeded.
    pub fn on_loaded(mut self, handler: impl FnMut() + 'static) -> Self {
        self.on_loaded = Some(Box::new(handler));
        self
    }

    pub(crate) fn entity_changed(&mut self, id: &EntityId, checked: bool) {
        let handler = if checked {
            self.on_entity_checked.as_mut()
        } else {
            self.on_entity_unchecked.as_mut()
        };
        if let Some(handler) = handler {
            handler(id);
        }
    }

    pub(crate) fn list_changed(&mut self, id: &str, checked: bool) {
        let handler = if checked {
            self.on_list_checked.as_mut()
        } else {
            self.on_list_unchecked.as_mut()
        };
        if let Some(handler) = handler {
            handler(id);
        }
    }

    pub(crate) fn loaded(&mut self) {
        if let Some(handler) = self.on_loaded.as_mut() {
            handler();
        }
    }
}

impl Debug for StoreHandlers {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreHandlers")
            .field("on_entity_checked", &self.on_entity_checked.is_some())
            .field("on_entity_unchecked", &self.on_entity_unchecked.is_some())
            .field("on_list_checked", &self.on_list_checked.is_some())
            .field("on_list_unchecked", &self.on_list_unchecked.is_some())
            .field("on_loaded", &self.on_loaded.is_some())
            .finish()
    }
}
