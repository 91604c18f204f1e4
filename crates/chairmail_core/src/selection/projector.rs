//! Store event -> view refresh bridge.
//!
//! # Responsibility
//! - Mirror explicit selection changes into the recipients area.
//! - Refresh every attached view once per store event.
//!
//! # Invariants
//! - No buffering or batching: one event, one synchronous refresh cycle.
//! - Views read recipients from the store; the projector keeps no copy.

use crate::model::entity::{Entity, EntityId};
use crate::selection::area::{AreaItem, RecipientsArea};
use crate::store::{EntityStore, SelectionEvent};
use log::debug;
use std::cell::RefCell;
use std::rc::Rc;

/// Presentation component depending on the effective selection.
pub trait RecipientView {
    fn refresh(&mut self, store: &EntityStore);
}

impl<V: RecipientView> RecipientView for Rc<RefCell<V>> {
    fn refresh(&mut self, store: &EntityStore) {
        self.borrow_mut().refresh(store);
    }
}

/// Effective recipient ids captured at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectionSnapshot {
    recipient_ids: Vec<EntityId>,
}

impl ProjectionSnapshot {
    pub fn capture(store: &EntityStore) -> Self {
        Self {
            recipient_ids: store
                .effective_selection()
                .into_iter()
                .map(|entity| entity.id.clone())
                .collect(),
        }
    }

    /// Recipient ids in discovery order.
    pub fn recipient_ids(&self) -> &[EntityId] {
        &self.recipient_ids
    }

    pub fn count(&self) -> usize {
        self.recipient_ids.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.recipient_ids.iter().any(|recipient| recipient.as_str() == id)
    }
}

/// Recipient counter shown next to the "Recipients" button.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipientCount {
    snapshot: ProjectionSnapshot,
}

impl RecipientCount {
    pub fn count(&self) -> usize {
        self.snapshot.count()
    }

    pub fn snapshot(&self) -> &ProjectionSnapshot {
        &self.snapshot
    }

    pub fn label(&self) -> String {
        match self.count() {
            1 => "1 recipient".to_string(),
            count => format!("{count} recipients"),
        }
    }
}

impl RecipientView for RecipientCount {
    fn refresh(&mut self, store: &EntityStore) {
        self.snapshot = ProjectionSnapshot::capture(store);
    }
}

/// Line of the "Recipients" listing dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientLine {
    pub id: EntityId,
    pub label: String,
    /// `true` when included only through a checked list.
    pub via_list: bool,
}

/// Builds the recipients listing from the effective selection.
pub fn recipient_lines(store: &EntityStore) -> Vec<RecipientLine> {
    store
        .effective_selection()
        .into_iter()
        .map(|entity: &Entity| RecipientLine {
            id: entity.id.clone(),
            label: entity.display_label().to_string(),
            via_list: !entity.checked,
        })
        .collect()
}

/// Applies store events to the recipients area and attached views.
#[derive(Default)]
pub struct SelectionProjector {
    area: RecipientsArea,
    views: Vec<Box<dyn RecipientView>>,
}

impl SelectionProjector {
    pub fn new(area: RecipientsArea) -> Self {
        Self {
            area,
            views: Vec::new(),
        }
    }

    pub fn attach(&mut self, view: impl RecipientView + 'static) {
        self.views.push(Box::new(view));
    }

    pub fn view_count(&self) -> usize {
        self.views.len()
    }

    pub fn area(&self) -> &RecipientsArea {
        &self.area
    }

    pub fn area_mut(&mut self) -> &mut RecipientsArea {
        &mut self.area
    }

    /// Mirrors one store event and refreshes every view once.
    pub fn apply(&mut self, event: &SelectionEvent, store: &EntityStore) {
        match event {
            SelectionEvent::EntityChecked(id) => {
                self.area.add(AreaItem::Entity, id.as_str());
            }
            SelectionEvent::EntityUnchecked(id) => {
                self.area.remove(AreaItem::Entity, id.as_str(), false);
            }
            SelectionEvent::ListChecked(id) => {
                self.area.add(AreaItem::List, id);
            }
            SelectionEvent::ListUnchecked(id) => {
                self.area.remove(AreaItem::List, id, false);
            }
        }
        debug!(
            "event=selection_projected module=selection status=ok views={}",
            self.views.len()
        );
        self.refresh_all(store);
    }

    /// Refreshes every attached view, e.g. right after load.
    pub fn refresh_all(&mut self, store: &EntityStore) {
        for view in &mut self.views {
            view.refresh(store);
        }
    }
}
