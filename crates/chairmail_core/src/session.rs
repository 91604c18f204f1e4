//! Compose page session.
//!
//! # Responsibility
//! - Own the store, the selection projector and the picker dialogs.
//! - Route store notifications to the projector after every mutation.
//! - Replay pre-filled recipients once data is loaded.
//!
//! # Invariants
//! - Store handlers only enqueue events; the session drains the queue after
//!   the mutating call returned, so views never observe a store mid-update.
//! - Each queued event refreshes every attached view exactly once.

use crate::config::ComposeConfig;
use crate::preview::{self, MessageEditor, PreviewError, PreviewForm, PreviewMessage, PreviewTransport};
use crate::selection::area::{AreaItem, RecipientsArea};
use crate::selection::picker::{PickerDialog, PickerTarget, PickerView};
use crate::selection::projector::{RecipientView, SelectionProjector};
use crate::store::source::RecipientSource;
use crate::store::{
    EntityStore, EventQueue, LoadError, LoadSummary, StoreError, StoreHandlers, StoreResult,
};
use log::{debug, info, warn};
use std::cell::{Ref, RefCell};
use std::rc::Rc;
use std::time::Instant;

/// State of one compose page.
pub struct ComposeSession {
    config: ComposeConfig,
    store: EntityStore,
    queue: EventQueue,
    projector: SelectionProjector,
    entities_picker: PickerDialog,
    lists_picker: PickerDialog,
    preview: Option<Rc<RefCell<PreviewForm>>>,
}

impl ComposeSession {
    /// Creates an unloaded session; `area` carries pre-filled form values.
    pub fn new(config: ComposeConfig, area: RecipientsArea) -> Self {
        let queue = EventQueue::default();
        let store = EntityStore::new(StoreHandlers::forward_to(&queue));
        let delay = config.search_delay();
        Self {
            config,
            store,
            queue,
            projector: SelectionProjector::new(area),
            entities_picker: PickerDialog::new(PickerTarget::Entities, delay),
            lists_picker: PickerDialog::new(PickerTarget::Lists, delay),
            preview: None,
        }
    }

    pub fn config(&self) -> &ComposeConfig {
        &self.config
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn projector(&self) -> &SelectionProjector {
        &self.projector
    }

    pub fn area(&self) -> &RecipientsArea {
        self.projector.area()
    }

    /// Attaches a view refreshed after every selection change.
    pub fn attach_view(&mut self, view: impl RecipientView + 'static) {
        self.projector.attach(view);
    }

    /// Loads recipients, then re-checks the pre-filled area values.
    ///
    /// The preview form is created on the first successful load, once the
    /// entity kind is known. A failed load leaves the store empty and views
    /// are refreshed to show that.
    pub fn load(&mut self, source: &dyn RecipientSource) -> Result<LoadSummary, LoadError> {
        let summary = match self.store.load(source) {
            Ok(summary) => summary,
            Err(err) => {
                self.queue.borrow_mut().clear();
                self.projector.refresh_all(&self.store);
                return Err(err);
            }
        };

        match &self.preview {
            Some(form) if form.borrow().kind() != summary.kind => {
                *form.borrow_mut() = PreviewForm::for_kind(summary.kind);
            }
            Some(_) => {}
            None => {
                let form = Rc::new(RefCell::new(PreviewForm::for_kind(summary.kind)));
                self.projector.attach(Rc::clone(&form));
                self.preview = Some(form);
            }
        }

        self.replay_area(AreaItem::Entity);
        self.replay_area(AreaItem::List);
        self.drain_events();
        self.projector.refresh_all(&self.store);
        info!(
            "event=session_load module=session status=ok entities={} lists={} checked_entities={} checked_lists={}",
            summary.entities,
            summary.lists,
            self.store.checked_entity_ids().len(),
            self.store.checked_list_ids().len()
        );
        Ok(summary)
    }

    fn replay_area(&mut self, item: AreaItem) {
        let ids = self.projector.area().all(item).to_vec();
        for id in ids {
            let result = match item {
                AreaItem::Entity => self.store.check_entity(&id),
                AreaItem::List => self.store.check_list(&id),
            };
            if let Err(err) = result {
                warn!("event=area_replay module=session status=skipped error={err}");
                self.projector.area_mut().remove(item, &id, false);
            }
        }
    }

    /// Hands every queued store event to the projector, in order.
    fn drain_events(&mut self) {
        loop {
            let event = self.queue.borrow_mut().pop_front();
            let Some(event) = event else {
                break;
            };
            debug!("event=selection_change module=session status=ok change={event:?}");
            self.projector.apply(&event, &self.store);
        }
    }

    pub fn check_entity(&mut self, id: &str) -> StoreResult<bool> {
        let changed = self.store.check_entity(id)?;
        self.drain_events();
        Ok(changed)
    }

    pub fn uncheck_entity(&mut self, id: &str) -> StoreResult<bool> {
        let changed = self.store.uncheck_entity(id)?;
        self.drain_events();
        Ok(changed)
    }

    pub fn toggle_entity(&mut self, id: &str) -> StoreResult<bool> {
        let checked = self.store.toggle_entity(id)?;
        self.drain_events();
        Ok(checked)
    }

    pub fn check_list(&mut self, id: &str) -> StoreResult<bool> {
        let changed = self.store.check_list(id)?;
        self.drain_events();
        Ok(changed)
    }

    pub fn uncheck_list(&mut self, id: &str) -> StoreResult<bool> {
        let changed = self.store.uncheck_list(id)?;
        self.drain_events();
        Ok(changed)
    }

    pub fn toggle_list(&mut self, id: &str) -> StoreResult<bool> {
        let checked = self.store.toggle_list(id)?;
        self.drain_events();
        Ok(checked)
    }

    /// Removes an item from the recipients area on user request and
    /// unchecks it in the store.
    ///
    /// Returns whether the item was present in the area. Unknown ids are
    /// rejected before the area changes.
    pub fn remove_from_area(&mut self, item: AreaItem, id: &str) -> StoreResult<bool> {
        match item {
            AreaItem::Entity if self.store.entity(id).is_none() => {
                return Err(StoreError::EntityNotFound(id.to_string()));
            }
            AreaItem::List if self.store.list(id).is_none() => {
                return Err(StoreError::ListNotFound(id.to_string()));
            }
            _ => {}
        }
        if !self.projector.area_mut().remove(item, id, true) {
            return Ok(false);
        }
        match item {
            AreaItem::Entity => self.store.uncheck_entity(id)?,
            AreaItem::List => self.store.uncheck_list(id)?,
        };
        self.drain_events();
        Ok(true)
    }

    pub fn picker(&self, target: PickerTarget) -> &PickerDialog {
        match target {
            PickerTarget::Entities => &self.entities_picker,
            PickerTarget::Lists => &self.lists_picker,
        }
    }

    fn picker_mut(&mut self, target: PickerTarget) -> &mut PickerDialog {
        match target {
            PickerTarget::Entities => &mut self.entities_picker,
            PickerTarget::Lists => &mut self.lists_picker,
        }
    }

    pub fn open_picker(&mut self, target: PickerTarget) {
        self.picker_mut(target).open();
    }

    pub fn close_picker(&mut self, target: PickerTarget) {
        self.picker_mut(target).close();
    }

    pub fn picker_input(&mut self, target: PickerTarget, value: &str, now: Instant) {
        self.picker_mut(target).input(value, now);
    }

    /// Runs due debounced searches. Returns whether any search ran.
    pub fn poll_pickers(&mut self, now: Instant) -> bool {
        let entities = self.entities_picker.poll(now, &self.store);
        let lists = self.lists_picker.poll(now, &self.store);
        entities || lists
    }

    /// Toggles a picker row and propagates the change.
    pub fn picker_click(&mut self, target: PickerTarget, id: &str) -> StoreResult<Option<bool>> {
        let picker = match target {
            PickerTarget::Entities => &self.entities_picker,
            PickerTarget::Lists => &self.lists_picker,
        };
        let result = picker.click(id, &mut self.store)?;
        self.drain_events();
        Ok(result)
    }

    pub fn render_picker(&self, target: PickerTarget) -> PickerView<'_> {
        self.picker(target).render(&self.store)
    }

    /// Preview selectors, available after the first successful load.
    pub fn preview_form(&self) -> Option<Ref<'_, PreviewForm>> {
        self.preview.as_ref().map(|form| form.borrow())
    }

    pub fn select_preview_submission(&mut self, id: &str) -> bool {
        match &self.preview {
            Some(form) => form.borrow_mut().select_submission(id, &self.store),
            None => false,
        }
    }

    pub fn select_preview_user(&mut self, id: &str) -> bool {
        match &self.preview {
            Some(form) => form.borrow_mut().select_user(id),
            None => false,
        }
    }

    /// Requests a preview for the current selectors.
    ///
    /// Before the first load there is nothing to preview and the message is
    /// empty.
    pub fn submit_preview(
        &self,
        form_fields: &[(String, String)],
        subject: &str,
        editor: &dyn MessageEditor,
        transport: &dyn PreviewTransport,
    ) -> Result<PreviewMessage, PreviewError> {
        match &self.preview {
            Some(form) => {
                preview::submit_preview(&form.borrow(), form_fields, subject, editor, transport)
            }
            None => Ok(PreviewMessage::empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ComposeSession;
    use crate::config::ComposeConfig;
    use crate::selection::area::{AreaItem, RecipientsArea};
    use crate::store::source::StaticSource;

    const OBJECTS: &str = r#"{"type": "user", "objects": [
        {"id": 1, "name": "Anna"},
        {"id": 2, "name": "Boris"}
    ]}"#;
    const LISTS: &str = r#"{"type": "mailing_list", "objects": [
        {"name": "chairs", "type": "user", "details": "", "objects": [2]}
    ]}"#;

    #[test]
    fn load_replays_prefilled_values_and_drops_unknown_ids() {
        let area = RecipientsArea::from_form_values("1,42", "chairs");
        let mut session = ComposeSession::new(ComposeConfig::default(), area);
        session.load(&StaticSource::new(OBJECTS, LISTS)).unwrap();

        assert!(session.store().entity("1").unwrap().checked);
        assert!(session.store().list("chairs").unwrap().checked);
        assert_eq!(session.area().form_value(AreaItem::Entity), "1");
        assert_eq!(session.store().effective_selection().len(), 2);
        assert!(session.preview_form().is_some());
    }
}
