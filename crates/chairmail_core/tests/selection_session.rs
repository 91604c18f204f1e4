use chairmail_core::selection::projector::{recipient_lines, RecipientCount};
use chairmail_core::{
    AreaItem, ComposeConfig, ComposeSession, EntityStore, PreviewForm, RecipientView,
    RecipientsArea, StaticSource, StoreError,
};
use std::cell::RefCell;
use std::rc::Rc;

const USERS: &str = r#"{"type": "user", "objects": [
    {"id": 1, "name": "Anna Ivanova"},
    {"id": 2, "name": "Boris Petrov"},
    {"id": 3, "name": "Clara Smirnova"}
]}"#;

const LISTS: &str = r#"{"type": "mailing_list", "objects": [
    {"name": "chairs", "type": "user", "details": "Track chairs", "objects": [1, 2]}
]}"#;

#[derive(Default)]
struct RecordingView {
    refreshes: usize,
    last_selection: Vec<String>,
}

impl RecipientView for RecordingView {
    fn refresh(&mut self, store: &EntityStore) {
        self.refreshes += 1;
        self.last_selection = store
            .effective_selection()
            .into_iter()
            .map(|entity| entity.id.to_string())
            .collect();
    }
}

fn loaded_session(area: RecipientsArea) -> (ComposeSession, Rc<RefCell<RecordingView>>) {
    let mut session = ComposeSession::new(ComposeConfig::default(), area);
    let view = Rc::new(RefCell::new(RecordingView::default()));
    session.attach_view(Rc::clone(&view));
    session.load(&StaticSource::new(USERS, LISTS)).unwrap();
    (session, view)
}

#[test]
fn each_toggle_refreshes_views_once() {
    let (mut session, view) = loaded_session(RecipientsArea::new());
    let after_load = view.borrow().refreshes;
    assert_eq!(after_load, 1);

    session.toggle_entity("3").unwrap();
    assert_eq!(view.borrow().refreshes, after_load + 1);
    assert_eq!(view.borrow().last_selection, ["3"]);

    session.toggle_list("chairs").unwrap();
    assert_eq!(view.borrow().refreshes, after_load + 2);
    assert_eq!(view.borrow().last_selection, ["1", "2", "3"]);

    session.check_list("chairs").unwrap();
    assert_eq!(view.borrow().refreshes, after_load + 2);
}

#[test]
fn store_changes_are_mirrored_in_area_form_values() {
    let (mut session, _) = loaded_session(RecipientsArea::new());

    session.check_entity("2").unwrap();
    session.check_entity("3").unwrap();
    session.check_list("chairs").unwrap();
    assert_eq!(session.area().form_value(AreaItem::Entity), "2,3");
    assert_eq!(session.area().form_value(AreaItem::List), "chairs");

    session.uncheck_entity("2").unwrap();
    assert_eq!(session.area().form_value(AreaItem::Entity), "3");
}

#[test]
fn removing_from_area_unchecks_in_store_once() {
    let (mut session, view) = loaded_session(RecipientsArea::new());
    session.check_entity("1").unwrap();
    let before = view.borrow().refreshes;

    assert!(session.remove_from_area(AreaItem::Entity, "1").unwrap());
    assert!(!session.store().entity("1").unwrap().checked);
    assert!(!session.area().has(AreaItem::Entity, "1"));
    assert_eq!(view.borrow().refreshes, before + 1);

    assert!(!session.remove_from_area(AreaItem::Entity, "1").unwrap());
    assert_eq!(view.borrow().refreshes, before + 1);
}

#[test]
fn prefilled_area_is_replayed_after_load() {
    let (session, view) = loaded_session(RecipientsArea::from_form_values("3", "chairs"));

    assert!(session.store().entity("3").unwrap().checked);
    assert!(session.store().list("chairs").unwrap().checked);
    assert_eq!(view.borrow().last_selection, ["1", "2", "3"]);
    assert_eq!(session.area().form_value(AreaItem::Entity), "3");
}

#[test]
fn unknown_ids_are_reported() {
    let (mut session, _) = loaded_session(RecipientsArea::new());
    assert_eq!(
        session.toggle_entity("99"),
        Err(StoreError::EntityNotFound("99".to_string()))
    );
    assert_eq!(
        session.check_list("nobody"),
        Err(StoreError::ListNotFound("nobody".to_string()))
    );
}

#[test]
fn recipient_listing_marks_list_only_members() {
    let (mut session, _) = loaded_session(RecipientsArea::new());
    session.check_entity("1").unwrap();
    session.check_list("chairs").unwrap();

    let lines = recipient_lines(session.store());
    let summary = lines
        .iter()
        .map(|line| (line.id.as_str(), line.via_list))
        .collect::<Vec<_>>();
    assert_eq!(summary, [("1", false), ("2", true)]);

    let mut count = RecipientCount::default();
    count.refresh(session.store());
    assert_eq!(count.label(), "2 recipients");
}

#[test]
fn failed_reload_refreshes_views_with_empty_store() {
    let (mut session, view) = loaded_session(RecipientsArea::new());
    let count = Rc::new(RefCell::new(RecipientCount::default()));
    session.attach_view(Rc::clone(&count));
    session.check_list("chairs").unwrap();
    assert_eq!(count.borrow().count(), 2);
    let before = view.borrow().refreshes;

    session.load(&StaticSource::objects_only(USERS)).unwrap_err();

    assert!(!session.store().is_loaded());
    assert_eq!(view.borrow().refreshes, before + 1);
    assert!(view.borrow().last_selection.is_empty());
    assert_eq!(count.borrow().count(), 0);
    let form = session.preview_form().unwrap();
    let PreviewForm::User { user } = &*form else {
        panic!("expected user form");
    };
    assert!(user.options().is_empty());
}

#[test]
fn removing_unknown_id_leaves_area_untouched() {
    let area = RecipientsArea::from_form_values("1", "chairs");
    let mut session = ComposeSession::new(ComposeConfig::default(), area);

    assert_eq!(
        session.remove_from_area(AreaItem::Entity, "1"),
        Err(StoreError::EntityNotFound("1".to_string()))
    );
    assert_eq!(
        session.remove_from_area(AreaItem::List, "chairs"),
        Err(StoreError::ListNotFound("chairs".to_string()))
    );
    assert!(session.area().has(AreaItem::Entity, "1"));
    assert!(session.area().has(AreaItem::List, "chairs"));

    session.load(&StaticSource::new(USERS, LISTS)).unwrap();
    assert!(session.remove_from_area(AreaItem::Entity, "1").unwrap());
    assert!(!session.area().has(AreaItem::Entity, "1"));
}
