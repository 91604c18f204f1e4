use chairmail_core::search::highlight::Segment;
use chairmail_core::{
    ComposeConfig, ComposeSession, PickerTarget, PickerView, RecipientsArea, SearchField,
    StaticSource,
};
use std::time::{Duration, Instant};

const USERS: &str = r#"{"type": "user", "objects": [
    {"id": 1, "name": "Anna Ivanova", "city": "Moscow"},
    {"id": 2, "name": "Boris Petrov", "city": "Tomsk"},
    {"id": 3, "name": "Clara Smirnova"}
]}"#;

const LISTS: &str = r#"{"type": "mailing_list", "objects": [
    {"name": "chairs", "type": "user", "details": "Track chairs", "objects": [1, 2]},
    {"name": "reviewers", "type": "user", "details": "", "objects": [3]}
]}"#;

fn session() -> ComposeSession {
    let config = ComposeConfig {
        search_delay_ms: 100,
        ..ComposeConfig::default()
    };
    let mut session = ComposeSession::new(config, RecipientsArea::new());
    session.load(&StaticSource::new(USERS, LISTS)).unwrap();
    session
}

fn row_ids(view: &PickerView<'_>) -> Vec<String> {
    match view {
        PickerView::Rows(rows) => rows.iter().map(|row| row.id.to_string()).collect(),
        PickerView::NothingFound => Vec::new(),
    }
}

#[test]
fn blank_query_renders_every_loaded_item() {
    let mut session = session();
    session.open_picker(PickerTarget::Entities);
    session.open_picker(PickerTarget::Lists);

    assert_eq!(row_ids(&session.render_picker(PickerTarget::Entities)), ["1", "2", "3"]);
    assert_eq!(row_ids(&session.render_picker(PickerTarget::Lists)), ["chairs", "reviewers"]);

    let start = Instant::now();
    session.picker_input(PickerTarget::Entities, "   ", start);
    assert!(session.poll_pickers(start + Duration::from_millis(100)));
    assert_eq!(session.picker(PickerTarget::Entities).result_count(), 0);
    assert_eq!(row_ids(&session.render_picker(PickerTarget::Entities)).len(), 3);
}

#[test]
fn search_runs_only_after_debounce_delay() {
    let mut session = session();
    session.open_picker(PickerTarget::Entities);
    let start = Instant::now();

    session.picker_input(PickerTarget::Entities, "mos", start);
    assert!(!session.poll_pickers(start + Duration::from_millis(50)));
    session.picker_input(PickerTarget::Entities, "tomsk", start + Duration::from_millis(60));
    assert!(!session.poll_pickers(start + Duration::from_millis(120)));
    assert!(session.poll_pickers(start + Duration::from_millis(160)));

    assert_eq!(session.picker(PickerTarget::Entities).query(), "tomsk");
    assert_eq!(row_ids(&session.render_picker(PickerTarget::Entities)), ["2"]);
}

#[test]
fn rows_carry_highlighted_segments() {
    let mut session = session();
    session.open_picker(PickerTarget::Entities);
    let start = Instant::now();
    session.picker_input(PickerTarget::Entities, "ann", start);
    session.poll_pickers(start + Duration::from_secs(1));

    let view = session.render_picker(PickerTarget::Entities);
    let PickerView::Rows(rows) = view else {
        panic!("expected rows");
    };
    assert_eq!(rows.len(), 1);
    let name = rows[0]
        .fields
        .iter()
        .find(|field| field.field == SearchField::Name)
        .unwrap();
    assert_eq!(
        name.segments,
        [
            Segment {
                text: "Ann",
                marked: true,
            },
            Segment {
                text: "a Ivanova",
                marked: false,
            },
        ]
    );
}

#[test]
fn query_without_matches_renders_nothing_found() {
    let mut session = session();
    session.open_picker(PickerTarget::Lists);
    let start = Instant::now();
    session.picker_input(PickerTarget::Lists, "sponsors", start);
    session.poll_pickers(start + Duration::from_secs(1));

    assert_eq!(
        session.render_picker(PickerTarget::Lists),
        PickerView::NothingFound
    );
}

#[test]
fn members_of_checked_list_are_disabled_and_ignore_clicks() {
    let mut session = session();
    session.open_picker(PickerTarget::Entities);

    assert_eq!(
        session.picker_click(PickerTarget::Lists, "chairs").unwrap(),
        Some(true)
    );
    let view = session.render_picker(PickerTarget::Entities);
    let PickerView::Rows(rows) = view else {
        panic!("expected rows");
    };
    assert!(rows[0].disabled && rows[0].checked);
    assert!(!rows[2].disabled && !rows[2].checked);

    assert_eq!(session.picker_click(PickerTarget::Entities, "1").unwrap(), None);
    assert!(!session.store().entity("1").unwrap().checked);

    assert_eq!(session.picker_click(PickerTarget::Entities, "3").unwrap(), Some(true));
    assert!(session.store().entity("3").unwrap().checked);
}

#[test]
fn closing_drops_pending_search() {
    let mut session = session();
    session.open_picker(PickerTarget::Entities);
    let start = Instant::now();
    session.picker_input(PickerTarget::Entities, "clara", start);
    session.close_picker(PickerTarget::Entities);

    assert!(!session.poll_pickers(start + Duration::from_secs(1)));
    assert!(!session.picker(PickerTarget::Entities).is_open());
}

#[test]
fn pending_input_keeps_rows_of_last_search() {
    let mut session = session();
    session.open_picker(PickerTarget::Entities);
    let start = Instant::now();

    session.picker_input(PickerTarget::Entities, "zzz", start);
    assert_eq!(session.picker(PickerTarget::Entities).query(), "zzz");
    assert_eq!(row_ids(&session.render_picker(PickerTarget::Entities)), ["1", "2", "3"]);

    session.picker_input(PickerTarget::Entities, "tomsk", start + Duration::from_millis(10));
    session.poll_pickers(start + Duration::from_millis(200));
    assert_eq!(row_ids(&session.render_picker(PickerTarget::Entities)), ["2"]);

    session.picker_input(PickerTarget::Entities, "sponsors", start + Duration::from_millis(300));
    assert_eq!(row_ids(&session.render_picker(PickerTarget::Entities)), ["2"]);
    session.poll_pickers(start + Duration::from_millis(500));
    assert_eq!(
        session.render_picker(PickerTarget::Entities),
        PickerView::NothingFound
    );
}
