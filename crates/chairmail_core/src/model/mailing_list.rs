//! Mailing list model.
//!
//! # Invariants
//! - `id` equals the server-side list name and is unique per page.
//! - `member_ids` keeps server order and is never deduplicated here.

use crate::model::entity::EntityId;
use crate::search::engine::{SearchField, Searchable};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static FIRST_WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\s)\S").expect("valid first word regex"));

/// Named, server-defined group of entity ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailingList {
    pub id: String,
    /// Human-friendly rendering of `id`, see [`prettify_list_name`].
    pub display_label: String,
    /// Entity kind the list targets on the server (`user|submission`).
    pub list_type: String,
    pub details: String,
    pub member_ids: Vec<EntityId>,
    pub checked: bool,
}

impl MailingList {
    /// Creates an unchecked list and derives its display label from `name`.
    pub fn new(
        name: impl Into<String>,
        list_type: impl Into<String>,
        details: impl Into<String>,
        member_ids: Vec<EntityId>,
    ) -> Self {
        let id = name.into();
        Self {
            display_label: prettify_list_name(&id),
            id,
            list_type: list_type.into(),
            details: details.into(),
            member_ids,
            checked: false,
        }
    }

    pub fn len(&self) -> usize {
        self.member_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.member_ids.is_empty()
    }
}

impl Searchable for MailingList {
    fn search_id(&self) -> &str {
        &self.id
    }

    fn search_fields(&self) -> Vec<(SearchField, &str)> {
        vec![
            (SearchField::Name, self.display_label.as_str()),
            (SearchField::Details, self.details.as_str()),
        ]
    }
}

/// Renders a list name for display: lowercase, underscores become spaces and
/// the first word is capitalized (`"ALL_AUTHORS"` -> `"All authors"`).
pub fn prettify_list_name(name: &str) -> String {
    let spaced = name.to_lowercase().replace('_', " ");
    FIRST_WORD_RE
        .replace(&spaced, |caps: &regex::Captures<'_>| caps[0].to_uppercase())
        .into_owned()
}
