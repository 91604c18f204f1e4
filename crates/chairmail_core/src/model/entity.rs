//! Primary recipient entity (user or submission).
//!
//! # Responsibility
//! - Define the canonical record shared by store, search and pickers.
//! - Keep per-kind optional fields explicit instead of trusting field presence.
//!
//! # Invariants
//! - `id` is stable for the page lifetime and is the store mapping key.
//! - `list_memberships` is derived data; only the store rebuilds it.

use crate::search::engine::{SearchField, Searchable};
use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Borrow;
use std::fmt::{Display, Formatter};

/// Fallback label for submissions without a title.
pub const UNTITLED_SUBMISSION_LABEL: &str = "[No title]";

/// Stable entity identifier.
///
/// The server sends integers for database keys, but ids are compared as
/// strings everywhere (form values, list membership, lookups).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for EntityId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for EntityId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<u64> for EntityId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum WireId {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match WireId::deserialize(deserializer)? {
            WireId::Text(value) => Self(value),
            WireId::Number(value) => Self(value.to_string()),
        })
    }
}

/// Entity kind active on one compose page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    User,
    Submission,
}

impl EntityKind {
    /// Wire discriminator used by the objects endpoint.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Submission => "submission",
        }
    }

    /// Fields searched for entities of this kind, in match-record order.
    pub fn search_fields(self) -> &'static [SearchField] {
        match self {
            Self::User => &[
                SearchField::Name,
                SearchField::NameRus,
                SearchField::City,
                SearchField::Affiliation,
                SearchField::Country,
                SearchField::Id,
            ],
            Self::Submission => &[SearchField::Name, SearchField::Id],
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User profile fields received from the objects endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub name: String,
    /// Transliterated full name; only sent when the profile has one.
    pub name_rus: Option<String>,
    pub url: Option<String>,
    pub avatar_url: Option<String>,
    pub affiliation: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub role: Option<String>,
    pub degree: Option<String>,
}

/// Submission author reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: EntityId,
    pub name: String,
}

/// Submission fields received from the objects endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubmissionInfo {
    /// May be empty; see [`Entity::display_label`].
    pub title: String,
    pub url: Option<String>,
    pub authors: Vec<Author>,
}

/// Kind-specific entity payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "object_type", rename_all = "snake_case")]
pub enum EntityDetails {
    User(UserProfile),
    Submission(SubmissionInfo),
}

/// Primary recipient record held by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entity {
    pub id: EntityId,
    pub details: EntityDetails,
    /// Explicit selection flag.
    pub checked: bool,
    /// Ids of mailing lists containing this entity, in list discovery order.
    pub list_memberships: Vec<String>,
}

impl Entity {
    /// Creates an unchecked entity without memberships.
    pub fn new(id: impl Into<EntityId>, details: EntityDetails) -> Self {
        Self {
            id: id.into(),
            details,
            checked: false,
            list_memberships: Vec::new(),
        }
    }

    pub fn user(id: impl Into<EntityId>, profile: UserProfile) -> Self {
        Self::new(id, EntityDetails::User(profile))
    }

    pub fn submission(id: impl Into<EntityId>, info: SubmissionInfo) -> Self {
        Self::new(id, EntityDetails::Submission(info))
    }

    pub fn kind(&self) -> EntityKind {
        match self.details {
            EntityDetails::User(_) => EntityKind::User,
            EntityDetails::Submission(_) => EntityKind::Submission,
        }
    }

    /// User name or submission title, as received.
    pub fn display_name(&self) -> &str {
        match &self.details {
            EntityDetails::User(profile) => &profile.name,
            EntityDetails::Submission(info) => &info.title,
        }
    }

    /// Display name with the untitled-submission fallback applied.
    pub fn display_label(&self) -> &str {
        let name = self.display_name();
        if name.trim().is_empty() && self.kind() == EntityKind::Submission {
            UNTITLED_SUBMISSION_LABEL
        } else {
            name
        }
    }

    /// Submission authors; empty for users.
    pub fn authors(&self) -> &[Author] {
        match &self.details {
            EntityDetails::Submission(info) => &info.authors,
            EntityDetails::User(_) => &[],
        }
    }

    /// Returns whether `list_id` is one of this entity's memberships.
    pub fn is_member_of(&self, list_id: &str) -> bool {
        self.list_memberships.iter().any(|id| id == list_id)
    }

    fn field_value(&self, field: SearchField) -> Option<&str> {
        match (&self.details, field) {
            (_, SearchField::Id) => Some(self.id.as_str()),
            (EntityDetails::User(profile), SearchField::Name) => Some(&profile.name),
            (EntityDetails::User(profile), SearchField::NameRus) => profile.name_rus.as_deref(),
            (EntityDetails::User(profile), SearchField::City) => profile.city.as_deref(),
            (EntityDetails::User(profile), SearchField::Affiliation) => {
                profile.affiliation.as_deref()
            }
            (EntityDetails::User(profile), SearchField::Country) => profile.country.as_deref(),
            (EntityDetails::Submission(info), SearchField::Name) => Some(&info.title),
            _ => None,
        }
    }
}

impl Searchable for Entity {
    fn search_id(&self) -> &str {
        self.id.as_str()
    }

    fn search_fields(&self) -> Vec<(SearchField, &str)> {
        self.kind()
            .search_fields()
            .iter()
            .filter_map(|field| self.field_value(*field).map(|value| (*field, value)))
            .collect()
    }
}
