//! Wire payload decoding for the objects and lists endpoints.
//!
//! # Responsibility
//! - Decode `{type, objects}` envelopes into typed entities and lists.
//! - Fail fast on unrecognized `type` discriminators.
//!
//! # Invariants
//! - Optional wire fields map to `Option`/empty values, required ones fail.
//! - Object order in the payload is preserved in the decoded vectors.

use crate::model::entity::{
    Author, Entity, EntityId, EntityKind, SubmissionInfo, UserProfile,
};
use crate::model::mailing_list::MailingList;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Discriminator sent by the lists endpoint.
pub const MAILING_LIST_TYPE: &str = "mailing_list";

/// Payload decoding error.
#[derive(Debug)]
pub enum DecodeError {
    /// Body is not a valid `{type, objects}` JSON envelope.
    Json(serde_json::Error),
    /// Envelope carries a `type` this core does not know.
    UnsupportedKind(String),
    /// Envelope is valid but belongs to the other endpoint.
    KindMismatch {
        expected: &'static str,
        found: String,
    },
    /// One record inside `objects` does not match its kind's shape.
    InvalidRecord {
        kind: String,
        index: usize,
        source: serde_json::Error,
    },
}

impl DecodeError {
    /// Variant name, safe to log.
    pub fn variant_name(&self) -> &'static str {
        match self {
            Self::Json(_) => "json",
            Self::UnsupportedKind(_) => "unsupported_kind",
            Self::KindMismatch { .. } => "kind_mismatch",
            Self::InvalidRecord { .. } => "invalid_record",
        }
    }
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "malformed payload: {err}"),
            Self::UnsupportedKind(kind) => write!(f, "unrecognized object type `{kind}`"),
            Self::KindMismatch { expected, found } => {
                write!(f, "expected `{expected}` payload, got `{found}`")
            }
            Self::InvalidRecord {
                kind,
                index,
                source,
            } => write!(f, "invalid `{kind}` record at index {index}: {source}"),
        }
    }
}

impl Error for DecodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::InvalidRecord { source, .. } => Some(source),
            Self::UnsupportedKind(_) | Self::KindMismatch { .. } => None,
        }
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Decoded endpoint payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Entities {
        kind: EntityKind,
        entities: Vec<Entity>,
    },
    Lists(Vec<MailingList>),
}

impl Payload {
    fn type_name(&self) -> String {
        match self {
            Self::Entities { kind, .. } => kind.as_str().to_string(),
            Self::Lists(_) => MAILING_LIST_TYPE.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    objects: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct UserRecord {
    id: EntityId,
    name: String,
    url: Option<String>,
    avatar_url: Option<String>,
    affiliation: Option<String>,
    country: Option<String>,
    city: Option<String>,
    role: Option<String>,
    degree: Option<String>,
    name_rus: Option<String>,
}

#[derive(Deserialize)]
struct SubmissionRecord {
    id: EntityId,
    title: Option<String>,
    url: Option<String>,
    #[serde(default)]
    authors: Vec<Author>,
}

#[derive(Deserialize)]
struct MailingListRecord {
    name: String,
    #[serde(rename = "type", default)]
    list_type: String,
    #[serde(default)]
    details: String,
    #[serde(default)]
    objects: Vec<EntityId>,
}

impl From<UserRecord> for Entity {
    fn from(record: UserRecord) -> Self {
        Entity::user(
            record.id,
            UserProfile {
                name: record.name,
                name_rus: record.name_rus.filter(|value| !value.trim().is_empty()),
                url: record.url,
                avatar_url: record.avatar_url,
                affiliation: record.affiliation,
                country: record.country,
                city: record.city,
                role: record.role,
                degree: record.degree,
            },
        )
    }
}

impl From<SubmissionRecord> for Entity {
    fn from(record: SubmissionRecord) -> Self {
        Entity::submission(
            record.id,
            SubmissionInfo {
                title: record.title.unwrap_or_default(),
                url: record.url,
                authors: record.authors,
            },
        )
    }
}

impl From<MailingListRecord> for MailingList {
    fn from(record: MailingListRecord) -> Self {
        MailingList::new(record.name, record.list_type, record.details, record.objects)
    }
}

/// Decodes any endpoint body by its `type` discriminator.
///
/// # Errors
/// - [`DecodeError::UnsupportedKind`] for an unknown discriminator.
/// - [`DecodeError::InvalidRecord`] when one object lacks required fields.
pub fn decode_payload(body: &str) -> Result<Payload, DecodeError> {
    let envelope: Envelope = serde_json::from_str(body)?;
    let kind = envelope.kind.as_str();
    match kind {
        "user" => Ok(Payload::Entities {
            kind: EntityKind::User,
            entities: decode_records::<UserRecord, Entity>(kind, envelope.objects)?,
        }),
        "submission" => Ok(Payload::Entities {
            kind: EntityKind::Submission,
            entities: decode_records::<SubmissionRecord, Entity>(kind, envelope.objects)?,
        }),
        MAILING_LIST_TYPE => Ok(Payload::Lists(decode_records::<
            MailingListRecord,
            MailingList,
        >(kind, envelope.objects)?)),
        other => Err(DecodeError::UnsupportedKind(other.to_string())),
    }
}

/// Decodes an objects endpoint body (users or submissions).
pub fn decode_entities(body: &str) -> Result<(EntityKind, Vec<Entity>), DecodeError> {
    match decode_payload(body)? {
        Payload::Entities { kind, entities } => Ok((kind, entities)),
        other => Err(DecodeError::KindMismatch {
            expected: "user|submission",
            found: other.type_name(),
        }),
    }
}

/// Decodes a lists endpoint body.
pub fn decode_lists(body: &str) -> Result<Vec<MailingList>, DecodeError> {
    match decode_payload(body)? {
        Payload::Lists(lists) => Ok(lists),
        other => Err(DecodeError::KindMismatch {
            expected: MAILING_LIST_TYPE,
            found: other.type_name(),
        }),
    }
}

fn decode_records<R, T>(kind: &str, objects: Vec<serde_json::Value>) -> Result<Vec<T>, DecodeError>
where
    R: for<'de> Deserialize<'de>,
    T: From<R>,
{
    objects
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            serde_json::from_value::<R>(value)
                .map(T::from)
                .map_err(|source| DecodeError::InvalidRecord {
                    kind: kind.to_string(),
                    index,
                    source,
                })
        })
        .collect()
}
