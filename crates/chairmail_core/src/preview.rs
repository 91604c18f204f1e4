//! Message preview for one selected recipient.
//!
//! # Responsibility
//! - Offer the effective selection as options of the preview selectors.
//! - Validate the selectors and assemble the preview GET request.
//! - Decode the rendered `{subject, body}` response.
//!
//! # Invariants
//! - A selector keeps its value only while that value is still offered.
//! - An invalid selection never reaches the transport; the preview renders
//!   empty instead.

use crate::model::entity::{Author, Entity, EntityKind};
use crate::selection::projector::RecipientView;
use crate::store::source::TransportError;
use crate::store::EntityStore;
use log::{debug, info, warn};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const USER_FIELD: &str = "user";
pub const SUBMISSION_FIELD: &str = "submission";

/// Preview failure.
#[derive(Debug)]
pub enum PreviewError {
    /// Named selectors have no value.
    InvalidSelection(Vec<&'static str>),
    Transport(TransportError),
    Decode(serde_json::Error),
}

impl Display for PreviewError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSelection(fields) => {
                write!(f, "preview selection missing: {}", fields.join(", "))
            }
            Self::Transport(err) => write!(f, "preview request failed: {err}"),
            Self::Decode(err) => write!(f, "preview response rejected: {err}"),
        }
    }
}

impl Error for PreviewError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidSelection(_) => None,
            Self::Transport(err) => Some(err),
            Self::Decode(err) => Some(err),
        }
    }
}

impl From<TransportError> for PreviewError {
    fn from(value: TransportError) -> Self {
        Self::Transport(value)
    }
}

impl From<serde_json::Error> for PreviewError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decode(value)
    }
}

/// One `<option>` of a preview selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub id: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(id: impl Into<String>, name: &str) -> Self {
        let id = id.into();
        let label = format!("{name} (ID: {id})");
        Self { id, label }
    }
}

impl From<&Entity> for SelectOption {
    fn from(entity: &Entity) -> Self {
        Self::new(entity.id.as_str(), entity.display_label())
    }
}

impl From<&Author> for SelectOption {
    fn from(author: &Author) -> Self {
        Self::new(author.id.as_str(), &author.name)
    }
}

/// Single-value selector; an empty value means "nothing selected".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipientSelect {
    options: Vec<SelectOption>,
    value: String,
}

impl RecipientSelect {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the options. Returns `true` when the previous value is no
    /// longer offered and was reset to empty.
    pub fn render(&mut self, options: Vec<SelectOption>) -> bool {
        self.options = options;
        if self.value.is_empty() || self.offers(&self.value) {
            return false;
        }
        self.value.clear();
        true
    }

    /// Selects `id` if offered; an empty `id` clears the selector.
    pub fn select(&mut self, id: &str) -> bool {
        if !id.is_empty() && !self.offers(id) {
            return false;
        }
        self.value = id.to_string();
        true
    }

    pub fn value(&self) -> Option<&str> {
        (!self.value.is_empty()).then_some(self.value.as_str())
    }

    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }

    fn offers(&self, id: &str) -> bool {
        self.options.iter().any(|option| option.id == id)
    }
}

/// Preview selector form; the variant follows the page's entity kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewForm {
    User {
        user: RecipientSelect,
    },
    Submission {
        submission: RecipientSelect,
        /// Authors of the selected submission.
        user: RecipientSelect,
    },
}

impl PreviewForm {
    pub fn for_kind(kind: EntityKind) -> Self {
        match kind {
            EntityKind::User => Self::User {
                user: RecipientSelect::new(),
            },
            EntityKind::Submission => Self::Submission {
                submission: RecipientSelect::new(),
                user: RecipientSelect::new(),
            },
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Self::User { .. } => EntityKind::User,
            Self::Submission { .. } => EntityKind::Submission,
        }
    }

    /// Re-renders the primary selector from the effective selection.
    pub fn update(&mut self, store: &EntityStore) {
        let options = store
            .effective_selection()
            .into_iter()
            .map(SelectOption::from)
            .collect::<Vec<_>>();
        match self {
            Self::User { user } => {
                user.render(options);
            }
            Self::Submission { submission, user } => {
                if submission.render(options) {
                    user.render(Vec::new());
                }
            }
        }
    }

    /// Selects a submission and offers its authors in the user selector.
    ///
    /// Returns `false` for user forms or when `id` is not offered.
    pub fn select_submission(&mut self, id: &str, store: &EntityStore) -> bool {
        let Self::Submission { submission, user } = self else {
            return false;
        };
        if !submission.select(id) {
            return false;
        }
        let authors = submission
            .value()
            .and_then(|id| store.entity(id))
            .map(|entity| entity.authors().iter().map(SelectOption::from).collect())
            .unwrap_or_default();
        user.render(authors);
        true
    }

    pub fn select_user(&mut self, id: &str) -> bool {
        match self {
            Self::User { user } | Self::Submission { user, .. } => user.select(id),
        }
    }

    /// Selector values as request fields, in form order.
    pub fn selected_values(&self) -> Vec<(&'static str, Option<&str>)> {
        match self {
            Self::User { user } => vec![(USER_FIELD, user.value())],
            Self::Submission { submission, user } => vec![
                (SUBMISSION_FIELD, submission.value()),
                (USER_FIELD, user.value()),
            ],
        }
    }

    /// Every selector must hold a value.
    pub fn validate(&self) -> Result<(), PreviewError> {
        let missing = self
            .selected_values()
            .into_iter()
            .filter(|(_, value)| value.is_none())
            .map(|(name, _)| name)
            .collect::<Vec<_>>();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(PreviewError::InvalidSelection(missing))
        }
    }

    /// Builds the GET request: other form fields, selectors, then the live
    /// `body` and `subject`.
    pub fn request(
        &self,
        form_fields: &[(String, String)],
        subject: &str,
        body: &str,
    ) -> Result<PreviewRequest, PreviewError> {
        self.validate()?;
        let mut fields = form_fields.to_vec();
        for (name, value) in self.selected_values() {
            fields.push((name.to_string(), value.unwrap_or_default().to_string()));
        }
        fields.push(("body".to_string(), body.to_string()));
        fields.push(("subject".to_string(), subject.to_string()));
        Ok(PreviewRequest { fields })
    }
}

impl RecipientView for PreviewForm {
    fn refresh(&mut self, store: &EntityStore) {
        self.update(store);
    }
}

/// Query fields of one preview GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewRequest {
    pub fields: Vec<(String, String)>,
}

impl PreviewRequest {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Rendered message returned by the preview endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PreviewMessage {
    pub subject: String,
    pub body: String,
}

impl PreviewMessage {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Preview endpoint.
pub trait PreviewTransport {
    /// Performs one best-effort GET and returns the raw response body.
    fn get(&self, request: &PreviewRequest) -> Result<String, TransportError>;
}

/// Source of the live message body.
pub trait MessageEditor {
    fn value(&self) -> String;
}

impl MessageEditor for String {
    fn value(&self) -> String {
        self.clone()
    }
}

/// Requests a preview for the form's current selection.
///
/// An invalid selection renders an empty message without calling the
/// transport.
pub fn submit_preview(
    form: &PreviewForm,
    form_fields: &[(String, String)],
    subject: &str,
    editor: &dyn MessageEditor,
    transport: &dyn PreviewTransport,
) -> Result<PreviewMessage, PreviewError> {
    let request = match form.request(form_fields, subject, &editor.value()) {
        Ok(request) => request,
        Err(PreviewError::InvalidSelection(missing)) => {
            debug!(
                "event=preview_submit module=preview status=skipped missing={}",
                missing.join(",")
            );
            return Ok(PreviewMessage::empty());
        }
        Err(err) => return Err(err),
    };

    let body = transport.get(&request).map_err(|err| {
        warn!(
            "event=preview_submit module=preview status=error stage=transport error_kind={}",
            err.variant_name()
        );
        PreviewError::from(err)
    })?;
    let message = serde_json::from_str::<PreviewMessage>(&body).map_err(|err| {
        warn!(
            "event=preview_submit module=preview status=error stage=decode error_kind={:?}",
            err.classify()
        );
        PreviewError::from(err)
    })?;
    info!(
        "event=preview_submit module=preview status=ok fields={}",
        request.fields.len()
    );
    Ok(message)
}
