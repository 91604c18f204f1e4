//! Core recipient selection logic for the chair mail compose screen.
//! This crate owns the selection state and its invariants; hosts only render.

pub mod config;
pub mod logging;
pub mod model;
pub mod preview;
pub mod search;
pub mod selection;
pub mod session;
pub mod store;

pub use config::{ComposeConfig, ConfigError, LogLevel};
pub use logging::{init_from_config, init_logging, logging_status, LoggingError};
pub use model::entity::{Entity, EntityDetails, EntityId, EntityKind, SubmissionInfo, UserProfile};
pub use model::mailing_list::MailingList;
pub use model::payload::DecodeError;
pub use preview::{PreviewError, PreviewForm, PreviewMessage, PreviewRequest, PreviewTransport};
pub use search::engine::{search, MatchSpan, SearchField, SearchHit, Searchable};
pub use selection::area::{AreaItem, RecipientsArea};
pub use selection::picker::{PickerDialog, PickerTarget, PickerView};
pub use selection::projector::{RecipientView, SelectionProjector};
pub use session::ComposeSession;
pub use store::source::{FileSource, RecipientSource, StaticSource, TransportError};
pub use store::{EntityStore, LoadError, SelectionEvent, StoreError, StoreHandlers};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
