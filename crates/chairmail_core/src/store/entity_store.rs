//! Authoritative in-memory snapshot of recipients.
//!
//! # Responsibility
//! - Hold the loaded entities and mailing lists in discovery order.
//! - Own every mutation of `checked` flags and fire change handlers.
//! - Rebuild the entity -> list membership index after list loads.
//!
//! # Invariants
//! - One entity kind per loaded store; a reload with another kind is
//!   rejected. A failed load forgets the kind along with the data.
//! - Memberships are rebuilt wholesale, never patched incrementally.
//! - The effective selection is computed on demand, never stored.

use crate::model::entity::{Entity, EntityId, EntityKind};
use crate::model::mailing_list::MailingList;
use crate::model::payload::{decode_entities, decode_lists, DecodeError};
use crate::search::engine::{search, SearchHit};
use crate::store::handlers::StoreHandlers;
use crate::store::source::{RecipientSource, TransportError};
use log::{error, info, warn};
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type StoreResult<T> = Result<T, StoreError>;

/// Lookup failure for check/uncheck/toggle calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    EntityNotFound(String),
    ListNotFound(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EntityNotFound(id) => write!(f, "entity not found: {id}"),
            Self::ListNotFound(id) => write!(f, "mailing list not found: {id}"),
        }
    }
}

impl Error for StoreError {}

/// Load pipeline stage, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStage {
    Objects,
    Lists,
}

impl LoadStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Objects => "objects",
            Self::Lists => "lists",
        }
    }
}

/// Failure of [`EntityStore::load`].
#[derive(Debug)]
pub enum LoadError {
    Transport {
        stage: LoadStage,
        source: TransportError,
    },
    Decode {
        stage: LoadStage,
        source: DecodeError,
    },
    /// Objects endpoint switched entity kind on reload.
    KindChanged {
        previous: EntityKind,
        found: EntityKind,
    },
}

impl LoadError {
    /// Whether the failure is an unrecognized or inconsistent payload type,
    /// as opposed to a transport problem.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Transport { .. } => false,
            Self::Decode { .. } | Self::KindChanged { .. } => true,
        }
    }

    /// Stage and error variant for log lines; never payload content.
    pub fn log_summary(&self) -> String {
        match self {
            Self::Transport { stage, source } => format!(
                "stage={} error_kind=transport.{}",
                stage.as_str(),
                source.variant_name()
            ),
            Self::Decode { stage, source } => format!(
                "stage={} error_kind=decode.{}",
                stage.as_str(),
                source.variant_name()
            ),
            Self::KindChanged { previous, found } => format!(
                "stage={} error_kind=kind_changed previous={previous} found={found}",
                LoadStage::Objects.as_str()
            ),
        }
    }
}

impl Display for LoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport { stage, source } => {
                write!(f, "{} fetch failed: {source}", stage.as_str())
            }
            Self::Decode { stage, source } => {
                write!(f, "{} payload rejected: {source}", stage.as_str())
            }
            Self::KindChanged { previous, found } => write!(
                f,
                "entity kind changed from `{previous}` to `{found}`; switching kinds is not supported"
            ),
        }
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Transport { source, .. } => Some(source),
            Self::Decode { source, .. } => Some(source),
            Self::KindChanged { .. } => None,
        }
    }
}

/// Counts reported by a successful load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    pub kind: EntityKind,
    pub entities: usize,
    pub lists: usize,
}

/// Entity and mailing list snapshot for one compose page.
#[derive(Debug, Default)]
pub struct EntityStore {
    kind: Option<EntityKind>,
    entities: Vec<Entity>,
    entity_index: HashMap<EntityId, usize>,
    lists: Vec<MailingList>,
    list_index: HashMap<String, usize>,
    loaded: bool,
    handlers: StoreHandlers,
}

impl EntityStore {
    /// Creates an empty, not yet loaded store.
    pub fn new(handlers: StoreHandlers) -> Self {
        Self {
            handlers,
            ..Self::default()
        }
    }

    /// Loads entities, then lists, then rebuilds memberships.
    ///
    /// The lists stage runs only after the entity stage indexed its records,
    /// so memberships always resolve against the fresh entity set. On
    /// success the `on_loaded` handler fires once.
    ///
    /// # Errors
    /// Any failure clears the store to empty and leaves it unloaded.
    /// - Transport failures are recoverable by calling `load` again.
    /// - Decode failures (including unrecognized `type`) are fatal, see
    ///   [`LoadError::is_fatal`].
    pub fn load(&mut self, source: &dyn RecipientSource) -> Result<LoadSummary, LoadError> {
        let started_at = Instant::now();
        info!("event=store_load module=store status=start");

        match self.load_stages(source) {
            Ok(summary) => {
                self.loaded = true;
                info!(
                    "event=store_load module=store status=ok kind={} entities={} lists={} duration_ms={}",
                    summary.kind,
                    summary.entities,
                    summary.lists,
                    started_at.elapsed().as_millis()
                );
                self.handlers.loaded();
                Ok(summary)
            }
            Err(err) => {
                self.clear();
                error!(
                    "event=store_load module=store status=error duration_ms={} {}",
                    started_at.elapsed().as_millis(),
                    err.log_summary()
                );
                Err(err)
            }
        }
    }

    fn load_stages(&mut self, source: &dyn RecipientSource) -> Result<LoadSummary, LoadError> {
        let body = source
            .fetch_objects()
            .map_err(|source| LoadError::Transport {
                stage: LoadStage::Objects,
                source,
            })?;
        let (kind, entities) = decode_entities(&body).map_err(|source| LoadError::Decode {
            stage: LoadStage::Objects,
            source,
        })?;
        self.replace_entities(kind, entities)?;

        let body = source.fetch_lists().map_err(|source| LoadError::Transport {
            stage: LoadStage::Lists,
            source,
        })?;
        let lists = decode_lists(&body).map_err(|source| LoadError::Decode {
            stage: LoadStage::Lists,
            source,
        })?;
        self.replace_lists(lists);

        Ok(LoadSummary {
            kind,
            entities: self.entities.len(),
            lists: self.lists.len(),
        })
    }

    /// Replaces the entity snapshot and re-derives memberships.
    ///
    /// Records with a repeated id replace the earlier record in place.
    pub fn replace_entities(
        &mut self,
        kind: EntityKind,
        entities: Vec<Entity>,
    ) -> Result<(), LoadError> {
        if let Some(previous) = self.kind {
            if previous != kind {
                return Err(LoadError::KindChanged {
                    previous,
                    found: kind,
                });
            }
        }

        self.kind = Some(kind);
        self.entities.clear();
        self.entity_index.clear();
        for entity in entities {
            match self.entity_index.get(&entity.id) {
                Some(&position) => {
                    warn!(
                        "event=entity_duplicate module=store status=replaced id={}",
                        entity.id
                    );
                    self.entities[position] = entity;
                }
                None => {
                    self.entity_index
                        .insert(entity.id.clone(), self.entities.len());
                    self.entities.push(entity);
                }
            }
        }
        self.rebuild_memberships();
        Ok(())
    }

    /// Replaces the mailing list snapshot and rebuilds memberships.
    pub fn replace_lists(&mut self, lists: Vec<MailingList>) {
        self.lists.clear();
        self.list_index.clear();
        for list in lists {
            match self.list_index.get(&list.id) {
                Some(&position) => {
                    warn!(
                        "event=list_duplicate module=store status=replaced list={}",
                        list.id
                    );
                    self.lists[position] = list;
                }
                None => {
                    self.list_index.insert(list.id.clone(), self.lists.len());
                    self.lists.push(list);
                }
            }
        }
        self.rebuild_memberships();
    }

    /// Recomputes `list_memberships` of every entity from list members.
    ///
    /// Unknown member ids are skipped; repeated member ids are reported but
    /// left in the list.
    fn rebuild_memberships(&mut self) {
        for entity in &mut self.entities {
            entity.list_memberships.clear();
        }

        for list in &self.lists {
            let mut seen = HashSet::with_capacity(list.member_ids.len());
            for member_id in &list.member_ids {
                if !seen.insert(member_id) {
                    warn!(
                        "event=list_member_duplicate module=store status=kept list={} id={}",
                        list.id, member_id
                    );
                    continue;
                }
                match self.entity_index.get(member_id) {
                    Some(&position) => self.entities[position]
                        .list_memberships
                        .push(list.id.clone()),
                    None => warn!(
                        "event=list_member_unknown module=store status=skipped list={} id={}",
                        list.id, member_id
                    ),
                }
            }
        }
    }

    fn clear(&mut self) {
        self.kind = None;
        self.entities.clear();
        self.entity_index.clear();
        self.lists.clear();
        self.list_index.clear();
        self.loaded = false;
    }

    /// Whether both load stages completed since the last failure.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Entity kind of this page, once entities were loaded.
    pub fn entity_kind(&self) -> Option<EntityKind> {
        self.kind
    }

    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.entity_index
            .get(id)
            .map(|&position| &self.entities[position])
    }

    pub fn list(&self, id: &str) -> Option<&MailingList> {
        self.list_index
            .get(id)
            .map(|&position| &self.lists[position])
    }

    /// Entities in discovery order.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Mailing lists in discovery order.
    pub fn lists(&self) -> &[MailingList] {
        &self.lists
    }

    /// Members of a list resolved to loaded entities, in list order.
    ///
    /// Unknown lists yield an empty vector.
    pub fn members_of(&self, list_id: &str) -> Vec<&Entity> {
        self.list(list_id)
            .map(|list| {
                list.member_ids
                    .iter()
                    .filter_map(|id| self.entity(id.as_str()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns `Ok(true)` when the entity was not checked before.
    pub fn check_entity(&mut self, id: &str) -> StoreResult<bool> {
        self.set_entity_checked(id, true)
    }

    /// Returns `Ok(true)` when the entity was checked before.
    pub fn uncheck_entity(&mut self, id: &str) -> StoreResult<bool> {
        self.set_entity_checked(id, false)
    }

    /// Flips the entity flag and returns the new value.
    pub fn toggle_entity(&mut self, id: &str) -> StoreResult<bool> {
        let checked = self
            .entity(id)
            .map(|entity| entity.checked)
            .ok_or_else(|| StoreError::EntityNotFound(id.to_string()))?;
        self.set_entity_checked(id, !checked)?;
        Ok(!checked)
    }

    pub fn check_list(&mut self, id: &str) -> StoreResult<bool> {
        self.set_list_checked(id, true)
    }

    pub fn uncheck_list(&mut self, id: &str) -> StoreResult<bool> {
        self.set_list_checked(id, false)
    }

    pub fn toggle_list(&mut self, id: &str) -> StoreResult<bool> {
        let checked = self
            .list(id)
            .map(|list| list.checked)
            .ok_or_else(|| StoreError::ListNotFound(id.to_string()))?;
        self.set_list_checked(id, !checked)?;
        Ok(!checked)
    }

    fn set_entity_checked(&mut self, id: &str, checked: bool) -> StoreResult<bool> {
        let position = *self
            .entity_index
            .get(id)
            .ok_or_else(|| StoreError::EntityNotFound(id.to_string()))?;
        let entity = &mut self.entities[position];
        if entity.checked == checked {
            return Ok(false);
        }
        entity.checked = checked;
        let entity_id = entity.id.clone();
        self.handlers.entity_changed(&entity_id, checked);
        Ok(true)
    }

    fn set_list_checked(&mut self, id: &str, checked: bool) -> StoreResult<bool> {
        let position = *self
            .list_index
            .get(id)
            .ok_or_else(|| StoreError::ListNotFound(id.to_string()))?;
        let list = &mut self.lists[position];
        if list.checked == checked {
            return Ok(false);
        }
        list.checked = checked;
        let list_id = list.id.clone();
        self.handlers.list_changed(&list_id, checked);
        Ok(true)
    }

    /// Whether the entity belongs to at least one checked list.
    pub fn is_part_of_checked_list(&self, entity_id: &str) -> bool {
        self.entity(entity_id).is_some_and(|entity| {
            entity
                .list_memberships
                .iter()
                .any(|list_id| self.list(list_id).is_some_and(|list| list.checked))
        })
    }

    /// Checked directly or through a checked list. Unknown ids are `false`.
    pub fn is_effectively_selected(&self, entity_id: &str) -> bool {
        self.entity(entity_id)
            .is_some_and(|entity| entity.checked || self.is_part_of_checked_list(entity_id))
    }

    /// Canonical recipient list, in discovery order, each entity once.
    pub fn effective_selection(&self) -> Vec<&Entity> {
        self.entities
            .iter()
            .filter(|entity| self.is_effectively_selected(entity.id.as_str()))
            .collect()
    }

    /// Explicitly checked entity ids, in discovery order.
    pub fn checked_entity_ids(&self) -> Vec<&EntityId> {
        self.entities
            .iter()
            .filter(|entity| entity.checked)
            .map(|entity| &entity.id)
            .collect()
    }

    /// Checked list ids, in discovery order.
    pub fn checked_list_ids(&self) -> Vec<&str> {
        self.lists
            .iter()
            .filter(|list| list.checked)
            .map(|list| list.id.as_str())
            .collect()
    }

    pub fn search_entities(&self, query: &str) -> Vec<SearchHit<'_, Entity>> {
        search(query, &self.entities)
    }

    pub fn search_lists(&self, query: &str) -> Vec<SearchHit<'_, MailingList>> {
        search(query, &self.lists)
    }
}

#[cfg(test)]
mod tests {
    use super::{EntityStore, LoadError, LoadStage, StoreError};
    use crate::model::payload::decode_lists;
    use crate::model::entity::{Entity, EntityKind, UserProfile};
    use crate::model::mailing_list::MailingList;
    use crate::store::handlers::StoreHandlers;

    fn user(id: &str) -> Entity {
        Entity::user(
            id,
            UserProfile {
                name: format!("User {id}"),
                ..UserProfile::default()
            },
        )
    }

    #[test]
    fn memberships_skip_unknown_and_repeated_members() {
        let mut store = EntityStore::new(StoreHandlers::new());
        store
            .replace_entities(EntityKind::User, vec![user("1"), user("2")])
            .unwrap();
        store.replace_lists(vec![MailingList::new(
            "chairs",
            "user",
            "",
            vec!["1".into(), "9".into(), "1".into()],
        )]);

        assert_eq!(store.entity("1").unwrap().list_memberships, vec!["chairs"]);
        assert!(store.entity("2").unwrap().list_memberships.is_empty());
        assert_eq!(store.list("chairs").unwrap().member_ids.len(), 3);
        assert_eq!(store.members_of("chairs").len(), 2);
    }

    #[test]
    fn replacing_entities_with_other_kind_is_rejected() {
        let mut store = EntityStore::new(StoreHandlers::new());
        store
            .replace_entities(EntityKind::User, vec![user("1")])
            .unwrap();
        let err = store
            .replace_entities(EntityKind::Submission, Vec::new())
            .unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(store.entities().len(), 1);
    }

    #[test]
    fn duplicate_entity_id_keeps_first_position() {
        let mut store = EntityStore::new(StoreHandlers::new());
        let mut replacement = user("1");
        replacement.details = crate::model::entity::EntityDetails::User(UserProfile {
            name: "Renamed".to_string(),
            ..UserProfile::default()
        });
        store
            .replace_entities(EntityKind::User, vec![user("1"), user("2"), replacement])
            .unwrap();

        assert_eq!(store.entities().len(), 2);
        assert_eq!(store.entities()[0].display_name(), "Renamed");
    }

    #[test]
    fn unknown_ids_report_lookup_errors() {
        let mut store = EntityStore::new(StoreHandlers::new());
        assert_eq!(
            store.toggle_entity("1"),
            Err(StoreError::EntityNotFound("1".to_string()))
        );
        assert_eq!(
            store.check_list("chairs"),
            Err(StoreError::ListNotFound("chairs".to_string()))
        );
        assert!(!store.is_effectively_selected("1"));
        assert!(store.members_of("chairs").is_empty());
    }

    #[test]
    fn load_error_log_summary_omits_payload_values() {
        let source = decode_lists(
            r#"{"type": "mailing_list", "objects": [{"name": "chairs", "objects": "Secret Person"}]}"#,
        )
        .unwrap_err();
        let err = LoadError::Decode {
            stage: LoadStage::Lists,
            source,
        };

        assert!(err.to_string().contains("Secret Person"));
        assert_eq!(
            err.log_summary(),
            "stage=lists error_kind=decode.invalid_record"
        );
    }
}
