use chairmail_core::search::highlight::merge_spans;
use chairmail_core::{
    Entity, EntityId, EntityKind, EntityStore, MailingList, MatchSpan, SearchField, StoreHandlers,
    UserProfile,
};
use proptest::prelude::*;
use std::collections::BTreeSet;

fn pt_config() -> ProptestConfig {
    ProptestConfig {
        cases: 256,
        ..ProptestConfig::default()
    }
}

fn spans_strategy() -> impl Strategy<Value = Vec<(usize, usize, bool)>> {
    prop::collection::vec((0usize..24, 1usize..6, any::<bool>()), 0..12)
}

fn covered(ranges: impl IntoIterator<Item = (usize, usize)>) -> BTreeSet<usize> {
    ranges
        .into_iter()
        .flat_map(|(start, end)| start..end)
        .collect()
}

/// Entity count, list member indexes (may point past the entities), and
/// checked entity/list indexes.
fn store_strategy() -> impl Strategy<Value = (usize, Vec<Vec<usize>>, Vec<usize>, Vec<usize>)> {
    (1usize..8).prop_flat_map(|entities| {
        (
            Just(entities),
            prop::collection::vec(prop::collection::vec(0..entities + 2, 0..5), 0..4),
            prop::collection::vec(0..entities, 0..4),
            prop::collection::vec(0usize..4, 0..3),
        )
    })
}

fn build_store(entity_count: usize, lists: &[Vec<usize>]) -> EntityStore {
    let mut store = EntityStore::new(StoreHandlers::new());
    let entities = (0..entity_count)
        .map(|index| {
            Entity::user(
                index.to_string(),
                UserProfile {
                    name: format!("User {index}"),
                    ..UserProfile::default()
                },
            )
        })
        .collect();
    store.replace_entities(EntityKind::User, entities).unwrap();
    store.replace_lists(
        lists
            .iter()
            .enumerate()
            .map(|(index, members)| {
                MailingList::new(
                    format!("list_{index}"),
                    "user",
                    "",
                    members.iter().map(|member| EntityId::from(member.to_string())).collect(),
                )
            })
            .collect(),
    );
    store
}

proptest! {
    #![proptest_config(pt_config())]

    #[test]
    fn merged_regions_are_sorted_disjoint_and_cover_the_spans(raw in spans_strategy()) {
        let spans = raw
            .iter()
            .map(|&(start, length, in_name)| MatchSpan {
                field: if in_name { SearchField::Name } else { SearchField::City },
                start,
                length,
            })
            .collect::<Vec<_>>();

        let regions = merge_spans(&spans, SearchField::Name);
        for pair in regions.windows(2) {
            prop_assert!(pair[0].end < pair[1].start);
        }
        for region in &regions {
            prop_assert!(region.start < region.end);
        }

        let expected = covered(
            spans
                .iter()
                .filter(|span| span.field == SearchField::Name)
                .map(|span| (span.start, span.end())),
        );
        let actual = covered(regions.iter().map(|region| (region.start, region.end)));
        prop_assert_eq!(expected, actual);
    }

    #[test]
    fn effective_selection_is_checked_or_member_of_checked_list(
        (entity_count, lists, checked_entities, checked_lists) in store_strategy()
    ) {
        let mut store = build_store(entity_count, &lists);
        for index in &checked_entities {
            store.check_entity(&index.to_string()).unwrap();
        }
        for index in checked_lists.iter().filter(|index| **index < lists.len()) {
            store.check_list(&format!("list_{index}")).unwrap();
        }

        let expected = (0..entity_count)
            .filter(|index| {
                checked_entities.contains(index)
                    || lists.iter().enumerate().any(|(list, members)| {
                        checked_lists.contains(&list) && members.contains(index)
                    })
            })
            .map(|index| index.to_string())
            .collect::<Vec<_>>();
        let actual = store
            .effective_selection()
            .into_iter()
            .map(|entity| entity.id.to_string())
            .collect::<Vec<_>>();
        prop_assert_eq!(expected, actual);
    }

    #[test]
    fn rebuilding_memberships_is_idempotent(
        (entity_count, lists, _, _) in store_strategy()
    ) {
        let mut store = build_store(entity_count, &lists);
        let before = store
            .entities()
            .iter()
            .map(|entity| entity.list_memberships.clone())
            .collect::<Vec<_>>();

        let again = store.lists().to_vec();
        store.replace_lists(again);
        let after = store
            .entities()
            .iter()
            .map(|entity| entity.list_memberships.clone())
            .collect::<Vec<_>>();
        prop_assert_eq!(&before, &after);

        for memberships in &after {
            let unique = memberships.iter().collect::<BTreeSet<_>>();
            prop_assert_eq!(unique.len(), memberships.len());
        }
    }
}
