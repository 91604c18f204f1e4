use anyhow::{anyhow, Context, Result};
use log::info;

use chairmail_core::search::engine::tokenize;
use chairmail_core::search::highlight::{mark_regions, merge_spans};
use chairmail_core::selection::projector::{recipient_lines, RecipientCount};
use chairmail_core::{
    search, ComposeConfig, ComposeSession, FileSource, MatchSpan, RecipientView, RecipientsArea,
    Searchable,
};

use crate::cli::{Cli, MembersArgs, RecipientsArgs, SearchArgs};

const MARK_OPEN: &str = "[";
const MARK_CLOSE: &str = "]";

pub fn run_search(cli: &Cli, config: ComposeConfig, args: &SearchArgs) -> Result<()> {
    let session = load_session(cli, config, RecipientsArea::new())?;
    let store = session.store();

    let lines = if args.in_lists {
        search_lines(&args.query, store.lists())
    } else {
        search_lines(&args.query, store.entities())
    };
    for line in &lines {
        println!("{line}");
    }
    if lines.is_empty() {
        println!("Nothing found");
    }
    info!("event=cli_search module=cli status=ok hits={}", lines.len());
    Ok(())
}

pub fn run_recipients(cli: &Cli, config: ComposeConfig, args: &RecipientsArgs) -> Result<()> {
    let mut session = load_session(cli, config, RecipientsArea::new())?;
    for id in &args.check_entity {
        session
            .check_entity(id)
            .with_context(|| format!("cannot check entity {id}"))?;
    }
    for id in &args.check_list {
        session
            .check_list(id)
            .with_context(|| format!("cannot check list {id}"))?;
    }

    let mut count = RecipientCount::default();
    count.refresh(session.store());
    for line in recipient_lines(session.store()) {
        let via = if line.via_list { " (via list)" } else { "" };
        println!("{}\t{}{}", line.id, line.label, via);
    }
    println!("{}", count.label());
    Ok(())
}

pub fn run_members(cli: &Cli, config: ComposeConfig, args: &MembersArgs) -> Result<()> {
    let session = load_session(cli, config, RecipientsArea::new())?;
    let store = session.store();
    let list = store
        .list(&args.list)
        .ok_or_else(|| anyhow!("mailing list not found: {}", args.list))?;

    println!("{} ({} members)", list.display_label, list.len());
    for entity in store.members_of(&list.id) {
        println!("{}\t{}", entity.id, entity.display_label());
    }
    Ok(())
}

pub fn run_version() {
    println!("chairmail {}", chairmail_core::core_version());
}

fn load_session(cli: &Cli, config: ComposeConfig, area: RecipientsArea) -> Result<ComposeSession> {
    let objects = cli
        .objects
        .as_ref()
        .ok_or_else(|| anyhow!("--objects is required for this command"))?;
    let lists = cli
        .lists
        .as_ref()
        .ok_or_else(|| anyhow!("--lists is required for this command"))?;

    let mut session = ComposeSession::new(config, area);
    session
        .load(&FileSource::new(objects, lists))
        .context("failed to load recipients")?;
    Ok(session)
}

/// One line per hit with every field's matches marked. A blank query lists
/// every item unmarked.
fn search_lines<T: Searchable>(query: &str, items: &[T]) -> Vec<String> {
    if tokenize(query).is_empty() {
        return items.iter().map(|item| search_line(item, &[])).collect();
    }
    search(query, items)
        .iter()
        .map(|hit| search_line(hit.item, &hit.matches))
        .collect()
}

fn search_line<T: Searchable>(item: &T, matches: &[MatchSpan]) -> String {
    let fields = item
        .search_fields()
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(field, value)| {
            let regions = merge_spans(matches, field);
            format!("{field}={}", mark_regions(value, &regions, MARK_OPEN, MARK_CLOSE))
        })
        .collect::<Vec<_>>();
    format!("{}\t{}", item.search_id(), fields.join("  "))
}
