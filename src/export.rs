use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write as _};

use anyhow::Context as _;

use crate::cli::ExportArgs;
use crate::formats::{LegacyGame, TabularRow};
use crate::store::Store;

/// season → player → games, each list ordered by position.
pub type LegacyTree = BTreeMap<i32, BTreeMap<String, Vec<LegacyGame>>>;

pub fn run(args: &ExportArgs) -> anyhow::Result<()> {
    if !Store::exists(&args.db) {
        anyhow::bail!("database not found: {}", args.db.display());
    }
    if args.out.exists() && !args.force {
        anyhow::bail!("export output already exists: {}", args.out.display());
    }
    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create export output dir: {}", parent.display()))?;
    }

    let store = Store::open_existing(&args.db)
        .with_context(|| format!("open database: {}", args.db.display()))?;
    let tree = legacy_tree(&store.read_all().context("read entries")?);

    let mut options = OpenOptions::new();
    options.write(true);
    if args.force {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }
    let file = options
        .open(&args.out)
        .with_context(|| format!("open output: {}", args.out.display()))?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut out, &tree).context("serialize export")?;
    out.write_all(b"\n").context("write export newline")?;
    out.flush()
        .with_context(|| format!("flush output: {}", args.out.display()))?;

    tracing::info!(out = %args.out.display(), seasons = tree.len(), "export written");
    Ok(())
}

pub fn legacy_tree(rows: &[TabularRow]) -> LegacyTree {
    let mut tree = LegacyTree::new();
    for row in rows {
        tree.entry(row.season)
            .or_default()
            .entry(row.player.clone())
            .or_default()
            .push(LegacyGame {
                title: row.title.clone(),
                position: row.position,
                link: row.link.clone(),
            });
    }
    for players in tree.values_mut() {
        for games in players.values_mut() {
            games.sort_by_key(|game| game.position);
        }
    }
    tree
}
