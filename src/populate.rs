use anyhow::Context as _;

use crate::chapters::{ChapterSource, HttpChapterSource};
use crate::cli::PopulateArgs;
use crate::registry::{SeasonConfig, SeasonRegistry};
use crate::store::{ImportSummary, Store};

pub fn run(args: &PopulateArgs) -> anyhow::Result<()> {
    if Store::exists(&args.db) {
        tracing::info!(db = %args.db.display(), "database already populated");
        return Ok(());
    }

    let registry = SeasonRegistry::load_or_builtin(args.source.seasons.as_deref())
        .context("load season registry")?;
    let source =
        HttpChapterSource::new(&args.source.chapters_api).context("build chapter client")?;
    let store = Store::open(&args.db)
        .with_context(|| format!("open database: {}", args.db.display()))?;
    tracing::info!(db = %store.path().display(), "database created");

    for config in registry.seasons() {
        let summary = import_season(&source, &store, config)
            .with_context(|| format!("import season {}", config.season))?;
        tracing::info!(
            season = config.season,
            inserted = summary.inserted,
            skipped = summary.skipped,
            "season imported"
        );
    }

    tracing::info!(rows = store.count()?, "database populated");
    Ok(())
}

pub fn import_season(
    source: &dyn ChapterSource,
    store: &Store,
    config: &SeasonConfig,
) -> anyhow::Result<ImportSummary> {
    let mut parser = config.parser().context("build title parser")?;
    let hook = config.hook();
    let batch = crate::pipeline::build(source, &config.sources, config.season, &mut parser, &hook)?;
    let summary = store.import_batch(&batch)?;
    Ok(summary)
}
