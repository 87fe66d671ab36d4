use std::io::Write as _;

use anyhow::Context as _;

use crate::chapters::HttpChapterSource;
use crate::cli::ChaptersArgs;
use crate::registry::{SeasonRegistry, SourceSpec};

pub fn run(args: &ChaptersArgs) -> anyhow::Result<()> {
    let registry = SeasonRegistry::load_or_builtin(args.source.seasons.as_deref())
        .context("load season registry")?;
    let config = match args.season {
        Some(season) => registry.get(season)?,
        None => registry
            .latest()
            .ok_or_else(|| anyhow::anyhow!("season registry is empty"))?,
    };

    let spec = if args.all {
        SourceSpec::Sliced {
            url: args.video.clone(),
            start: None,
            end: None,
        }
    } else {
        SourceSpec::Bare(args.video.clone())
    };

    let source =
        HttpChapterSource::new(&args.source.chapters_api).context("build chapter client")?;
    let mut parser = config.parser().context("build title parser")?;
    let records = crate::pipeline::scan(&source, &spec, &mut parser)
        .with_context(|| format!("read chapters of {}", args.video))?;
    tracing::info!(season = config.season, records = records.len(), "chapters parsed");

    let mut out = std::io::stdout().lock();
    for record in records {
        serde_json::to_writer(&mut out, &record).context("serialize record")?;
        out.write_all(b"\n").context("write record newline")?;
    }
    out.flush().context("flush stdout")?;
    Ok(())
}
