use crate::chapters::{ChapterSource, SourceError, video_id};
use crate::corrections::CorrectionHook;
use crate::formats::{Chapter, RawRecord};
use crate::parse::{ParseError, TitleParser};
use crate::registry::SourceSpec;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("season {season}: chapters unavailable for {video}")]
    SourceUnavailable {
        season: i32,
        video: String,
        #[source]
        source: SourceError,
    },
    #[error("season {season}: cannot parse chapter {chapter} of {video}")]
    ParseMismatch {
        season: i32,
        video: String,
        chapter: Chapter,
        #[source]
        source: ParseError,
    },
}

/// Reads every source of one season, parses the chapters in order and runs
/// the correction hook over the whole batch.
///
/// Nothing is returned unless every chapter parsed; the hook only ever sees a
/// complete season.
pub fn build(
    source: &dyn ChapterSource,
    sources: &[SourceSpec],
    season: i32,
    parser: &mut TitleParser,
    hook: &CorrectionHook,
) -> Result<Vec<RawRecord>, ImportError> {
    let mut batch = Vec::new();

    for spec in sources {
        let video = spec.video_ref();
        let unavailable = |source| ImportError::SourceUnavailable {
            season,
            video: video.to_owned(),
            source,
        };

        let id = video_id(video).map_err(unavailable)?;
        let chapters = source.chapters(&id).map_err(unavailable)?;
        let (start, end) = spec.bounds();
        let selected = slice(&chapters, start, end);
        tracing::debug!(
            season,
            video = %video,
            total = chapters.len(),
            selected = selected.len(),
            "chapters fetched"
        );

        for chapter in selected {
            let record =
                parser
                    .parse(chapter, &id)
                    .map_err(|source| ImportError::ParseMismatch {
                        season,
                        video: video.to_owned(),
                        chapter: chapter.clone(),
                        source,
                    })?;
            batch.push(record);
        }
    }

    let parsed = batch.len();
    let corrected = hook.apply(batch);
    tracing::debug!(season, parsed, corrected = corrected.len(), "season built");
    Ok(corrected)
}

/// Parses whatever chapters match and skips the rest. For looking at a video,
/// never for importing it.
pub fn scan(
    source: &dyn ChapterSource,
    spec: &SourceSpec,
    parser: &mut TitleParser,
) -> Result<Vec<RawRecord>, SourceError> {
    let id = video_id(spec.video_ref())?;
    let chapters = source.chapters(&id)?;
    let (start, end) = spec.bounds();

    let mut records = Vec::new();
    for chapter in slice(&chapters, start, end) {
        match parser.parse(chapter, &id) {
            Ok(record) => records.push(record),
            Err(err) => {
                tracing::warn!(video = %id, chapter = %chapter, error = %err, "skipping chapter");
            }
        }
    }
    Ok(records)
}

/// `items[start:end]` with negative indices counted from the end and
/// out-of-range bounds clamped.
pub fn slice<T>(items: &[T], start: Option<i64>, end: Option<i64>) -> &[T] {
    let len = items.len() as i64;
    let resolve = |index: i64| {
        let index = if index < 0 { index + len } else { index };
        index.clamp(0, len) as usize
    };

    let start = start.map(resolve).unwrap_or(0);
    let end = end.map(resolve).unwrap_or(items.len());
    if start >= end {
        return &[];
    }
    &items[start..end]
}
