use std::path::{Path, PathBuf};

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use rusqlite::{Connection, ErrorCode, OpenFlags, params};

use crate::formats::{RawRecord, TabularRow};

/// Bytes left as-is in a search query: alphanumerics, `_.-~` and `/`.
const QUERY_SAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~')
    .remove(b'/');

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS entry (
    year INTEGER NOT NULL,
    player TEXT NOT NULL,
    title TEXT NOT NULL,
    position INTEGER NOT NULL,
    url TEXT NOT NULL,
    bgg_search TEXT NOT NULL,
    youtube_link TEXT NOT NULL,
    PRIMARY KEY (year, player, position),
    CHECK (
        length(player) > 0 AND
        length(title) > 0 AND
        length(url) > 0 AND
        length(bgg_search) > 0 AND
        length(youtube_link) > 0
    )
)
"#;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("season {season}: entry {player} #{position} violates the table constraints: {message}")]
    IntegrityViolation {
        season: i32,
        player: String,
        position: u32,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub inserted: usize,
    pub skipped: usize,
}

/// The leaderboard table. One file, one table; rows are never updated.
pub struct Store {
    path: PathBuf,
    conn: Connection,
}

impl Store {
    pub fn exists(path: impl AsRef<Path>) -> bool {
        path.as_ref().is_file()
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open(&path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { path, conn })
    }

    /// Like [`Store::open`], but never creates the file.
    pub fn open_existing(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(&path, flags)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { path, conn })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Inserts every record, skipping ones whose (season, player, position)
    /// is already taken. Each insert commits on its own, so rows written
    /// before an integrity failure stay.
    pub fn import_batch(&self, records: &[RawRecord]) -> Result<ImportSummary, StoreError> {
        let mut summary = ImportSummary::default();
        let mut insert = self.conn.prepare(
            "INSERT INTO entry (year, player, title, position, url, bgg_search, youtube_link)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;

        for record in records {
            let result = insert.execute(params![
                record.season,
                record.player,
                record.title,
                record.position,
                record.link,
                bgg_search_link(&record.title),
                youtube_link(&record.link),
            ]);

            match result {
                Ok(_) => summary.inserted += 1,
                Err(rusqlite::Error::SqliteFailure(err, _))
                    if err.code == ErrorCode::ConstraintViolation
                        && err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
                {
                    tracing::debug!(
                        season = record.season,
                        player = %record.player,
                        position = record.position,
                        "entry already stored"
                    );
                    summary.skipped += 1;
                }
                Err(rusqlite::Error::SqliteFailure(err, message))
                    if err.code == ErrorCode::ConstraintViolation =>
                {
                    return Err(StoreError::IntegrityViolation {
                        season: record.season,
                        player: record.player.clone(),
                        position: record.position,
                        message: message.unwrap_or_else(|| err.to_string()),
                    });
                }
                Err(err) => return Err(err.into()),
            }
        }

        Ok(summary)
    }

    /// Every row, lowest position first.
    pub fn read_all(&self) -> Result<Vec<TabularRow>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT year, player, title, position, url, bgg_search, youtube_link
             FROM entry
             ORDER BY position ASC, year ASC, player ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            let title: String = row.get(2)?;
            let bgg_search: String = row.get(5)?;
            let youtube_link: String = row.get(6)?;
            Ok(TabularRow {
                season: row.get(0)?,
                player: row.get(1)?,
                display_title: display_title(&title, &bgg_search, &youtube_link),
                title,
                position: row.get(3)?,
                link: row.get(4)?,
                bgg_search,
                youtube_link,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn seasons(&self) -> Result<Vec<i32>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT year FROM entry ORDER BY year ASC")?;
        let seasons = stmt.query_map([], |row| row.get(0))?;
        Ok(seasons.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn count(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT count(*) FROM entry", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

pub fn bgg_search_url(title: &str) -> String {
    let query = utf8_percent_encode(title, QUERY_SAFE);
    format!("https://boardgamegeek.com/geeksearch.php?action=search&q={query}&objecttype=boardgame")
}

pub fn bgg_search_link(title: &str) -> String {
    format!("<a href='{}' target='_blank'>BGG</a>", bgg_search_url(title))
}

pub fn youtube_link(link: &str) -> String {
    format!("<a href='{link}' target='_blank'>YouTube</a>")
}

pub fn display_title(title: &str, bgg_search: &str, youtube_link: &str) -> String {
    format!("**{title}**   [ {bgg_search} ] [ {youtube_link} ]")
}
