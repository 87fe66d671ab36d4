use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::chapters::chapter_link;
use crate::formats::{Chapter, RawRecord};

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("chapter title {title:?} does not match `{pattern}`")]
    Mismatch { title: String, pattern: String },
    #[error("rank position {0:?} is not a valid number")]
    Position(String),
    #[error("countdown from {ceiling} is exhausted")]
    CountdownExhausted { ceiling: u32 },
    #[error("invalid player set: {0}")]
    Players(String),
    #[error("invalid title pattern")]
    Pattern(#[from] regex::Error),
}

/// How a season formats its chapter titles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TitleRule {
    /// `"<position> - <title>"`, every chapter belongs to `player`.
    PositionTitle { player: String },
    /// `"<position> <player> - <title>"`, player drawn from `players`.
    PositionPlayerTitle { players: Vec<String> },
    /// The chapter title is the game title; positions count down from `ceiling`.
    Countdown { player: String, ceiling: u32 },
}

/// A [`TitleRule`] plus the state it needs while walking one season.
#[derive(Debug, Clone)]
pub struct TitleParser {
    season: i32,
    matcher: Matcher,
}

#[derive(Debug, Clone)]
enum Matcher {
    PositionTitle { regex: Regex, player: String },
    PositionPlayerTitle { regex: Regex },
    Countdown { player: String, ceiling: u32, next: u32 },
}

impl TitleParser {
    pub fn new(season: i32, rule: &TitleRule) -> Result<Self, ParseError> {
        let matcher = match rule {
            TitleRule::PositionTitle { player } => Matcher::PositionTitle {
                regex: compile(r"(\d+) - (.*)")?,
                player: player.clone(),
            },
            TitleRule::PositionPlayerTitle { players } => {
                if players.is_empty() || players.iter().any(|p| p.trim().is_empty()) {
                    return Err(ParseError::Players(format!("{players:?}")));
                }
                let names = players
                    .iter()
                    .map(|p| regex::escape(p))
                    .collect::<Vec<_>>()
                    .join("|");
                Matcher::PositionPlayerTitle {
                    regex: compile(&format!(r"(\d+) ({names}) ?- (.*)"))?,
                }
            }
            TitleRule::Countdown { player, ceiling } => Matcher::Countdown {
                player: player.clone(),
                ceiling: *ceiling,
                next: *ceiling,
            },
        };
        Ok(Self { season, matcher })
    }

    pub fn season(&self) -> i32 {
        self.season
    }

    /// Parses one chapter. Countdown parsers consume a position on every
    /// successful call, so chapters must be fed in order.
    pub fn parse(&mut self, chapter: &Chapter, video_id: &str) -> Result<RawRecord, ParseError> {
        let link = chapter_link(video_id, &chapter.time);
        let (position, player, title) = match &mut self.matcher {
            Matcher::PositionTitle { regex, player } => {
                let caps = captures(regex, &chapter.title)?;
                (parse_position(&caps[1])?, player.clone(), caps[2].to_owned())
            }
            Matcher::PositionPlayerTitle { regex } => {
                let caps = captures(regex, &chapter.title)?;
                (
                    parse_position(&caps[1])?,
                    caps[2].to_owned(),
                    caps[3].to_owned(),
                )
            }
            Matcher::Countdown {
                player,
                ceiling,
                next,
            } => {
                if *next == 0 {
                    return Err(ParseError::CountdownExhausted { ceiling: *ceiling });
                }
                let position = *next;
                *next -= 1;
                (position, player.clone(), chapter.title.clone())
            }
        };

        Ok(RawRecord {
            season: self.season,
            player,
            title,
            position,
            link,
        })
    }
}

fn compile(pattern: &str) -> Result<Regex, ParseError> {
    Ok(Regex::new(pattern)?)
}

fn captures<'t>(regex: &Regex, title: &'t str) -> Result<regex::Captures<'t>, ParseError> {
    regex.captures(title).ok_or_else(|| ParseError::Mismatch {
        title: title.to_owned(),
        pattern: regex.as_str().to_owned(),
    })
}

fn parse_position(digits: &str) -> Result<u32, ParseError> {
    digits
        .parse()
        .map_err(|_| ParseError::Position(digits.to_owned()))
}
