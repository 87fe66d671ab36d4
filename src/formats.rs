use serde::{Deserialize, Deserializer, Serialize};

/// One titled, time-offset segment of a source video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub title: String,
    #[serde(deserialize_with = "offset_as_string")]
    pub time: String,
}

impl std::fmt::Display for Chapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} @ {}s", self.title, self.time)
    }
}

/// A parsed leaderboard line, before it reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    pub season: i32,
    pub player: String,
    pub title: String,
    pub position: u32,
    pub link: String,
}

impl RawRecord {
    /// Exact match on all five fields. Correction hooks select records with this.
    pub fn same_fingerprint(&self, other: &RawRecord) -> bool {
        self.season == other.season
            && self.player == other.player
            && self.title == other.title
            && self.position == other.position
            && self.link == other.link
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabularRow {
    pub season: i32,
    pub player: String,
    pub title: String,
    pub display_title: String,
    pub position: u32,
    pub link: String,
    /// Stored BGG search anchor.
    pub bgg_search: String,
    /// Stored deep-link anchor.
    pub youtube_link: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyGame {
    pub title: String,
    pub position: u32,
    pub link: String,
}

fn offset_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Offset {
        Seconds(u64),
        Text(String),
    }

    Ok(match Offset::deserialize(deserializer)? {
        Offset::Seconds(secs) => secs.to_string(),
        Offset::Text(text) => text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> RawRecord {
        RawRecord {
            season: 2022,
            player: "Alex".to_owned(),
            title: "Welcome To...".to_owned(),
            position: 92,
            link: "https://www.youtube.com/watch?v=7Y8NuZxZCxM&t=3356".to_owned(),
        }
    }

    #[test]
    fn fingerprint_requires_every_field() {
        let base = record();
        assert!(base.same_fingerprint(&record()));

        let mut other = record();
        other.link.push('0');
        assert!(!base.same_fingerprint(&other));

        let mut other = record();
        other.position = 91;
        assert!(!base.same_fingerprint(&other));
    }

    #[test]
    fn chapter_time_accepts_numbers_and_strings() -> anyhow::Result<()> {
        let numeric: Chapter = serde_json::from_str(r#"{"title":"1 - Azul","time":2240}"#)?;
        assert_eq!(numeric.time, "2240");

        let text: Chapter = serde_json::from_str(r#"{"title":"1 - Azul","time":"65"}"#)?;
        assert_eq!(text.time, "65");
        Ok(())
    }
}
