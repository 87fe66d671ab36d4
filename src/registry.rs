use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::corrections::{Correction, CorrectionHook};
use crate::parse::{ParseError, TitleParser, TitleRule};

const DEFAULT_SEASONS_YAML: &str = include_str!("../seasons.yaml");

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("read season registry: {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parse season registry")]
    Yaml(#[from] serde_yaml::Error),
    #[error("season {0} is registered more than once")]
    DuplicateSeason(i32),
    #[error("season {0} is not registered")]
    UnknownSeason(i32),
    #[error("season {season}: correction record belongs to season {found}")]
    ForeignCorrection { season: i32, found: i32 },
}

/// Which chapters of a video hold leaderboard entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged, deny_unknown_fields)]
pub enum SourceSpec {
    /// A watch URL or id; the first and last chapter are skipped.
    Bare(String),
    Sliced {
        url: String,
        #[serde(default)]
        start: Option<i64>,
        #[serde(default)]
        end: Option<i64>,
    },
}

impl SourceSpec {
    pub fn video_ref(&self) -> &str {
        match self {
            SourceSpec::Bare(url) => url,
            SourceSpec::Sliced { url, .. } => url,
        }
    }

    /// `(start, end)` with Python slice semantics; `None` means open-ended.
    pub fn bounds(&self) -> (Option<i64>, Option<i64>) {
        match self {
            SourceSpec::Bare(_) => (Some(1), Some(-1)),
            SourceSpec::Sliced { start, end, .. } => (*start, *end),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeasonConfig {
    pub season: i32,
    pub rule: TitleRule,
    pub sources: Vec<SourceSpec>,
    /// Written as one-key maps (`- relabel: {...}`).
    #[serde(default, with = "serde_yaml::with::singleton_map_recursive")]
    pub corrections: Vec<Correction>,
}

impl SeasonConfig {
    pub fn parser(&self) -> Result<TitleParser, ParseError> {
        TitleParser::new(self.season, &self.rule)
    }

    pub fn hook(&self) -> CorrectionHook {
        CorrectionHook::new(self.corrections.clone())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RegistryFile {
    seasons: Vec<SeasonConfig>,
}

/// Season number → how to read and fix up that season.
#[derive(Debug, Clone)]
pub struct SeasonRegistry {
    seasons: Vec<SeasonConfig>,
}

impl SeasonRegistry {
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::from_yaml(DEFAULT_SEASONS_YAML)
    }

    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| RegistryError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&yaml)
    }

    /// Loads `path` when given, the built-in registry otherwise.
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self, RegistryError> {
        match path {
            Some(path) => Self::load(path),
            None => Self::builtin(),
        }
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, RegistryError> {
        let file: RegistryFile = serde_yaml::from_str(yaml)?;

        let mut seen = BTreeSet::new();
        for config in &file.seasons {
            if !seen.insert(config.season) {
                return Err(RegistryError::DuplicateSeason(config.season));
            }
            for correction in &config.corrections {
                let record = match correction {
                    Correction::Relabel { record, .. }
                    | Correction::Filter { record }
                    | Correction::Append { record } => record,
                };
                if record.season != config.season {
                    return Err(RegistryError::ForeignCorrection {
                        season: config.season,
                        found: record.season,
                    });
                }
            }
        }

        let mut seasons = file.seasons;
        seasons.sort_by_key(|config| config.season);
        Ok(Self { seasons })
    }

    pub fn get(&self, season: i32) -> Result<&SeasonConfig, RegistryError> {
        self.seasons
            .iter()
            .find(|config| config.season == season)
            .ok_or(RegistryError::UnknownSeason(season))
    }

    /// Seasons in ascending order.
    pub fn seasons(&self) -> impl Iterator<Item = &SeasonConfig> {
        self.seasons.iter()
    }

    pub fn latest(&self) -> Option<&SeasonConfig> {
        self.seasons.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_covers_three_seasons() -> anyhow::Result<()> {
        let registry = SeasonRegistry::builtin()?;
        let seasons: Vec<_> = registry.seasons().map(|c| c.season).collect();
        assert_eq!(seasons, vec![2020, 2021, 2022]);

        let s2020 = registry.get(2020)?;
        assert_eq!(s2020.sources.len(), 5);
        assert_eq!(s2020.sources[3].bounds(), (Some(2), Some(-1)));
        assert_eq!(s2020.sources[0].bounds(), (Some(1), Some(-1)));

        let s2021 = registry.get(2021)?;
        assert_eq!(
            s2021.rule,
            TitleRule::Countdown {
                player: "Alex".to_owned(),
                ceiling: 100
            }
        );

        let s2022 = registry.get(2022)?;
        assert_eq!(s2022.corrections.len(), 3);
        assert!(matches!(s2022.corrections[0], Correction::Relabel { .. }));
        assert!(matches!(s2022.corrections[2], Correction::Append { .. }));
        Ok(())
    }

    #[test]
    fn duplicate_seasons_are_rejected() {
        let yaml = r#"
seasons:
  - season: 2020
    rule: { kind: position_title, player: Alex }
    sources: []
  - season: 2020
    rule: { kind: position_title, player: Alex }
    sources: []
"#;
        let err = SeasonRegistry::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateSeason(2020)));
    }

    #[test]
    fn corrections_must_target_their_own_season() {
        let yaml = r#"
seasons:
  - season: 2022
    rule: { kind: position_title, player: Alex }
    sources: []
    corrections:
      - filter:
          record: { season: 2021, player: Alex, title: Azul, position: 1, link: "x" }
"#;
        let err = SeasonRegistry::from_yaml(yaml).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::ForeignCorrection {
                season: 2022,
                found: 2021
            }
        ));
    }

    #[test]
    fn unknown_season_lookup_fails() -> anyhow::Result<()> {
        let registry = SeasonRegistry::builtin()?;
        assert!(matches!(
            registry.get(1999),
            Err(RegistryError::UnknownSeason(1999))
        ));
        Ok(())
    }

    #[test]
    fn sliced_source_without_bounds_is_open_ended() -> anyhow::Result<()> {
        let yaml = r#"
seasons:
  - season: 2023
    rule: { kind: position_title, player: Alex }
    sources:
      - { url: "abc" }
"#;
        let registry = SeasonRegistry::from_yaml(yaml)?;
        let source = &registry.get(2023)?.sources[0];
        assert_eq!(source.video_ref(), "abc");
        assert_eq!(source.bounds(), (None, None));
        Ok(())
    }

    #[test]
    fn misspelled_slice_bound_is_rejected() {
        let yaml = r#"
seasons:
  - season: 2023
    rule: { kind: position_title, player: Alex }
    sources:
      - { url: "abc", strat: 4, end: -1 }
"#;
        let err = SeasonRegistry::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, RegistryError::Yaml(_)));
    }

    #[test]
    fn misspelled_corrections_key_is_rejected() {
        let yaml = r#"
seasons:
  - season: 2022
    rule: { kind: position_title, player: Alex }
    sources: []
    correction:
      - filter:
          record: { season: 2022, player: Alex, title: Azul, position: 1, link: "x" }
"#;
        let err = SeasonRegistry::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, RegistryError::Yaml(_)));
    }

    #[test]
    fn bare_and_sliced_sources_still_parse() -> anyhow::Result<()> {
        let yaml = r#"
seasons:
  - season: 2023
    rule: { kind: position_title, player: Alex }
    sources:
      - https://www.youtube.com/watch?v=abc
      - { url: "def", start: 2, end: -1 }
"#;
        let registry = SeasonRegistry::from_yaml(yaml)?;
        let sources = &registry.get(2023)?.sources;
        assert_eq!(sources[0].bounds(), (Some(1), Some(-1)));
        assert_eq!(sources[1].bounds(), (Some(2), Some(-1)));
        Ok(())
    }
}
