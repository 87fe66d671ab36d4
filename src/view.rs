use serde::{Deserialize, Serialize};

use crate::formats::TabularRow;

/// The last value typed into each filter box.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub player: String,
}

impl FilterState {
    pub fn with_title(&self, title: &str) -> Self {
        Self {
            title: title.to_owned(),
            player: self.player.clone(),
        }
    }

    pub fn with_player(&self, player: &str) -> Self {
        Self {
            title: self.title.clone(),
            player: player.to_owned(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.player.is_empty()
    }

    pub fn matches(&self, row: &TabularRow) -> bool {
        contains_ignore_case(&row.title, &self.title)
            && contains_ignore_case(&row.player, &self.player)
    }
}

/// Rows matching both filters, lowest position first.
pub fn filter_rows(rows: &[TabularRow], state: &FilterState) -> Vec<TabularRow> {
    let mut out: Vec<TabularRow> = rows.iter().filter(|r| state.matches(r)).cloned().collect();
    out.sort_by_key(|r| r.position);
    out
}

pub fn filter_by_title(
    rows: &[TabularRow],
    state: &FilterState,
    title: &str,
) -> (FilterState, Vec<TabularRow>) {
    let state = state.with_title(title);
    let rows = filter_rows(rows, &state);
    (state, rows)
}

pub fn filter_by_player(
    rows: &[TabularRow],
    state: &FilterState,
    player: &str,
) -> (FilterState, Vec<TabularRow>) {
    let state = state.with_player(player);
    let rows = filter_rows(rows, &state);
    (state, rows)
}

pub fn season_rows(rows: &[TabularRow], season: i32) -> Vec<TabularRow> {
    rows.iter().filter(|r| r.season == season).cloned().collect()
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
