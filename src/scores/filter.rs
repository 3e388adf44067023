use clap::ValueEnum;
use serde::Deserialize;

use super::models::{Match, MatchState};

/// Listing tabs offered to the viewer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterTag {
    #[default]
    All,
    Live,
    Upcoming,
    Completed,
}

impl FilterTag {
    pub fn as_str(self) -> &'static str {
        match self {
            FilterTag::All => "all",
            FilterTag::Live => "live",
            FilterTag::Upcoming => "upcoming",
            FilterTag::Completed => "completed",
        }
    }

    pub fn admits(self, state: MatchState) -> bool {
        match self {
            FilterTag::All => true,
            FilterTag::Live => matches!(state, MatchState::Live | MatchState::InningsBreak),
            FilterTag::Upcoming => state == MatchState::Upcoming,
            FilterTag::Completed => state == MatchState::Completed,
        }
    }
}

/// Select the matches shown under `tag`, keeping listing order.
pub fn filter_matches(matches: &[Match], tag: FilterTag) -> Vec<Match> {
    matches
        .iter()
        .filter(|m| tag.admits(m.state))
        .cloned()
        .collect()
}
