use serde_json::Value;
use tracing::warn;

use super::models::{Match, MatchState, ScoreTuple, TeamSummary, DEFAULT_TEAM_LOGO};
use crate::cricapi::ProviderError;

/// Normalize a provider `currentMatches` envelope into listing matches.
///
/// Records that cannot be normalized are skipped; a payload without a `data`
/// array is rejected as a whole.
pub fn normalize_matches(payload: &Value) -> Result<Vec<Match>, ProviderError> {
    let records = payload["data"].as_array().ok_or_else(|| {
        ProviderError::UpstreamMalformed("current matches payload has no `data` array".into())
    })?;

    let matches = records
        .iter()
        .filter_map(|raw| match normalize_match(raw) {
            Ok(m) => Some(m),
            Err(e) => {
                warn!("Skipping match record: {}", e);
                None
            }
        })
        .collect();

    Ok(matches)
}

/// Map one raw provider match record to a [`Match`].
pub fn normalize_match(raw: &Value) -> Result<Match, ProviderError> {
    let id = opt_string(&raw["id"])
        .ok_or_else(|| ProviderError::UpstreamMalformed("match record has no id".into()))?;

    let team_info = raw["teamInfo"].as_array().map(Vec::as_slice).unwrap_or(&[]);
    if team_info.len() < 2 {
        return Err(ProviderError::UpstreamMalformed(format!(
            "match {} has {} teamInfo entries, expected 2",
            id,
            team_info.len()
        )));
    }

    let status = raw["status"].as_str().unwrap_or_default().to_string();
    let state = classify_status(&status, raw["matchStarted"].as_bool(), raw["matchEnded"].as_bool());

    Ok(Match {
        series: opt_string(&raw["series_id"]),
        venue: opt_string(&raw["venue"]),
        date: opt_string(&raw["date"]),
        match_type: opt_string(&raw["matchType"]),
        team1: team_summary(&id, &team_info[0], &raw["score"][0])?,
        team2: team_summary(&id, &team_info[1], &raw["score"][1])?,
        id,
        status,
        state,
    })
}

fn team_summary(id: &str, info: &Value, score: &Value) -> Result<TeamSummary, ProviderError> {
    let name = info["name"]
        .as_str()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ProviderError::UpstreamMalformed(format!("match {} has a team without a name", id)))?
        .to_string();
    let logo = info["img"]
        .as_str()
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_TEAM_LOGO)
        .to_string();
    Ok(TeamSummary {
        name,
        logo,
        score: score_tuple(score),
    })
}

/// Read a provider score entry; a missing entry means the side has not batted.
pub(crate) fn score_tuple(raw: &Value) -> ScoreTuple {
    if !raw.is_object() {
        return ScoreTuple::zero();
    }
    ScoreTuple {
        r: as_u32(&raw["r"]),
        w: as_u32(&raw["w"]),
        o: as_f64(&raw["o"]),
        inning: opt_string(&raw["inning"]),
    }
}

/// Assign a lifecycle stage from the free-text status.
///
/// Text wins over the provider's started/ended flags, which only settle
/// statuses the text does not recognize.
pub fn classify_status(status: &str, started: Option<bool>, ended: Option<bool>) -> MatchState {
    let s = status.to_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|n| s.contains(n));

    if has(&["abandoned", "no result", "cancelled"]) {
        MatchState::Abandoned
    } else if has(&["won by", "completed", "finished"]) {
        MatchState::Completed
    } else if has(&["innings break"]) {
        MatchState::InningsBreak
    } else if has(&["live"]) {
        MatchState::Live
    } else if has(&["upcoming", "scheduled"]) {
        MatchState::Upcoming
    } else {
        match (started, ended) {
            (_, Some(true)) => MatchState::Completed,
            (Some(true), _) => MatchState::Live,
            (Some(false), _) => MatchState::Upcoming,
            _ => MatchState::Unknown,
        }
    }
}

pub(crate) fn opt_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub(crate) fn as_u32(v: &Value) -> u32 {
    v.as_u64()
        .or_else(|| v.as_f64().map(|f| f.max(0.0) as u64))
        .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
        .map(|n| n.min(u32::MAX as u64) as u32)
        .unwrap_or(0)
}

pub(crate) fn as_f64(v: &Value) -> f64 {
    v.as_f64()
        .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
        .unwrap_or(0.0)
}
