use serde_json::Value;

use super::models::{Ball, Batter, Bowler, LiveScore, LiveState};
use super::normalize::{as_f64, as_u32, classify_status, opt_string, score_tuple};
use super::projection::overs_limit;
use crate::cricapi::ProviderError;

/// Parse a live-score payload, either the provider envelope or the bare record.
pub fn parse_live_score(payload: &Value) -> Result<LiveScore, ProviderError> {
    let record = if payload["data"].is_object() {
        &payload["data"]
    } else {
        payload
    };

    let team_name = |i: usize| -> Result<String, ProviderError> {
        record["teamInfo"][i]["name"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| {
                ProviderError::UpstreamMalformed(format!("live score has no teamInfo[{}].name", i))
            })
    };

    let status = record["status"].as_str().unwrap_or_default().to_string();
    let state = classify_status(
        &status,
        record["matchStarted"].as_bool(),
        record["matchEnded"].as_bool(),
    );

    Ok(LiveScore {
        team1: team_name(0)?,
        team2: team_name(1)?,
        score1: score_tuple(&record["score"][0]),
        score2: score_tuple(&record["score"][1]),
        status,
        state,
        overs_limit: record["matchType"].as_str().and_then(overs_limit),
        live: parse_live_state(record),
    })
}

fn parse_live_state(record: &Value) -> LiveState {
    let list = |key: &str| record[key].as_array().cloned().unwrap_or_default();

    let batting = list("batting")
        .iter()
        .map(|b| Batter {
            id: opt_string(&b["id"]),
            name: b["name"].as_str().unwrap_or_default().to_string(),
            runs: as_u32(&b["r"]),
            balls: as_u32(&b["b"]),
            fours: as_u32(&b["fours"]),
            sixes: as_u32(&b["sixes"]),
            strike_rate: as_f64(&b["sr"]),
            on_strike: b["batting"].as_str() == Some("striker"),
        })
        .collect();

    let bowling = list("bowling")
        .iter()
        .map(|b| Bowler {
            id: opt_string(&b["id"]),
            name: b["name"].as_str().unwrap_or_default().to_string(),
            overs: as_f64(&b["o"]),
            maidens: as_u32(&b["m"]),
            runs: as_u32(&b["r"]),
            wickets: as_u32(&b["w"]),
            economy: as_f64(&b["eco"]),
        })
        .collect();

    let current_over = list("currentOver")
        .iter()
        .filter_map(|ball| match ball {
            Value::String(s) => Some(Ball::parse(s)),
            Value::Number(n) => Some(Ball::parse(&n.to_string())),
            _ => None,
        })
        .collect();

    LiveState {
        batting,
        bowling,
        current_over,
    }
}
