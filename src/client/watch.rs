use anyhow::Result;
use serde_json::Value;
use std::fmt::Write as _;
use tokio::sync::watch;
use tracing::info;

use super::fetch::ProxyClient;
use super::refresh::{mount, MountedView, ViewSpec, ViewState};
use crate::config::Config;
use crate::scores::{filter_matches, FilterTag, LiveScore, Match};

/// Follow the proxy until Ctrl-C, printing each view whenever it changes.
pub async fn run(config: &Config, filter: FilterTag, match_id: Option<String>) -> Result<()> {
    let client = ProxyClient::new(&config.api_base_url, config.upstream_timeout())?;
    info!("Watching {} (filter={:?})", config.api_base_url, filter);

    let list_view = {
        let client = client.clone();
        mount(ViewSpec::match_list(config.match_list_period()), move || {
            let client = client.clone();
            async move { client.get_matches().await }
        })
    };
    let mut list_rx = list_view.subscribe();

    let detail = match_id.map(|id| DetailViews::mount(&client, config, id));
    let mut info_rx = detail.as_ref().map(|d| d.info.subscribe());
    let mut live_rx = detail.as_ref().map(|d| d.live.subscribe());
    let mut card_rx = detail.as_ref().map(|d| d.scorecard.subscribe());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, unmounting views");
                break;
            }
            changed = list_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                println!("{}", render_match_list(&list_rx.borrow_and_update(), filter));
            }
            Some(rx) = next_change(&mut info_rx) => {
                println!("{}", render_match_info(&rx.borrow_and_update()));
            }
            Some(rx) = next_change(&mut live_rx) => {
                println!("{}", render_live_score(&rx.borrow_and_update()));
            }
            Some(rx) = next_change(&mut card_rx) => {
                println!("{}", render_scorecard(&rx.borrow_and_update()));
            }
        }
    }

    list_view.unmount();
    if let Some(detail) = &detail {
        detail.unmount();
    }
    Ok(())
}

/// Views of the match detail screen.
struct DetailViews {
    info: MountedView<Value>,
    live: MountedView<LiveScore>,
    scorecard: MountedView<Value>,
}

impl DetailViews {
    fn mount(client: &ProxyClient, config: &Config, id: String) -> Self {
        let info = {
            let (client, id) = (client.clone(), id.clone());
            mount(ViewSpec::match_info(), move || {
                let (client, id) = (client.clone(), id.clone());
                async move { client.get_match_by_id(&id).await }
            })
        };
        let live = {
            let (client, id) = (client.clone(), id.clone());
            mount(ViewSpec::live_score(config.live_score_period()), move || {
                let (client, id) = (client.clone(), id.clone());
                async move { client.get_live_score(&id).await }
            })
        };
        let scorecard = {
            let client = client.clone();
            mount(ViewSpec::scorecard(), move || {
                let (client, id) = (client.clone(), id.clone());
                async move { client.get_scorecard(&id).await }
            })
        };
        DetailViews {
            info,
            live,
            scorecard,
        }
    }

    fn unmount(&self) {
        self.info.unmount();
        self.live.unmount();
        self.scorecard.unmount();
    }
}

/// Resolve once the receiver sees a new value; pend forever without one.
async fn next_change<T>(
    rx: &mut Option<watch::Receiver<T>>,
) -> Option<&mut watch::Receiver<T>> {
    match rx {
        Some(rx) => match rx.changed().await {
            Ok(()) => Some(rx),
            Err(_) => std::future::pending().await,
        },
        None => std::future::pending().await,
    }
}

pub fn render_match_list(state: &ViewState<Vec<Match>>, filter: FilterTag) -> String {
    let mut out = String::new();
    let matches = match (&state.data, &state.error) {
        (None, Some(error)) => return error.clone(),
        (None, None) => return "Loading matches...".to_string(),
        (Some(matches), error) => {
            // the last good listing stays below the error
            if let Some(error) = error {
                let _ = writeln!(out, "{}", error);
            }
            matches
        }
    };
    if matches.is_empty() {
        out.push_str("No matches found");
        return out;
    }

    if state.loading {
        out.push_str("Refreshing matches...\n");
    }
    let shown = filter_matches(matches, filter);
    if shown.is_empty() {
        match filter {
            FilterTag::All => out.push_str("No matches found"),
            other => {
                let _ = write!(out, "No {} matches found", other.as_str());
            }
        }
        return out;
    }
    for m in shown {
        let _ = writeln!(out, "{}  {}", m.id, m);
    }
    out.trim_end().to_string()
}

pub fn render_match_info(state: &ViewState<Value>) -> String {
    let payload = match (&state.data, &state.error) {
        (_, Some(error)) => return error.clone(),
        (None, None) => return "Loading match information...".to_string(),
        (Some(payload), None) => payload,
    };
    let info = if payload["data"].is_object() {
        &payload["data"]
    } else {
        payload
    };
    if !info.is_object() {
        return "No match information available".to_string();
    }
    let field = |key: &str| info[key].as_str().unwrap_or("-").to_string();
    format!(
        "{}\n  Series: {}\n  Venue: {}\n  Date: {}\n  Match Type: {}\n  Status: {}",
        field("name"),
        field("series"),
        field("venue"),
        field("date"),
        field("matchType"),
        field("status")
    )
}

pub fn render_scorecard(state: &ViewState<Value>) -> String {
    match (&state.data, &state.error) {
        (_, Some(error)) => error.clone(),
        (None, None) => "Loading scorecard...".to_string(),
        (Some(card), None) => {
            serde_json::to_string_pretty(card).unwrap_or_else(|_| card.to_string())
        }
    }
}

pub fn render_live_score(state: &ViewState<LiveScore>) -> String {
    match (&state.data, &state.error) {
        (_, Some(error)) => error.clone(),
        (None, None) => "Loading live score...".to_string(),
        (Some(live), None) => live.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scores::normalize::normalize_match;
    use serde_json::json;

    fn state<T>(data: Option<T>, loading: bool, error: Option<&str>) -> ViewState<T> {
        ViewState {
            data,
            loading,
            error: error.map(str::to_string),
            updated_at: None,
        }
    }

    fn listing() -> Vec<Match> {
        vec![normalize_match(&json!({
            "id": "m1",
            "teamInfo": [{"name": "A"}, {"name": "B"}],
            "score": [{"r": 120, "w": 3, "o": 15}],
            "status": "Live"
        }))
        .unwrap()]
    }

    #[test]
    fn test_match_list_states() {
        assert_eq!(
            render_match_list(&state(None, true, None), FilterTag::All),
            "Loading matches..."
        );
        assert_eq!(
            render_match_list(&state(None, false, Some("Failed to load matches")), FilterTag::All),
            "Failed to load matches"
        );
        assert_eq!(
            render_match_list(&state(Some(vec![]), false, None), FilterTag::All),
            "No matches found"
        );
    }

    #[test]
    fn test_match_list_keeps_data_under_error() {
        let out = render_match_list(
            &state(Some(listing()), false, Some("Failed to load matches")),
            FilterTag::All,
        );
        assert_eq!(out, "Failed to load matches\nm1  A 120/3 (15) vs B 0/0 (0) [Live]");
    }

    #[test]
    fn test_match_list_rows_and_filter() {
        let out = render_match_list(&state(Some(listing()), false, None), FilterTag::Live);
        assert_eq!(out, "m1  A 120/3 (15) vs B 0/0 (0) [Live]");

        let out = render_match_list(&state(Some(listing()), false, None), FilterTag::Completed);
        assert_eq!(out, "No completed matches found");

        let out = render_match_list(&state(Some(listing()), true, None), FilterTag::All);
        assert!(out.starts_with("Refreshing matches..."));
    }

    #[test]
    fn test_match_info_render() {
        let payload = json!({"data": {"name": "A vs B", "venue": "MCG", "status": "Live"}});
        let out = render_match_info(&state(Some(payload), false, None));
        assert!(out.starts_with("A vs B"));
        assert!(out.contains("Venue: MCG"));
        assert!(out.contains("Series: -"));
        assert_eq!(
            render_match_info(&state(None, false, Some("Failed to load match information"))),
            "Failed to load match information"
        );
    }

    #[test]
    fn test_scorecard_render() {
        let out = render_scorecard(&state(Some(json!({"data": {"innings": []}})), false, None));
        assert!(out.contains("\"innings\""));
        assert_eq!(
            render_scorecard(&state(None, false, Some("Failed to load scorecard"))),
            "Failed to load scorecard"
        );
    }

    #[test]
    fn test_live_score_render_error() {
        assert_eq!(
            render_live_score(&state(None, false, Some("Failed to load live score"))),
            "Failed to load live score"
        );
        assert_eq!(render_live_score(&state(None, true, None)), "Loading live score...");
    }
}
