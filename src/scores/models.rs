use serde::{Deserialize, Serialize};
use std::fmt;

use super::projection::{projections, Projection};

/// Logo served for teams the provider has no image for
pub const DEFAULT_TEAM_LOGO: &str = "/assets/images/team-logos/default.png";

/// Runs / wickets / overs for one side. All zero until the side has batted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreTuple {
    #[serde(default)]
    pub r: u32,
    #[serde(default)]
    pub w: u32,
    /// Overs bowled, cricket notation (15.3 = 15 overs and 3 balls)
    #[serde(default)]
    pub o: f64,
    /// Provider innings label, e.g. "India Inning 1"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inning: Option<String>,
}

impl ScoreTuple {
    pub fn zero() -> Self {
        Self::default()
    }
}

impl fmt::Display for ScoreTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} ({})", self.r, self.w, self.o)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamSummary {
    pub name: String,
    pub logo: String,
    pub score: ScoreTuple,
}

/// Lifecycle stage assigned during normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchState {
    Upcoming,
    Live,
    InningsBreak,
    Completed,
    Abandoned,
    Unknown,
}

/// A normalized match as served by `GET /api/matches/current`.
///
/// Serializes to the listing wire shape (`teams` / `score` objects keyed by
/// `team1` / `team2`) rather than to its field layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "MatchWire", from = "MatchWire")]
pub struct Match {
    pub id: String,
    pub series: Option<String>,
    pub venue: Option<String>,
    pub date: Option<String>,
    pub match_type: Option<String>,
    /// Free-text provider status, e.g. "India won by 5 wickets"
    pub status: String,
    pub state: MatchState,
    pub team1: TeamSummary,
    pub team2: TeamSummary,
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} vs {} {} [{}]",
            self.team1.name, self.team1.score, self.team2.name, self.team2.score, self.status
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MatchWire {
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    series: Option<String>,
    teams: TeamsWire,
    score: ScoresWire,
    #[serde(default)]
    status: String,
    #[serde(default = "unknown_state")]
    state: MatchState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    venue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    match_type: Option<String>,
}

fn unknown_state() -> MatchState {
    MatchState::Unknown
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TeamsWire {
    team1: String,
    team2: String,
    team1_logo: String,
    team2_logo: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScoresWire {
    #[serde(default)]
    team1: ScoreTuple,
    #[serde(default)]
    team2: ScoreTuple,
}

impl From<Match> for MatchWire {
    fn from(m: Match) -> Self {
        MatchWire {
            id: m.id,
            series: m.series,
            teams: TeamsWire {
                team1: m.team1.name,
                team2: m.team2.name,
                team1_logo: m.team1.logo,
                team2_logo: m.team2.logo,
            },
            score: ScoresWire {
                team1: m.team1.score,
                team2: m.team2.score,
            },
            status: m.status,
            state: m.state,
            venue: m.venue,
            date: m.date,
            match_type: m.match_type,
        }
    }
}

impl From<MatchWire> for Match {
    fn from(w: MatchWire) -> Self {
        Match {
            id: w.id,
            series: w.series,
            venue: w.venue,
            date: w.date,
            match_type: w.match_type,
            status: w.status,
            state: w.state,
            team1: TeamSummary {
                name: w.teams.team1,
                logo: w.teams.team1_logo,
                score: w.score.team1,
            },
            team2: TeamSummary {
                name: w.teams.team2,
                logo: w.teams.team2_logo,
                score: w.score.team2,
            },
        }
    }
}

/// One symbol of the over in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ball {
    Runs(u8),
    Wicket,
    Wide,
    NoBall,
    Bye,
    LegBye,
    Other(String),
}

impl Ball {
    pub fn parse(symbol: &str) -> Ball {
        let s = symbol.trim();
        match s.to_lowercase().as_str() {
            "w" => Ball::Wicket,
            "wd" | "wide" => Ball::Wide,
            "nb" | "noball" => Ball::NoBall,
            "b" | "bye" => Ball::Bye,
            "lb" | "legbye" => Ball::LegBye,
            other => match other.parse::<u8>() {
                Ok(runs) if runs <= 6 => Ball::Runs(runs),
                _ => Ball::Other(s.to_string()),
            },
        }
    }
}

impl fmt::Display for Ball {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ball::Runs(r) => write!(f, "{}", r),
            Ball::Wicket => f.write_str("W"),
            Ball::Wide => f.write_str("wd"),
            Ball::NoBall => f.write_str("nb"),
            Ball::Bye => f.write_str("b"),
            Ball::LegBye => f.write_str("lb"),
            Ball::Other(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Batter {
    pub id: Option<String>,
    pub name: String,
    pub runs: u32,
    pub balls: u32,
    pub fours: u32,
    pub sixes: u32,
    pub strike_rate: f64,
    pub on_strike: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bowler {
    pub id: Option<String>,
    pub name: String,
    pub overs: f64,
    pub maidens: u32,
    pub runs: u32,
    pub wickets: u32,
    pub economy: f64,
}

/// Who is at the crease and how the current over is going.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LiveState {
    pub batting: Vec<Batter>,
    pub bowling: Vec<Bowler>,
    pub current_over: Vec<Ball>,
}

/// Parsed `GET /api/matches/:id/live` payload.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveScore {
    pub team1: String,
    pub team2: String,
    pub score1: ScoreTuple,
    pub score2: ScoreTuple,
    pub status: String,
    pub state: MatchState,
    /// Innings length for limited-overs matches, `None` for tests or unknown formats
    pub overs_limit: Option<u32>,
    pub live: LiveState,
}

impl LiveScore {
    /// Projection for the side currently batting, when the format has an overs limit.
    pub fn projection(&self) -> Option<Projection> {
        let overs_total = self.overs_limit?;
        if !matches!(self.state, MatchState::Live) {
            return None;
        }
        let batting = if self.score2.o > 0.0 {
            &self.score2
        } else {
            &self.score1
        };
        Some(projections(batting, overs_total))
    }
}

impl fmt::Display for LiveScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} {} | {} {} | {}",
            self.team1, self.score1, self.team2, self.score2, self.status
        )?;
        if let Some(projection) = self.projection() {
            writeln!(f, "  {}", projection)?;
        }
        for b in &self.live.batting {
            writeln!(
                f,
                "  {}{} {} ({}) {}x4 {}x6 SR {:.2}",
                b.name,
                if b.on_strike { "*" } else { "" },
                b.runs,
                b.balls,
                b.fours,
                b.sixes,
                b.strike_rate
            )?;
        }
        for b in &self.live.bowling {
            writeln!(
                f,
                "  {} {}-{}-{}-{} econ {:.2}",
                b.name, b.overs, b.maidens, b.runs, b.wickets, b.economy
            )?;
        }
        let over: Vec<String> = self.live.current_over.iter().map(|b| b.to_string()).collect();
        write!(f, "  this over: {}", over.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_match() -> Match {
        Match {
            id: "m1".into(),
            series: Some("s1".into()),
            venue: None,
            date: Some("2024-01-20".into()),
            match_type: Some("t20".into()),
            status: "Live".into(),
            state: MatchState::Live,
            team1: TeamSummary {
                name: "A".into(),
                logo: DEFAULT_TEAM_LOGO.into(),
                score: ScoreTuple { r: 120, w: 3, o: 15.0, inning: None },
            },
            team2: TeamSummary {
                name: "B".into(),
                logo: "https://img/b.png".into(),
                score: ScoreTuple::zero(),
            },
        }
    }

    #[test]
    fn test_match_wire_shape() {
        let v = serde_json::to_value(sample_match()).unwrap();
        assert_eq!(v["teams"]["team1"], "A");
        assert_eq!(v["teams"]["team1Logo"], DEFAULT_TEAM_LOGO);
        assert_eq!(v["teams"]["team2Logo"], "https://img/b.png");
        assert_eq!(v["score"]["team1"]["r"], 120);
        assert_eq!(v["score"]["team2"]["w"], 0);
        assert_eq!(v["matchType"], "t20");
        assert_eq!(v["state"], "live");
        assert!(v.get("venue").is_none());
        assert!(v["score"]["team1"].get("inning").is_none());
    }

    #[test]
    fn test_match_wire_reads_back() {
        let m = sample_match();
        let back: Match = serde_json::from_value(serde_json::to_value(&m).unwrap()).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn test_ball_symbols() {
        assert_eq!(Ball::parse("0"), Ball::Runs(0));
        assert_eq!(Ball::parse("6"), Ball::Runs(6));
        assert_eq!(Ball::parse("W"), Ball::Wicket);
        assert_eq!(Ball::parse("wd"), Ball::Wide);
        assert_eq!(Ball::parse("NB"), Ball::NoBall);
        assert_eq!(Ball::parse("lb"), Ball::LegBye);
        assert_eq!(Ball::parse("7"), Ball::Other("7".into()));
        assert_eq!(Ball::parse("1wd"), Ball::Other("1wd".into()));
    }

    #[test]
    fn test_score_display() {
        let s = ScoreTuple { r: 120, w: 3, o: 15.3, inning: None };
        assert_eq!(s.to_string(), "120/3 (15.3)");
    }
}
