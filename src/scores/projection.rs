use std::fmt;

use super::models::ScoreTuple;

/// Scheduled innings length for limited-overs formats, from the provider's `matchType`.
pub fn overs_limit(match_type: &str) -> Option<u32> {
    match match_type.to_ascii_lowercase().as_str() {
        "t10" => Some(10),
        "t20" | "t20i" => Some(20),
        "odi" | "list a" => Some(50),
        _ => None,
    }
}

/// Legal balls bowled for overs in cricket notation (15.3 = 15 overs and 3 balls).
pub fn balls_bowled(overs: f64) -> u32 {
    if !overs.is_finite() || overs <= 0.0 {
        return 0;
    }
    let whole = overs.trunc();
    let part = ((overs - whole) * 10.0).round().min(5.0);
    whole as u32 * 6 + part as u32
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedTotal {
    pub run_rate: f64,
    pub score: u32,
}

/// Innings total projected at the current rate and at a few faster ones.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub overs_total: u32,
    pub current_run_rate: f64,
    /// First entry is the current rate
    pub rows: Vec<ProjectedTotal>,
}

/// Project `score` to the end of an innings of `overs_total` overs.
///
/// Before the first ball the current rate is 0 and every row is the runs so far
/// plus the full innings at that row's rate.
pub fn projections(score: &ScoreTuple, overs_total: u32) -> Projection {
    let balls = balls_bowled(score.o);
    let current_run_rate = if balls == 0 {
        0.0
    } else {
        f64::from(score.r) * 6.0 / f64::from(balls)
    };
    let remaining = (f64::from(overs_total) - f64::from(balls) / 6.0).max(0.0);

    let base = current_run_rate.floor();
    let rows = std::iter::once(current_run_rate)
        .chain([base + 2.0, base + 4.0, base + 6.0])
        .map(|run_rate| ProjectedTotal {
            run_rate,
            score: (f64::from(score.r) + run_rate * remaining).round() as u32,
        })
        .collect();

    Projection {
        overs_total,
        current_run_rate,
        rows,
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CRR {:.2} | projected ({} ov):",
            self.current_run_rate, self.overs_total
        )?;
        for row in &self.rows {
            write!(f, " {:.2}->{}", row.run_rate, row.score)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn score(r: u32, o: f64) -> ScoreTuple {
        ScoreTuple { r, w: 1, o, inning: None }
    }

    #[test]
    fn test_balls_from_cricket_notation() {
        assert_eq!(balls_bowled(0.0), 0);
        assert_eq!(balls_bowled(6.2), 38);
        assert_eq!(balls_bowled(15.0), 90);
        assert_eq!(balls_bowled(19.5), 119);
        assert_eq!(balls_bowled(-1.0), 0);
    }

    #[test]
    fn test_projection_mid_innings() {
        let p = projections(&score(45, 6.2), 20);
        assert_relative_eq!(p.current_run_rate, 45.0 * 6.0 / 38.0);
        let scores: Vec<u32> = p.rows.iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![142, 168, 195, 223]);
        assert_relative_eq!(p.rows[1].run_rate, 9.0);
    }

    #[test]
    fn test_projection_before_first_ball() {
        let p = projections(&score(0, 0.0), 20);
        assert_relative_eq!(p.current_run_rate, 0.0);
        assert!(p.rows.iter().all(|r| r.run_rate.is_finite()));
        let scores: Vec<u32> = p.rows.iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![0, 40, 80, 120]);
    }

    #[test]
    fn test_projection_after_innings_complete() {
        let p = projections(&score(180, 20.0), 20);
        assert!(p.rows.iter().all(|r| r.score == 180));
    }

    #[test]
    fn test_overs_limit() {
        assert_eq!(overs_limit("T20"), Some(20));
        assert_eq!(overs_limit("odi"), Some(50));
        assert_eq!(overs_limit("test"), None);
    }

    #[test]
    fn test_display() {
        let p = projections(&score(60, 10.0), 20);
        assert_eq!(
            p.to_string(),
            "CRR 6.00 | projected (20 ov): 6.00->120 8.00->140 10.00->160 12.00->180"
        );
    }
}
