use std::{fmt::Display, time::Duration};

use serde::{Deserialize, Serialize};

/// Metrics of one finished round, for both sides
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RoundResult {
    pub human_time: Duration,
    /// Accepted moves, the start cell is not counted
    pub human_steps: usize,
    /// Wall-clock time of the AI playback. Dominated by the animation cadence, not the search.
    pub ai_time: Duration,
    /// Cells on the AI path, the start cell included
    pub ai_steps: usize,
    /// Time the search itself took, kept apart for diagnostics
    pub ai_search_time: Duration,
}

/// Constants of the per-round score `(base - time * time_weight) + (base - steps * step_weight)`.
/// Time is counted in seconds.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub base: f64,
    pub time_weight: f64,
    pub step_weight: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            base: 10.0,
            time_weight: 5.0,
            step_weight: 1.0,
        }
    }
}

impl ScoreWeights {
    /// Score of a single round, higher is better. Slow or long rounds go negative.
    pub fn score(&self, time: Duration, steps: usize) -> f64 {
        (self.base - time.as_secs_f64() * self.time_weight)
            + (self.base - steps as f64 * self.step_weight)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Human,
    Ai,
}

impl Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Side::Human => "Human",
                Side::Ai => "AI",
            }
        )
    }
}

/// Who wins when both sides end up with exactly the same score
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TieBreak {
    #[default]
    Ai,
    Human,
    /// Nobody wins
    Draw,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Verdict {
    pub human_score: f64,
    pub ai_score: f64,
    /// None on a draw
    pub winner: Option<Side>,
    /// Whether the scores were equal and the tie break decided
    pub tied: bool,
}

impl Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.winner {
            Some(side) => write!(f, "{} wins!", side)?,
            None => write!(f, "Draw!")?,
        }
        write!(
            f,
            " (human {:.2}, AI {:.2}{})",
            self.human_score,
            self.ai_score,
            if self.tied { ", tied" } else { "" }
        )
    }
}

/// Collects the results of all rounds and decides the winner
#[derive(Debug, Clone, Default)]
pub struct ScoreKeeper {
    weights: ScoreWeights,
    tie_break: TieBreak,
    rounds: Vec<RoundResult>,
}

impl ScoreKeeper {
    pub fn new(weights: ScoreWeights, tie_break: TieBreak) -> Self {
        Self {
            weights,
            tie_break,
            rounds: Vec::new(),
        }
    }

    pub fn record(&mut self, result: RoundResult) {
        self.rounds.push(result);
    }

    pub fn rounds(&self) -> &[RoundResult] {
        &self.rounds
    }

    fn mean_score(&self, per_round: impl Fn(&RoundResult) -> f64) -> Option<f64> {
        if self.rounds.is_empty() {
            return None;
        }
        let total: f64 = self.rounds.iter().map(per_round).sum();
        Some(total / self.rounds.len() as f64)
    }

    pub fn human_score(&self) -> Option<f64> {
        self.mean_score(|r| self.weights.score(r.human_time, r.human_steps))
    }

    pub fn ai_score(&self) -> Option<f64> {
        self.mean_score(|r| self.weights.score(r.ai_time, r.ai_steps))
    }

    /// The final verdict, None until at least one round has been recorded
    pub fn verdict(&self) -> Option<Verdict> {
        let human_score = self.human_score()?;
        let ai_score = self.ai_score()?;

        let tied = human_score == ai_score;
        let winner = if human_score > ai_score {
            Some(Side::Human)
        } else if ai_score > human_score {
            Some(Side::Ai)
        } else {
            match self.tie_break {
                TieBreak::Ai => Some(Side::Ai),
                TieBreak::Human => Some(Side::Human),
                TieBreak::Draw => None,
            }
        };

        Some(Verdict {
            human_score,
            ai_score,
            winner,
            tied,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn result(human: (f64, usize), ai: (f64, usize)) -> RoundResult {
        RoundResult {
            human_time: Duration::from_secs_f64(human.0),
            human_steps: human.1,
            ai_time: Duration::from_secs_f64(ai.0),
            ai_steps: ai.1,
            ai_search_time: Duration::ZERO,
        }
    }

    #[test]
    fn test_single_round_ai_wins() {
        let mut scores = ScoreKeeper::default();
        scores.record(result((2.0, 8), (1.0, 10)));

        // human: (10 - 2*5) + (10 - 8) = 2, ai: (10 - 1*5) + (10 - 10) = 5
        let verdict = scores.verdict().unwrap();
        assert_eq!(verdict.human_score, 2.0);
        assert_eq!(verdict.ai_score, 5.0);
        assert_eq!(verdict.winner, Some(Side::Ai));
        assert!(!verdict.tied);
        assert_eq!(verdict.to_string(), "AI wins! (human 2.00, AI 5.00)");
    }

    #[test]
    fn test_mean_over_rounds_and_negative_scores() {
        let mut scores = ScoreKeeper::default();
        scores.record(result((0.5, 4), (3.0, 41)));
        scores.record(result((1.5, 6), (2.0, 21)));

        // human: (7.5 + 6) and (2.5 + 4) -> mean 10
        assert_eq!(scores.human_score(), Some(10.0));
        // ai: (-5 - 31) and (0 - 11) -> mean -23.5
        assert_eq!(scores.ai_score(), Some(-23.5));
        assert_eq!(scores.verdict().unwrap().winner, Some(Side::Human));
        assert_eq!(scores.rounds().len(), 2);
    }

    #[test]
    fn test_no_rounds_no_verdict() {
        let scores = ScoreKeeper::default();
        assert_eq!(scores.human_score(), None);
        assert_eq!(scores.verdict(), None);
    }

    #[test]
    fn test_tie_break() {
        let tie = result((1.0, 10), (1.0, 10));

        for (tie_break, winner) in [
            (TieBreak::Ai, Some(Side::Ai)),
            (TieBreak::Human, Some(Side::Human)),
            (TieBreak::Draw, None),
        ] {
            let mut scores = ScoreKeeper::new(ScoreWeights::default(), tie_break);
            scores.record(tie);
            let verdict = scores.verdict().unwrap();
            assert!(verdict.tied);
            assert_eq!(verdict.winner, winner);
        }
    }

    #[test]
    fn test_custom_weights() {
        let weights = ScoreWeights {
            base: 0.0,
            time_weight: 1.0,
            step_weight: 0.0,
        };
        // only time counts, the faster side wins regardless of steps
        let mut scores = ScoreKeeper::new(weights, TieBreak::Draw);
        scores.record(result((1.0, 100), (2.0, 1)));
        assert_eq!(scores.verdict().unwrap().winner, Some(Side::Human));
    }
}
