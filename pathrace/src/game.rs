use std::time::Instant;

use anyhow::{bail, ensure};
use log::{debug, info};
use rand::Rng;

use crate::{
    config::GameConfig,
    score::{RoundResult, ScoreKeeper, Verdict},
    session::{Command, GameSession, SessionState},
};

/// Things that happened during a tick which the frontend has to react to
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum GameEvent {
    /// The AI playback of the given (1-based) round has finished
    RoundComplete {
        round: usize,
        result: RoundResult,
    },
    /// All rounds are played. Emitted on the same tick as the last `RoundComplete`.
    GameOver(Verdict),
    Quit,
}

/// A full game of several rounds, each on a freshly generated maze
pub struct Game<R: Rng> {
    config: GameConfig,
    rng: R,
    scores: ScoreKeeper,
    round: usize,
    session: GameSession,
    over: bool,
}

impl<R: Rng> Game<R> {
    /// Validates the config and prepares the first round
    pub fn new(config: GameConfig, mut rng: R, now: Instant) -> anyhow::Result<Self> {
        config.validate()?;

        let session = prepare_round(&config, &mut rng, 1, now)?;
        let scores = ScoreKeeper::new(config.weights, config.tie_break);

        Ok(Self {
            config,
            rng,
            scores,
            round: 1,
            session,
            over: false,
        })
    }

    /// Feeds the polled commands to the current round
    pub fn tick(&mut self, now: Instant, commands: &[Command]) -> Vec<GameEvent> {
        if commands.contains(&Command::Quit) {
            info!("quit requested in round {}", self.round);
            return vec![GameEvent::Quit];
        }
        if self.over {
            return Vec::new();
        }

        let mut events = Vec::new();
        if let Some(result) = self.session.tick(now, commands) {
            info!(
                "round {} done: human {:.2}s / {} steps, AI {:.2}s / {} steps",
                self.round,
                result.human_time.as_secs_f64(),
                result.human_steps,
                result.ai_time.as_secs_f64(),
                result.ai_steps
            );
            self.scores.record(result);
            events.push(GameEvent::RoundComplete {
                round: self.round,
                result,
            });

            if self.round == self.config.rounds {
                self.over = true;
                if let Some(verdict) = self.scores.verdict() {
                    info!("game over: {}", verdict);
                    events.push(GameEvent::GameOver(verdict));
                }
            }
        }
        events
    }

    /// Starts the next round on a new maze. Only valid once the current round is complete and
    /// the game is not over.
    pub fn next_round(&mut self, now: Instant) -> anyhow::Result<()> {
        ensure!(!self.over, "the game is over");
        ensure!(
            self.session.state() == SessionState::RoundComplete,
            "round {} is still being played",
            self.round
        );

        self.session = prepare_round(&self.config, &mut self.rng, self.round + 1, now)?;
        self.round += 1;
        Ok(())
    }

    /// Restarts the human clock of the current round if the player has not moved yet. Used
    /// once the window is up, so start-up time is not counted.
    pub fn restart_clock(&mut self, now: Instant) {
        self.session.restart_clock(now);
    }

    /// Current round, 1-based
    pub fn round(&self) -> usize {
        self.round
    }

    pub fn rounds_total(&self) -> usize {
        self.config.rounds
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn scores(&self) -> &ScoreKeeper {
        &self.scores
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn is_over(&self) -> bool {
        self.over
    }
}

/// Generates mazes until the AI finds a route through one, then starts the round on it
fn prepare_round<R: Rng + ?Sized>(
    config: &GameConfig,
    rng: &mut R,
    round: usize,
    now: Instant,
) -> anyhow::Result<GameSession> {
    for attempt in 1..=config.max_regenerations {
        let grid = config.maze.generate(config.rows, config.cols, rng);

        let search_started = Instant::now();
        let path = config.algorithm.find(&grid, grid.start(), grid.goal());
        let search_time = search_started.elapsed();

        match path {
            Some(path) => {
                info!(
                    "round {}: {} found a path of {} cells in {:.3}ms",
                    round,
                    config.algorithm,
                    path.len(),
                    search_time.as_secs_f64() * 1000.0
                );
                debug!("round {} maze:\n{}", round, grid);
                return Ok(GameSession::new(
                    grid,
                    path,
                    search_time,
                    config.step_interval(),
                    now,
                ));
            }
            None => info!(
                "round {}: no path from start to goal, regenerating (attempt {}/{})",
                round, attempt, config.max_regenerations
            ),
        }
    }

    bail!(
        "could not generate a solvable {}x{} maze in {} attempts",
        config.rows,
        config.cols,
        config.max_regenerations
    )
}
