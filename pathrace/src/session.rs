//! One round of the race: the human walks the maze, then the AI replays its precomputed path.
//!
//! The session is driven by [`GameSession::tick`], called once per frame with the commands
//! polled during that frame. Nothing in here blocks: the AI playback reveals one cell per
//! `step_interval` of wall-clock time, however often it is ticked.

use std::time::{Duration, Instant};

use log::{debug, info};

use crate::{
    find::Path,
    grid::{Direction, Grid, Point},
    score::RoundResult,
};

/// Whose turn drives the grid
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    HumanControl,
    AiPlayback,
    RoundComplete,
}

/// Input delivered to the game during one tick
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Move(Direction),
    Quit,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OverlayKind {
    PlayerPath,
    AiPath,
    Player,
    Goal,
}

/// A set of cells to paint in one color on top of the maze
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Overlay<'a> {
    pub kind: OverlayKind,
    pub cells: &'a [Point],
}

#[derive(Copy, Clone, Debug)]
struct HumanFinish {
    time: Duration,
    steps: usize,
}

#[derive(Copy, Clone, Debug)]
struct Playback {
    started: Instant,
    /// Number of AI path cells shown so far
    revealed: usize,
    finished: Option<Duration>,
}

pub struct GameSession {
    grid: Grid,
    goal: Point,
    ai_path: Path<Point>,
    ai_search_time: Duration,
    step_interval: Duration,

    state: SessionState,
    player: Point,
    player_path: Vec<Point>,
    started: Instant,
    human: Option<HumanFinish>,
    playback: Option<Playback>,
}

impl GameSession {
    /// Starts a round in human control. `ai_path` must have been computed on `grid`.
    pub fn new(
        grid: Grid,
        ai_path: Path<Point>,
        ai_search_time: Duration,
        step_interval: Duration,
        now: Instant,
    ) -> Self {
        let start = grid.start();
        let goal = grid.goal();
        Self {
            grid,
            goal,
            ai_path,
            ai_search_time,
            step_interval,
            state: SessionState::HumanControl,
            player: start,
            player_path: vec![start],
            started: now,
            human: None,
            playback: None,
        }
    }

    /// Advances the round by one frame. Returns the round result on the tick the AI playback
    /// finishes, and only then.
    pub fn tick(&mut self, now: Instant, commands: &[Command]) -> Option<RoundResult> {
        match self.state {
            SessionState::HumanControl => {
                for command in commands {
                    if let Command::Move(direction) = command {
                        self.try_move(*direction);
                    }
                    if self.player == self.goal {
                        break;
                    }
                }
                if self.player == self.goal {
                    self.hand_over(now);
                }
                None
            }
            SessionState::AiPlayback => self.advance_playback(now),
            SessionState::RoundComplete => None,
        }
    }

    /// Moves the player if the target cell is inside the maze and passable, otherwise nothing
    /// happens.
    fn try_move(&mut self, direction: Direction) {
        if let Some(next) = self.grid.neighbor(self.player, direction) {
            if self.grid.is_passable(next) {
                self.player = next;
                self.player_path.push(next);
            }
        }
    }

    fn hand_over(&mut self, now: Instant) {
        let finish = HumanFinish {
            time: now.saturating_duration_since(self.started),
            steps: self.player_path.len() - 1,
        };
        info!(
            "human reached the goal in {:.2}s with {} steps, AI takes over",
            finish.time.as_secs_f64(),
            finish.steps
        );

        self.human = Some(finish);
        self.playback = Some(Playback {
            started: now,
            revealed: 0,
            finished: None,
        });
        self.state = SessionState::AiPlayback;
    }

    fn advance_playback(&mut self, now: Instant) -> Option<RoundResult> {
        let playback = self.playback.as_mut()?;

        let elapsed = now.saturating_duration_since(playback.started);
        let steps = elapsed.as_nanos() / self.step_interval.as_nanos().max(1);
        playback.revealed = steps.min(self.ai_path.len() as u128) as usize;

        if playback.revealed < self.ai_path.len() {
            return None;
        }

        let ai_time = elapsed;
        playback.finished = Some(ai_time);
        self.state = SessionState::RoundComplete;

        let human = self.human?;
        let result = RoundResult {
            human_time: human.time,
            human_steps: human.steps,
            ai_time,
            ai_steps: self.ai_path.len(),
            ai_search_time: self.ai_search_time,
        };
        debug!("round finished: {:?}", result);
        Some(result)
    }

    /// Restarts the human clock, as long as no move has been made yet
    pub fn restart_clock(&mut self, now: Instant) {
        if self.state == SessionState::HumanControl && self.player_path.len() == 1 {
            self.started = now;
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn player(&self) -> Point {
        self.player
    }

    pub fn player_path(&self) -> &[Point] {
        &self.player_path
    }

    pub fn ai_path(&self) -> &Path<Point> {
        &self.ai_path
    }

    /// The part of the AI path played back so far
    pub fn revealed_ai_path(&self) -> &[Point] {
        let revealed = self.playback.map(|p| p.revealed).unwrap_or(0);
        &self.ai_path[..revealed]
    }

    /// Human time, frozen once the goal is reached
    pub fn human_elapsed(&self, now: Instant) -> Duration {
        match self.human {
            Some(finish) => finish.time,
            None => now.saturating_duration_since(self.started),
        }
    }

    /// Accepted moves so far
    pub fn human_steps(&self) -> usize {
        self.player_path.len() - 1
    }

    /// AI playback time, zero before the hand over and frozen once the playback is done
    pub fn ai_elapsed(&self, now: Instant) -> Duration {
        match self.playback {
            Some(Playback {
                finished: Some(time),
                ..
            }) => time,
            Some(playback) => now.saturating_duration_since(playback.started),
            None => Duration::ZERO,
        }
    }

    /// Layers to paint on top of the maze, bottom first
    pub fn overlays(&self) -> Vec<Overlay<'_>> {
        vec![
            Overlay {
                kind: OverlayKind::PlayerPath,
                cells: &self.player_path,
            },
            Overlay {
                kind: OverlayKind::AiPath,
                cells: self.revealed_ai_path(),
            },
            Overlay {
                kind: OverlayKind::Player,
                cells: std::slice::from_ref(&self.player),
            },
            Overlay {
                kind: OverlayKind::Goal,
                cells: std::slice::from_ref(&self.goal),
            },
        ]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::find::bfs;

    use Direction::*;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    /// 3x3 maze with a single route: down the left side, then along the bottom
    fn create_session(now: Instant) -> GameSession {
        let grid: Grid = "
            .#.
            .#.
            ...
            "
        .parse()
        .unwrap();
        let path = bfs(&grid, grid.start(), grid.goal()).unwrap();
        GameSession::new(grid, path, ms(1), ms(200), now)
    }

    fn moves(directions: &[Direction]) -> Vec<Command> {
        directions.iter().map(|d| Command::Move(*d)).collect()
    }

    #[test]
    fn test_rejected_moves_are_silent() {
        let t0 = Instant::now();
        let mut session = create_session(t0);

        // off the grid, then into the wall
        assert_eq!(session.tick(t0, &moves(&[Up, Left, Right])), None);
        assert_eq!(session.player(), Point::new(0, 0));
        assert_eq!(session.player_path(), &[Point::new(0, 0)]);
        assert_eq!(session.human_steps(), 0);
        assert_eq!(session.state(), SessionState::HumanControl);
    }

    #[test]
    fn test_hand_over_freezes_human_metrics() {
        let t0 = Instant::now();
        let mut session = create_session(t0);

        session.tick(t0 + ms(100), &moves(&[Down, Down]));
        assert_eq!(session.state(), SessionState::HumanControl);
        assert_eq!(session.human_elapsed(t0 + ms(200)), ms(200));

        // the last move is dropped, the goal is reached before it
        session.tick(t0 + ms(1500), &moves(&[Right, Right, Up]));
        assert_eq!(session.state(), SessionState::AiPlayback);
        assert_eq!(session.player(), Point::new(2, 2));
        assert_eq!(session.human_steps(), 4);
        assert_eq!(session.human_elapsed(t0 + ms(9000)), ms(1500));

        // moves during playback are ignored
        session.tick(t0 + ms(1600), &moves(&[Up]));
        assert_eq!(session.player(), Point::new(2, 2));
    }

    #[test]
    fn test_playback_cadence_and_result() {
        let t0 = Instant::now();
        let mut session = create_session(t0);
        session.tick(t0 + ms(1000), &moves(&[Down, Down, Right, Right]));
        assert_eq!(session.revealed_ai_path().len(), 0);
        assert_eq!(session.ai_elapsed(t0 + ms(1000)), Duration::ZERO);

        // 200ms per cell, five cells
        let mut result = None;
        let mut now = t0 + ms(1000);
        for tick in 1..=10 {
            now += ms(100);
            let r = session.tick(now, &[]);
            assert_eq!(session.revealed_ai_path().len(), tick / 2);
            if tick < 10 {
                assert_eq!(r, None);
                assert_eq!(session.state(), SessionState::AiPlayback);
            } else {
                result = r;
            }
        }

        let result = result.unwrap();
        assert_eq!(session.state(), SessionState::RoundComplete);
        assert_eq!(result.human_time, ms(1000));
        assert_eq!(result.human_steps, 4);
        assert_eq!(result.ai_time, ms(1000));
        assert_eq!(result.ai_steps, 5);
        assert_eq!(result.ai_search_time, ms(1));
        assert_eq!(session.revealed_ai_path(), &**session.ai_path());

        // the result is handed out exactly once
        assert_eq!(session.tick(now + ms(100), &[]), None);
        assert_eq!(session.ai_elapsed(now + ms(5000)), ms(1000));
    }

    #[test]
    fn test_playback_cadence_ignores_tick_rate() {
        let t0 = Instant::now();
        let mut session = create_session(t0);
        session.tick(t0, &moves(&[Down, Down, Right, Right]));

        // a burst of irregular ticks, much faster than one cell per 200ms
        let mut now = t0;
        let mut result = None;
        for i in 0..2000u64 {
            now += ms(1 + i % 7);
            let elapsed = now.duration_since(t0).as_millis() as usize;
            let r = session.tick(now, &[]);
            assert_eq!(session.revealed_ai_path().len(), (elapsed / 200).min(5));
            if r.is_some() {
                result = r;
                break;
            }
        }

        // five cells at 200ms each, give or take the last frame
        let ai_time = result.unwrap().ai_time;
        assert!(ai_time >= ms(1000) && ai_time < ms(1007), "{:?}", ai_time);
    }

    #[test]
    fn test_restart_clock() {
        let t0 = Instant::now();
        let mut session = create_session(t0);

        session.restart_clock(t0 + ms(800));
        assert_eq!(session.human_elapsed(t0 + ms(1000)), ms(200));

        // once the player moved, the clock keeps running
        session.tick(t0 + ms(1000), &moves(&[Down]));
        session.restart_clock(t0 + ms(5000));
        assert_eq!(session.human_elapsed(t0 + ms(6000)), ms(5200));
    }

    #[test]
    fn test_start_on_goal() {
        let t0 = Instant::now();
        let grid = Grid::new(1, 1, crate::grid::Cell::Passable);
        let path = bfs(&grid, grid.start(), grid.goal()).unwrap();
        let mut session = GameSession::new(grid, path, Duration::ZERO, ms(100), t0);

        assert_eq!(session.tick(t0, &[]), None);
        assert_eq!(session.state(), SessionState::AiPlayback);

        let result = session.tick(t0 + ms(100), &[]).unwrap();
        assert_eq!(result.human_steps, 0);
        assert_eq!(result.ai_steps, 1);
        assert_eq!(result.ai_time, ms(100));
    }

    #[test]
    fn test_overlays() {
        let t0 = Instant::now();
        let mut session = create_session(t0);
        session.tick(t0, &moves(&[Down]));

        let overlays = session.overlays();
        let kinds: Vec<OverlayKind> = overlays.iter().map(|o| o.kind).collect();
        assert_eq!(
            kinds,
            vec![
                OverlayKind::PlayerPath,
                OverlayKind::AiPath,
                OverlayKind::Player,
                OverlayKind::Goal
            ]
        );
        assert_eq!(overlays[0].cells, &[Point::new(0, 0), Point::new(1, 0)]);
        assert!(overlays[1].cells.is_empty());
        assert_eq!(overlays[2].cells, &[Point::new(1, 0)]);
        assert_eq!(overlays[3].cells, &[Point::new(2, 2)]);
    }
}
