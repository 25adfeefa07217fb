use std::{path::PathBuf, time::Duration};

use anyhow::ensure;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::{
    find::Algorithm,
    grid::Point,
    maze::MazeKind,
    score::{ScoreWeights, TieBreak},
};

/// RGB colors used by both the window and the saved snapshots
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub background: [u8; 3],
    pub passable: [u8; 3],
    pub blocked: [u8; 3],
    pub player_path: [u8; 3],
    pub ai_path: [u8; 3],
    pub player: [u8; 3],
    pub goal: [u8; 3],
    pub text: [u8; 3],
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: [0, 0, 0],
            passable: [255, 255, 255],
            blocked: [0, 0, 0],
            player_path: [0, 255, 0],
            ai_path: [0, 0, 255],
            player: [0, 160, 0],
            goal: [255, 0, 0],
            text: [255, 255, 0],
        }
    }
}

/// Everything needed to set up and run a game
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)] // if we add new fields, give them default values when deserializing old configs
pub struct GameConfig {
    pub rows: usize,
    pub cols: usize,
    /// Edge length of one cell in pixels
    pub cell_size: u32,
    /// Space above the maze reserved for the status line, in pixels
    pub top_margin: u32,
    pub rounds: usize,
    /// Target frame rate of the game loop
    pub fps: u32,
    /// Frames between two cells of the AI playback, at the target frame rate
    pub ticks_per_step: u32,
    pub algorithm: Algorithm,
    pub maze: MazeKind,
    pub weights: ScoreWeights,
    pub tie_break: TieBreak,
    /// How many mazes to try per round before giving up on finding a solvable one
    pub max_regenerations: usize,
    /// Directory the per-round snapshots are written to
    pub output_dir: PathBuf,
    pub palette: Palette,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rows: 21,
            cols: 21,
            cell_size: 20,
            top_margin: 40,
            rounds: 3,
            fps: 30,
            ticks_per_step: 3,
            algorithm: Algorithm::AStar,
            maze: MazeKind::Connected,
            weights: ScoreWeights::default(),
            tie_break: TieBreak::Ai,
            max_regenerations: 100,
            output_dir: PathBuf::from("."),
            palette: Palette::default(),
        }
    }
}

impl GameConfig {
    /// Checks the settings, fails on anything that can not produce a playable game
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.rows > 0 && self.cols > 0,
            "maze must have at least one row and one column, got {}x{}",
            self.rows,
            self.cols
        );
        ensure!(self.cell_size > 0, "cell size must be positive");
        ensure!(self.rounds > 0, "at least one round must be played");
        ensure!(self.fps > 0, "frame rate must be positive");
        ensure!(self.ticks_per_step > 0, "ticks per step must be positive");
        ensure!(
            self.max_regenerations > 0,
            "at least one maze must be generated per round"
        );

        match self.maze {
            MazeKind::Simple { density } => {
                ensure!(
                    (0.0..=1.0).contains(&density),
                    "density must be between 0 and 1, got {}",
                    density
                );
            }
            MazeKind::Connected => {
                if self.rows % 2 == 0 || self.cols % 2 == 0 {
                    warn!(
                        "connected mazes need odd dimensions, a {}x{} goal may be walled in",
                        self.rows, self.cols
                    );
                }
            }
        }

        Ok(())
    }

    /// Time between two frames
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps.max(1) as f64)
    }

    /// Wall-clock time between two cells of the AI playback
    pub fn step_interval(&self) -> Duration {
        self.tick_interval() * self.ticks_per_step
    }

    /// Size of the drawing area in pixels (width, height), status line included
    pub fn canvas_size(&self) -> (u32, u32) {
        (
            self.cols as u32 * self.cell_size,
            self.rows as u32 * self.cell_size + self.top_margin,
        )
    }

    /// Top-left pixel of a cell on the canvas
    pub fn cell_origin(&self, point: Point) -> (u32, u32) {
        (
            point.col as u32 * self.cell_size,
            point.row as u32 * self.cell_size + self.top_margin,
        )
    }

    /// File the snapshot of the given (1-based) round is written to
    pub fn snapshot_path(&self, round: usize) -> PathBuf {
        self.output_dir.join(format!("round_{}_result.png", round))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = GameConfig::default();
        config.validate().unwrap();
        assert_eq!(config.canvas_size(), (420, 460));
        assert_eq!(config.cell_origin(Point::new(2, 3)), (60, 80));
        assert_eq!(config.tick_interval(), Duration::from_secs_f64(1.0 / 30.0));
        assert_eq!(config.step_interval(), config.tick_interval() * 3);
        let millis = config.step_interval().as_secs_f64() * 1000.0;
        assert!((millis - 100.0).abs() < 0.01, "{}", millis);
    }

    #[test]
    fn test_invalid_configs() {
        let invalid = [
            GameConfig {
                rows: 0,
                ..Default::default()
            },
            GameConfig {
                rounds: 0,
                ..Default::default()
            },
            GameConfig {
                ticks_per_step: 0,
                ..Default::default()
            },
            GameConfig {
                fps: 0,
                ..Default::default()
            },
            GameConfig {
                maze: MazeKind::Simple { density: 1.5 },
                ..Default::default()
            },
        ];

        for config in invalid {
            assert!(config.validate().is_err(), "{:?}", config);
        }
    }

    #[test]
    fn test_even_connected_is_only_a_warning() {
        let config = GameConfig {
            rows: 20,
            cols: 20,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_snapshot_path() {
        let config = GameConfig {
            output_dir: PathBuf::from("shots"),
            ..Default::default()
        };
        assert_eq!(
            config.snapshot_path(2),
            PathBuf::from("shots").join("round_2_result.png")
        );
    }
}
