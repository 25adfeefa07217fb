pub mod config;
pub mod find;
pub mod game;
pub mod grid;
pub mod maze;
pub mod score;
pub mod session;
pub mod snapshot;

pub use config::{GameConfig, Palette};
pub use find::{astar, bfs, Algorithm, MapStorage, MapTrait, Path, PathFinder, PathFinderState};
pub use game::{Game, GameEvent};
pub use grid::{Cell, Direction, Grid, Point};
pub use maze::MazeKind;
pub use score::{RoundResult, ScoreKeeper, ScoreWeights, Side, TieBreak, Verdict};
pub use session::{Command, GameSession, Overlay, OverlayKind, SessionState};
