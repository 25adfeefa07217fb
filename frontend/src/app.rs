use std::{sync::Arc, time::Instant};

use egui::{mutex::Mutex, Color32, Pos2, Rect, Vec2};
use log::{error, info};
use pathrace::{
    snapshot, Game, GameConfig, GameEvent, GameSession, OverlayKind, Point, SessionState,
};
use rand::rngs::StdRng;

/// Error that ended the game early, handed back to `main` once the window is closed
pub type Failure = Arc<Mutex<Option<anyhow::Error>>>;

pub struct App {
    game: Game<StdRng>,
    failure: Failure,
    /// Whether the first frame has been shown
    shown: bool,
    closing: bool,
}

impl App {
    pub fn new(game: Game<StdRng>, failure: Failure) -> Self {
        App {
            game,
            failure,
            shown: false,
            closing: false,
        }
    }

    fn handle(&mut self, ctx: &egui::Context, event: GameEvent, now: Instant) {
        match event {
            GameEvent::RoundComplete { round, .. } => {
                // a missing snapshot does not end the game
                let session = self.game.session();
                if let Err(e) = snapshot::save_round(session, self.game.config(), round) {
                    error!("{:#}", e);
                }

                if !self.game.is_over() {
                    if let Err(e) = self.game.next_round(now) {
                        self.fail(ctx, e);
                    }
                }
            }
            GameEvent::GameOver(verdict) => {
                println!("{}", verdict);
                self.close(ctx);
            }
            GameEvent::Quit => {
                info!("quitting");
                self.close(ctx);
            }
        }
    }

    fn fail(&mut self, ctx: &egui::Context, e: anyhow::Error) {
        error!("{:#}", e);
        *self.failure.lock() = Some(e);
        self.close(ctx);
    }

    fn close(&mut self, ctx: &egui::Context) {
        self.closing = true;
        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
    }

    fn draw(&self, painter: &egui::Painter, origin: Pos2, now: Instant) {
        let config = self.game.config();
        let palette = &config.palette;
        let session = self.game.session();

        let cell_rect = |point: Point| {
            let (x, y) = config.cell_origin(point);
            Rect::from_min_size(
                origin + Vec2::new(x as f32, y as f32),
                Vec2::splat(config.cell_size as f32),
            )
        };

        for (point, cell) in session.grid().iter() {
            let color = if cell.is_passable() {
                palette.passable
            } else {
                palette.blocked
            };
            painter.rect_filled(cell_rect(point), 0.0, color32(color));
        }

        for overlay in session.overlays() {
            let color = match overlay.kind {
                OverlayKind::PlayerPath => palette.player_path,
                OverlayKind::AiPath => palette.ai_path,
                OverlayKind::Player => palette.player,
                OverlayKind::Goal => palette.goal,
            };
            for point in overlay.cells {
                painter.rect_filled(cell_rect(*point), 0.0, color32(color));
            }
        }

        painter.text(
            origin + Vec2::new(10.0, config.top_margin as f32 / 2.0),
            egui::Align2::LEFT_CENTER,
            status_line(self.game.round(), session, now),
            egui::FontId::proportional(20.0),
            color32(palette.text),
        );
    }
}

fn color32([r, g, b]: [u8; 3]) -> Color32 {
    Color32::from_rgb(r, g, b)
}

/// Text shown above the maze
fn status_line(round: usize, session: &GameSession, now: Instant) -> String {
    match session.state() {
        SessionState::HumanControl => format!(
            "Round: {} | Player Time: {:.2}s | Steps: {}",
            round,
            session.human_elapsed(now).as_secs_f64(),
            session.human_steps()
        ),
        SessionState::AiPlayback | SessionState::RoundComplete => format!(
            "Round: {} | AI Time: {:.2}s | Steps: {}",
            round,
            session.ai_elapsed(now).as_secs_f64(),
            session.revealed_ai_path().len()
        ),
    }
}

/// Canvas size of the config as a window size
pub fn window_size(config: &GameConfig) -> Vec2 {
    let (width, height) = config.canvas_size();
    Vec2::new(width as f32, height as f32)
}

impl eframe::App for App {
    /// Called once per frame, drives one tick of the game.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();

        // the round was set up before the window existed
        if !self.shown {
            self.game.restart_clock(now);
            self.shown = true;
        }

        if !self.closing {
            let commands = crate::event::poll(ctx);
            for event in self.game.tick(now, &commands) {
                self.handle(ctx, event, now);
                if self.closing {
                    break;
                }
            }
        }

        let background = color32(self.game.config().palette.background);
        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(background))
            .show(ctx, |ui| {
                self.draw(ui.painter(), ui.max_rect().min, now);
            });

        ctx.request_repaint_after(self.game.config().tick_interval());
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use pathrace::{bfs, Command, Direction, Grid};

    use super::*;

    #[test]
    fn test_status_line() {
        let grid: Grid = "
            ..
            ..
            "
        .parse()
        .unwrap();
        let path = bfs(&grid, grid.start(), grid.goal()).unwrap();
        let t0 = Instant::now();
        let step = Duration::from_secs(1);
        let mut session = GameSession::new(grid, path, Duration::ZERO, step, t0);

        session.tick(t0, &[Command::Move(Direction::Right)]);
        assert_eq!(
            status_line(1, &session, t0 + Duration::from_millis(1250)),
            "Round: 1 | Player Time: 1.25s | Steps: 1"
        );

        session.tick(
            t0 + Duration::from_secs(2),
            &[Command::Move(Direction::Down)],
        );
        session.tick(t0 + Duration::from_secs(3), &[]);
        assert_eq!(
            status_line(2, &session, t0 + Duration::from_secs(3)),
            "Round: 2 | AI Time: 1.00s | Steps: 1"
        );
    }

    #[test]
    fn test_window_size() {
        assert_eq!(window_size(&GameConfig::default()), Vec2::new(420.0, 460.0));
    }
}
