//! Saves the final state of a round as a PNG file.

use std::path::{Path, PathBuf};

use anyhow::Context;
use image::{Rgb, RgbImage};
use log::info;

use crate::{
    config::GameConfig,
    grid::Grid,
    session::{GameSession, Overlay, OverlayKind},
};

/// Draws the grid and its overlays with the configured cell size and palette. The top margin is
/// left in the background color.
pub fn render(grid: &Grid, overlays: &[Overlay<'_>], config: &GameConfig) -> RgbImage {
    let (width, height) = config.canvas_size();
    let palette = &config.palette;
    let mut img = RgbImage::from_pixel(width, height, Rgb(palette.background));

    for (point, cell) in grid.iter() {
        let color = if cell.is_passable() {
            palette.passable
        } else {
            palette.blocked
        };
        fill_cell(&mut img, config, config.cell_origin(point), color);
    }

    for overlay in overlays {
        let color = match overlay.kind {
            OverlayKind::PlayerPath => palette.player_path,
            OverlayKind::AiPath => palette.ai_path,
            OverlayKind::Player => palette.player,
            OverlayKind::Goal => palette.goal,
        };
        for point in overlay.cells {
            fill_cell(&mut img, config, config.cell_origin(*point), color);
        }
    }

    img
}

fn fill_cell(img: &mut RgbImage, config: &GameConfig, (x0, y0): (u32, u32), color: [u8; 3]) {
    let x1 = (x0 + config.cell_size).min(img.width());
    let y1 = (y0 + config.cell_size).min(img.height());
    for y in y0..y1 {
        for x in x0..x1 {
            img.put_pixel(x, y, Rgb(color));
        }
    }
}

pub fn save_png(img: &RgbImage, path: &Path) -> anyhow::Result<()> {
    img.save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("failed to write snapshot to {}", path.display()))
}

/// Renders the session as it is now and writes it to the snapshot file of `round`
pub fn save_round(
    session: &GameSession,
    config: &GameConfig,
    round: usize,
) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "failed to create snapshot directory {}",
            config.output_dir.display()
        )
    })?;

    let path = config.snapshot_path(round);
    let img = render(session.grid(), &session.overlays(), config);
    save_png(&img, &path)?;

    info!("saved snapshot of round {} to {}", round, path.display());
    Ok(path)
}
