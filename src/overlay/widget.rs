// SPDX-License-Identifier: GPL-3.0-only

//! Terminal rendering of the feedback overlay
//!
//! The widget composites the mask onto whatever is already in the buffer.
//! It expects the half-block camera frame, where each cell holds two
//! vertical pixels: `▀` with the upper pixel in `fg` and the lower one in
//! `bg`. The pixel viewport of an area is therefore `width × 2·height`.

use super::{OverlayFrame, Viewport};
use ratatui::{buffer::Buffer, layout::Rect, style::Color, widgets::Widget};

const UPPER_HALF_BLOCK: &str = "▀";

/// Pixel viewport covered by a terminal area
pub fn viewport_for_area(area: Rect) -> Viewport {
    Viewport::new(area.width as f32, area.height as f32 * 2.0)
}

/// Dims the buffer outside the cutout
pub struct OverlayWidget<'a> {
    frame: &'a OverlayFrame,
}

impl<'a> OverlayWidget<'a> {
    pub fn new(frame: &'a OverlayFrame) -> Self {
        Self { frame }
    }
}

impl Widget for OverlayWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for row in 0..area.height {
            for col in 0..area.width {
                // Sample at pixel centers
                let x = col as f32 + 0.5;
                let top = self.frame.mask_alpha_at(x, row as f32 * 2.0 + 0.5);
                let bottom = self.frame.mask_alpha_at(x, row as f32 * 2.0 + 1.5);

                if top == 0.0 && bottom == 0.0 {
                    continue;
                }

                let Some(cell) = buf.cell_mut((area.x + col, area.y + row)) else {
                    continue;
                };

                let symbol = cell.symbol();
                let is_half_block = symbol == UPPER_HALF_BLOCK;
                let is_blank = symbol == " ";

                if is_half_block {
                    let (fg, bg) = (cell.fg, cell.bg);
                    cell.set_fg(dim(fg, top));
                    cell.set_bg(dim(bg, bottom));
                } else if is_blank {
                    // Empty cell: split it so both halves get their own coverage
                    let bg = cell.bg;
                    cell.set_char('▀');
                    cell.set_fg(dim(bg, top));
                    cell.set_bg(dim(bg, bottom));
                } else {
                    // Text keeps its glyph; only the background is masked
                    let bg = cell.bg;
                    cell.set_bg(dim(bg, top.max(bottom)));
                }
            }
        }
    }
}

/// Blend a color towards black by `alpha`
fn dim(color: Color, alpha: f32) -> Color {
    let keep = (1.0 - alpha).clamp(0.0, 1.0);
    match color {
        Color::Rgb(r, g, b) => Color::Rgb(
            (r as f32 * keep).round() as u8,
            (g as f32 * keep).round() as u8,
            (b as f32 * keep).round() as u8,
        ),
        // Unknown terminal colors are treated as the black backdrop itself
        _ => Color::Rgb(0, 0, 0),
    }
}
