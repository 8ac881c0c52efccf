// SPDX-License-Identifier: GPL-3.0-only

//! Terminal check-in screen
//!
//! Renders the camera feed to the terminal using Unicode half-block
//! characters for improved vertical resolution, with the feedback overlay
//! composited on top. The screen model runs on this thread; its tasks run
//! on a tokio runtime and come back as messages.

use crate::app::{AppModel, CaptureState, Message, StatusKind, Task};
use crate::backends::camera::{CameraFrame, create_platform};
use crate::config::Config;
use crate::constants::terminal as tc;
use crate::fl;
use crate::overlay::CutoutLayout;
use crate::overlay::widget::{OverlayWidget, viewport_for_area};
use crate::surface::SurfaceView;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{
        EnterAlternateScreen, LeaveAlternateScreen, SetTitle, disable_raw_mode, enable_raw_mode,
    },
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Text},
    widgets::{Paragraph, Widget, Wrap},
};
use std::io::{self, stdout};
use std::time::Instant;
use tokio::runtime::Runtime;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

/// Run the terminal check-in screen
pub fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = Runtime::new()?;
    let platform = create_platform(&config)?;

    // Half-block pixels are far coarser than screen pixels
    let layout = CutoutLayout {
        vertical_offset: tc::VERTICAL_OFFSET,
        ..CutoutLayout::default()
    };
    let mirror = config.mirror_preview;
    let mut model = AppModel::with_layout(config, platform, layout);

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, SetTitle(fl!("app-title")))?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let result = run_app(&mut terminal, &runtime, &mut model, mirror);

    // Late capture results are discarded; nothing left to run
    drop(model.update(Message::Unmount));

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Run tasks on the runtime, delivering their messages to `sender`
fn spawn_tasks(runtime: &Runtime, sender: &UnboundedSender<Message>, tasks: Vec<Task>) {
    for task in tasks {
        let sender = sender.clone();
        runtime.spawn(async move {
            // Receiver is gone only once the UI loop has exited
            let _ = sender.send(task.await);
        });
    }
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    runtime: &Runtime,
    model: &mut AppModel,
    mirror: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (sender, mut receiver) = tokio::sync::mpsc::unbounded_channel();
    spawn_tasks(runtime, &sender, model.init());

    let mut frame_widget = FrameWidget::new(mirror);
    let mut camera_area = Rect::default();

    loop {
        // Drain task results before advancing animations
        while let Ok(message) = receiver.try_recv() {
            let tasks = model.update(message);
            spawn_tasks(runtime, &sender, tasks);
        }

        let size = terminal.size()?;
        let area = Rect::new(0, 0, size.width, size.height);
        let (next_camera_area, status_area) = split_status_row(area);
        if next_camera_area != camera_area {
            camera_area = next_camera_area;
            debug!(width = camera_area.width, height = camera_area.height, "Terminal resized");
            model.update(Message::Resized(viewport_for_area(camera_area)));
        }

        let tasks = model.update(Message::Tick(Instant::now()));
        spawn_tasks(runtime, &sender, tasks);

        if let Some(frame) = model.preview_frame() {
            frame_widget.update_frame(frame);
        }

        let status = status_line(model);
        let status_kind = model
            .status()
            .map(|status| status.kind)
            .unwrap_or(StatusKind::Info);

        terminal.draw(|f| {
            match model.surface_view() {
                SurfaceView::Live => {
                    f.render_widget(&frame_widget, camera_area);
                    if let Some(overlay) = model.overlay_frame() {
                        f.render_widget(OverlayWidget::new(&overlay), camera_area);
                    }
                }
                SurfaceView::Pending => f.render_widget(
                    Placeholder {
                        message: fl!("status-starting-camera"),
                    },
                    camera_area,
                ),
                SurfaceView::PermissionDenied => f.render_widget(PermissionNotice, camera_area),
            }

            f.render_widget(
                StatusBar {
                    message: &status,
                    kind: status_kind,
                },
                status_area,
            );
        })?;

        // Handle input with timeout for frame updates
        if event::poll(tc::TICK_INTERVAL)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            // Ctrl+C to quit
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                break;
            }

            let message = match key.code {
                KeyCode::Char(' ') | KeyCode::Char('p') => Some(Message::CapturePressed),
                KeyCode::Char('o') => Some(Message::ToggleOverlay),
                KeyCode::Char('h') => Some(Message::ToggleHelp),
                KeyCode::Char('q') => break,
                _ => None,
            };

            if let Some(message) = message {
                let tasks = model.update(message);
                spawn_tasks(runtime, &sender, tasks);
            }
        }
    }

    info!("Terminal check-in screen closed");
    Ok(())
}

/// Reserve the bottom line for status
fn split_status_row(area: Rect) -> (Rect, Rect) {
    let camera_area = Rect {
        x: area.x,
        y: area.y,
        width: area.width,
        height: area.height.saturating_sub(1),
    };
    let status_area = Rect {
        x: area.x,
        y: area.y + area.height.saturating_sub(1),
        width: area.width,
        height: area.height.min(1),
    };
    (camera_area, status_area)
}

/// Text for the status bar
fn status_line(model: &AppModel) -> String {
    if let Some(status) = model.status() {
        return status.text.clone();
    }
    if model.show_help() {
        return fl!("help-keys");
    }

    match (model.surface_view(), model.capture_state()) {
        (SurfaceView::PermissionDenied, _) => fl!("permission-denied-title"),
        (SurfaceView::Pending, _) => fl!("status-waiting-permission"),
        (SurfaceView::Live, CaptureState::Pending { .. }) => fl!("status-capturing"),
        (SurfaceView::Live, CaptureState::Submitting { .. }) => fl!("status-submitting"),
        (SurfaceView::Live, CaptureState::Idle) => fl!("status-ready"),
    }
}

/// Widget that renders a camera frame using half-block characters
struct FrameWidget {
    frame: Option<CameraFrame>,
    mirror: bool,
}

impl FrameWidget {
    fn new(mirror: bool) -> Self {
        Self {
            frame: None,
            mirror,
        }
    }

    fn update_frame(&mut self, frame: CameraFrame) {
        self.frame = Some(frame);
    }
}

impl Widget for &FrameWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(frame) = &self.frame else {
            Placeholder {
                message: fl!("status-starting-camera"),
            }
            .render(area, buf);
            return;
        };

        if frame.width == 0 || frame.height == 0 || area.width == 0 || area.height == 0 {
            return;
        }

        // Calculate display dimensions maintaining aspect ratio
        // Each terminal cell displays 2 vertical pixels using half-block characters
        let frame_aspect = frame.width as f64 / frame.height as f64;
        let term_width = area.width as f64;
        let term_height = (area.height * 2) as f64; // *2 because half-blocks

        let (display_width, display_height) = if term_width / term_height > frame_aspect {
            // Terminal is wider - fit to height
            let h = term_height;
            let w = h * frame_aspect;
            (w as u16, (h / 2.0) as u16)
        } else {
            // Terminal is taller - fit to width
            let w = term_width;
            let h = w / frame_aspect;
            (w as u16, (h / 2.0) as u16)
        };

        if display_width == 0 || display_height == 0 {
            return;
        }

        // Center the image
        let x_offset = area.x + (area.width.saturating_sub(display_width)) / 2;
        let y_offset = area.y + (area.height.saturating_sub(display_height)) / 2;

        // Scale factors
        let x_scale = frame.width as f64 / display_width as f64;
        let y_scale = frame.height as f64 / (display_height * 2) as f64;

        // Upper half (▀) colored with fg, lower half with bg
        for ty in 0..display_height {
            for tx in 0..display_width {
                let term_x = x_offset + tx;
                let term_y = y_offset + ty;

                if term_x >= area.x + area.width || term_y >= area.y + area.height {
                    continue;
                }

                let column = if self.mirror {
                    display_width - 1 - tx
                } else {
                    tx
                };
                let src_x = (column as f64 * x_scale) as u32;
                let src_y_top = (ty as f64 * 2.0 * y_scale) as u32;
                let src_y_bottom = ((ty as f64 * 2.0 + 1.0) * y_scale) as u32;

                let top_color = sample_pixel(frame, src_x, src_y_top);
                let bottom_color = sample_pixel(frame, src_x, src_y_bottom);

                if let Some(cell) = buf.cell_mut((term_x, term_y)) {
                    cell.set_char('▀');
                    cell.set_fg(top_color);
                    cell.set_bg(bottom_color);
                }
            }
        }
    }
}

fn sample_pixel(frame: &CameraFrame, x: u32, y: u32) -> Color {
    let (r, g, b) = frame.pixel_rgb(x, y);
    Color::Rgb(r, g, b)
}

/// Centered single-line message
struct Placeholder {
    message: String,
}

impl Widget for Placeholder {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let width = self.message.chars().count() as u16;
        let x = area.x + (area.width.saturating_sub(width)) / 2;
        let y = area.y + area.height / 2;
        if y < area.y + area.height && x < area.x + area.width {
            buf.set_string(x, y, &self.message, Style::default());
        }
    }
}

/// Static explanation shown instead of the preview
struct PermissionNotice;

impl Widget for PermissionNotice {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let text = Text::from(vec![
            Line::styled(
                fl!("permission-denied-title"),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Line::default(),
            Line::from(fl!("permission-denied-body")),
        ]);

        // Vertically center the three lines, leaving room to wrap
        let top = area.y + area.height.saturating_sub(4) / 2;
        let body_area = Rect {
            x: area.x + 2.min(area.width),
            y: top,
            width: area.width.saturating_sub(4),
            height: area.height.saturating_sub(top - area.y),
        };

        Paragraph::new(text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(body_area, buf);
    }
}

/// Status bar widget
struct StatusBar<'a> {
    message: &'a str,
    kind: StatusKind,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bg = match self.kind {
            StatusKind::Info => Color::DarkGray,
            StatusKind::Error => Color::Red,
        };

        // Fill background
        for x in area.x..area.x + area.width {
            if let Some(cell) = buf.cell_mut((x, area.y)) {
                cell.set_char(' ');
                cell.set_bg(bg);
            }
        }

        // Truncate on a char boundary
        let text: String = self.message.chars().take(area.width as usize).collect();

        buf.set_string(area.x, area.y, text, Style::default().fg(Color::White).bg(bg));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::PixelFormat;

    #[test]
    fn test_status_row_split() {
        let (camera, status) = split_status_row(Rect::new(0, 0, 80, 24));
        assert_eq!(camera.height, 23);
        assert_eq!(status.y, 23);
        assert_eq!(status.height, 1);
    }

    #[test]
    fn test_frame_widget_mirrors() {
        // Left half red, right half blue
        let mut data = Vec::new();
        for _ in 0..2 {
            data.extend_from_slice(&[255, 0, 0, 0, 0, 255]);
        }
        let frame = CameraFrame::new(2, 2, PixelFormat::RGB24, data);

        let area = Rect::new(0, 0, 2, 1);
        let mut widget = FrameWidget::new(true);
        widget.update_frame(frame);

        let mut buf = Buffer::empty(area);
        (&widget).render(area, &mut buf);

        let left = buf.cell((0, 0)).expect("cell");
        assert_eq!(left.fg, Color::Rgb(0, 0, 255));
    }

    #[test]
    fn test_status_bar_truncates_on_char_boundary() {
        let area = Rect::new(0, 0, 3, 1);
        let mut buf = Buffer::empty(area);
        StatusBar {
            message: "Capturing…",
            kind: StatusKind::Info,
        }
        .render(area, &mut buf);
        assert_eq!(buf.cell((2, 0)).expect("cell").symbol(), "p");
    }
}
