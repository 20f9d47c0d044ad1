// SPDX-License-Identifier: GPL-3.0-only

//! Terminal scanner UI
//!
//! Renders the camera feed with Unicode half-block characters for improved
//! vertical resolution, alongside the scan state, the current result and the
//! scan history. Key presses are translated into engine intents.

use crate::backends::camera::types::{CameraFrame, PixelFormat};
use crate::backends::camera::{CameraStream, enumerate_cameras, select_device};
use crate::config::Config;
use crate::constants::POLL_INTERVAL;
use crate::errors::CameraError;
use crate::feedback::Beeper;
use crate::scan::{ScanEngine, ScanState};

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};
use std::io::{self, stdout};
use std::sync::Arc;
use tracing::{info, warn};

/// Width of the results side panel in terminal cells
const PANEL_WIDTH: u16 = 34;

/// Run the terminal scanner
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    // Engine decode/cooldown tasks need a runtime for the whole session
    let runtime = tokio::runtime::Runtime::new()?;
    let _guard = runtime.enter();

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let result = run_app(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn open_camera(config: &Config) -> Option<CameraStream> {
    let cameras = enumerate_cameras();
    let Some(device) = select_device(&cameras, config.facing) else {
        warn!(error = %CameraError::NoCameraFound, "Camera unavailable");
        return None;
    };

    match CameraStream::open(device) {
        Ok(stream) => {
            info!(device = %device.name, "Camera opened");
            Some(stream)
        }
        Err(e) => {
            warn!(device = %device.name, error = %e, "Failed to open camera");
            None
        }
    }
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load();
    let mut engine = ScanEngine::new(config.settings(), Some(Arc::new(Beeper)));

    let mut camera = open_camera(&config);
    if let Some(stream) = &camera {
        config.last_camera_path = Some(stream.device_path.clone());
    }

    let mut frame_widget = FrameWidget::new();
    let mut show_help = false;

    loop {
        // Latest frame only; the capture channel drops the rest
        if let Some(stream) = &mut camera
            && let Some(frame) = stream.latest_frame()
        {
            engine.process_frame(frame.clone());
            frame_widget.update_frame(frame);
        }

        // Apply decode completions and cooldown expiries
        engine.poll();

        // Draw
        terminal.draw(|f| {
            let area = f.area();

            let panel_width = PANEL_WIDTH.min(area.width / 2);
            let preview_area = Rect {
                x: area.x,
                y: area.y,
                width: area.width.saturating_sub(panel_width),
                height: area.height.saturating_sub(1),
            };
            let panel_area = Rect {
                x: area.x + area.width.saturating_sub(panel_width),
                y: area.y,
                width: panel_width,
                height: area.height.saturating_sub(1),
            };
            let status_area = Rect {
                x: area.x,
                y: area.height.saturating_sub(1),
                width: area.width,
                height: 1,
            };

            f.render_widget(&frame_widget, preview_area);
            f.render_widget(ResultPanel { engine: &engine }, panel_area);
            f.render_widget(
                StatusBar {
                    message: &status_message(&engine, camera.is_some(), show_help),
                },
                status_area,
            );
        })?;

        // Handle input with timeout for frame updates
        if event::poll(POLL_INTERVAL)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            // Ctrl+C to quit
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                break;
            }

            match key.code {
                KeyCode::Char('q') => break,

                // Start/stop scanning
                KeyCode::Char(' ') | KeyCode::Enter => {
                    show_help = false;
                    match engine.state() {
                        ScanState::Idle if camera.is_some() => engine.start_scanning(),
                        ScanState::Idle => {} // no camera, cannot proceed
                        _ => engine.stop_scanning(),
                    }
                }

                // Switch decoding backend
                KeyCode::Char('b') => {
                    show_help = false;
                    engine.set_backend(engine.settings().backend.toggled());
                }

                // Switch camera facing (reopens the capture stream)
                KeyCode::Char('f') => {
                    show_help = false;
                    let facing = engine.settings().facing.toggled();
                    engine.set_facing(facing);
                    engine.stop_scanning();
                    config.facing = facing;

                    drop(camera.take());
                    camera = open_camera(&config);
                    if let Some(stream) = &camera {
                        config.last_camera_path = Some(stream.device_path.clone());
                    }
                    frame_widget = FrameWidget::new(); // Clear old frame
                }

                // Clear the published result
                KeyCode::Char('x') => {
                    engine.clear_result();
                }

                KeyCode::Char('h') => {
                    show_help = !show_help;
                }

                _ => {}
            }
        }
    }

    // Persist settings picked during the session
    config.backend = engine.settings().backend;
    config.facing = engine.settings().facing;
    if let Err(e) = config.save() {
        warn!(error = %e, "Failed to save config");
    }

    Ok(())
}

fn status_message(engine: &ScanEngine, has_camera: bool, show_help: bool) -> String {
    if show_help {
        return "space: Start/stop | b: Backend | f: Facing | x: Clear result | h: Toggle help | q/Ctrl+C: Quit".to_string();
    }

    if !has_camera {
        // Persistent cannot-proceed state; scanning is unavailable until a
        // camera shows up on a restart or facing switch
        return "No camera available - connect one and press 'f' to retry | 'q' quit".to_string();
    }

    let settings = engine.settings();
    format!(
        "[{}] {} | {} camera | space scan | 'b' backend | 'f' facing | 'h' help | 'q' quit",
        engine.state().display_name(),
        settings.backend.display_name(),
        settings.facing.display_name(),
    )
}

/// Widget that renders a camera frame using half-block characters
struct FrameWidget {
    frame: Option<CameraFrame>,
}

impl FrameWidget {
    fn new() -> Self {
        Self { frame: None }
    }

    fn update_frame(&mut self, frame: CameraFrame) {
        self.frame = Some(frame);
    }
}

impl Widget for &FrameWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(frame) = &self.frame else {
            // No frame yet - show placeholder
            let msg = "Waiting for camera...";
            let x = area.x + (area.width.saturating_sub(msg.len() as u16)) / 2;
            let y = area.y + area.height / 2;
            if y < area.y + area.height && x < area.x + area.width {
                buf.set_string(x, y, msg, Style::default());
            }
            return;
        };

        // Each terminal cell displays 2 vertical pixels using half-blocks
        let frame_aspect = frame.width as f64 / frame.height as f64;
        let term_width = area.width as f64;
        let term_height = (area.height * 2) as f64;

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

        // Center the image
        let x_offset = area.x + (area.width.saturating_sub(display_width)) / 2;
        let y_offset = area.y + (area.height.saturating_sub(display_height)) / 2;

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

                let src_x = (tx as f64 * x_scale) as u32;
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
    let (r, g, b) = sample_pixel_rgb(frame, x, y);
    Color::Rgb(r, g, b)
}

fn sample_pixel_rgb(frame: &CameraFrame, x: u32, y: u32) -> (u8, u8, u8) {
    let x = x.min(frame.width - 1);
    let y = y.min(frame.height - 1);
    let data = frame.data_slice();

    match frame.format {
        PixelFormat::Rgba => {
            let idx = (y * frame.stride + x * 4) as usize;
            if idx + 2 < data.len() {
                (data[idx], data[idx + 1], data[idx + 2])
            } else {
                (0, 0, 0)
            }
        }
        PixelFormat::Rgb24 => {
            let idx = (y * frame.stride + x * 3) as usize;
            if idx + 2 < data.len() {
                (data[idx], data[idx + 1], data[idx + 2])
            } else {
                (0, 0, 0)
            }
        }
        PixelFormat::Gray8 => {
            let idx = (y * frame.stride + x) as usize;
            if idx < data.len() {
                let v = data[idx];
                (v, v, v)
            } else {
                (0, 0, 0)
            }
        }
        PixelFormat::Yuyv => {
            // Packed 4:2:2: two pixels share chroma (Y0 U Y1 V)
            let pair_x = (x & !1) as usize;
            let base = (y as usize) * (frame.stride as usize) + pair_x * 2;
            if base + 3 >= data.len() {
                return (0, 0, 0);
            }
            let luma = if x & 1 == 0 {
                data[base]
            } else {
                data[base + 2]
            };
            yuv_to_rgb(luma, data[base + 1], data[base + 3])
        }
    }
}

/// Convert YUV (BT.601) to RGB
fn yuv_to_rgb(y: u8, u: u8, v: u8) -> (u8, u8, u8) {
    let y = y as f32;
    let u = u as f32 - 128.0;
    let v = v as f32 - 128.0;

    let r = (y + 1.402 * v).clamp(0.0, 255.0) as u8;
    let g = (y - 0.344136 * u - 0.714136 * v).clamp(0.0, 255.0) as u8;
    let b = (y + 1.772 * u).clamp(0.0, 255.0) as u8;

    (r, g, b)
}

/// Side panel: scan state, current result, history
struct ResultPanel<'a> {
    engine: &'a ScanEngine,
}

impl Widget for ResultPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 8 || area.height < 4 {
            return;
        }

        let mut y = area.y;
        let width = area.width as usize;

        let mut line = |buf: &mut Buffer, y: &mut u16, text: &str, style: Style| {
            if *y >= area.y + area.height {
                return;
            }
            let clipped: String = text.chars().take(width).collect();
            buf.set_string(area.x, *y, clipped, style);
            *y += 1;
        };

        let state = self.engine.state();
        let state_style = match state {
            ScanState::Idle => Style::default().fg(Color::DarkGray),
            ScanState::Scanning => Style::default().fg(Color::Green),
            ScanState::Paused => Style::default().fg(Color::Yellow),
        };
        line(
            buf,
            &mut y,
            &format!(" State: {}", state.display_name()),
            state_style.add_modifier(Modifier::BOLD),
        );
        y += 1;

        match self.engine.result() {
            Some(result) => {
                line(
                    buf,
                    &mut y,
                    &format!(" {} [{}]", result.action().label(), result.format),
                    Style::default().fg(Color::Cyan),
                );
                line(
                    buf,
                    &mut y,
                    &format!(" {}", result.text),
                    Style::default().add_modifier(Modifier::BOLD),
                );
            }
            None => {
                line(
                    buf,
                    &mut y,
                    " No result",
                    Style::default().fg(Color::DarkGray),
                );
                y += 1;
            }
        }
        y += 1;

        line(
            buf,
            &mut y,
            " History",
            Style::default().add_modifier(Modifier::UNDERLINED),
        );

        for entry in self.engine.history() {
            if y >= area.y + area.height {
                break;
            }
            line(
                buf,
                &mut y,
                &format!(
                    " {} {:>9} {}",
                    entry.scanned_at.format("%H:%M:%S"),
                    entry.format,
                    entry.text
                ),
                Style::default(),
            );
        }
    }
}

/// Status bar widget
struct StatusBar<'a> {
    message: &'a str,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Fill background
        for x in area.x..area.x + area.width {
            if let Some(cell) = buf.cell_mut((x, area.y)) {
                cell.set_char(' ');
                cell.set_bg(Color::DarkGray);
            }
        }

        let text: String = self.message.chars().take(area.width as usize).collect();

        buf.set_string(
            area.x,
            area.y,
            text,
            Style::default().fg(Color::White).bg(Color::DarkGray),
        );
    }
}
