/// Terminal stand-in for the LED string
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal,
};
use ledcube_core::color::unpack_rgb;
use ledcube_core::{Error, LedDriver, PanelLayout, Result};
use std::io::{self, stdout, Stdout, Write};
use std::time::{Duration, Instant};

/// Glyph for one LED; two columns keep pixels roughly square
const LIT: &str = "██";
const DARK: &str = "··";

/// Terminal column of panel column `x`; far columns pile up at the edge
fn column(x: u32) -> u16 {
    u16::try_from(x).unwrap_or(u16::MAX).saturating_mul(2)
}

/// Terminal row of panel row `y`, below the status line
fn row(y: u32) -> u16 {
    u16::try_from(y).unwrap_or(u16::MAX).saturating_add(1)
}

fn hardware(e: io::Error) -> Error {
    Error::Hardware(format!("terminal: {}", e))
}

/// Draws the LED buffer as colored blocks, unmapping the wiring order back
/// to panel coordinates.
pub struct TerminalPreview<W: Write> {
    out: W,
    layout: PanelLayout,
    brightness: u8,
    leds: Vec<u32>,
    /// Raw mode, alternate screen and keyboard polling on the real terminal
    interactive: bool,
    active: bool,
    frames: u64,
    last_fps: Instant,
    fps_frames: u32,
    fps: f32,
}

impl TerminalPreview<Stdout> {
    pub fn stdout(layout: PanelLayout, brightness: u8) -> Self {
        Self {
            interactive: true,
            ..Self::new(stdout(), layout, brightness)
        }
    }
}

impl<W: Write> TerminalPreview<W> {
    /// Preview writing plain escape sequences to `out`
    pub fn new(out: W, layout: PanelLayout, brightness: u8) -> Self {
        Self {
            out,
            layout,
            brightness,
            leds: vec![0; layout.len()],
            interactive: false,
            active: false,
            frames: 0,
            last_fps: Instant::now(),
            fps_frames: 0,
            fps: 0.0,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn scale(&self, channel: u8) -> u8 {
        (channel as u16 * self.brightness as u16 / 255) as u8
    }

    fn draw(&mut self) -> io::Result<()> {
        for (index, &packed) in self.leds.iter().enumerate() {
            let Some((x, y)) = self.layout.coordinates(index) else {
                break;
            };
            let [r, g, b] = unpack_rgb(packed).0;
            queue!(self.out, cursor::MoveTo(column(x), row(y)))?;
            if packed == 0 {
                queue!(self.out, SetForegroundColor(Color::DarkGrey), Print(DARK))?;
            } else {
                let color = Color::Rgb {
                    r: self.scale(r),
                    g: self.scale(g),
                    b: self.scale(b),
                };
                queue!(self.out, SetForegroundColor(color), Print(LIT))?;
            }
        }

        queue!(
            self.out,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "ledcube {}x{} | frame {} | FPS: {:.1} | Q=Quit",
                self.layout.width(),
                self.layout.height(),
                self.frames,
                self.fps
            )),
            ResetColor
        )?;
        self.out.flush()
    }

    fn update_fps(&mut self) {
        self.frames += 1;
        self.fps_frames += 1;
        let now = Instant::now();
        if (now - self.last_fps).as_secs() >= 1 {
            self.fps = self.fps_frames as f32 / (now - self.last_fps).as_secs_f32();
            self.fps_frames = 0;
            self.last_fps = now;
        }
    }
}

impl<W: Write> LedDriver for TerminalPreview<W> {
    fn init(&mut self) -> Result<()> {
        if self.interactive {
            terminal::enable_raw_mode().map_err(hardware)?;
            execute!(
                self.out,
                terminal::EnterAlternateScreen,
                terminal::Clear(terminal::ClearType::All),
                cursor::Hide
            )
            .map_err(hardware)?;
        }
        self.active = true;
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        if !self.active {
            return Err(Error::Hardware("preview is not initialized".to_string()));
        }
        self.update_fps();
        self.draw().map_err(hardware)
    }

    fn wait(&mut self) -> Result<()> {
        self.out.flush().map_err(hardware)
    }

    fn finalize(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if self.interactive {
            // Nothing left to report to if restoring the terminal fails.
            let _ = execute!(self.out, ResetColor, terminal::LeaveAlternateScreen, cursor::Show);
            let _ = terminal::disable_raw_mode();
        }
    }

    fn leds(&mut self, channel: usize) -> Result<&mut [u32]> {
        match channel {
            0 => Ok(self.leds.as_mut_slice()),
            _ => Err(Error::Hardware(format!("no channel {}", channel))),
        }
    }

    fn stop_requested(&mut self) -> bool {
        if !self.interactive {
            return false;
        }
        while let Ok(true) = event::poll(Duration::from_millis(0)) {
            match event::read() {
                Ok(Event::Key(KeyEvent {
                    code,
                    modifiers,
                    kind: KeyEventKind::Press,
                    ..
                })) => match code {
                    KeyCode::Char('q') | KeyCode::Esc => return true,
                    KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                        return true
                    }
                    _ => {}
                },
                Ok(_) => {}
                Err(e) => {
                    log::warn!("failed to read terminal event: {}", e);
                    return true;
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draws_unmapped_pixels() {
        let layout = PanelLayout::single(2, 2).unwrap();
        let mut preview = TerminalPreview::new(Vec::new(), layout, 255);
        preview.init().unwrap();
        // Index 2 is the bottom of column 1, which runs upwards.
        preview.leds(0).unwrap()[2] = 0xFF0000;
        preview.render().unwrap();
        preview.finalize();

        let out = String::from_utf8(preview.into_inner()).unwrap();
        assert_eq!(out.matches(LIT).count(), 1);
        assert_eq!(out.matches(DARK).count(), 3);
        // Panel (1, 1) sits below the status line at 1-based cell (3, 3).
        let red = "\u{1b}[3;3H\u{1b}[38;2;255;0;0m";
        assert!(out.contains(red), "{:?}", out);
    }

    #[test]
    fn test_brightness_scales_colors() {
        let layout = PanelLayout::single(1, 1).unwrap();
        let mut preview = TerminalPreview::new(Vec::new(), layout, 128);
        preview.init().unwrap();
        preview.leds(0).unwrap()[0] = 0xFFFFFF;
        preview.render().unwrap();
        let out = String::from_utf8(preview.into_inner()).unwrap();
        assert!(out.contains("38;2;128;128;128"));
    }

    #[test]
    fn test_wide_panel_stays_addressable() {
        assert_eq!(column(3), 6);
        assert_eq!(column(40_000), u16::MAX);
        assert_eq!(row(u32::MAX), u16::MAX);

        let layout = PanelLayout::single(40_000, 1).unwrap();
        let mut preview = TerminalPreview::new(Vec::new(), layout, 255);
        preview.init().unwrap();
        preview.leds(0).unwrap()[39_999] = 0x00FF00;
        preview.render().unwrap();
        let out = String::from_utf8(preview.into_inner()).unwrap();
        assert_eq!(out.matches(LIT).count(), 1);
    }

    #[test]
    fn test_render_before_init_fails() {
        let layout = PanelLayout::single(1, 1).unwrap();
        let mut preview = TerminalPreview::new(Vec::new(), layout, 255);
        assert!(matches!(preview.render(), Err(Error::Hardware(_))));
        assert!(preview.leds(1).is_err());
    }
}
