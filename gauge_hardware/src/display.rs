//! Text stand-in for the LED matrix.

use std::io::Write;

use gauge_traits::DisplaySurface;

type DrawResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Canvas {
    digits: Option<(u16, u16)>,
    label: Option<String>,
}

impl Canvas {
    fn is_blank(&self) -> bool {
        self.digits.is_none() && self.label.is_none()
    }

    fn line(&self) -> String {
        let mut out = String::new();
        if let Some((value, hue)) = self.digits {
            out.push_str(&format!("{value:>3}"));
            if let Some(label) = &self.label {
                out.push(' ');
                out.push_str(label);
            }
            out.push_str(&format!(" (hue {hue})"));
        } else if let Some(label) = &self.label {
            out.push_str(label);
        }
        out
    }
}

/// Writes one line per presented frame that differs from the previous one.
/// Blank presents (the second half of the double buffer) print nothing.
pub struct TerminalDisplay<W: Write> {
    out: W,
    canvas: Canvas,
    last_line: Option<String>,
    presented: u64,
}

impl<W: Write> TerminalDisplay<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            canvas: Canvas::default(),
            last_line: None,
            presented: 0,
        }
    }

    /// Non-blank frames presented so far.
    pub fn presented(&self) -> u64 {
        self.presented
    }

    pub fn last_line(&self) -> Option<&str> {
        self.last_line.as_deref()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> DisplaySurface for TerminalDisplay<W> {
    fn clear(&mut self) -> DrawResult {
        self.canvas = Canvas::default();
        Ok(())
    }

    fn draw_digits(&mut self, value: u16, hue: u16) -> DrawResult {
        self.canvas.digits = Some((value, hue));
        Ok(())
    }

    fn draw_label(&mut self, text: &str) -> DrawResult {
        self.canvas.label = Some(text.to_string());
        Ok(())
    }

    fn present(&mut self) -> DrawResult {
        if self.canvas.is_blank() {
            return Ok(());
        }
        self.presented += 1;
        let line = self.canvas.line();
        if self.last_line.as_deref() != Some(line.as_str()) {
            writeln!(self.out, "{line}").map_err(crate::error::HwError::from)?;
            self.out.flush().map_err(crate::error::HwError::from)?;
            self.last_line = Some(line);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(d: &mut TerminalDisplay<Vec<u8>>, value: u16, hue: u16) {
        d.clear().unwrap();
        d.draw_digits(value, hue).unwrap();
        d.draw_label("Gal").unwrap();
        d.present().unwrap();
        d.clear().unwrap();
        d.present().unwrap();
    }

    #[test]
    fn repeated_frames_print_once() {
        let mut d = TerminalDisplay::new(Vec::new());
        frame(&mut d, 42, 316);
        frame(&mut d, 42, 316);
        frame(&mut d, 7, 372);
        assert_eq!(d.presented(), 3);
        let text = String::from_utf8(d.into_inner()).unwrap();
        assert_eq!(text, " 42 Gal (hue 316)\n  7 Gal (hue 372)\n");
    }

    #[test]
    fn label_only_frame() {
        let mut d = TerminalDisplay::new(Vec::new());
        d.draw_label("SAVED").unwrap();
        d.present().unwrap();
        assert_eq!(d.last_line(), Some("SAVED"));
    }
}
