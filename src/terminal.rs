//! Terminal View
//!
//! [`FormView`] implementation for the command line. The result panel is
//! printed when it becomes visible; alerts go to the error stream.

use serde::Serialize;
use std::io::{self, IsTerminal, Write};
use std::sync::Mutex;

use crate::form::FormView;
use crate::verdict::UiResult;

/// How the result panel is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable panel
    Text,
    /// One JSON object per result
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "table" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format: {}", other)),
        }
    }
}

type Sink = Mutex<Box<dyn Write + Send>>;

/// Terminal-backed form view
pub struct TerminalView {
    out: Sink,
    err: Sink,
    format: OutputFormat,
    color: bool,
    pending: Mutex<Option<UiResult>>,
}

impl TerminalView {
    /// View on stdout/stderr; colors only when stdout is a terminal
    pub fn stdio(format: OutputFormat) -> Self {
        let color = io::stdout().is_terminal();
        Self::new(Box::new(io::stdout()), Box::new(io::stderr()), format, color)
    }

    pub fn new(
        out: Box<dyn Write + Send>,
        err: Box<dyn Write + Send>,
        format: OutputFormat,
        color: bool,
    ) -> Self {
        Self {
            out: Mutex::new(out),
            err: Mutex::new(err),
            format,
            color,
            pending: Mutex::new(None),
        }
    }

    fn write_out(&self, text: &str) {
        if let Ok(mut out) = self.out.lock() {
            // Terminal writes are best effort
            let _ = out.write_all(text.as_bytes());
            let _ = out.flush();
        }
    }

    fn write_err(&self, text: &str) {
        if let Ok(mut err) = self.err.lock() {
            let _ = err.write_all(text.as_bytes());
            let _ = err.flush();
        }
    }

    fn paint(&self, text: &str, hex: &str) -> String {
        match (self.color, hex_to_rgb(hex)) {
            (true, Some((r, g, b))) => format!("\x1b[1;38;2;{};{};{}m{}\x1b[0m", r, g, b, text),
            _ => text.to_string(),
        }
    }

    fn render_panel(&self, result: &UiResult) -> String {
        match self.format {
            OutputFormat::Json => {
                let panel = JsonPanel {
                    label: result.label,
                    color: result.color,
                    icon: result.icon,
                    description: result.description,
                    probability_diabetic: result.probability,
                    risk_score: result.risk_score(),
                    risk_category: result.risk_band.name(),
                    recommendation: result.risk_band.recommendation(),
                };
                match serde_json::to_string(&panel) {
                    Ok(json) => format!("{}\n", json),
                    Err(e) => format!("{{\"error\":\"{}\"}}\n", e),
                }
            }
            OutputFormat::Text => {
                let marker = match result.icon {
                    "notes-medical" => "[+]",
                    _ => "[\u{2665}]",
                };
                format!(
                    "\n{} {}\n{}\n\n  Probability:    {:.1}%\n  Risk category:  {}\n  Recommendation: {}\n\n",
                    self.paint(marker, result.color),
                    self.paint(result.label, result.color),
                    result.description,
                    result.risk_score(),
                    result.risk_band.name(),
                    result.risk_band.recommendation(),
                )
            }
        }
    }
}

#[derive(Serialize)]
struct JsonPanel<'a> {
    label: &'a str,
    color: &'a str,
    icon: &'a str,
    description: &'a str,
    probability_diabetic: f64,
    risk_score: f64,
    risk_category: &'a str,
    recommendation: &'a str,
}

fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

impl FormView for TerminalView {
    fn set_loading(&self, visible: bool) {
        if visible && self.format == OutputFormat::Text {
            self.write_err("Predicting...\n");
        }
    }

    fn set_result_panel(&self, visible: bool) {
        if !visible {
            return;
        }
        let pending = self.pending.lock().ok().and_then(|mut p| p.take());
        if let Some(result) = pending {
            let panel = self.render_panel(&result);
            self.write_out(&panel);
        }
    }

    fn render_result(&self, result: &UiResult) {
        if let Ok(mut pending) = self.pending.lock() {
            *pending = Some(result.clone());
        }
    }

    fn alert(&self, message: &str) {
        self.write_err(&format!("error: {}\n", message));
    }

    fn clear_fields(&self) {
        if self.format == OutputFormat::Text {
            self.write_err("Form cleared.\n");
        }
    }
}
