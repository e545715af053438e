// ABOUTME: Output formatting for CLI feedback.
// ABOUTME: Supports normal, quiet (scripting), and JSON output modes.

use serde::Serialize;
use std::time::Instant;

use crate::view::{self, Row};

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly output with progress messages
    Normal,
    /// Minimal output (only final results)
    Quiet,
    /// JSON lines for scripting
    Json,
}

/// Handles CLI output based on the configured mode.
pub struct Output {
    mode: OutputMode,
    start_time: Option<Instant>,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            start_time: None,
        }
    }

    /// Start timing an operation.
    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Get elapsed time since timer started.
    pub fn elapsed_secs(&self) -> f64 {
        self.start_time
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    /// Print a progress message (suppressed in quiet/json mode).
    pub fn progress(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            println!("{message}");
        }
    }

    /// Print a success message with optional timing.
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => {
                let elapsed = self.elapsed_secs();
                if elapsed > 0.0 {
                    println!("{message} ({:.1}s)", elapsed);
                } else {
                    println!("{message}");
                }
            }
            OutputMode::Quiet => {
                println!("{message}");
            }
            OutputMode::Json => self.emit_stdout("success", message),
        }
    }

    /// Print a non-fatal warning.
    pub fn warn(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => eprintln!("Warning: {message}"),
            OutputMode::Quiet => {}
            OutputMode::Json => self.emit_stderr("warning", message),
        }
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => {
                eprintln!("Error: {message}");
            }
            OutputMode::Json => self.emit_stderr("error", message),
        }
    }

    /// Print the image list.
    pub fn rows(&self, rows: &[Row]) {
        match self.mode {
            OutputMode::Normal => print!("{}", with_newline(view::render_text(rows))),
            OutputMode::Quiet => {
                for row in rows {
                    println!("{}\t{}", row.id, row.url);
                }
            }
            OutputMode::Json => {
                if let Ok(json) = serde_json::to_string(rows) {
                    println!("{json}");
                }
            }
        }
    }

    /// Print one value per line, or a JSON array in json mode.
    pub fn list(&self, items: &[String]) {
        if self.mode == OutputMode::Json {
            if let Ok(json) = serde_json::to_string(items) {
                println!("{json}");
            }
        } else {
            for item in items {
                println!("{item}");
            }
        }
    }

    fn event<'a>(&self, event: &'a str, message: &'a str) -> JsonEvent<'a> {
        JsonEvent {
            event,
            message,
            duration_secs: if self.start_time.is_some() {
                Some(self.elapsed_secs())
            } else {
                None
            },
        }
    }

    fn emit_stdout(&self, event: &str, message: &str) {
        if let Ok(json) = serde_json::to_string(&self.event(event, message)) {
            println!("{json}");
        }
    }

    fn emit_stderr(&self, event: &str, message: &str) {
        if let Ok(json) = serde_json::to_string(&self.event(event, message)) {
            eprintln!("{json}");
        }
    }
}

fn with_newline(mut text: String) -> String {
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    event: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}
