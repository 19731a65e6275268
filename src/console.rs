//! Terminal front end.
//!
//! Prints each step's status line and output as the chain progresses, and
//! asks for feedback once the page is written.

use crate::pipeline::{ChainObserver, ChainStep};
use std::io::{BufRead, IsTerminal, Write};
use std::path::Path;

pub struct ConsoleObserver {
    feedback: Option<String>,
    interactive: bool,
    streaming: bool,
}

impl ConsoleObserver {
    /// `feedback` from the command line wins; otherwise stdin is asked when
    /// it is a terminal and `allow_prompt` is set.
    pub fn new(feedback: Option<String>, allow_prompt: bool, streaming: bool) -> Self {
        Self {
            feedback,
            interactive: allow_prompt && std::io::stdin().is_terminal(),
            streaming,
        }
    }

    fn prompt_feedback(&self) -> Option<String> {
        print!("\nAsk a question or provide feedback (enter to finish): ");
        let _ = std::io::stdout().flush();
        let mut line = String::new();
        match std::io::stdin().lock().read_line(&mut line) {
            Ok(_) => Some(line.trim().to_string()).filter(|l| !l.is_empty()),
            Err(e) => {
                log::warn!("[CONSOLE] Failed to read feedback: {}", e);
                None
            }
        }
    }
}

/// Print streamed deltas straight to stdout.
pub fn stdout_delta_sink() -> crate::llm::DeltaSink {
    Box::new(|delta: &str| {
        let mut out = std::io::stdout().lock();
        let _ = out.write_all(delta.as_bytes());
        let _ = out.flush();
    })
}

/// Format HTML output as a fenced block for the terminal.
pub fn render_code(html: &str) -> String {
    format!("```html\n{}\n```", html.trim_end())
}

/// The single user-facing failure message.
pub fn render_error(err: &dyn std::fmt::Display) -> String {
    format!("An error occurred: {}", err)
}

impl ChainObserver for ConsoleObserver {
    fn step_started(&mut self, step: ChainStep) {
        println!("\n{}", step.status());
        if self.streaming {
            println!();
        }
    }

    fn step_finished(&mut self, step: ChainStep, output: &str) {
        if self.streaming {
            // Already printed as it arrived.
            println!();
            return;
        }
        if step.produces_html() {
            println!("{}", render_code(output));
        } else {
            println!("{}", output);
        }
    }

    fn artifact_written(&mut self, path: &Path, _html: &str) {
        println!("\n✅ HTML file '{}' has been created.", path.display());
    }

    fn feedback(&mut self) -> Option<String> {
        if let Some(feedback) = self.feedback.take() {
            return Some(feedback);
        }
        if self.interactive {
            return self.prompt_feedback();
        }
        None
    }
}
