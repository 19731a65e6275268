//! Command-line arguments.

use crate::llm::prompts::DEFAULT_FRAMEWORK;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "ui-coder",
    version,
    about = "Turn a UI screenshot into a responsive HTML page with Gemini"
)]
pub struct Cli {
    /// Screenshot to code (jpg, jpeg or png)
    #[arg(
        required_unless_present_any = ["capture", "save_key"],
        conflicts_with = "capture"
    )]
    pub image: Option<PathBuf>,

    /// Capture the primary monitor instead of reading a file
    #[arg(long)]
    pub capture: bool,

    /// Where the generated page is written (overwritten every run)
    #[arg(short, long, default_value = "index.html")]
    pub output: PathBuf,

    /// CSS approach requested from the model
    #[arg(long, default_value = DEFAULT_FRAMEWORK)]
    pub framework: String,

    /// Gemini model name [env: GEMINI_MODEL]
    #[arg(long)]
    pub model: Option<String>,

    /// Fixed path the normalized JPEG is parked at between turns
    #[arg(long, default_value = "temp_image.jpg")]
    pub temp_image: PathBuf,

    /// Feedback applied to the generated page in one extra turn
    #[arg(long)]
    pub feedback: Option<String>,

    /// Never prompt for feedback on stdin
    #[arg(long)]
    pub no_input: bool,

    /// Stream replies to the terminal as they are generated
    #[arg(long)]
    pub stream: bool,

    /// Save a copy of the page (`--export=PATH`); defaults to index.html on the Desktop
    #[arg(long, value_name = "PATH", num_args = 0..=1, require_equals = true)]
    pub export: Option<Option<PathBuf>>,

    /// Copy the final HTML to the clipboard
    #[arg(long)]
    pub copy: bool,

    /// Open the generated page in the default browser
    #[arg(long)]
    pub open: bool,

    /// Store a Gemini API key in the OS keychain and exit
    #[arg(long, value_name = "KEY")]
    pub save_key: Option<String>,
}
