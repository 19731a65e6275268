//! UI Coder: screenshot in, HTML page out.
//!
//! This is the app shell that wires the domains together. No chain logic
//! lives here: only env loading, logger setup, and the run sequence.
//!
//! Modules:
//!   - capture/    : image loading, live capture, RGB normalization
//!   - llm/        : model seam + Gemini session + prompts
//!   - pipeline.rs : the four-turn prompt chain (+ feedback turn)
//!   - artifact.rs : index.html, export, clipboard, preview
//!   - console.rs  : terminal progress + feedback prompt
//!   - settings.rs : configuration + API key resolution

pub mod artifact;
pub mod capture;
pub mod cli;
pub mod console;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod settings;

use clap::Parser;
use cli::Cli;
use console::ConsoleObserver;
use error::Result;
use llm::GeminiSession;
use pipeline::{PromptChain, RunReport};
use settings::{ImageSource, Settings};
use std::process::ExitCode;

/// Entry point: called by the binary.
pub fn run() -> ExitCode {
    // Load .env.local → .env from the working directory.
    'env_load: for env_file in [".env.local", ".env"] {
        let path = std::path::Path::new(env_file);
        if path.exists() {
            match dotenvy::from_path(path) {
                Ok(_) => eprintln!("[STARTUP] Loaded {}", path.display()),
                Err(e) => eprintln!("[STARTUP] Failed to load {}: {}", path.display(), e),
            }
            break 'env_load;
        }
    }

    env_logger::init();

    let cli = Cli::parse();

    if let Some(key) = &cli.save_key {
        return match settings::save_api_key(key) {
            Ok(()) => {
                println!("API key saved.");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{}", console::render_error(&e));
                ExitCode::FAILURE
            }
        };
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("{}", console::render_error(&e));
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(code_ui(&cli)) {
        Ok(report) => {
            log::info!(
                "[PIPELINE] Finished: {} turns, feedback applied: {}",
                report.turns,
                report.feedback_applied
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("[PIPELINE] Run failed: {:?}", e);
            eprintln!("{}", console::render_error(&e));
            ExitCode::FAILURE
        }
    }
}

/// One full run: image → chain → artifact → extras.
async fn code_ui(cli: &Cli) -> Result<RunReport> {
    let settings = Settings::from_cli(cli);
    let api_key = settings::resolve_api_key()?;

    let image = match &settings.source {
        ImageSource::File(path) => capture::load_image(path)?,
        ImageSource::PrimaryMonitor => capture::capture_primary_monitor()?,
    };
    let image_ref = capture::prepare(&image, &settings.temp_image_path)?;
    drop(image);

    let mut session = GeminiSession::new(settings.model.clone(), api_key);
    if settings.model.stream {
        session = session.with_delta_sink(console::stdout_delta_sink());
    }
    let mut chain = PromptChain::new(session, settings.framework.clone());
    let mut observer = ConsoleObserver::new(cli.feedback.clone(), !cli.no_input, cli.stream);

    let report =
        pipeline::code_ui(&mut chain, &image_ref, &settings.output_path, &mut observer).await?;

    if let Some(dest) = &cli.export {
        let path = artifact::export_html(&report.final_html, dest.as_deref())?;
        println!("⬇️  Saved a copy to {}", path.display());
    }
    if cli.copy {
        artifact::copy_to_clipboard(&report.final_html)?;
        println!("📋 Copied HTML to clipboard");
    }
    if cli.open {
        println!("Live preview of the generated website 🌐");
        artifact::open_preview(&report.artifact_path)?;
    }

    Ok(report)
}
