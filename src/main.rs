use clap::Parser;
use roster_extract::adapters::Osc52Clipboard;
use roster_extract::app::console::Console;
use roster_extract::app::input::{load_document, load_text};
use roster_extract::app::progress_view::{LineProgress, SpinnerProgress};
use roster_extract::app::{present, PresentOptions};
use roster_extract::config::ViewArg;
use roster_extract::core::engine::{interrupted, RunOutcome};
use roster_extract::core::progress::{ProgressObserver, Silent};
use roster_extract::core::session::{Phase, ViewMode};
use roster_extract::utils::error::{ErrorSeverity, RosterError};
use roster_extract::utils::{logger, validation::Validate};
use roster_extract::{CliConfig, ExtractionEngine, GeminiExtractor, LocalStorage, Session};
use std::io::IsTerminal;

fn exit_code(severity: ErrorSeverity) -> i32 {
    match severity {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

fn report(e: &RosterError) -> i32 {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    exit_code(e.severity())
}

fn progress_observer(config: &CliConfig) -> Box<dyn ProgressObserver> {
    if config.no_progress {
        Box::new(Silent)
    } else if std::io::stderr().is_terminal() {
        Box::new(SpinnerProgress::new())
    } else {
        Box::new(LineProgress::new(std::io::stderr()))
    }
}

async fn run(config: CliConfig) -> Result<i32, RosterError> {
    let tool_config = config.tool_config()?;
    let extractor = GeminiExtractor::new(tool_config.gemini_config())?;
    let engine = ExtractionEngine::new(extractor).with_step_interval(tool_config.step_interval());
    let storage = LocalStorage::current_dir();
    let mut progress = progress_observer(&config);

    if config.interactive {
        let mut console = Console::new(engine, Osc52Clipboard::stderr(), storage)
            .with_start_date(config.start_date);
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();
        console.run(stdin.lock(), &mut stdout, progress.as_mut()).await?;
        return Ok(0);
    }

    if !config.has_input() {
        return Err(RosterError::MissingInput);
    }

    let mut session = Session::new();
    if let Some(text) = &config.text {
        session.set_text(text.as_str())?;
    }
    if let Some(path) = &config.text_file {
        let text = load_text(&storage, &path.to_string_lossy()).await?;
        session.set_text(text)?;
    }
    if let Some(path) = &config.file {
        if !session.text().trim().is_empty() {
            tracing::warn!("A file is staged; the text input is ignored");
        }
        let file = load_document(&storage, &path.to_string_lossy()).await?;
        session.stage_file(file)?;
    }

    match engine
        .run_until(&mut session, progress.as_mut(), interrupted())
        .await?
    {
        RunOutcome::Interrupted => {
            eprintln!("Extraction abandoned.");
            return Ok(130);
        }
        RunOutcome::Completed(_) => {}
    }

    match session.phase() {
        Phase::Success { roster, .. } => {
            let options = PresentOptions {
                view: match config.view {
                    ViewArg::Calendar => ViewMode::Calendar,
                    ViewArg::Json => ViewMode::Json,
                },
                output: config.output.as_ref().map(|p| p.to_string_lossy().into_owned()),
                csv: config.csv.as_ref().map(|p| p.to_string_lossy().into_owned()),
                start_date: config.start_date,
                copy: config.copy,
            };
            let mut stdout = std::io::stdout();
            let mut clipboard = Osc52Clipboard::stderr();
            present(roster, &options, &mut stdout, &mut clipboard, &storage).await?;
            if let Some(path) = &options.output {
                eprintln!("📁 Roster JSON saved to: {}", path);
            }
            if let Some(path) = &options.csv {
                eprintln!("📁 Roster CSV saved to: {}", path);
            }
            Ok(0)
        }
        Phase::Failed { message } => {
            eprintln!("❌ {}", message);
            Ok(exit_code(ErrorSeverity::Medium))
        }
        Phase::Idle | Phase::Pending { .. } => Ok(0),
    }
}

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = config.validate() {
        std::process::exit(report(&e));
    }

    let code = match run(config).await {
        Ok(code) => code,
        Err(e) => report(&e),
    };
    if code != 0 {
        std::process::exit(code);
    }
}
