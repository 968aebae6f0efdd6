use std::io::{self, BufRead};
use std::path::PathBuf;
use std::time::Duration;

use eyre::{Result, WrapErr, bail};
use log::{debug, info};

mod cli;

use cli::Cli;
use ytsheet::batch::Progress;
use ytsheet::config::{Config, Settings, config_path, read_prompt, split_languages};
use ytsheet::gemini::{API_KEY_VARS, GeminiClient, api_key_from_env};
use ytsheet::youtube::YouTubeCaptions;

fn setup_logging() -> Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join("ytsheet.log");

    let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(&log_file)?);

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized: {}", log_file.display());
    Ok(())
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ytsheet")
        .join("logs")
}

fn build_after_help() -> String {
    let key_line = match API_KEY_VARS.iter().find(|v| std::env::var(v).is_ok_and(|s| !s.trim().is_empty())) {
        Some(var) => format!("  \x1b[32m✅\x1b[0m {var} is set"),
        None => format!("  \x1b[31m❌\x1b[0m none of {} is set", API_KEY_VARS.join(", ")),
    };

    format!(
        "\nAPI KEY:\n{key_line}\n\nConfig file: {}\nLogs are written to: {}",
        config_path().display(),
        log_dir().join("ytsheet.log").display()
    )
}

/// Links from args, a file, or stdin; blank lines and `#` comments are skipped
fn collect_links(cli: &Cli) -> Result<Vec<String>> {
    let lines = if !cli.links.is_empty() {
        cli.links.clone()
    } else if let Some(ref path) = cli.links_file {
        std::fs::read_to_string(path)
            .wrap_err_with(|| format!("reading links file {}", path.display()))?
            .lines()
            .map(str::to_string)
            .collect()
    } else {
        let stdin = io::stdin();
        stdin.lock().lines().collect::<Result<Vec<_>, _>>()?
    };

    Ok(lines
        .into_iter()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .collect())
}

fn resolve_settings(cli: &Cli) -> Result<Settings> {
    let config = match cli.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let mut settings = Settings::from_config(config)?;

    // CLI flags take priority
    let langs = split_languages(&cli.lang);
    if !langs.is_empty() {
        settings.languages = langs;
    }
    if let Some(ref model) = cli.model {
        settings.model = model.clone();
    }
    if let Some(ref path) = cli.prompt_file {
        settings.prompt_template = read_prompt(path)?;
    }
    if let Some(secs) = cli.pace {
        settings.pacing = Duration::try_from_secs_f64(secs).wrap_err("--pace must be a non-negative number")?;
    }
    if let Some(ref output) = cli.output {
        settings.output = output.clone();
    }
    if cli.no_transcript {
        settings.include_transcript = false;
    }
    if cli.excel_bom {
        settings.excel_bom = true;
    }

    Ok(settings)
}

fn print_progress(event: Progress<'_>) {
    match event {
        Progress::Started { index, total, link } => eprintln!("({index}/{total}) {link}"),
        Progress::Finished { record } => eprintln!("  ok: {} fields", record.len()),
        Progress::Skipped { failure } => eprintln!("  skipped: {}", failure.error),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging()?;

    // .env is optional
    if let Ok(path) = dotenvy::dotenv() {
        debug!("Loaded environment from {}", path.display());
    }

    let after_help = build_after_help();
    let cmd = <Cli as clap::CommandFactory>::command().after_help(after_help);
    let matches = cmd.get_matches();
    let cli = <Cli as clap::FromArgMatches>::from_arg_matches(&matches)?;

    let settings = resolve_settings(&cli)?;
    debug!("Settings: {settings:?}");

    if cli.verbose {
        eprintln!(
            "Model: {}\nLanguages: {}\nPacing: {:?}\nOutput: {}",
            settings.model,
            settings.languages.join(", "),
            settings.pacing,
            settings.output.display(),
        );
    }

    let links = collect_links(&cli)?;
    if links.is_empty() {
        bail!("no links provided\n\nUsage: ytsheet <URL>...\n       ytsheet < links.txt");
    }

    let Some(api_key) = api_key_from_env() else {
        bail!("no Gemini API key: set one of {}", API_KEY_VARS.join(", "));
    };

    let client = reqwest::Client::new();
    let captions = YouTubeCaptions::new(client.clone());
    let model = GeminiClient::new(client, api_key, &settings);

    let report = ytsheet::batch::run(
        &links,
        &settings.output,
        &captions,
        &model,
        &settings.batch_options(),
        print_progress,
    )
    .await?;

    let saved = std::fs::canonicalize(&settings.output).unwrap_or_else(|_| settings.output.clone());
    eprintln!(
        "Saved {} of {} videos to {} ({} skipped)",
        report.records.len(),
        links.len(),
        saved.display(),
        report.failures.len()
    );
    for failure in &report.failures {
        eprintln!("  {failure}");
    }

    Ok(())
}
