use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "ytsheet",
    about = "Ask Gemini about YouTube transcripts and collect the JSON answers in a CSV",
    version = env!("GIT_DESCRIBE"),
)]
pub struct Cli {
    /// YouTube video URLs or IDs (reads one per line from stdin if omitted)
    pub links: Vec<String>,

    /// Read links from a file, one per line
    #[arg(long, value_name = "FILE", conflicts_with = "links")]
    pub links_file: Option<PathBuf>,

    /// CSV file to write (overwritten)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Caption language preference, in order (repeat or comma-separate) [default: pt,en]
    #[arg(short, long = "lang", value_name = "LANG")]
    pub lang: Vec<String>,

    /// Gemini model
    #[arg(long)]
    pub model: Option<String>,

    /// Prompt template file; `{transcript}` marks where the transcript goes
    #[arg(long, value_name = "FILE")]
    pub prompt_file: Option<PathBuf>,

    /// Seconds to wait between videos
    #[arg(long, value_name = "SECS")]
    pub pace: Option<f64>,

    /// Leave the transcript column out of the CSV
    #[arg(long)]
    pub no_transcript: bool,

    /// Prefix the CSV with a UTF-8 byte order mark (for spreadsheet apps)
    #[arg(long)]
    pub excel_bom: bool,

    /// Config file (default: ~/.config/ytsheet/config.toml)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Show resolved settings
    #[arg(short, long)]
    pub verbose: bool,
}
