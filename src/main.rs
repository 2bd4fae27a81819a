use std::path::PathBuf;
use std::sync::Arc;

use eyre::{Result, bail};
use log::{debug, info};
use tokio::io::{AsyncBufReadExt, BufReader};

use ytbrief::config::Config;
use ytbrief::copy::SystemClipboard;
use ytbrief::page::{self, Tab};
use ytbrief::present;
use ytbrief::session::{Coordinator, Settings, WorkflowState};
use ytbrief::summarize::GeminiClient;
use ytbrief::transcript::TranscriptClient;
use ytbrief::SummaryType;

mod cli;

use cli::{Cli, Command, OutputFormat};

fn setup_logging() -> Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join("ytbrief.log");

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
        .join("ytbrief")
        .join("logs")
}

fn build_after_help() -> String {
    let config_path = ytbrief::config::config_path();
    let config_line = if config_path.exists() {
        format!("  \x1b[32m✅\x1b[0m config     {}", config_path.display())
    } else {
        format!(
            "  \x1b[31m❌\x1b[0m config     {} (not found, needed for gemini_api_key)",
            config_path.display()
        )
    };

    let log_path = log_dir().join("ytbrief.log");

    format!(
        "\nSETTINGS:\n{config_line}\n\nLogs are written to: {}",
        log_path.display()
    )
}

/// Open the page as the active tab. Direct video links skip the page fetch.
async fn open_tab(client: &reqwest::Client, url: &str, need_article: bool) -> Result<Tab> {
    if !need_article && page::is_direct_video_url(url) {
        debug!("Direct video link, not fetching page: {url}");
        return Ok(Tab::from_html(url, ""));
    }
    Tab::load(client, url).await
}

async fn open_coordinator(client: &reqwest::Client, config: &Config, tab: Tab) -> Result<Coordinator<Tab>> {
    let settings = Settings::from_config(config)?;
    let transcripts = TranscriptClient::new(client.clone(), config.transcript_base_url());
    let summarizer = GeminiClient::new(client.clone(), config.gemini_base_url(), config.gemini_model());
    Ok(Coordinator::open(tab, transcripts, summarizer, settings).await)
}

fn default_summary_type(config: &Config) -> SummaryType {
    config
        .default_summary_type
        .as_deref()
        .map(SummaryType::parse)
        .unwrap_or_default()
}

async fn run_transcript(
    client: &reqwest::Client,
    config: &Config,
    url: &str,
    lang: Option<String>,
    format: OutputFormat,
    copy: bool,
    verbose: bool,
) -> Result<()> {
    let tab = open_tab(client, url, false).await?;
    let coord = open_coordinator(client, config, tab).await?;

    let Some(video_url) = coord.video_url() else {
        bail!("{}", ytbrief::session::NO_VIDEO_MESSAGE);
    };
    if verbose {
        eprintln!("Video: {video_url}");
    }

    let lang = lang.or_else(|| config.default_lang.clone()).unwrap_or_default();
    if lang.is_empty() {
        coord.extract_transcript().await?;
    } else {
        coord.select_language(&lang).await?;
    }

    let view = match coord.transcript_state() {
        WorkflowState::Success(view) => view,
        WorkflowState::Error(msg) => bail!("{msg}"),
        other => bail!("transcript request did not finish: {other:?}"),
    };

    if verbose {
        eprintln!("Language: {}\n{}", view.selected_lang, present::render_languages(&view));
    }

    let rendered = match format {
        OutputFormat::Text => present::render_text(&view),
        OutputFormat::Json => present::render_json(&view)?,
    };
    println!("{rendered}");

    if copy && coord.copy_transcript(&SystemClipboard)? {
        eprintln!("{}", coord.copy_transcript_label());
    }
    Ok(())
}

async fn run_summarize(
    client: &reqwest::Client,
    config: &Config,
    url: &str,
    summary_type: Option<SummaryType>,
    copy: bool,
    verbose: bool,
) -> Result<()> {
    let tab = open_tab(client, url, true).await?;
    let coord = open_coordinator(client, config, tab).await?;

    let summary_type = summary_type.unwrap_or_else(|| default_summary_type(config));
    if verbose {
        eprintln!("Summary type: {summary_type}");
    }

    coord.summarize(summary_type).await?;

    match coord.summary_state() {
        WorkflowState::Success(summary) => println!("{summary}"),
        WorkflowState::Error(msg) => bail!("{msg}"),
        other => bail!("summary request did not finish: {other:?}"),
    }

    if copy && coord.copy_summary(&SystemClipboard) {
        eprintln!("{}", coord.copy_summary_label());
    }
    Ok(())
}

const POPUP_HELP: &str = "Commands:
  extract              fetch the transcript
  lang <code>          re-fetch the transcript in another language
  copy                 copy title and transcript
  summarize [type]     summarize the page (brief, detailed, bullets, personalize)
  copy-summary         copy the summary
  status               show both workflows
  help                 show this help
  quit                 close the session";

fn print_status(coord: &Coordinator<Tab>) {
    println!("Page: {}", coord.page_url());
    match coord.message() {
        Some(msg) => println!("{msg}"),
        None => {
            let extract = if coord.extract_enabled() { "enabled" } else { "busy" };
            println!("Video: {} [extract {extract}]", coord.video_url().unwrap_or_default());
        }
    }

    let transcript_state = coord.transcript_state();
    let transcript = present::render_transcript(&transcript_state);
    if !transcript.is_empty() {
        println!("\n--- Transcript ---\n{transcript}");
    }
    if let WorkflowState::Success(ref view) = transcript_state {
        println!("\n{}", present::render_languages(view));
    }
    if coord.copy_transcript_enabled() {
        println!("[{}]", coord.copy_transcript_label());
    }

    let summary = present::render_summary(&coord.summary_state());
    if !summary.is_empty() {
        println!("\n--- Summary ---\n{summary}\n[{}]", coord.copy_summary_label());
    }
}

async fn run_popup(client: &reqwest::Client, config: &Config, url: &str) -> Result<()> {
    let tab = open_tab(client, url, true).await?;
    let coord = Arc::new(open_coordinator(client, config, tab).await?);
    let default_type = default_summary_type(config);

    print_status(&coord);
    println!("\n{POPUP_HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let mut parts = line.split_whitespace();
        let Some(command) = parts.next() else {
            continue;
        };
        let arg = parts.next().map(str::to_string);

        match command {
            "extract" => {
                let coord = Arc::clone(&coord);
                println!("{}", present::TRANSCRIPT_LOADING);
                tokio::spawn(async move {
                    match coord.extract_transcript().await {
                        Ok(()) => print_status(&coord),
                        Err(e) => println!("{e}"),
                    }
                });
            }
            "lang" => {
                let Some(code) = arg else {
                    println!("usage: lang <code>");
                    continue;
                };
                let coord = Arc::clone(&coord);
                tokio::spawn(async move {
                    match coord.select_language(&code).await {
                        Ok(()) => print_status(&coord),
                        Err(e) => println!("{e}"),
                    }
                });
            }
            "summarize" => {
                let summary_type = arg.as_deref().map(SummaryType::parse).unwrap_or(default_type);
                let coord = Arc::clone(&coord);
                println!("{}", present::SUMMARY_LOADING);
                tokio::spawn(async move {
                    match coord.summarize(summary_type).await {
                        Ok(()) => print_status(&coord),
                        Err(e) => println!("{e}"),
                    }
                });
            }
            "copy" => match coord.copy_transcript(&SystemClipboard) {
                Ok(true) => println!("[{}]", coord.copy_transcript_label()),
                Ok(false) => println!("Nothing to copy yet."),
                Err(e) => println!("Copy failed: {e}"),
            },
            "copy-summary" => {
                if coord.copy_summary(&SystemClipboard) {
                    println!("[{}]", coord.copy_summary_label());
                }
            }
            "status" => print_status(&coord),
            "help" => println!("{POPUP_HELP}"),
            "quit" | "exit" => break,
            other => println!("unknown command: {other} (try `help`)"),
        }
    }

    info!("Popup session closed for {url}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging()?;

    let after_help = build_after_help();
    let cmd = <Cli as clap::CommandFactory>::command().after_help(after_help);
    let matches = cmd.get_matches();
    let cli = <Cli as clap::FromArgMatches>::from_arg_matches(&matches)?;

    // Load config file (non-fatal if missing/invalid)
    let config = Config::load().unwrap_or_default();

    if cli.verbose {
        let config_path = ytbrief::config::config_path();
        if config_path.exists() {
            eprintln!("Config: {}", config_path.display());
        }
        debug!("Transcript service: {}", config.transcript_base_url());
        debug!("Gemini model: {}", config.gemini_model());
    }

    let client = reqwest::Client::new();

    match cli.command {
        Command::Transcript {
            url,
            lang,
            format,
            copy,
        } => run_transcript(&client, &config, &url, lang, format, copy, cli.verbose).await,
        Command::Summarize {
            url,
            summary_type,
            copy,
        } => run_summarize(&client, &config, &url, summary_type, copy, cli.verbose).await,
        Command::Popup { url } => run_popup(&client, &config, &url).await,
    }
}
