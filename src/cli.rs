use clap::{Parser, Subcommand};

use ytbrief::SummaryType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[command(
    name = "ytbrief",
    about = "YouTube transcript fetcher and article summarizer",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Show detection results and request details on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Fetch the transcript of the video on a page (direct or embedded)
    Transcript {
        /// Page URL: a YouTube watch/shorts/youtu.be link or any page embedding a player
        url: String,

        /// Transcript language code (service default if omitted)
        #[arg(short, long)]
        lang: Option<String>,

        /// Output format: text (default), json
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Copy title and transcript to the clipboard
        #[arg(short, long)]
        copy: bool,
    },

    /// Summarize the main article text of a page
    Summarize {
        /// Page URL
        url: String,

        /// Summary style
        #[arg(short = 't', long = "type", value_enum)]
        summary_type: Option<SummaryType>,

        /// Copy the summary to the clipboard
        #[arg(short, long)]
        copy: bool,
    },

    /// Interactive session with both workflows on one page
    Popup {
        /// Page URL
        url: String,
    },
}
