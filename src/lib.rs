pub mod config;
pub mod copy;
pub mod page;
pub mod present;
pub mod session;
pub mod summarize;
pub mod transcript;

use serde::{Deserialize, Serialize};

/// A caption language offered by the transcript service
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LanguageOption {
    pub code: String,
    pub name: String,
}

/// Transcript service response, kept exactly as the service returned it
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptPayload {
    pub transcript: String,
    pub title: String,
    #[serde(default)]
    pub languages: Vec<LanguageOption>,
    #[serde(default)]
    pub transcript_language_code: String,
}

/// Prompt template used when asking for an article summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SummaryType {
    Brief,
    Detailed,
    Bullets,
    Personalize,
    #[default]
    Generic,
}

impl SummaryType {
    /// Parse a selector value. Unrecognized values fall back to `Generic`.
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "brief" => SummaryType::Brief,
            "detailed" => SummaryType::Detailed,
            "bullets" => SummaryType::Bullets,
            v if v.eq_ignore_ascii_case("personalize") => SummaryType::Personalize,
            _ => SummaryType::Generic,
        }
    }
}

impl std::fmt::Display for SummaryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SummaryType::Brief => write!(f, "brief"),
            SummaryType::Detailed => write!(f, "detailed"),
            SummaryType::Bullets => write!(f, "bullets"),
            SummaryType::Personalize => write!(f, "personalize"),
            SummaryType::Generic => write!(f, "generic"),
        }
    }
}
