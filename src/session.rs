//! Coordinator for the two popup workflows: transcript and summary.
//!
//! Each workflow owns its own state and busy flag, so both can have a request
//! in flight at once while neither accepts a second trigger of its own.

use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use eyre::Result;
use log::{debug, info, warn};
use serde::Serialize;

use crate::config::{self, Config};
use crate::copy::{Clipboard, CopyButton};
use crate::page::{self, PageBridge, PageRequest, PageResponse};
use crate::summarize::GeminiClient;
use crate::transcript::TranscriptClient;
use crate::{LanguageOption, SummaryType, TranscriptPayload};

pub const NO_VIDEO_MESSAGE: &str = "No YouTube video found on this page.";
pub const NO_ARTICLE_MESSAGE: &str = "Could not extract article text from this page.";

const COPY_TRANSCRIPT_LABEL: &str = "Copy";
const COPY_SUMMARY_LABEL: &str = "Copy Summary";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowState<T> {
    Idle,
    Loading,
    Success(T),
    Error(String),
}

impl<T> WorkflowState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, WorkflowState::Loading)
    }
}

/// What the transcript area shows after a successful fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptView {
    pub title: String,
    pub transcript: String,
    pub languages: Vec<LanguageOption>,
    /// Code of the language the service actually returned
    pub selected_lang: String,
}

impl From<TranscriptPayload> for TranscriptView {
    fn from(payload: TranscriptPayload) -> Self {
        Self {
            title: payload.title,
            transcript: payload.transcript,
            languages: payload.languages,
            selected_lang: payload.transcript_language_code,
        }
    }
}

/// Snapshot of everything the popup remembers while it is open
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub video_url: Option<String>,
    pub transcript: String,
    pub video_title: String,
    pub summary: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workflow {
    Transcript,
    Summary,
}

impl std::fmt::Display for Workflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Workflow::Transcript => write!(f, "transcript"),
            Workflow::Summary => write!(f, "summary"),
        }
    }
}

/// A trigger the coordinator refused without starting any work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowError {
    NoVideo,
    Busy(Workflow),
}

impl std::fmt::Display for WorkflowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkflowError::NoVideo => write!(f, "{NO_VIDEO_MESSAGE}"),
            WorkflowError::Busy(w) => write!(f, "{w} request already in progress"),
        }
    }
}

impl std::error::Error for WorkflowError {}

/// Terminal failure of one summary action, rendered as the result text
#[derive(Debug)]
enum SummaryFailure {
    MissingApiKey(PathBuf),
    NoArticleText,
    Generation(eyre::Report),
}

impl std::fmt::Display for SummaryFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SummaryFailure::MissingApiKey(path) => write!(
                f,
                "API key not found. Set gemini_api_key in {} or export {}.",
                path.display(),
                config::API_KEY_ENV
            ),
            SummaryFailure::NoArticleText => write!(f, "{NO_ARTICLE_MESSAGE}"),
            SummaryFailure::Generation(e) => write!(f, "Error: {e}"),
        }
    }
}

/// The read-only settings the coordinator needs
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub api_key: Option<String>,
    pub resume: Option<String>,
    /// Where the user should put the API key when it is missing
    pub config_path: PathBuf,
}

impl Settings {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            api_key: config.api_key(),
            resume: config.resume_text()?,
            config_path: config::config_path(),
        })
    }
}

#[derive(Debug, Default)]
struct BusyFlag(AtomicBool);

struct BusyGuard<'a>(&'a AtomicBool);

impl BusyFlag {
    fn try_acquire(&self) -> Option<BusyGuard<'_>> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard(&self.0))
    }

    fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

struct TranscriptData {
    transcript: String,
    video_title: String,
    state: WorkflowState<TranscriptView>,
}

struct TranscriptWorkflow {
    client: TranscriptClient,
    video_url: Option<String>,
    busy: BusyFlag,
    data: Mutex<TranscriptData>,
    copy_button: CopyButton,
}

struct SummaryData {
    summary: String,
    state: WorkflowState<String>,
}

struct SummaryWorkflow {
    client: GeminiClient,
    busy: BusyFlag,
    data: Mutex<SummaryData>,
    copy_button: CopyButton,
}

pub struct Coordinator<B> {
    bridge: B,
    settings: Settings,
    transcript: TranscriptWorkflow,
    summary: SummaryWorkflow,
}

impl<B: PageBridge + Sync> Coordinator<B> {
    /// Open a session on a page: detect its video and prepare both workflows
    pub async fn open(bridge: B, transcripts: TranscriptClient, summarizer: GeminiClient, settings: Settings) -> Self {
        let video_url = match page::detect_video_url(&bridge).await {
            Ok(url) => url,
            Err(e) => {
                warn!("Video detection failed on {}: {e}", bridge.url());
                None
            }
        };

        match video_url {
            Some(ref url) => info!("Video found on {}: {url}", bridge.url()),
            None => info!("No video found on {}", bridge.url()),
        }

        Self {
            bridge,
            settings,
            transcript: TranscriptWorkflow {
                client: transcripts,
                video_url,
                busy: BusyFlag::default(),
                data: Mutex::new(TranscriptData {
                    transcript: String::new(),
                    video_title: String::new(),
                    state: WorkflowState::Idle,
                }),
                copy_button: CopyButton::new(COPY_TRANSCRIPT_LABEL),
            },
            summary: SummaryWorkflow {
                client: summarizer,
                busy: BusyFlag::default(),
                data: Mutex::new(SummaryData {
                    summary: String::new(),
                    state: WorkflowState::Idle,
                }),
                copy_button: CopyButton::new(COPY_SUMMARY_LABEL),
            },
        }
    }

    pub fn page_url(&self) -> &str {
        self.bridge.url()
    }

    pub fn video_url(&self) -> Option<&str> {
        self.transcript.video_url.as_deref()
    }

    /// Whether the extract control accepts a click right now
    pub fn extract_enabled(&self) -> bool {
        self.transcript.video_url.is_some() && !self.transcript.busy.is_set()
    }

    pub fn summarize_enabled(&self) -> bool {
        !self.summary.busy.is_set()
    }

    /// Blocking message shown above the transcript area, if any
    pub fn message(&self) -> Option<&'static str> {
        self.transcript.video_url.is_none().then_some(NO_VIDEO_MESSAGE)
    }

    pub fn transcript_state(&self) -> WorkflowState<TranscriptView> {
        lock(&self.transcript.data).state.clone()
    }

    pub fn summary_state(&self) -> WorkflowState<String> {
        lock(&self.summary.data).state.clone()
    }

    pub fn session(&self) -> SessionState {
        let transcript = lock(&self.transcript.data);
        let summary = lock(&self.summary.data);
        SessionState {
            video_url: self.transcript.video_url.clone(),
            transcript: transcript.transcript.clone(),
            video_title: transcript.video_title.clone(),
            summary: summary.summary.clone(),
        }
    }

    /// Fetch the transcript in the video's default language
    pub async fn extract_transcript(&self) -> Result<(), WorkflowError> {
        self.fetch_transcript("").await
    }

    /// Re-fetch the transcript in `code`. An empty code is the placeholder entry and does nothing.
    pub async fn select_language(&self, code: &str) -> Result<(), WorkflowError> {
        if code.is_empty() {
            return Ok(());
        }
        self.fetch_transcript(code).await
    }

    async fn fetch_transcript(&self, lang: &str) -> Result<(), WorkflowError> {
        let video_url = self.transcript.video_url.as_deref().ok_or(WorkflowError::NoVideo)?;
        let _busy = self
            .transcript
            .busy
            .try_acquire()
            .ok_or(WorkflowError::Busy(Workflow::Transcript))?;

        lock(&self.transcript.data).state = WorkflowState::Loading;

        let result = self.transcript.client.fetch_transcript(video_url, lang).await;

        let mut data = lock(&self.transcript.data);
        match result {
            Ok(payload) => {
                data.transcript = payload.transcript.clone();
                data.video_title = payload.title.clone();
                data.state = WorkflowState::Success(payload.into());
            }
            Err(e) => {
                warn!("Transcript fetch failed for {video_url}: {e}");
                data.state = WorkflowState::Error(format!("Error: {e}"));
            }
        }
        Ok(())
    }

    /// Summarize the page's article text
    pub async fn summarize(&self, summary_type: SummaryType) -> Result<(), WorkflowError> {
        let _busy = self
            .summary
            .busy
            .try_acquire()
            .ok_or(WorkflowError::Busy(Workflow::Summary))?;

        lock(&self.summary.data).state = WorkflowState::Loading;

        let result = self.run_summary(summary_type).await;

        let mut data = lock(&self.summary.data);
        match result {
            Ok(summary) => {
                data.summary = summary.clone();
                data.state = WorkflowState::Success(summary);
            }
            Err(failure) => {
                debug!("Summary failed: {failure:?}");
                data.state = WorkflowState::Error(failure.to_string());
            }
        }
        Ok(())
    }

    async fn run_summary(&self, summary_type: SummaryType) -> std::result::Result<String, SummaryFailure> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .ok_or_else(|| SummaryFailure::MissingApiKey(self.settings.config_path.clone()))?;

        let text = match self.bridge.request(PageRequest::GetArticleText).await {
            Ok(PageResponse::ArticleText { text }) => text,
            Ok(other) => {
                warn!("Unexpected page response to article request: {other:?}");
                String::new()
            }
            Err(e) => {
                warn!("Article extraction failed on {}: {e}", self.bridge.url());
                String::new()
            }
        };
        if text.trim().is_empty() {
            return Err(SummaryFailure::NoArticleText);
        }

        self.summary
            .client
            .summarize(&text, summary_type, api_key, self.settings.resume.as_deref())
            .await
            .map_err(SummaryFailure::Generation)
    }

    pub fn copy_transcript_enabled(&self) -> bool {
        !lock(&self.transcript.data).transcript.is_empty()
    }

    pub fn copy_transcript_label(&self) -> &str {
        self.transcript.copy_button.label()
    }

    pub fn copy_summary_label(&self) -> &str {
        self.summary.copy_button.label()
    }

    /// Copy title and transcript. Returns false when there is nothing to copy.
    pub fn copy_transcript(&self, clipboard: &dyn Clipboard) -> Result<bool> {
        let text = {
            let data = lock(&self.transcript.data);
            if data.transcript.is_empty() {
                return Ok(false);
            }
            format!("{}\n\n{}", data.video_title, data.transcript)
        };
        self.transcript.copy_button.click(clipboard, &text)?;
        Ok(true)
    }

    /// Copy the summary. Clipboard failures are logged, not surfaced.
    pub fn copy_summary(&self, clipboard: &dyn Clipboard) -> bool {
        let text = lock(&self.summary.data).summary.clone();
        if text.trim().is_empty() {
            return false;
        }
        match self.summary.copy_button.click(clipboard, &text) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to copy text: {e}");
                false
            }
        }
    }
}
