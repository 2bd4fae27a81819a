use std::borrow::Cow;

use eyre::{Result, bail};
use log::{debug, warn};

use crate::SummaryType;

/// Longest article excerpt sent to the model, in characters
pub const MAX_ARTICLE_CHARS: usize = 20_000;

const TRUNCATION_MARKER: &str = "...";
const TEMPERATURE: f64 = 0.2;

pub const NO_SUMMARY: &str = "No summary available.";
pub const GENERIC_FAILURE: &str = "Failed to generate summary. Please try again later.";
const API_REQUEST_FAILED: &str = "API request failed";

const NO_RESUME: &str = "(no resume provided)";

/// Output shape shown to the model for bullet summaries
const BULLETS_EXAMPLE: &str = "- First key insight\n- Second key insight";

/// Cut an article down to `MAX_ARTICLE_CHARS` characters, marking the cut
pub fn truncate_article(text: &str) -> Cow<'_, str> {
    match text.char_indices().nth(MAX_ARTICLE_CHARS) {
        Some((idx, _)) => Cow::Owned(format!("{}{TRUNCATION_MARKER}", &text[..idx])),
        None => Cow::Borrowed(text),
    }
}

/// Assemble the prompt for a summary type. `resume` is only used by `Personalize`.
pub fn build_prompt(text: &str, summary_type: SummaryType, resume: Option<&str>) -> String {
    let article = truncate_article(text);
    match summary_type {
        SummaryType::Brief => {
            format!("Provide a brief summary of the following article in 2-3 sentences:\n\n{article}")
        }
        SummaryType::Detailed => format!(
            "Provide a detailed summary of the following article, covering all main points and key details:\n\n{article}"
        ),
        SummaryType::Bullets => format!(
            "Summarize the following article in 5-7 key points. \
Format each point as a line starting with \"- \" (dash followed by a space). \
Do not use asterisks or other bullet symbols, only use the dash. \
Keep each point concise and focused on a single key insight from the article.\n\
Example format:\n{BULLETS_EXAMPLE}\n\n{article}"
        ),
        SummaryType::Personalize => {
            let resume = resume.map(str::trim).filter(|r| !r.is_empty()).unwrap_or(NO_RESUME);
            format!(
                "Act as a technical content linker with deep knowledge of programming syntax and frameworks. \
I will provide an article and my resume, which lists the skills, tools and technologies I have used. \
Read the article and detect every mentioned technology, component, function, tool or piece of syntax. \
When one of them is related or conceptually equivalent to something in my resume, explain the relationship \
precisely by showing exact equivalents in syntax or terminology, for example: \
\"<Article_Term> in <Article_Tech> is similar to <Resume_Term> in <Resume_Tech>.\" \
If no such mapping is possible, respond with \"Cannot link.\" \
Do not write summaries or general comparisons such as \"both are frameworks\". \
Only produce output when specific function names, syntax, components or tools can be matched.\n\n\
My resume:\n{resume}\n\nArticle text:\n{article}"
            )
        }
        SummaryType::Generic => format!("Summarize the following article:\n\n{article}"),
    }
}

/// Client for the Gemini `generateContent` endpoint
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, model: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            model: model.into(),
        }
    }

    /// Endpoint without the key query parameter
    pub fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }

    /// Summarize article text with the prompt for `summary_type`
    pub async fn summarize(
        &self,
        text: &str,
        summary_type: SummaryType,
        api_key: &str,
        resume: Option<&str>,
    ) -> Result<String> {
        let prompt = build_prompt(text, summary_type, resume);
        let endpoint = self.endpoint();

        debug!(
            "Summarizing {} chars as {summary_type} via {endpoint}",
            text.chars().count()
        );

        let body = serde_json::json!({
            "contents": [
                {
                    "parts": [{ "text": prompt }]
                }
            ],
            "generationConfig": {
                "temperature": TEMPERATURE
            }
        });

        let resp = match self
            .client
            .post(&endpoint)
            .query(&[("key", api_key)])
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                warn!("Gemini request failed: {e}");
                bail!(GENERIC_FAILURE);
            }
        };

        if !resp.status().is_success() {
            let status = resp.status();
            let body: serde_json::Value = resp.json().await.unwrap_or_default();
            let message = extract_error_message(&body).unwrap_or(API_REQUEST_FAILED);
            warn!("Gemini API returned {status}: {message}");
            bail!("{message}");
        }

        match resp.json::<serde_json::Value>().await {
            Ok(json) => Ok(extract_gemini_text(&json)),
            Err(e) => {
                warn!("Gemini response could not be decoded: {e}");
                bail!(GENERIC_FAILURE);
            }
        }
    }
}

fn extract_gemini_text(json: &serde_json::Value) -> String {
    json.get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.get(0))
        .and_then(|p| p.get("text"))
        .and_then(|t| t.as_str())
        .filter(|t| !t.is_empty())
        .unwrap_or(NO_SUMMARY)
        .to_string()
}

fn extract_error_message(json: &serde_json::Value) -> Option<&str> {
    json.get("error")
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
        .filter(|m| !m.is_empty())
}
