use eyre::{Result, bail};
use log::debug;

use crate::TranscriptPayload;

/// Client for the remote transcript service
#[derive(Debug, Clone)]
pub struct TranscriptClient {
    client: reqwest::Client,
    base_url: String,
}

impl TranscriptClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/simple-transcript-v3", self.base_url)
    }

    /// Fetch a transcript. An empty `lang` asks for the video's default language.
    pub async fn fetch_transcript(&self, url: &str, lang: &str) -> Result<TranscriptPayload> {
        let endpoint = self.endpoint();
        debug!("Requesting transcript for {url} (lang={lang:?}) from {endpoint}");

        let body = serde_json::json!({
            "url": url,
            "lang": lang,
        });

        let resp = self
            .client
            .post(&endpoint)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            debug!("Transcript service returned {}", resp.status());
            bail!("Failed to fetch transcript");
        }

        let payload: TranscriptPayload = resp.json().await?;
        debug!(
            "Transcript received: title={:?} lang={} languages={}",
            payload.title,
            payload.transcript_language_code,
            payload.languages.len()
        );
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_body() -> serde_json::Value {
        serde_json::json!({
            "transcript": "never gonna give you up",
            "title": "Rick Astley",
            "languages": [{"code": "en", "name": "English"}],
            "transcriptLanguageCode": "en"
        })
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client = TranscriptClient::new(reqwest::Client::new(), "https://t.example.com/");
        assert_eq!(client.endpoint(), "https://t.example.com/simple-transcript-v3");
    }

    #[tokio::test]
    async fn test_fetch_transcript_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/simple-transcript-v3"))
            .and(body_json(serde_json::json!({
                "url": "https://youtu.be/dQw4w9WgXcQ",
                "lang": ""
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_body()))
            .expect(1)
            .mount(&server)
            .await;

        let client = TranscriptClient::new(reqwest::Client::new(), server.uri());
        let payload = client.fetch_transcript("https://youtu.be/dQw4w9WgXcQ", "").await.unwrap();

        assert_eq!(payload.title, "Rick Astley");
        assert_eq!(payload.transcript, "never gonna give you up");
        assert_eq!(payload.transcript_language_code, "en");
    }

    #[tokio::test]
    async fn test_fetch_transcript_sends_language() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/simple-transcript-v3"))
            .and(body_json(serde_json::json!({
                "url": "https://youtu.be/dQw4w9WgXcQ",
                "lang": "de"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_body()))
            .expect(1)
            .mount(&server)
            .await;

        let client = TranscriptClient::new(reqwest::Client::new(), server.uri());
        assert!(client.fetch_transcript("https://youtu.be/dQw4w9WgXcQ", "de").await.is_ok());
    }

    #[tokio::test]
    async fn test_fetch_transcript_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = TranscriptClient::new(reqwest::Client::new(), server.uri());
        let err = client.fetch_transcript("https://youtu.be/x", "").await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to fetch transcript");
    }

    #[tokio::test]
    async fn test_fetch_transcript_bad_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = TranscriptClient::new(reqwest::Client::new(), server.uri());
        assert!(client.fetch_transcript("https://youtu.be/x", "").await.is_err());
    }
}
