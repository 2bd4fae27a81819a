use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr};
use log::debug;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TRANSCRIPT_BASE_URL: &str = "https://transcript.andreszenteno.com";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Environment variable that takes priority over `gemini_api_key` in the file
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub gemini_model: Option<String>,
    pub gemini_base_url: Option<String>,
    pub transcript_base_url: Option<String>,
    pub default_summary_type: Option<String>,
    pub default_lang: Option<String>,
    pub resume: Option<String>,
    pub resume_file: Option<PathBuf>,
}

impl Config {
    /// Load config from ~/.config/ytbrief/config.toml if it exists
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            debug!("Loading config from {}", path.display());
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            debug!("No config file found at {}", path.display());
            Ok(Config::default())
        }
    }

    /// Stored API key, with the environment variable taking priority.
    /// Blank values count as missing.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(API_KEY_ENV)
            .ok()
            .or_else(|| self.gemini_api_key.clone())
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
    }

    pub fn transcript_base_url(&self) -> &str {
        self.transcript_base_url.as_deref().unwrap_or(DEFAULT_TRANSCRIPT_BASE_URL)
    }

    pub fn gemini_base_url(&self) -> &str {
        self.gemini_base_url.as_deref().unwrap_or(DEFAULT_GEMINI_BASE_URL)
    }

    pub fn gemini_model(&self) -> &str {
        self.gemini_model.as_deref().unwrap_or(DEFAULT_GEMINI_MODEL)
    }

    /// Resume text for the personalize prompt: inline `resume` wins over `resume_file`.
    pub fn resume_text(&self) -> Result<Option<String>> {
        if let Some(ref text) = self.resume {
            return Ok(Some(text.clone()));
        }
        match self.resume_file {
            Some(ref path) => {
                let text = std::fs::read_to_string(path)
                    .wrap_err_with(|| format!("reading resume file {}", path.display()))?;
                Ok(Some(text))
            }
            None => Ok(None),
        }
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("ytbrief")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml_str = r#"
gemini_api_key = "AIza-test"
gemini_model = "gemini-2.0-flash"
transcript_base_url = "http://localhost:9000"
default_summary_type = "bullets"
default_lang = "es"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.gemini_api_key.as_deref(), Some("AIza-test"));
        assert_eq!(config.gemini_model(), "gemini-2.0-flash");
        assert_eq!(config.transcript_base_url(), "http://localhost:9000");
        assert_eq!(config.default_summary_type.as_deref(), Some("bullets"));
        assert_eq!(config.default_lang.as_deref(), Some("es"));
    }

    #[test]
    fn test_parse_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.gemini_api_key.is_none());
        assert_eq!(config.gemini_model(), DEFAULT_GEMINI_MODEL);
        assert_eq!(config.gemini_base_url(), DEFAULT_GEMINI_BASE_URL);
        assert_eq!(config.transcript_base_url(), DEFAULT_TRANSCRIPT_BASE_URL);
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.toml")).unwrap();
        assert!(config.resume.is_none());
    }

    #[test]
    fn test_load_invalid_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "gemini_model = [").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_resume_inline_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.txt");
        std::fs::write(&path, "from file").unwrap();
        let config = Config {
            resume: Some("inline".to_string()),
            resume_file: Some(path),
            ..Default::default()
        };
        assert_eq!(config.resume_text().unwrap().as_deref(), Some("inline"));
    }

    #[test]
    fn test_resume_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.txt");
        std::fs::write(&path, "Rust, Tokio, Axum").unwrap();
        let config = Config {
            resume_file: Some(path),
            ..Default::default()
        };
        assert_eq!(config.resume_text().unwrap().as_deref(), Some("Rust, Tokio, Axum"));
    }

    #[test]
    fn test_resume_file_missing_is_error() {
        let config = Config {
            resume_file: Some(PathBuf::from("/definitely/not/here.txt")),
            ..Default::default()
        };
        assert!(config.resume_text().is_err());
    }
}
