use eyre::Result;

use crate::session::{TranscriptView, WorkflowState};

pub const TRANSCRIPT_LOADING: &str = "Fetching transcript... This may take a few seconds.";
pub const SUMMARY_LOADING: &str = "Summarizing...";

/// Render the transcript area (title, blank line, transcript) for a workflow state
pub fn render_transcript(state: &WorkflowState<TranscriptView>) -> String {
    match state {
        WorkflowState::Idle => String::new(),
        WorkflowState::Loading => TRANSCRIPT_LOADING.to_string(),
        WorkflowState::Success(view) => render_text(view),
        WorkflowState::Error(msg) => msg.clone(),
    }
}

pub fn render_text(view: &TranscriptView) -> String {
    format!("{}\n\n{}", view.title, view.transcript)
}

pub fn render_json(view: &TranscriptView) -> Result<String> {
    Ok(serde_json::to_string_pretty(view)?)
}

/// Language selector: one line per option, the current one marked with `*`
pub fn render_languages(view: &TranscriptView) -> String {
    if view.languages.is_empty() {
        return String::new();
    }
    let mut lines = vec!["Available languages".to_string()];
    for lang in &view.languages {
        let marker = if lang.code == view.selected_lang { '*' } else { ' ' };
        lines.push(format!("  {marker} {:<8} {}", lang.code, lang.name));
    }
    lines.join("\n")
}

pub fn render_summary(state: &WorkflowState<String>) -> String {
    match state {
        WorkflowState::Idle => String::new(),
        WorkflowState::Loading => SUMMARY_LOADING.to_string(),
        WorkflowState::Success(summary) => summary.clone(),
        WorkflowState::Error(msg) => msg.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LanguageOption;

    fn sample_view() -> TranscriptView {
        TranscriptView {
            title: "Test Video".to_string(),
            transcript: "Hello world\nThis is a test".to_string(),
            languages: vec![
                LanguageOption {
                    code: "en".to_string(),
                    name: "English".to_string(),
                },
                LanguageOption {
                    code: "fr".to_string(),
                    name: "French".to_string(),
                },
            ],
            selected_lang: "fr".to_string(),
        }
    }

    #[test]
    fn test_render_transcript_states() {
        assert_eq!(render_transcript(&WorkflowState::Idle), "");
        assert_eq!(render_transcript(&WorkflowState::Loading), TRANSCRIPT_LOADING);
        assert_eq!(
            render_transcript(&WorkflowState::Error("Error: boom".to_string())),
            "Error: boom"
        );
        assert_eq!(
            render_transcript(&WorkflowState::Success(sample_view())),
            "Test Video\n\nHello world\nThis is a test"
        );
    }

    #[test]
    fn test_render_languages_marks_selected() {
        let rendered = render_languages(&sample_view());
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "Available languages");
        assert!(lines[1].starts_with("    en"));
        assert!(lines[2].starts_with("  * fr"));
    }

    #[test]
    fn test_render_languages_empty() {
        let view = TranscriptView {
            languages: vec![],
            ..sample_view()
        };
        assert_eq!(render_languages(&view), "");
    }

    #[test]
    fn test_render_json() {
        let json: serde_json::Value = serde_json::from_str(&render_json(&sample_view()).unwrap()).unwrap();
        assert_eq!(json["title"], "Test Video");
        assert_eq!(json["selected_lang"], "fr");
        assert_eq!(json["languages"][0]["code"], "en");
    }

    #[test]
    fn test_render_summary_states() {
        assert_eq!(render_summary(&WorkflowState::Loading), SUMMARY_LOADING);
        assert_eq!(render_summary(&WorkflowState::Success("- a".to_string())), "- a");
    }
}
