use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::Mutex;
use std::time::Duration;

use eyre::{Result, bail};
use log::debug;
use tokio::time::Instant;

pub const COPIED_LABEL: &str = "Copied!";

/// How long a copy button shows `COPIED_LABEL`
pub const COPIED_FOR: Duration = Duration::from_millis(2000);

pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> Result<()>;
}

/// System clipboard, reached through the platform's copy tool
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

type CopyTool = (&'static str, &'static [&'static str]);

#[cfg(target_os = "macos")]
const COPY_TOOLS: &[CopyTool] = &[("pbcopy", &[])];

#[cfg(target_os = "windows")]
const COPY_TOOLS: &[CopyTool] = &[("clip", &[])];

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const COPY_TOOLS: &[CopyTool] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
];

impl Clipboard for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<()> {
        for &(program, args) in COPY_TOOLS {
            let child = Command::new(program)
                .args(args)
                .stdin(Stdio::piped())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn();

            let mut child = match child {
                Ok(child) => child,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!("{program} not found, trying next clipboard tool");
                    continue;
                }
                Err(e) => bail!("failed to run {program}: {e}"),
            };

            if let Some(mut stdin) = child.stdin.take() {
                stdin.write_all(text.as_bytes())?;
            }

            let status = child.wait()?;
            if !status.success() {
                bail!("{program} exited with status {status}");
            }
            debug!("Copied {} bytes via {program}", text.len());
            return Ok(());
        }
        bail!("no clipboard tool found (install wl-copy, xclip or xsel)");
    }
}

/// Label state of a copy button: flips to "Copied!" after a successful copy
#[derive(Debug)]
pub struct CopyButton {
    label: String,
    copied_until: Mutex<Option<Instant>>,
}

impl CopyButton {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            copied_until: Mutex::new(None),
        }
    }

    /// Write `text` to the clipboard; the label changes only if the write succeeds
    pub fn click(&self, clipboard: &dyn Clipboard, text: &str) -> Result<()> {
        clipboard.write_text(text)?;
        let mut copied_until = self.copied_until.lock().unwrap_or_else(|e| e.into_inner());
        *copied_until = Some(Instant::now() + COPIED_FOR);
        Ok(())
    }

    pub fn label(&self) -> &str {
        let copied_until = self.copied_until.lock().unwrap_or_else(|e| e.into_inner());
        match *copied_until {
            Some(until) if Instant::now() < until => COPIED_LABEL,
            _ => &self.label,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// In-memory clipboard for tests
    #[derive(Default)]
    pub(crate) struct FakeClipboard {
        pub(crate) contents: Mutex<Option<String>>,
        pub(crate) fail: bool,
    }

    impl Clipboard for FakeClipboard {
        fn write_text(&self, text: &str) -> Result<()> {
            if self.fail {
                bail!("clipboard unavailable");
            }
            *self.contents.lock().unwrap() = Some(text.to_string());
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_label_reverts_after_exactly_2000ms() {
        let clipboard = FakeClipboard::default();
        let button = CopyButton::new("Copy");
        assert_eq!(button.label(), "Copy");

        button.click(&clipboard, "hello").unwrap();
        assert_eq!(button.label(), COPIED_LABEL);
        assert_eq!(clipboard.contents.lock().unwrap().as_deref(), Some("hello"));

        tokio::time::advance(Duration::from_millis(1999)).await;
        assert_eq!(button.label(), COPIED_LABEL);

        tokio::time::advance(Duration::from_millis(1)).await;
        assert_eq!(button.label(), "Copy");
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_click_restarts_timer() {
        let clipboard = FakeClipboard::default();
        let button = CopyButton::new("Copy");

        button.click(&clipboard, "a").unwrap();
        tokio::time::advance(Duration::from_millis(1500)).await;
        button.click(&clipboard, "b").unwrap();
        tokio::time::advance(Duration::from_millis(1500)).await;
        assert_eq!(button.label(), COPIED_LABEL);

        tokio::time::advance(Duration::from_millis(500)).await;
        assert_eq!(button.label(), "Copy");
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_copy_keeps_label() {
        let clipboard = FakeClipboard {
            fail: true,
            ..Default::default()
        };
        let button = CopyButton::new("Copy Summary");
        assert!(button.click(&clipboard, "text").is_err());
        assert_eq!(button.label(), "Copy Summary");
    }
}
