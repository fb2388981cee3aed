//! Clipboard implementations

use std::process::Stdio;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::domain::{Clipboard, DomainError};

/// Clipboard command used when none is configured
pub fn default_clipboard_command() -> &'static str {
    if cfg!(target_os = "macos") {
        "pbcopy"
    } else if cfg!(target_os = "windows") {
        "clip"
    } else {
        "xclip -selection clipboard"
    }
}

/// Clipboard that pipes text into a platform copy command
#[derive(Debug, Clone)]
pub struct SystemClipboard {
    program: String,
    args: Vec<String>,
}

impl SystemClipboard {
    /// Parse a command line such as `xclip -selection clipboard`
    pub fn new(command: &str) -> Result<Self, DomainError> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| DomainError::configuration("Clipboard command is empty"))?;

        Ok(Self {
            program,
            args: parts.collect(),
        })
    }
}

impl Default for SystemClipboard {
    fn default() -> Self {
        let mut parts = default_clipboard_command().split_whitespace().map(str::to_string);
        Self {
            program: parts.next().unwrap_or_default(),
            args: parts.collect(),
        }
    }
}

#[async_trait]
impl Clipboard for SystemClipboard {
    async fn write_text(&self, text: &str) -> Result<(), DomainError> {
        debug!(program = %self.program, "Writing to system clipboard");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| DomainError::clipboard(format!("Failed to start '{}': {}", self.program, e)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| DomainError::clipboard("Clipboard command has no stdin"))?;
        stdin
            .write_all(text.as_bytes())
            .await
            .map_err(|e| DomainError::clipboard(format!("Failed to write to clipboard: {}", e)))?;
        drop(stdin);

        let status = child
            .wait()
            .await
            .map_err(|e| DomainError::clipboard(format!("Clipboard command failed: {}", e)))?;

        if !status.success() {
            return Err(DomainError::clipboard(format!(
                "Clipboard command exited with {}",
                status
            )));
        }

        Ok(())
    }
}

/// Clipboard kept in process memory
#[derive(Debug, Default)]
pub struct InMemoryClipboard {
    contents: Mutex<Option<String>>,
}

impl InMemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.lock().ok().and_then(|c| c.clone())
    }
}

#[async_trait]
impl Clipboard for InMemoryClipboard {
    async fn write_text(&self, text: &str) -> Result<(), DomainError> {
        let mut contents = self
            .contents
            .lock()
            .map_err(|_| DomainError::clipboard("Clipboard lock poisoned"))?;
        *contents = Some(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        let clipboard = SystemClipboard::new("xclip -selection clipboard").unwrap();
        assert_eq!(clipboard.program, "xclip");
        assert_eq!(clipboard.args, vec!["-selection", "clipboard"]);

        assert!(SystemClipboard::new("   ").is_err());
    }

    #[tokio::test]
    async fn test_in_memory_clipboard() {
        let clipboard = InMemoryClipboard::new();
        assert_eq!(clipboard.contents(), None);

        clipboard.write_text("tvly-dev-abc").await.unwrap();
        assert_eq!(clipboard.contents().as_deref(), Some("tvly-dev-abc"));
    }

    #[tokio::test]
    async fn test_missing_program_is_clipboard_error() {
        let clipboard = SystemClipboard::new("definitely-not-a-clipboard-binary-4242").unwrap();

        let err = clipboard.write_text("secret").await.unwrap_err();
        assert!(matches!(err, DomainError::Clipboard { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_that_ignores_input_fails_cleanly() {
        let clipboard = SystemClipboard::new("true").unwrap();
        let text = "x".repeat(1024 * 1024);

        let err = clipboard.write_text(&text).await.unwrap_err();
        assert!(matches!(err, DomainError::Clipboard { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_pipes_into_command() {
        let clipboard = SystemClipboard::new("cat").unwrap();
        clipboard.write_text("tvly-dev-abc").await.unwrap();
    }
}
