//! A [`Host`] for the terminal: prompts on stderr, answers from stdin.

use std::io::Write;
use std::path::Path;

use async_trait::async_trait;
use common::error::{PodError, Result};
use common::nav::{ExternalFile, Host, PickerEvent};
use tokio::sync::mpsc;
use url::Url;

pub struct TerminalHost {
    /// Approve every prompt without asking
    assume_yes: bool,
}

impl TerminalHost {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

/// Print `prompt` and read one line; `None` on end of input.
async fn read_line(prompt: String) -> Option<String> {
    tokio::task::spawn_blocking(move || {
        eprint!("{}", prompt);
        std::io::stderr().flush().ok();
        let mut line = String::new();
        match std::io::stdin().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    })
    .await
    .ok()
    .flatten()
}

fn is_approval(answer: &str) -> bool {
    matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Describe a local file the way a platform picker would.
fn external_file(path: &Path, mime_type: Option<&str>) -> Result<ExternalFile> {
    let path = path
        .canonicalize()
        .map_err(|e| PodError::NotFound(format!("{}: {}", path.display(), e)))?;
    let size = path
        .metadata()
        .map_err(|e| PodError::NotFound(format!("{}: {}", path.display(), e)))?
        .len();
    if let (Some(wanted), Some(guessed)) = (mime_type, mime_guess::from_path(&path).first()) {
        if guessed.essence_str() != wanted {
            tracing::warn!(path = %path.display(), wanted, guessed = %guessed, "picked file has an unexpected type");
        }
    }
    let url = Url::from_file_path(&path)
        .map_err(|_| PodError::NotFound(path.display().to_string()))?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    Ok(ExternalFile {
        name,
        url: url.to_string(),
        size,
    })
}

#[async_trait]
impl Host for TerminalHost {
    async fn confirm(&self, message: &str) -> bool {
        if self.assume_yes {
            eprintln!("{} [approved by --yes]", message);
            return true;
        }
        read_line(format!("{} [y/N] ", message))
            .await
            .map(|answer| is_approval(&answer))
            .unwrap_or(false)
    }

    async fn open_url(&self, url: &Url) -> Result<()> {
        eprintln!("open: {}", url);
        Ok(())
    }

    async fn show_title(&self, title: &str) {
        eprintln!("title: {}", title);
    }

    async fn push_history(&self, title: &str) {
        tracing::debug!(title, "history entry pushed");
    }

    async fn pick_file(&self, mime_type: Option<&str>) -> Result<mpsc::Receiver<PickerEvent>> {
        let (tx, rx) = mpsc::channel(1);
        let prompt = match mime_type {
            Some(mime_type) => format!("path to a {} file (empty to cancel): ", mime_type),
            None => "path to a file (empty to cancel): ".to_string(),
        };
        let event = match read_line(prompt).await.filter(|line| !line.is_empty()) {
            Some(path) => PickerEvent::Selected(external_file(Path::new(&path), mime_type)?),
            None => PickerEvent::Dismissed,
        };
        // capacity one and nothing else sent
        let _ = tx.send(event).await;
        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approval_answers() {
        assert!(is_approval("y"));
        assert!(is_approval("YES"));
        assert!(!is_approval(""));
        assert!(!is_approval("no"));
    }

    #[test]
    fn test_external_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("export.zip");
        std::fs::write(&path, b"12345").unwrap();

        let file = external_file(&path, Some("application/zip")).unwrap();
        assert_eq!(file.name, "export.zip");
        assert_eq!(file.size, 5);
        assert!(file.url.starts_with("file:///"));
        assert!(file.url.ends_with("/export.zip"));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            external_file(Path::new("/definitely/not/here.zip"), None),
            Err(PodError::NotFound(_))
        ));
    }
}
