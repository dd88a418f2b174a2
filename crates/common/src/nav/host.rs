use async_trait::async_trait;
use tokio::sync::mpsc;
use url::Url;

use super::ExternalFile;
use crate::error::Result;

/// What a platform file picker reports while it is open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerEvent {
    Selected(ExternalFile),
    /// The dialog closed. Some platforms send this before (or instead of)
    /// the selection, so it is not a cancellation by itself.
    Dismissed,
}

/// The embedding application: consent prompts, chrome, and platform dialogs.
#[async_trait]
pub trait Host: Send + Sync {
    /// Ask the user a yes/no question. May never return if the user never
    /// answers.
    async fn confirm(&self, message: &str) -> bool;

    async fn open_url(&self, url: &Url) -> Result<()>;

    /// Update the title shown in the host chrome.
    async fn show_title(&self, title: &str);

    /// Push a synthetic history entry so the next back gesture is reported
    /// to the feature instead of leaving it.
    async fn push_history(&self, title: &str);

    /// Open the platform file picker and stream what happens to it.
    async fn pick_file(&self, mime_type: Option<&str>) -> Result<mpsc::Receiver<PickerEvent>>;
}
