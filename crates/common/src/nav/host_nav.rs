use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::sync::mpsc;
use url::Url;

use super::{Action, ExternalFile, Host, PickerEvent, PolyNav};
use crate::error::{PodError, Result};
use crate::session::Session;

/// How long a dismissed picker may still deliver a selection before the pick
/// counts as cancelled.
pub const PICK_CANCEL_GRACE: Duration = Duration::from_secs(1);

pub type ActionHandler = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct NavState {
    active: BTreeSet<Action>,
    handlers: HashMap<Action, ActionHandler>,
}

/// Navigation gateway backed by a [`Host`].
pub struct HostNav {
    host: Arc<dyn Host>,
    session: Arc<Session>,
    state: RwLock<NavState>,
}

impl HostNav {
    pub fn new(host: Arc<dyn Host>, session: Arc<Session>) -> Self {
        Self {
            host,
            session,
            state: RwLock::new(NavState::default()),
        }
    }

    /// Register the feature's handler for an action.
    pub fn on_action(&self, action: Action, handler: ActionHandler) {
        self.state.write().handlers.insert(action, handler);
    }

    pub fn active_actions(&self) -> Vec<Action> {
        self.state.read().active.iter().copied().collect()
    }

    /// A key press reported by the host. Returns whether the feature took it.
    pub fn handle_key(&self, key: &str) -> bool {
        match Action::from_key(key) {
            Some(action) => self.dispatch(action),
            None => false,
        }
    }

    /// A back gesture reported by the host. Returns whether the feature took
    /// it; `false` means the host should leave the feature.
    pub fn handle_history_pop(&self) -> bool {
        self.dispatch(Action::Back)
    }

    fn dispatch(&self, action: Action) -> bool {
        let handler = {
            let state = self.state.read();
            if !state.active.contains(&action) {
                return false;
            }
            state.handlers.get(&action).cloned()
        };
        match handler {
            Some(handler) => {
                tracing::debug!(%action, "poly_nav: dispatching action");
                handler();
                true
            }
            None => false,
        }
    }
}

/// Wait for a selection, ignoring further dismissals.
async fn next_selection(events: &mut mpsc::Receiver<PickerEvent>) -> Option<ExternalFile> {
    while let Some(event) = events.recv().await {
        if let PickerEvent::Selected(file) = event {
            return Some(file);
        }
    }
    None
}

#[async_trait]
impl PolyNav for HostNav {
    async fn open_url(&self, link: &str) -> Result<()> {
        tracing::debug!(link, "poly_nav: open_url");
        let manifest = self.session.manifest();
        let target = manifest
            .link(link)
            .ok_or_else(|| PodError::UnknownLink(link.to_string()))?;
        let url = Url::parse(target)
            .map_err(|e| PodError::Config(format!("link {} is not a URL: {}", link, e)))?;

        let message = format!(
            "Feature {} is trying to open URL {}. Allow?",
            manifest.name, url
        );
        if !self.host.confirm(&message).await {
            tracing::warn!(link, "user declined to open URL");
            return Err(PodError::PermissionDenied(format!(
                "user declined to open {}",
                url
            )));
        }
        self.host.open_url(&url).await
    }

    async fn set_active_actions(&self, actions: &[Action]) -> Result<()> {
        tracing::debug!(?actions, "poly_nav: set_active_actions");
        self.state.write().active = actions.iter().copied().collect();
        if actions.contains(&Action::Back) {
            let title = self.session.feature_name();
            self.host.push_history(&title).await;
        }
        Ok(())
    }

    async fn set_title(&self, title: &str) -> Result<()> {
        tracing::debug!(title, "poly_nav: set_title");
        self.session.set_title(title);
        self.host.show_title(title).await;
        Ok(())
    }

    async fn pick_file(&self, mime_type: Option<&str>) -> Result<Option<ExternalFile>> {
        tracing::debug!(?mime_type, "poly_nav: pick_file");
        let mut events = self.host.pick_file(mime_type).await?;
        let selection = match events.recv().await {
            Some(PickerEvent::Selected(file)) => Some(file),
            Some(PickerEvent::Dismissed) => {
                tokio::time::timeout(PICK_CANCEL_GRACE, next_selection(&mut events))
                    .await
                    .unwrap_or(None)
            }
            None => None,
        };

        // the feature only ever sees a reference to what the user chose
        Ok(selection.map(|mut file| {
            file.url = self.session.grant_pick(&file.url, &file.name);
            tracing::info!(name = %file.name, size = file.size, "poly_nav: file picked");
            file
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::session::Manifest;
    use crate::testkit::ScriptedHost;

    fn nav(host: Arc<ScriptedHost>) -> HostNav {
        let manifest = Manifest::new("Explorer").with_link("help", "https://example.org/help");
        HostNav::new(host, Arc::new(Session::new(manifest)))
    }

    #[tokio::test]
    async fn test_back_registers_history_entry() {
        let host = Arc::new(ScriptedHost::new());
        let nav = nav(host.clone());

        nav.set_active_actions(&[Action::Info]).await.unwrap();
        assert!(host.history().is_empty());

        nav.set_active_actions(&[Action::Back, Action::Search])
            .await
            .unwrap();
        assert_eq!(host.history(), vec!["Explorer".to_string()]);
        assert_eq!(nav.active_actions(), vec![Action::Back, Action::Search]);
    }

    #[tokio::test]
    async fn test_only_active_actions_dispatch() {
        let host = Arc::new(ScriptedHost::new());
        let nav = nav(host);
        let backs = Arc::new(AtomicUsize::new(0));
        let counter = backs.clone();
        nav.on_action(
            Action::Back,
            Arc::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        assert!(!nav.handle_history_pop());
        nav.set_active_actions(&[Action::Back]).await.unwrap();
        assert!(nav.handle_history_pop());
        assert!(nav.handle_key("Escape"));
        assert!(!nav.handle_key("s"));
        assert_eq!(backs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_open_url_requires_consent() {
        let host = Arc::new(ScriptedHost::new());
        let nav = nav(host.clone());

        host.answer_next(false);
        assert!(matches!(
            nav.open_url("help").await,
            Err(PodError::PermissionDenied(_))
        ));
        assert!(host.opened_urls().is_empty());

        host.answer_next(true);
        nav.open_url("help").await.unwrap();
        assert_eq!(host.opened_urls(), vec!["https://example.org/help".to_string()]);

        let prompts = host.prompts();
        assert!(prompts[0].contains("Explorer"));
        assert!(prompts[0].contains("https://example.org/help"));
    }

    #[tokio::test]
    async fn test_open_unknown_link() {
        let host = Arc::new(ScriptedHost::new());
        let nav = nav(host.clone());
        assert_eq!(
            nav.open_url("imprint").await,
            Err(PodError::UnknownLink("imprint".to_string()))
        );
        assert!(host.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_set_title_updates_session_and_chrome() {
        let host = Arc::new(ScriptedHost::new());
        let nav = nav(host.clone());
        nav.set_title("Report").await.unwrap();
        assert_eq!(host.titles(), vec!["Report".to_string()]);
        assert_eq!(nav.session.feature_name(), "Report");
    }

    #[tokio::test]
    async fn test_pick_file_selected() {
        let host = Arc::new(ScriptedHost::new());
        let file = ExternalFile {
            name: "export.zip".to_string(),
            url: "file:///tmp/export.zip".to_string(),
            size: 10,
        };
        host.queue_pick(vec![PickerEvent::Selected(file.clone())]);
        let nav = nav(host.clone());
        let picked = nav.pick_file(Some("application/zip")).await.unwrap().unwrap();
        assert_eq!(picked.name, file.name);
        assert_eq!(picked.size, file.size);
        assert!(picked.url.starts_with("polypod-picked://"));
        assert_eq!(
            nav.session.picked_source(&picked.url),
            Some("file:///tmp/export.zip".to_string())
        );
        assert_eq!(host.pick_types(), vec![Some("application/zip".to_string())]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pick_file_dismissed_without_selection() {
        let host = Arc::new(ScriptedHost::new());
        // the sender stays open, so only the grace period ends the wait
        let _events = host.queue_pick_open(vec![PickerEvent::Dismissed]);
        let nav = nav(host);
        assert_eq!(nav.pick_file(None).await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pick_file_selection_after_dismissal() {
        let host = Arc::new(ScriptedHost::new());
        let file = ExternalFile {
            name: "late.zip".to_string(),
            url: "file:///tmp/late.zip".to_string(),
            size: 1,
        };
        host.queue_pick(vec![
            PickerEvent::Dismissed,
            PickerEvent::Selected(file.clone()),
        ]);
        let nav = nav(host);
        let picked = nav.pick_file(None).await.unwrap().unwrap();
        assert_eq!(picked.name, "late.zip");
        assert_eq!(
            nav.session.picked_source(&picked.url),
            Some(file.url)
        );
    }

    #[tokio::test]
    async fn test_pick_file_closed_stream_is_cancel() {
        let host = Arc::new(ScriptedHost::new());
        host.queue_pick(vec![]);
        let nav = nav(host);
        assert_eq!(nav.pick_file(None).await.unwrap(), None);
    }
}
