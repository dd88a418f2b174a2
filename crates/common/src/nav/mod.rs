//! Navigation gateway (PolyNav)
//!
//! Mediates the chrome around a feature: its title, which host actions
//! (back/info/search) it handles itself, opening external links, and picking
//! files. Everything that needs the user goes through a [`Host`].

mod host;
mod host_nav;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{PodError, Result};

pub use host::{Host, PickerEvent};
pub use host_nav::{ActionHandler, HostNav, PICK_CANCEL_GRACE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Back,
    Info,
    Search,
}

impl Action {
    /// Keyboard shortcut for an action, as the host reports key names.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "Escape" => Some(Action::Back),
            "s" => Some(Action::Search),
            "i" => Some(Action::Info),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Back => "back",
            Action::Info => "info",
            Action::Search => "search",
        })
    }
}

impl FromStr for Action {
    type Err = PodError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "back" => Ok(Action::Back),
            "info" => Ok(Action::Info),
            "search" => Ok(Action::Search),
            other => Err(PodError::Config(format!("unknown action: {}", other))),
        }
    }
}

/// A file the user picked, importable through `PolyOut::import_archive`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalFile {
    pub name: String,
    pub url: String,
    pub size: u64,
}

#[async_trait]
pub trait PolyNav: Send + Sync {
    /// Open a link named in the feature manifest, after the user agrees.
    async fn open_url(&self, link: &str) -> Result<()>;

    /// Replace the set of actions the feature handles itself.
    async fn set_active_actions(&self, actions: &[Action]) -> Result<()>;

    async fn set_title(&self, title: &str) -> Result<()>;

    /// `None` when the user cancels.
    async fn pick_file(&self, mime_type: Option<&str>) -> Result<Option<ExternalFile>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mapping() {
        assert_eq!(Action::from_key("Escape"), Some(Action::Back));
        assert_eq!(Action::from_key("s"), Some(Action::Search));
        assert_eq!(Action::from_key("i"), Some(Action::Info));
        assert_eq!(Action::from_key("q"), None);
    }

    #[test]
    fn test_action_names() {
        for action in [Action::Back, Action::Info, Action::Search] {
            assert_eq!(action.to_string().parse::<Action>().unwrap(), action);
        }
        assert!("forward".parse::<Action>().is_err());
        assert_eq!(serde_json::to_string(&Action::Back).unwrap(), r#""back""#);
    }
}
