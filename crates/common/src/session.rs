//! Per-session state shared by the navigation and endpoint gateways.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{PodError, Result};
use crate::poly_out::FileUrl;
use crate::uri::PICKED_SCHEME;

const NAV_DEFAULT_BACKGROUND_COLOR: &str = "#ffffff";
const NAV_DARK_FOREGROUND_COLOR: &str = "#000000";
const NAV_LIGHT_FOREGROUND_COLOR: &str = "#ffffff";
const NAV_BRIGHTNESS_THRESHOLD: f64 = 80.0;

/// The parts of a feature manifest the runtime consults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    /// Symbolic link names a feature may ask to open
    #[serde(default)]
    pub links: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavBarColors {
    pub fg: &'static str,
    pub bg: String,
}

impl Manifest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_link(mut self, name: impl Into<String>, url: impl Into<String>) -> Self {
        self.links.insert(name.into(), url.into());
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let manifest: Manifest = serde_json::from_str(json)
            .map_err(|e| PodError::Config(format!("unable to parse feature manifest: {}", e)))?;
        if manifest.name.trim().is_empty() {
            return Err(PodError::Config("feature manifest has no name".to_string()));
        }
        Ok(manifest)
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| PodError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    pub fn link(&self, name: &str) -> Option<&str> {
        self.links.get(name).map(String::as_str)
    }

    /// Chrome colors: the primary color as background, with a foreground
    /// picked by the background's relative luminance.
    pub fn nav_bar_colors(&self) -> NavBarColors {
        let bg = self
            .primary_color
            .clone()
            .filter(|c| luminance(c).is_some())
            .unwrap_or_else(|| NAV_DEFAULT_BACKGROUND_COLOR.to_string());
        let fg = match luminance(&bg) {
            Some(l) if l > NAV_BRIGHTNESS_THRESHOLD => NAV_DARK_FOREGROUND_COLOR,
            _ => NAV_LIGHT_FOREGROUND_COLOR,
        };
        NavBarColors { fg, bg }
    }
}

/// Relative luminance of a `#rrggbb` color.
fn luminance(color: &str) -> Option<f64> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok().map(f64::from);
    let (red, green, blue) = (channel(0)?, channel(2)?, channel(4)?);
    Some(red * 0.2126 + green * 0.7152 + blue * 0.0722)
}

/// State that lives exactly as long as one feature session.
#[derive(Debug)]
pub struct Session {
    manifest: Manifest,
    title: RwLock<Option<String>>,
    /// Opaque pick reference -> the host source it stands for
    picked: RwLock<HashMap<String, String>>,
}

impl Session {
    pub fn new(manifest: Manifest) -> Self {
        Self {
            manifest,
            title: RwLock::new(None),
            picked: RwLock::new(HashMap::new()),
        }
    }

    /// Record that the user picked `source` and return the reference the
    /// feature gets instead, of the form `polypod-picked://<uuid>/<name>`.
    pub fn grant_pick(&self, source: &str, name: &str) -> String {
        let reference =
            FileUrl::from_parts(&format!("{}://{}", PICKED_SCHEME, Uuid::new_v4()), name).url;
        self.picked
            .write()
            .insert(reference.clone(), source.to_string());
        reference
    }

    /// The host source behind a pick reference, if this session issued it.
    pub fn picked_source(&self, reference: &str) -> Option<String> {
        self.picked.read().get(reference).cloned()
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn set_title(&self, title: &str) {
        *self.title.write() = Some(title.to_string());
    }

    pub fn title(&self) -> Option<String> {
        self.title.read().clone()
    }

    /// Name shown in consent prompts: the current title, else the manifest name.
    pub fn feature_name(&self) -> String {
        self.title()
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| self.manifest.name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_from_json() {
        let manifest = Manifest::from_json(
            r##"{"name":"Explorer","primaryColor":"#0f1938","links":{"help":"https://example.org/help"}}"##,
        )
        .unwrap();
        assert_eq!(manifest.name, "Explorer");
        assert_eq!(manifest.link("help"), Some("https://example.org/help"));
        assert_eq!(manifest.link("missing"), None);
    }

    #[test]
    fn test_manifest_requires_name() {
        assert!(matches!(
            Manifest::from_json(r#"{"name":""}"#),
            Err(PodError::Config(_))
        ));
        assert!(matches!(
            Manifest::from_json("not json"),
            Err(PodError::Config(_))
        ));
    }

    #[test]
    fn test_nav_bar_colors() {
        let mut manifest = Manifest::new("f");
        assert_eq!(
            manifest.nav_bar_colors(),
            NavBarColors {
                fg: "#000000",
                bg: "#ffffff".to_string()
            }
        );

        manifest.primary_color = Some("#0f1938".to_string());
        assert_eq!(manifest.nav_bar_colors().fg, "#ffffff");

        manifest.primary_color = Some("garbage".to_string());
        assert_eq!(manifest.nav_bar_colors().bg, "#ffffff");
    }

    #[test]
    fn test_pick_references_are_opaque() {
        let session = Session::new(Manifest::new("f"));
        let reference = session.grant_pick("file:///home/me/takeout.zip", "takeout.zip");

        assert!(reference.starts_with("polypod-picked://"));
        assert!(!reference.contains("/home/me"));
        assert_eq!(FileUrl::from_url(&reference).file_name, "takeout.zip");
        assert_eq!(
            session.picked_source(&reference).as_deref(),
            Some("file:///home/me/takeout.zip")
        );
        assert_eq!(session.picked_source("file:///home/me/takeout.zip"), None);

        let other = Session::new(Manifest::new("f"));
        assert_eq!(other.picked_source(&reference), None);
    }

    #[test]
    fn test_feature_name_prefers_title() {
        let session = Session::new(Manifest::new("Facebook Import"));
        assert_eq!(session.feature_name(), "Facebook Import");
        session.set_title("Report");
        assert_eq!(session.feature_name(), "Report");
    }
}
