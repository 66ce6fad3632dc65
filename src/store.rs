//! Persisted user state: profiles, gesture definitions, runtime settings
//! and UI texts, kept as JSON files in a resource directory.

use crate::{
    gestures::GestureDefinition,
    profile::{Action, Profile},
    Result,
};
use log::{debug, warn};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const PROFILES_FILE: &str = "profile_config.json";
pub const GESTURES_FILE: &str = "gestures.json";
pub const MAIN_CONFIG_FILE: &str = "main_config.json";
pub const TEXTS_FILE: &str = "text_resources.json";

/// Language used when a text has no entry for the requested one
pub const FALLBACK_LANG: &str = "uk";

/// Interface language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Uk,
    En,
}

impl Language {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uk => "uk",
            Self::En => "en",
        }
    }
}

fn default_last_profile() -> String {
    "default".to_string()
}

fn default_lang() -> String {
    FALLBACK_LANG.to_string()
}

const fn default_scale() -> f64 {
    crate::constants::DEFAULT_ZOOM_SCALE
}

/// Contents of `main_config.json`
///
/// Keys this crate does not know about are kept and written back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeSettings {
    #[serde(default = "default_last_profile")]
    pub last_profile: String,
    #[serde(default = "default_lang")]
    pub lang: String,
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            last_profile: default_last_profile(),
            lang: default_lang(),
            scale: default_scale(),
            extra: Map::new(),
        }
    }
}

/// Source of profiles, gestures and runtime settings
pub trait ConfigStore: Send + Sync {
    /// Named action → gesture profiles
    ///
    /// # Errors
    ///
    /// Returns an error if the backing data exists but cannot be read
    fn load_profiles(&self) -> Result<HashMap<String, Profile>>;

    /// Gesture definitions, in file order
    ///
    /// # Errors
    ///
    /// Returns an error if the backing data exists but cannot be read
    fn load_gesture_definitions(&self) -> Result<Vec<GestureDefinition>>;

    /// Runtime settings with defaults filled in
    ///
    /// # Errors
    ///
    /// Returns an error if the backing data exists but cannot be read
    fn load_runtime_settings(&self) -> Result<RuntimeSettings>;

    /// Write runtime settings back
    ///
    /// # Errors
    ///
    /// Returns an error if the settings cannot be written
    fn save_runtime_settings(&self, settings: &RuntimeSettings) -> Result<()>;
}

/// [`ConfigStore`] over a directory of JSON files
#[derive(Debug, Clone)]
pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn path(&self, file: &str) -> PathBuf {
        self.base_dir.join(file)
    }

    /// Parse a JSON file, `None` if it does not exist
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn load_json<T: DeserializeOwned>(&self, file: &str) -> Result<Option<T>> {
        let path = self.path(file);
        if !path.exists() {
            debug!("{} not found, using defaults", path.display());
            return Ok(None);
        }
        let contents = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    /// Write a JSON file, creating the directory if needed
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    pub fn save_json<T: Serialize>(&self, file: &str, data: &T) -> Result<()> {
        fs::create_dir_all(&self.base_dir)?;
        let contents = serde_json::to_string_pretty(data)?;
        fs::write(self.path(file), contents)?;
        Ok(())
    }

    /// UI texts
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed
    pub fn load_texts(&self) -> Result<Texts> {
        Ok(Texts::new(self.load_json(TEXTS_FILE)?.unwrap_or(Value::Null)))
    }
}

impl ConfigStore for JsonStore {
    fn load_profiles(&self) -> Result<HashMap<String, Profile>> {
        let raw: Map<String, Value> = self.load_json(PROFILES_FILE)?.unwrap_or_default();
        let mut profiles = HashMap::new();
        for (name, bindings) in raw {
            let Value::Object(bindings) = bindings else {
                warn!("Profile '{name}' is not an object, skipped");
                continue;
            };
            let pairs = bindings.iter().filter_map(|(action, gesture)| match gesture {
                Value::String(gesture) => Some((action.as_str(), gesture.as_str())),
                // mouse_move takes no gesture, any value enables it
                _ if Action::from(action.as_str()) == Action::MouseMove => Some((action.as_str(), "")),
                Value::Null => Some((action.as_str(), "")),
                _ => {
                    warn!("Profile '{name}': gesture for '{action}' is not a string, skipped");
                    None
                }
            });
            profiles.insert(name.clone(), Profile::from_pairs(pairs));
        }
        Ok(profiles)
    }

    fn load_gesture_definitions(&self) -> Result<Vec<GestureDefinition>> {
        Ok(self.load_json(GESTURES_FILE)?.unwrap_or_default())
    }

    fn load_runtime_settings(&self) -> Result<RuntimeSettings> {
        Ok(self.load_json(MAIN_CONFIG_FILE)?.unwrap_or_default())
    }

    fn save_runtime_settings(&self, settings: &RuntimeSettings) -> Result<()> {
        self.save_json(MAIN_CONFIG_FILE, settings)
    }
}

/// Localised UI strings: `{ key: { lang: text } }`, nested groups allowed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Texts {
    root: Value,
}

impl Texts {
    #[must_use]
    pub const fn new(root: Value) -> Self {
        Self { root }
    }

    /// Text for a dotted key such as `help` or `ui.camera.running`
    ///
    /// Falls back to Ukrainian, then to the key itself.
    #[must_use]
    pub fn get(&self, key: &str, lang: &str) -> String {
        let entry = key
            .split('.')
            .try_fold(&self.root, |node, part| node.get(part));
        entry
            .and_then(|e| e.get(lang).or_else(|| e.get(FALLBACK_LANG)))
            .and_then(Value::as_str)
            .map_or_else(|| key.to_string(), str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_runtime_settings_defaults_merge() {
        let settings: RuntimeSettings =
            serde_json::from_value(json!({"lang": "en", "theme": "dark"})).unwrap();
        assert_eq!(settings.last_profile, "default");
        assert_eq!(settings.lang, "en");
        assert_eq!(settings.scale, 1.5);
        assert_eq!(settings.extra.get("theme"), Some(&json!("dark")));

        let back = serde_json::to_value(&settings).unwrap();
        assert_eq!(back["theme"], json!("dark"));
        assert_eq!(back["last_profile"], json!("default"));
    }

    #[test]
    fn test_texts_fallbacks() {
        let texts = Texts::new(json!({
            "help": {"uk": "довідка", "en": "help text"},
            "only_uk": {"uk": "тільки"},
            "ui": {"camera": {"running": {"uk": "працює", "en": "running"}}}
        }));
        assert_eq!(texts.get("help", "en"), "help text");
        assert_eq!(texts.get("only_uk", "en"), "тільки");
        assert_eq!(texts.get("missing", "en"), "missing");
        assert_eq!(texts.get("ui.camera.running", "en"), "running");
        assert_eq!(texts.get("ui.camera", "en"), "ui.camera");
        assert_eq!(Texts::default().get("help", "uk"), "help");
    }

    #[test]
    fn test_mouse_move_with_any_value_follows_cursor() {
        let dir = std::env::temp_dir().join(format!("hand-mouse-store-move-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join(PROFILES_FILE),
            json!({
                "flag": {"mouse_move": true, "click": "thumb_index_touch"},
                "object": {"mouse_move": {}},
                "bad_click": {"click": 5}
            })
            .to_string(),
        )
        .unwrap();

        let profiles = JsonStore::new(&dir).load_profiles().unwrap();
        let _ = std::fs::remove_dir_all(&dir);

        assert!(profiles["flag"].follows_cursor());
        assert_eq!(profiles["flag"].gesture_for(&Action::Click), Some("thumb_index_touch"));
        assert!(profiles["object"].follows_cursor());
        assert!(profiles["bad_click"].bindings().is_empty());
        assert!(!profiles["bad_click"].follows_cursor());
    }

    #[test]
    fn test_language_names() {
        assert_eq!(Language::Uk.as_str(), "uk");
        assert_eq!(Language::En.as_str(), "en");
    }
}
