//! Loading and persisting rendering preferences.

use crate::store::ConfigStore;
use crate::types::{DarkMode, FontSize, LatexResult, Preferences};

/// Config store section holding the preferences.
pub const SECTION: &str = "latex";
pub const DARK_MODE_KEY: &str = "darkMode";
pub const FONT_SIZE_KEY: &str = "fontSize";

/// Environment variable overriding the stored dark mode on startup.
pub const DARK_MODE_ENV: &str = "LATEX__DARKMODE";
/// Environment variable overriding the stored font size on startup.
pub const FONT_SIZE_ENV: &str = "LATEX__FONTSIZE";

/// Startup overrides that take precedence over the store on initial load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferenceOverrides {
    pub dark_mode: Option<bool>,
    pub font_size: Option<String>,
}

impl PreferenceOverrides {
    /// Collect overrides through `lookup`, normally `std::env::var`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let dark_mode = lookup(DARK_MODE_ENV).and_then(|raw| parse_bool(&raw));
        let font_size = lookup(FONT_SIZE_ENV)
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty());
        Self {
            dark_mode,
            font_size,
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Build the initial preferences. Overrides win over stored values; a value
/// that does not parse falls through to the store.
pub fn load_preferences(
    store: &dyn ConfigStore,
    overrides: &PreferenceOverrides,
) -> LatexResult<Preferences> {
    let dark_mode = match overrides.dark_mode {
        Some(value) => Some(value),
        None => store.get_bool(SECTION, DARK_MODE_KEY)?,
    };

    let font_size = match overrides.font_size.as_deref().and_then(FontSize::parse) {
        Some(size) => Some(size),
        None => store
            .get_string(SECTION, FONT_SIZE_KEY)?
            .as_deref()
            .and_then(FontSize::parse),
    };

    Ok(Preferences::new(DarkMode::from_option(dark_mode), font_size))
}

pub fn persist_dark_mode(store: &dyn ConfigStore, value: bool) -> LatexResult<()> {
    store.set_bool(SECTION, DARK_MODE_KEY, value)
}

pub fn persist_font_size(store: &dyn ConfigStore, value: Option<FontSize>) -> LatexResult<()> {
    match value {
        Some(size) => store.set_string(SECTION, FONT_SIZE_KEY, size.ident()),
        None => store.remove(SECTION, FONT_SIZE_KEY),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryConfigStore;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let pairs: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
    }

    #[test]
    fn test_load_from_empty_store() {
        let store = MemoryConfigStore::new();
        let prefs = load_preferences(&store, &PreferenceOverrides::default()).unwrap();
        assert_eq!(prefs, Preferences::default());
    }

    #[test]
    fn test_load_from_store() {
        let store = MemoryConfigStore::new();
        store.set_bool(SECTION, DARK_MODE_KEY, false).unwrap();
        store.set_string(SECTION, FONT_SIZE_KEY, "huge").unwrap();

        let prefs = load_preferences(&store, &PreferenceOverrides::default()).unwrap();
        assert_eq!(prefs.dark_mode, DarkMode::Off);
        assert_eq!(prefs.font_size, Some(FontSize::Huge));
    }

    #[test]
    fn test_env_overrides_win() {
        let store = MemoryConfigStore::new();
        store.set_bool(SECTION, DARK_MODE_KEY, false).unwrap();
        store.set_string(SECTION, FONT_SIZE_KEY, "huge").unwrap();

        let overrides =
            PreferenceOverrides::from_lookup(env(&[(DARK_MODE_ENV, "True"), (FONT_SIZE_ENV, "tiny")]));
        let prefs = load_preferences(&store, &overrides).unwrap();
        assert_eq!(prefs.dark_mode, DarkMode::On);
        assert_eq!(prefs.font_size, Some(FontSize::Tiny));
    }

    #[test]
    fn test_unparseable_override_falls_through() {
        let store = MemoryConfigStore::new();
        store.set_bool(SECTION, DARK_MODE_KEY, true).unwrap();
        store.set_string(SECTION, FONT_SIZE_KEY, "LARGE").unwrap();

        let overrides =
            PreferenceOverrides::from_lookup(env(&[(DARK_MODE_ENV, "yes"), (FONT_SIZE_ENV, "Large")]));
        assert_eq!(overrides.dark_mode, None);

        let prefs = load_preferences(&store, &overrides).unwrap();
        assert_eq!(prefs.dark_mode, DarkMode::On);
        assert_eq!(prefs.font_size, Some(FontSize::ExtraLarge));
    }

    #[test]
    fn test_invalid_stored_font_size_is_absent() {
        let store = MemoryConfigStore::new();
        store.set_string(SECTION, FONT_SIZE_KEY, "gigantic").unwrap();
        let prefs = load_preferences(&store, &PreferenceOverrides::default()).unwrap();
        assert_eq!(prefs.font_size, None);
    }

    #[test]
    fn test_persist_font_size_none_removes_key() {
        let store = MemoryConfigStore::new();
        persist_font_size(&store, Some(FontSize::Small)).unwrap();
        assert_eq!(store.get_string(SECTION, FONT_SIZE_KEY).unwrap().as_deref(), Some("small"));
        persist_font_size(&store, None).unwrap();
        assert_eq!(store.get_string(SECTION, FONT_SIZE_KEY).unwrap(), None);
    }
}
