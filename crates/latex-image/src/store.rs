//! Sectioned key/value configuration store.
//!
//! The file-backed store keeps one JSON object per section:
//!
//! ```json
//! { "latex": { "darkMode": true, "fontSize": "tiny" } }
//! ```
//!
//! Every write rewrites the whole file through a temporary sibling and a
//! rename, so each single-key update is atomic. Nothing spans several keys.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::{Map, Value};

use crate::types::{LatexError, LatexResult};

type Sections = BTreeMap<String, Map<String, Value>>;

/// Typed scalar access to a sectioned configuration store.
pub trait ConfigStore: Send + Sync {
    fn get_bool(&self, section: &str, key: &str) -> LatexResult<Option<bool>>;
    fn get_string(&self, section: &str, key: &str) -> LatexResult<Option<String>>;
    fn set_bool(&self, section: &str, key: &str, value: bool) -> LatexResult<()>;
    fn set_string(&self, section: &str, key: &str, value: &str) -> LatexResult<()>;
    fn remove(&self, section: &str, key: &str) -> LatexResult<()>;
}

fn lookup<'a>(sections: &'a Sections, section: &str, key: &str) -> Option<&'a Value> {
    sections.get(section).and_then(|s| s.get(key))
}

/// JSON file store at user scope (e.g. `~/.latex-image/config.json`).
pub struct JsonConfigStore {
    path: PathBuf,
    sections: Mutex<Sections>,
}

impl JsonConfigStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> LatexResult<Self> {
        let path = path.into();
        let sections = if path.exists() {
            let bytes = std::fs::read(&path)?;
            if bytes.iter().all(u8::is_ascii_whitespace) {
                Sections::new()
            } else {
                serde_json::from_slice(&bytes)?
            }
        } else {
            Sections::new()
        };

        tracing::debug!("Opened config store: {}", path.display());

        Ok(Self {
            path,
            sections: Mutex::new(sections),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn update(&self, f: impl FnOnce(&mut Sections)) -> LatexResult<()> {
        let mut sections = self
            .sections
            .lock()
            .map_err(|_| LatexError::Persistence("config store lock poisoned".to_string()))?;

        let mut next = sections.clone();
        f(&mut next);
        next.retain(|_, keys| !keys.is_empty());

        write_atomic(&self.path, &next)
            .map_err(|e| LatexError::Persistence(format!("{}: {e}", self.path.display())))?;

        *sections = next;
        Ok(())
    }

    fn read(&self, section: &str, key: &str) -> LatexResult<Option<Value>> {
        let sections = self
            .sections
            .lock()
            .map_err(|_| LatexError::Persistence("config store lock poisoned".to_string()))?;
        Ok(lookup(&sections, section, key).cloned())
    }
}

fn write_atomic(path: &Path, sections: &Sections) -> LatexResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let payload = serde_json::to_vec_pretty(sections)?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    std::fs::write(&tmp, payload)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

impl ConfigStore for JsonConfigStore {
    fn get_bool(&self, section: &str, key: &str) -> LatexResult<Option<bool>> {
        Ok(self.read(section, key)?.and_then(|v| match v {
            Value::Bool(b) => Some(b),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }))
    }

    fn get_string(&self, section: &str, key: &str) -> LatexResult<Option<String>> {
        Ok(self.read(section, key)?.and_then(|v| match v {
            Value::String(s) => Some(s),
            _ => None,
        }))
    }

    fn set_bool(&self, section: &str, key: &str, value: bool) -> LatexResult<()> {
        self.update(|sections| {
            sections
                .entry(section.to_string())
                .or_default()
                .insert(key.to_string(), Value::Bool(value));
        })
    }

    fn set_string(&self, section: &str, key: &str, value: &str) -> LatexResult<()> {
        self.update(|sections| {
            sections
                .entry(section.to_string())
                .or_default()
                .insert(key.to_string(), Value::String(value.to_string()));
        })
    }

    fn remove(&self, section: &str, key: &str) -> LatexResult<()> {
        if self.read(section, key)?.is_none() {
            return Ok(());
        }
        self.update(|sections| {
            if let Some(keys) = sections.get_mut(section) {
                keys.remove(key);
            }
        })
    }
}

/// In-memory store with no backing file.
#[derive(Default)]
pub struct MemoryConfigStore {
    sections: Mutex<Sections>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with<T>(&self, f: impl FnOnce(&mut Sections) -> T) -> LatexResult<T> {
        let mut sections = self
            .sections
            .lock()
            .map_err(|_| LatexError::Persistence("config store lock poisoned".to_string()))?;
        Ok(f(&mut sections))
    }
}

impl ConfigStore for MemoryConfigStore {
    fn get_bool(&self, section: &str, key: &str) -> LatexResult<Option<bool>> {
        self.with(|s| lookup(s, section, key).and_then(Value::as_bool))
    }

    fn get_string(&self, section: &str, key: &str) -> LatexResult<Option<String>> {
        self.with(|s| lookup(s, section, key).and_then(Value::as_str).map(str::to_string))
    }

    fn set_bool(&self, section: &str, key: &str, value: bool) -> LatexResult<()> {
        self.with(|s| {
            s.entry(section.to_string())
                .or_default()
                .insert(key.to_string(), Value::Bool(value));
        })
    }

    fn set_string(&self, section: &str, key: &str, value: &str) -> LatexResult<()> {
        self.with(|s| {
            s.entry(section.to_string())
                .or_default()
                .insert(key.to_string(), Value::String(value.to_string()));
        })
    }

    fn remove(&self, section: &str, key: &str) -> LatexResult<()> {
        self.with(|s| {
            if let Some(keys) = s.get_mut(section) {
                keys.remove(key);
            }
        })
    }
}
