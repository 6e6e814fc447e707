use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::app_log;

pub const STORE_FILE_NAME: &str = "config.json";

pub type SharedStateStore = Arc<Mutex<StateStore>>;

/// JSON-file backed key-value preferences for one installation.
///
/// The whole file is rewritten on every `set`, so each value is durable once
/// `set` returns. Reads never fail: a missing or damaged file is an empty store.
#[derive(Debug)]
pub struct StateStore {
    path: PathBuf,
    values: Map<String, Value>,
}

impl StateStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = load_values(&path);
        Self { path, values }
    }

    pub fn shared(self) -> SharedStateStore {
        Arc::new(Mutex::new(self))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let Some(value) = self.values.get(key) else {
            return default;
        };
        match serde_json::from_value(value.clone()) {
            Ok(v) => v,
            Err(e) => {
                app_log::warn(
                    "store",
                    "invalid_value",
                    Some(serde_json::json!({ "key": key, "error": e.to_string() })),
                );
                default
            }
        }
    }

    pub fn set<T: Serialize>(&mut self, key: &str, value: &T) -> io::Result<()> {
        let value =
            serde_json::to_value(value).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut next = self.values.clone();
        next.insert(key.to_string(), value);
        write_atomically(&self.path, &next)?;

        self.values = next;
        Ok(())
    }
}

fn load_values(path: &Path) -> Map<String, Value> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Map::new(),
        Err(e) => {
            app_log::warn(
                "store",
                "read_failed",
                Some(serde_json::json!({ "path": path.display().to_string(), "error": e.to_string() })),
            );
            return Map::new();
        }
    };

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(values)) => values,
        Ok(_) => {
            app_log::warn(
                "store",
                "not_an_object",
                Some(serde_json::json!({ "path": path.display().to_string() })),
            );
            Map::new()
        }
        Err(e) => {
            app_log::warn(
                "store",
                "invalid_json",
                Some(serde_json::json!({ "path": path.display().to_string(), "error": e.to_string() })),
            );
            Map::new()
        }
    }
}

fn write_atomically(path: &Path, values: &Map<String, Value>) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let tmp = path.with_extension("tmp");
    let mut file = fs::File::create(&tmp)?;
    serde_json::to_writer_pretty(&mut file, values)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    file.write_all(b"\n")?;
    file.sync_all()?;
    drop(file);

    fs::rename(&tmp, path)
}
