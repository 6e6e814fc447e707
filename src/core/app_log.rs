use chrono::Utc;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{
    fs::{self, File, OpenOptions},
    io::{Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

const LOG_FILE_NAME: &str = "app.log.jsonl";
const MAX_LOG_BYTES: u64 = 5 * 1024 * 1024;
const MAX_ROTATIONS: usize = 3;
const TAIL_BYTES: u64 = 2 * 1024 * 1024;

/// Log directory installed by `init`. Records appended before that are dropped.
static LOG_DIR: Lazy<Mutex<Option<PathBuf>>> = Lazy::new(|| Mutex::new(None));

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppLogRecord {
    pub ts_ms: i64,
    pub level: String,
    pub scope: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl AppLogRecord {
    pub fn now(level: &str, scope: &str, message: &str, data: Option<Value>) -> Self {
        Self {
            ts_ms: Utc::now().timestamp_millis(),
            level: level.to_string(),
            scope: scope.to_string(),
            message: message.to_string(),
            data,
        }
    }
}

pub fn init(dir: PathBuf) -> Result<(), String> {
    fs::create_dir_all(&dir).map_err(|e| format!("Failed to create log dir: {}", e))?;
    *LOG_DIR.lock() = Some(dir);
    Ok(())
}

fn log_path(dir: &Path) -> PathBuf {
    dir.join(LOG_FILE_NAME)
}

fn rotated_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("app.log.{}.jsonl", index))
}

fn rotate_if_needed(dir: &Path, max_bytes: u64) -> Result<(), String> {
    let path = log_path(dir);
    let Ok(meta) = fs::metadata(&path) else {
        return Ok(());
    };
    if meta.len() < max_bytes {
        return Ok(());
    }

    let oldest = rotated_path(dir, MAX_ROTATIONS);
    if oldest.exists() {
        fs::remove_file(&oldest)
            .map_err(|e| format!("Failed to drop {}: {}", oldest.display(), e))?;
    }

    for i in (1..MAX_ROTATIONS).rev() {
        let src = rotated_path(dir, i);
        if src.exists() {
            let dst = rotated_path(dir, i + 1);
            fs::rename(&src, &dst)
                .map_err(|e| format!("Failed to rotate {}: {}", src.display(), e))?;
        }
    }

    fs::rename(&path, rotated_path(dir, 1))
        .map_err(|e| format!("Failed to rotate {}: {}", path.display(), e))
}

fn append_in(dir: &Path, record: &AppLogRecord, max_bytes: u64) -> Result<(), String> {
    rotate_if_needed(dir, max_bytes)?;

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path(dir))
        .map_err(|e| format!("Failed to open log file: {}", e))?;

    let mut line =
        serde_json::to_string(record).map_err(|e| format!("Failed to encode log record: {}", e))?;
    line.push('\n');
    file.write_all(line.as_bytes())
        .map_err(|e| format!("Failed to write log record: {}", e))
}

pub fn append(record: AppLogRecord) -> Result<(), String> {
    let guard = LOG_DIR.lock();
    let Some(dir) = guard.as_deref() else {
        return Ok(());
    };
    append_in(dir, &record, MAX_LOG_BYTES)
}

pub fn info(scope: &str, message: &str, data: Option<Value>) {
    let _ = append(AppLogRecord::now("info", scope, message, data));
}

pub fn warn(scope: &str, message: &str, data: Option<Value>) {
    let _ = append(AppLogRecord::now("warn", scope, message, data));
}

pub fn error(scope: &str, message: &str, data: Option<Value>) {
    let _ = append(AppLogRecord::now("error", scope, message, data));
}

fn read_tail(path: &Path, max_bytes: u64) -> Result<String, String> {
    let mut file = File::open(path).map_err(|e| format!("Failed to open log file: {}", e))?;
    let size = file
        .metadata()
        .map_err(|e| format!("Failed to stat log file: {}", e))?
        .len();

    let start = size.saturating_sub(max_bytes);
    file.seek(SeekFrom::Start(start))
        .map_err(|e| format!("Failed to seek log file: {}", e))?;

    let mut buf = Vec::new();
    file.read_to_end(&mut buf)
        .map_err(|e| format!("Failed to read log file: {}", e))?;

    // A mid-file start may land inside a multi-byte character; skip the
    // partial first line at the byte level before decoding.
    let tail = if start > 0 {
        match buf.iter().position(|&b| b == b'\n') {
            Some(idx) => &buf[idx + 1..],
            None => &[][..],
        }
    } else {
        &buf[..]
    };
    Ok(String::from_utf8_lossy(tail).into_owned())
}

fn read_in(dir: &Path, limit: usize, query: Option<&str>) -> Result<Vec<AppLogRecord>, String> {
    let q = query
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    let mut paths: Vec<PathBuf> = (1..=MAX_ROTATIONS)
        .rev()
        .map(|i| rotated_path(dir, i))
        .collect();
    paths.push(log_path(dir));

    let mut records = Vec::new();
    for path in paths.iter().filter(|p| p.exists()) {
        for line in read_tail(path, TAIL_BYTES)?.lines() {
            let Ok(rec) = serde_json::from_str::<AppLogRecord>(line) else {
                continue;
            };
            if let Some(q) = &q {
                let hay = format!("{} {} {}", rec.level, rec.scope, rec.message).to_lowercase();
                if !hay.contains(q.as_str()) {
                    continue;
                }
            }
            records.push(rec);
        }
    }

    let excess = records.len().saturating_sub(limit);
    records.drain(..excess);
    Ok(records)
}

/// Most recent `limit` records, oldest first.
pub fn read(limit: usize, query: Option<&str>) -> Result<Vec<AppLogRecord>, String> {
    let guard = LOG_DIR.lock();
    let Some(dir) = guard.as_deref() else {
        return Ok(Vec::new());
    };
    read_in(dir, limit, query)
}

fn clear_in(dir: &Path) -> Result<(), String> {
    let mut paths = vec![log_path(dir)];
    paths.extend((1..=MAX_ROTATIONS).map(|i| rotated_path(dir, i)));

    for p in paths.iter().filter(|p| p.exists()) {
        fs::remove_file(p).map_err(|e| format!("Failed to remove {}: {}", p.display(), e))?;
    }
    Ok(())
}

pub fn clear() -> Result<(), String> {
    let guard = LOG_DIR.lock();
    match guard.as_deref() {
        Some(dir) => clear_in(dir),
        None => Ok(()),
    }
}

pub fn install_panic_hook() {
    let prev = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let payload = if let Some(s) = info.payload().downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "panic".to_string()
        };
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_else(|| "unknown".to_string());

        error("panic", &format!("{} ({})", payload, location), None);
        prev(info);
    }));
}
