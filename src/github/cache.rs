use crate::model::{Result, Table};
use log::{info, warn};
use serde_json::Value;
use std::fs;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// On-disk store of fetched streams, one JSON-lines file per stream.
///
/// Nested objects and arrays are stored as JSON text, so readers get flat records whose
/// user references may need decoding.
#[derive(Debug, Clone)]
pub struct StreamCache {
    dir: PathBuf,
}

impl StreamCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Replaces the stored stream. An empty stream leaves no entry behind.
    pub fn write_stream(&self, stream: &str, records: &[Value]) -> Result<()> {
        let path = self.stream_path(stream);
        if records.is_empty() {
            if path.exists() {
                fs::remove_file(&path)?;
            }
            return Ok(());
        }
        fs::create_dir_all(&self.dir)?;
        let mut writer = BufWriter::new(fs::File::create(&path)?);
        for record in records {
            serde_json::to_writer(&mut writer, &flatten(record))?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn contains(&self, stream: &str) -> bool {
        self.stream_path(stream).is_file()
    }

    pub fn to_table(&self, stream: &str) -> Result<Table> {
        if !self.contains(stream) {
            return Ok(Table::new());
        }
        let reader = BufReader::new(fs::File::open(self.stream_path(stream))?);
        let mut records = vec![];
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            records.push(serde_json::from_str(&line)?);
        }
        Ok(Table::from_records(records))
    }

    fn stream_path(&self, stream: &str) -> PathBuf {
        self.dir.join(format!("{stream}.jsonl"))
    }
}

fn flatten(record: &Value) -> Value {
    match record {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| {
                    let value = match value {
                        Value::Object(_) | Value::Array(_) => Value::String(value.to_string()),
                        scalar => scalar.clone(),
                    };
                    (key.clone(), value)
                })
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Removes the cache directory when dropped, whatever the outcome of the run.
pub struct CacheGuard {
    dir: PathBuf,
}

impl CacheGuard {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl Drop for CacheGuard {
    fn drop(&mut self) {
        if !self.dir.exists() {
            return;
        }
        match fs::remove_dir_all(&self.dir) {
            Ok(()) => info!("🧹 Cache directory {} removed.", self.dir.display()),
            Err(err) => warn!("⚠️ Could not remove cache directory {}: {err}", self.dir.display()),
        }
    }
}
