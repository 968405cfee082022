//! Whole-file JSON persistence with atomic replace.
//!
//! Both the rate ledger and the alert bounds store rewrite their backing
//! file in full on every mutation. The write goes to a sibling temp file
//! which is renamed over the target, so a concurrent reader (or a crash
//! mid-write) never observes a partial document.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Serializes `value` to `path` via write-to-temp-then-rename.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> std::io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let tmp = path.with_extension("tmp");
    let bytes = serde_json::to_vec_pretty(value)?;

    let mut file = fs::File::create(&tmp)?;
    file.write_all(&bytes)?;
    file.sync_all()?;

    fs::rename(&tmp, path)
}

/// Reads and deserializes `path`. `Ok(None)` when the file does not exist;
/// parse failures surface as errors for the caller to decide on.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, serde_json::Error> {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(_) => return Ok(None),
    };
    serde_json::from_slice(&bytes).map(Some)
}
