//! Persistence layer modules.
//!
//! State lives in flat JSON files next to the config; each is read in full
//! and rewritten in full.

pub mod mapping_store;
pub mod retention;
pub mod seen_cache;

use std::io::Write;
use std::path::Path;

use crate::{AppError, Result};

/// Write `body` to `path` via a temp file in the same directory and a rename.
pub(crate) fn write_atomic(path: &Path, body: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(body)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .map_err(|err| AppError::Io(format!("failed to replace {}: {err}", path.display())))?;
    Ok(())
}
