use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::diagnostics::{self, RawDiagnostic};
use crate::error::{DiagError, Result};

/// Hard ceiling on the merged document read by the report stage (100 MiB).
pub const DEFAULT_MAX_DOCUMENT_BYTES: u64 = 100 * 1024 * 1024;

/// Read a whole file, refusing anything over `max_bytes`.
///
/// The size is checked on the open handle before reading, and the read is
/// capped at the limit. A limit of 0 is rejected.
pub fn read_capped(path: &Path, max_bytes: u64) -> Result<Vec<u8>> {
    if max_bytes == 0 {
        return Err(DiagError::InvalidOption(
            "max document bytes must be greater than 0".to_string(),
        ));
    }

    let file = File::open(path).map_err(|e| DiagError::io(path, e))?;
    let size = file.metadata().map_err(|e| DiagError::io(path, e))?.len();

    if size > max_bytes {
        return Err(DiagError::DocumentTooLarge {
            path: path.to_path_buf(),
            size,
            limit: max_bytes,
        });
    }

    let mut bytes = Vec::with_capacity(size as usize);
    file.take(max_bytes + 1)
        .read_to_end(&mut bytes)
        .map_err(|e| DiagError::io(path, e))?;

    if bytes.len() as u64 > max_bytes {
        return Err(DiagError::DocumentTooLarge {
            path: path.to_path_buf(),
            size: bytes.len() as u64,
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

/// Load the merged document for reporting.
///
/// Unlike merging, an oversized document is fatal, and the ceiling cannot be
/// disabled (see [`read_capped`]).
pub fn load_document(path: &Path, max_bytes: u64) -> Result<Vec<RawDiagnostic>> {
    let bytes = read_capped(path, max_bytes)?;

    let doc = serde_json::from_slice(&bytes).map_err(|source| DiagError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let records = diagnostics::extract(doc);
    debug!("Loaded {} record(s) from {}", records.len(), path.display());
    Ok(records)
}
