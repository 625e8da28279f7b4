use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{DiagError, Result};

/// Output file written through a sibling temporary file.
///
/// The destination only appears once [`AtomicFile::commit`] renames the
/// temporary file over it. Dropping the guard without committing (early
/// return, `?`, panic) removes the temporary file and leaves any previous
/// destination untouched.
pub struct AtomicFile {
    dest: PathBuf,
    tmp: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl AtomicFile {
    /// Create parent directories and open the temporary file.
    pub fn create(dest: &Path) -> Result<Self> {
        let parent = dest.parent().unwrap_or_else(|| Path::new(""));
        fs::create_dir_all(parent).map_err(|e| DiagError::io(parent, e))?;

        let name = dest
            .file_name()
            .ok_or_else(|| DiagError::InvalidOption(format!("not a file path: {}", dest.display())))?
            .to_string_lossy();
        let tmp = parent.join(format!(".{}.{}.tmp", name, std::process::id()));

        let file = File::create(&tmp).map_err(|e| DiagError::io(&tmp, e))?;
        debug!("Writing {} via {}", dest.display(), tmp.display());

        Ok(AtomicFile {
            dest: dest.to_path_buf(),
            tmp,
            writer: Some(BufWriter::new(file)),
        })
    }

    /// Flush, sync and move the temporary file into place.
    pub fn commit(mut self) -> Result<()> {
        let writer = self.writer.take().ok_or_else(|| {
            DiagError::io(&self.dest, io::Error::other("output already closed"))
        })?;
        let file = writer
            .into_inner()
            .map_err(|e| DiagError::io(&self.tmp, e.into_error()))?;
        file.sync_all().map_err(|e| DiagError::io(&self.tmp, e))?;
        drop(file);

        fs::rename(&self.tmp, &self.dest).map_err(|e| DiagError::io(&self.dest, e))?;
        Ok(())
    }

    /// Write a whole buffer and commit in one step.
    pub fn write_all_and_commit(dest: &Path, bytes: &[u8]) -> Result<()> {
        let mut out = AtomicFile::create(dest)?;
        out.write_all(bytes).map_err(|e| DiagError::io(dest, e))?;
        out.commit()
    }
}

impl Write for AtomicFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.writer.as_mut() {
            Some(w) => w.write(buf),
            None => Err(io::Error::other("output already closed")),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.writer.as_mut() {
            Some(w) => w.flush(),
            None => Ok(()),
        }
    }
}

impl Drop for AtomicFile {
    fn drop(&mut self) {
        drop(self.writer.take());
        if self.tmp.exists() {
            let _ = fs::remove_file(&self.tmp);
        }
    }
}
