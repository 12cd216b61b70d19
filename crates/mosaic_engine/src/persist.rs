use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output path {} exists and is not a directory", .0.display())]
    NotADirectory(PathBuf),
    #[error("could not create output directory {}: {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Ensure the output directory exists; an existing one is reused as is.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => return Ok(()),
        Ok(_) => return Err(PersistError::NotADirectory(dir.to_path_buf())),
        Err(_) => {}
    }
    match fs::create_dir_all(dir) {
        Ok(()) => Ok(()),
        // Lost a race with another creator.
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
        Err(source) => Err(PersistError::Create {
            path: dir.to_path_buf(),
            source,
        }),
    }
}
