use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use engine_logging::{engine_debug, engine_info};
use walkdir::WalkDir;
use zip::result::ZipError;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("{} folder does not exist", .0.display())]
    MissingSource(PathBuf),
    #[error("archive {} would be written inside {}", archive.display(), source_dir.display())]
    InsideSource { archive: PathBuf, source_dir: PathBuf },
    #[error("could not resolve {}: {source}", path.display())]
    Resolve {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not create archive {}: {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("error on walking to {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("could not add {name} to archive: {source}")]
    Entry {
        name: String,
        #[source]
        source: ZipError,
    },
    #[error("could not copy {} into archive: {source}", path.display())]
    Copy {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not finish archive: {0}")]
    Finish(#[source] ZipError),
}

#[derive(Debug, thiserror::Error)]
pub enum CleanupError {
    #[error("{} does not exist, skipping output folder delete", .0.display())]
    ArchiveMissing(PathBuf),
    #[error("archive {} is inside {}, refusing to delete", archive.display(), output_dir.display())]
    ArchiveInside { archive: PathBuf, output_dir: PathBuf },
    #[error("could not resolve {}: {source}", path.display())]
    Resolve {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not read from {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not remove {}: {source}", path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSummary {
    pub path: PathBuf,
    pub files: usize,
    pub directories: usize,
    pub bytes: u64,
}

/// Bundles `source_dir` into a store-mode zip at `archive_path`.
///
/// Entry names are relative to `source_dir` with `/` separators; directories
/// carry a trailing `/`. The root itself gets no entry. Any error aborts the
/// whole archive.
pub fn create_archive(source_dir: &Path, archive_path: &Path) -> Result<ArchiveSummary, ArchiveError> {
    if !source_dir.is_dir() {
        return Err(ArchiveError::MissingSource(source_dir.to_path_buf()));
    }
    let resolved_source = source_dir.canonicalize().map_err(|source| ArchiveError::Resolve {
        path: source_dir.to_path_buf(),
        source,
    })?;
    let resolved_archive = resolve_path(archive_path).map_err(|source| ArchiveError::Resolve {
        path: archive_path.to_path_buf(),
        source,
    })?;
    if resolved_archive.starts_with(&resolved_source) {
        return Err(ArchiveError::InsideSource {
            archive: archive_path.to_path_buf(),
            source_dir: source_dir.to_path_buf(),
        });
    }

    let file = File::create(archive_path).map_err(|source| ArchiveError::Create {
        path: archive_path.to_path_buf(),
        source,
    })?;
    let mut writer = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Stored);
    let mut summary = ArchiveSummary {
        path: archive_path.to_path_buf(),
        files: 0,
        directories: 0,
        bytes: 0,
    };

    for entry in WalkDir::new(source_dir).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|source| ArchiveError::Walk {
            path: source
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| source_dir.to_path_buf()),
            source,
        })?;
        let name = entry_name(source_dir, entry.path());

        if entry.file_type().is_dir() {
            writer
                .add_directory(name.clone(), options)
                .map_err(|source| ArchiveError::Entry { name, source })?;
            summary.directories += 1;
            continue;
        }
        if !entry.file_type().is_file() {
            engine_debug!("skipping non-regular entry {}", entry.path().display());
            continue;
        }

        writer
            .start_file(name.clone(), options)
            .map_err(|source| ArchiveError::Entry { name, source })?;
        let copy_error = |source: io::Error| ArchiveError::Copy {
            path: entry.path().to_path_buf(),
            source,
        };
        let input = File::open(entry.path()).map_err(copy_error)?;
        let size = input.metadata().map_err(copy_error)?.len();
        let copied = io::copy(&mut input.take(size), &mut writer).map_err(copy_error)?;
        summary.files += 1;
        summary.bytes += copied;
    }

    writer.finish().map_err(ArchiveError::Finish)?;
    engine_info!(
        "archived {} files ({} bytes) into {}",
        summary.files,
        summary.bytes,
        archive_path.display()
    );
    Ok(summary)
}

/// Deletes `output_dir` once `archive_path` exists.
///
/// Without the archive nothing is touched, and an archive that resolves to a
/// path inside `output_dir` is refused so it can never be removed with it.
pub fn remove_output_dir(output_dir: &Path, archive_path: &Path) -> Result<(), CleanupError> {
    if !archive_path.is_file() {
        return Err(CleanupError::ArchiveMissing(archive_path.to_path_buf()));
    }
    let resolved_dir = output_dir.canonicalize().map_err(|source| CleanupError::Resolve {
        path: output_dir.to_path_buf(),
        source,
    })?;
    let resolved_archive = archive_path.canonicalize().map_err(|source| CleanupError::Resolve {
        path: archive_path.to_path_buf(),
        source,
    })?;
    if resolved_archive.starts_with(&resolved_dir) {
        return Err(CleanupError::ArchiveInside {
            archive: archive_path.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
        });
    }
    let output_dir = resolved_dir.as_path();

    let read_error = |source: io::Error| CleanupError::Read {
        path: output_dir.to_path_buf(),
        source,
    };
    for entry in fs::read_dir(output_dir).map_err(read_error)? {
        let entry = entry.map_err(read_error)?;
        let path = entry.path();
        let removed = match entry.file_type() {
            Ok(kind) if kind.is_dir() => fs::remove_dir_all(&path),
            Ok(_) => fs::remove_file(&path),
            Err(err) => Err(err),
        };
        removed.map_err(|source| CleanupError::Remove { path, source })?;
    }

    fs::remove_dir(output_dir).map_err(|source| CleanupError::Remove {
        path: output_dir.to_path_buf(),
        source,
    })?;
    engine_info!("removed {}", output_dir.display());
    Ok(())
}

/// Absolute form of a path that may not exist yet: its parent is resolved
/// and the file name is kept as given.
fn resolve_path(path: &Path) -> io::Result<PathBuf> {
    if let Ok(resolved) = path.canonicalize() {
        return Ok(resolved);
    }
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let resolved_parent = parent.canonicalize()?;
    Ok(match path.file_name() {
        Some(name) => resolved_parent.join(name),
        None => resolved_parent,
    })
}

fn entry_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
