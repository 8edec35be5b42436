// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::error::{Error, Result};
use crate::filesystem::{FileSystem, RandomAccessFile};
use crate::path::{join_abstract_path, normalize_abstract_path, split_abstract_path};
use crate::stats::{FileSelector, FileStats};
use std::path::{Path, PathBuf};

/// Host directory exposed through abstract paths.
///
/// Abstract path `""` is the configured root. Paths never escape the root:
/// `.` and `..` segments are rejected. Listings follow symlinks to files
/// but skip symlinks to directories and dangling links.
#[derive(Debug, Clone)]
pub struct LocalFileSystem {
    root: PathBuf,
}

impl LocalFileSystem {
    /// Create a filesystem rooted at `root`, which must be an existing directory
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let display = root.as_ref().display().to_string();
        let canonical = root
            .as_ref()
            .canonicalize()
            .map_err(|e| Error::io(&display, e))?;

        if !canonical.is_dir() {
            return Err(Error::not_a_directory(display));
        }

        Ok(Self { root: canonical })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn host_path(&self, path: &str) -> Result<PathBuf> {
        let mut host = self.root.clone();
        for segment in split_abstract_path(path) {
            if segment == "." || segment == ".." {
                return Err(Error::invalid_path(path));
            }
            host.push(segment);
        }
        Ok(host)
    }

    fn stat(&self, path: &str, host: &Path) -> Result<FileStats> {
        let metadata = std::fs::metadata(host).map_err(|e| Error::io(path, e))?;
        if metadata.is_dir() {
            Ok(FileStats::dir(path))
        } else {
            Ok(FileStats::file(path, metadata.len()))
        }
    }
}

impl FileSystem for LocalFileSystem {
    fn type_name(&self) -> &str {
        "local"
    }

    fn get_target_stats(&self, selector: &FileSelector) -> Result<Vec<FileStats>> {
        let base = normalize_abstract_path(&selector.base_dir);
        let host_base = self.host_path(&base)?;

        match std::fs::metadata(&host_base) {
            Ok(m) if m.is_dir() => {}
            Ok(_) => return Err(Error::not_a_directory(base)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && selector.allow_not_found => {
                return Ok(Vec::new());
            }
            Err(e) => return Err(Error::io(&base, e)),
        }

        let mut out = Vec::new();
        let mut pending = vec![(base, host_base)];
        while let Some((dir, host_dir)) = pending.pop() {
            let listing = std::fs::read_dir(&host_dir).map_err(|e| Error::io(&dir, e))?;
            for entry in listing {
                let entry = entry.map_err(|e| Error::io(&dir, e))?;
                let name = entry.file_name();
                let Some(name) = name.to_str() else {
                    diagnostics::log_warn!(
                        "Skipping non-UTF-8 entry in {dir}",
                        dir: dir.as_str()
                    );
                    continue;
                };
                let path = join_abstract_path([dir.as_str(), name]);
                let host = entry.path();
                let file_type = entry.file_type().map_err(|e| Error::io(&path, e))?;
                let stat = if file_type.is_symlink() {
                    match self.stat(&path, &host) {
                        Ok(stat) if stat.is_file() => stat,
                        _ => {
                            diagnostics::log_warn!(
                                "Skipping symlink {path} to a directory or missing target",
                                path: path.as_str()
                            );
                            continue;
                        }
                    }
                } else {
                    self.stat(&path, &host)?
                };
                if stat.is_dir() && selector.recursive {
                    pending.push((path, host));
                }
                out.push(stat);
            }
        }

        out.sort_by(|a, b| a.path().cmp(b.path()));
        diagnostics::log_debug!(
            "Listed {count} entries under {base}",
            count: out.len(),
            base: selector.base_dir.as_str()
        );
        Ok(out)
    }

    fn get_file_stats(&self, paths: &[String]) -> Result<Vec<FileStats>> {
        paths
            .iter()
            .map(|p| {
                let path = normalize_abstract_path(p);
                let host = self.host_path(&path)?;
                self.stat(&path, &host)
            })
            .collect()
    }

    fn open_input_file(&self, path: &str) -> Result<Box<dyn RandomAccessFile>> {
        let host = self.host_path(path)?;
        if host.is_dir() {
            return Err(Error::not_a_file(path));
        }
        let file = std::fs::File::open(&host).map_err(|e| Error::io(path, e))?;
        Ok(Box::new(file))
    }
}
