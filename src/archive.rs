//! Unpacking of snapshot archives

use crate::error::{Result, SnapdiffError};
use crate::progress::create_count_progress;
use crate::universe::FileUniverse;
use flate2::read::GzDecoder;
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Component, Path, PathBuf};
use tar::Archive;
use zstd::Decoder;

const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];
const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// Outcome of unpacking a directory of snapshot archives
#[derive(Debug, Clone, Default)]
pub struct UnpackResult {
    /// One entry per archive, named after the archive file
    pub snapshots: BTreeSet<String>,
    /// Union of member paths over all archives
    pub universe: FileUniverse,
}

/// Extracts snapshot archives into per-snapshot directories
pub struct ArchiveUnpacker {
    unpack_root: PathBuf,
    show_progress: bool,
}

impl ArchiveUnpacker {
    pub fn new(unpack_root: impl Into<PathBuf>) -> Self {
        Self {
            unpack_root: unpack_root.into(),
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Directory a snapshot is extracted into
    pub fn snapshot_dir(&self, snapshot: &str) -> PathBuf {
        self.unpack_root.join(snapshot)
    }

    /// Unpack every regular file in `source_dir`.
    ///
    /// Stops at the first entry that is not a readable archive.
    pub fn unpack_all(&self, source_dir: &Path) -> Result<UnpackResult> {
        let archives = list_archives(source_dir)?;
        fs::create_dir_all(&self.unpack_root)?;

        let progress = create_count_progress(archives.len() as u64, "Unpacking snapshots", self.show_progress);
        let mut result = UnpackResult::default();

        for archive_path in &archives {
            let name = archive_name(archive_path)?;
            let members = self.unpack_one(archive_path, &name)?;
            log::debug!("Unpacked {} ({} members)", name, members.len());

            result.universe.merge(members);
            result.snapshots.insert(name);
            progress.inc(1);
        }

        progress.finish_with_message("Snapshots unpacked");
        log::info!(
            "Unpacked {} snapshot(s) with {} distinct member path(s) into {}",
            result.snapshots.len(),
            result.universe.len(),
            self.unpack_root.display()
        );

        Ok(result)
    }

    /// Extract one archive into its snapshot directory and return its member paths
    pub fn unpack_one(&self, archive_path: &Path, name: &str) -> Result<FileUniverse> {
        let dest = self.snapshot_dir(name);
        if dest.exists() {
            return Err(SnapdiffError::archive(
                name,
                format!("snapshot directory already exists: {}", dest.display()),
            ));
        }
        fs::create_dir_all(&dest)?;

        let reader = open_archive_reader(archive_path).map_err(|e| SnapdiffError::archive(name, e))?;
        let mut archive = Archive::new(reader);
        let mut members = FileUniverse::new();
        let mut entry_count = 0usize;

        let entries = archive.entries().map_err(|e| SnapdiffError::archive(name, e))?;
        for entry in entries {
            let mut entry = entry.map_err(|e| SnapdiffError::archive(name, e))?;
            entry_count += 1;
            let is_dir = entry.header().entry_type().is_dir();
            let member = entry
                .path()
                .map(|p| normalize_member(&p))
                .map_err(|e| SnapdiffError::archive(name, e))?;

            let unpacked = entry.unpack_in(&dest).map_err(|e| SnapdiffError::archive(name, e))?;
            if !unpacked {
                log::warn!("Skipped member '{}' of {}: path escapes the snapshot directory", member, name);
                continue;
            }

            if !is_dir && !member.is_empty() {
                members.insert(member);
            }
        }

        // A zero-byte or end-of-archive-only file is not a usable snapshot
        if entry_count == 0 {
            return Err(SnapdiffError::archive(name, "empty archive"));
        }

        Ok(members)
    }
}

/// Regular files of `source_dir`, sorted by name
pub fn list_archives(source_dir: &Path) -> Result<Vec<PathBuf>> {
    if !source_dir.is_dir() {
        return Err(SnapdiffError::InputNotFound {
            path: source_dir.to_path_buf(),
        });
    }

    let mut archives = Vec::new();
    for entry in fs::read_dir(source_dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() {
            archives.push(path);
        }
    }

    archives.sort();
    Ok(archives)
}

/// Snapshot identifier for an archive: its file name
pub fn archive_name(archive_path: &Path) -> Result<String> {
    archive_path
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| SnapdiffError::invalid_input(format!(
            "Archive name is not valid UTF-8: {}",
            archive_path.display()
        )))
}

/// Open a plain, gzip- or zstd-compressed tar stream
fn open_archive_reader(archive_path: &Path) -> std::io::Result<Box<dyn Read>> {
    let mut file = File::open(archive_path)?;

    let mut magic = [0u8; 4];
    let read = read_prefix(&mut file, &mut magic)?;
    file.seek(SeekFrom::Start(0))?;

    if read == magic.len() && magic == ZSTD_MAGIC {
        Ok(Box::new(Decoder::new(file)?))
    } else if read >= GZIP_MAGIC.len() && magic[..2] == GZIP_MAGIC {
        Ok(Box::new(GzDecoder::new(BufReader::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

fn read_prefix(file: &mut File, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut total = 0;
    while total < buf.len() {
        let n = file.read(&mut buf[total..])?;
        if n == 0 {
            break;
        }
        total += n;
    }
    Ok(total)
}

/// `/`-separated relative member path without `./` prefixes
fn normalize_member(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
