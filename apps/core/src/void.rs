//! The void - A directory of plain-text files with one active file.
//!
//! New fragments are appended to the active file (`0.txt` by default).
//! Archiving renames the active file and starts a fresh empty one; every
//! other `.txt` file in the directory is an archive and feeds recall.

use crate::config::Config;
use crate::entry::{format_fragments, ArchiveTarget, Entry, MARKER_LINE};
use crate::error::{Result, VoidError};
use rand::Rng;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const TXT_EXT: &str = "txt";
const MAX_RANDOM_DIGITS: usize = 10;
const MAX_NAME_ATTEMPTS: usize = 64;

/// Outcome of committing the text field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Commit {
    /// Blank input, nothing written
    Nothing,
    /// Fragments appended to the active file
    Appended { segments: usize },
    /// Active file renamed to `path`
    Archived { path: PathBuf },
}

/// Snapshot of the void's files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoidStats {
    pub archives: usize,
    pub active_bytes: u64,
    pub active_fragments: usize,
}

/// Handle to a void directory.
#[derive(Debug, Clone)]
pub struct Void {
    dir: PathBuf,
    active_file: String,
}

impl Void {
    /// Open a void, creating the directory and an empty active file if needed.
    pub fn open(dir: impl Into<PathBuf>, active_file: impl Into<String>) -> Result<Self> {
        let void = Self {
            dir: dir.into(),
            active_file: active_file.into(),
        };
        void.ensure_layout()?;
        Ok(void)
    }

    /// Open the void described by a config.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        Self::open(config.void_dir.clone(), config.active_file.clone())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn active_file_name(&self) -> &str {
        &self.active_file
    }

    pub fn active_path(&self) -> PathBuf {
        self.dir.join(&self.active_file)
    }

    /// Make sure the directory and the active file exist.
    pub fn ensure_layout(&self) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).map_err(|e| VoidError::io(&self.dir, e))?;
            debug!("Created void directory {:?}", self.dir);
        }

        let active = self.active_path();
        if !active.exists() {
            OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(false)
                .open(&active)
                .map_err(|e| VoidError::io(&active, e))?;
            debug!("Created active file {:?}", active);
        }

        Ok(())
    }

    /// Commit raw field text: append fragments or run an archive command.
    pub fn commit(&self, raw: &str) -> Result<Commit> {
        self.commit_with_rng(raw, &mut rand::thread_rng())
    }

    /// Same as [`Void::commit`] with an explicit random source for archive names.
    pub fn commit_with_rng<R: Rng + ?Sized>(&self, raw: &str, rng: &mut R) -> Result<Commit> {
        match Entry::parse(raw) {
            Entry::Empty => Ok(Commit::Nothing),
            Entry::Fragments(segments) => {
                self.append(&segments)?;
                Ok(Commit::Appended {
                    segments: segments.len(),
                })
            }
            Entry::Archive(target) => {
                let path = self.archive_with_rng(&target, rng)?;
                Ok(Commit::Archived { path })
            }
        }
    }

    /// Append fragments to the active file and fsync.
    pub fn append(&self, segments: &[String]) -> Result<()> {
        let text = format_fragments(segments);
        if text.is_empty() {
            return Ok(());
        }

        self.ensure_layout()?;
        let path = self.active_path();
        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&path)
            .map_err(|e| VoidError::io(&path, e))?;

        file.write_all(text.as_bytes())
            .map_err(|e| VoidError::io(&path, e))?;
        file.sync_all().map_err(|e| VoidError::io(&path, e))?;

        debug!("Appended {} fragment(s) to {:?}", segments.len(), path);
        Ok(())
    }

    /// Rename the active file to an archive and start a fresh one.
    pub fn archive(&self, target: &ArchiveTarget) -> Result<PathBuf> {
        self.archive_with_rng(target, &mut rand::thread_rng())
    }

    pub fn archive_with_rng<R: Rng + ?Sized>(
        &self,
        target: &ArchiveTarget,
        rng: &mut R,
    ) -> Result<PathBuf> {
        self.ensure_layout()?;

        let destination = match target {
            ArchiveTarget::Random => self.archive_to_random(rng)?,
            ArchiveTarget::Named(name) => {
                let path = self.named_archive_path(name)?;
                self.move_active_to(&path)?;
                path
            }
        };
        self.ensure_layout()?;

        info!("Archived {:?} to {:?}", self.active_path(), destination);
        Ok(destination)
    }

    /// Move the active file to `<active stem>_<1-10 random digits>.txt`,
    /// drawing a new name while the drawn one is taken.
    fn archive_to_random<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<PathBuf> {
        let stem = Path::new(&self.active_file)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut last = None;
        for _ in 0..MAX_NAME_ATTEMPTS {
            let digits = rng.gen_range(1..=MAX_RANDOM_DIGITS);
            let number: String = (0..digits)
                .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
                .collect();
            let path = self.dir.join(format!("{}_{}.{}", stem, number, TXT_EXT));
            match self.move_active_to(&path) {
                Ok(()) => return Ok(path),
                Err(VoidError::ArchiveExists(taken)) => {
                    debug!("Archive name {:?} taken, drawing again", taken);
                    last = Some(taken);
                }
                Err(e) => return Err(e),
            }
        }

        Err(VoidError::ArchiveExists(
            last.unwrap_or_else(|| self.active_path()),
        ))
    }

    /// Move the active file to `destination` without ever replacing an
    /// existing file.
    ///
    /// The hard link is created atomically and fails if the name is taken;
    /// only then is the active name removed.
    fn move_active_to(&self, destination: &Path) -> Result<()> {
        let active = self.active_path();
        match fs::hard_link(&active, destination) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(VoidError::ArchiveExists(destination.to_path_buf()));
            }
            Err(e) => return Err(VoidError::io(destination, e)),
        }
        fs::remove_file(&active).map_err(|e| VoidError::io(&active, e))
    }

    fn named_archive_path(&self, name: &str) -> Result<PathBuf> {
        let invalid = name.is_empty()
            || name == "."
            || name == ".."
            || name.contains(['/', '\\', '\0'])
            || name.contains("..");
        if invalid {
            return Err(VoidError::InvalidArchiveName(name.to_string()));
        }

        let file_name = format!("{}.{}", name, TXT_EXT);
        if file_name == self.active_file {
            return Err(VoidError::InvalidArchiveName(name.to_string()));
        }

        Ok(self.dir.join(file_name))
    }

    /// All archive files, sorted by name. The active file is never included.
    pub fn archives(&self) -> Result<Vec<PathBuf>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(VoidError::io(&self.dir, e)),
        };

        let mut archives: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && self.is_archive(path))
            .collect();
        archives.sort();
        Ok(archives)
    }

    /// Whether `path` names an archive of this void (by name only).
    pub fn is_archive(&self, path: &Path) -> bool {
        let is_txt = path.extension().is_some_and(|ext| ext == TXT_EXT);
        let is_active = path
            .file_name()
            .is_some_and(|name| name == self.active_file.as_str());
        is_txt && !is_active
    }

    pub fn stats(&self) -> Result<VoidStats> {
        let archives = self.archives()?.len();
        let active = self.active_path();

        let (active_bytes, active_fragments) = match fs::read_to_string(&active) {
            Ok(content) => (
                content.len() as u64,
                content
                    .lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty() && *l != MARKER_LINE)
                    .count(),
            ),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => (0, 0),
            Err(e) => return Err(VoidError::io(&active, e)),
        };

        Ok(VoidStats {
            archives,
            active_bytes,
            active_fragments,
        })
    }
}
