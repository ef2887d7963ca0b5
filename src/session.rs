//! Per-run working directory.
//!
//! A [`Session`] owns the files a single analysis reads. Archives are
//! extracted into a fresh temporary directory that is removed when the
//! session is dropped, so two runs never see each other's files.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use tempfile::TempDir;
use uuid::Uuid;
use zip::ZipArchive;

use crate::config::AnalysisConfig;
use crate::corpus::{Corpus, TEXT_EXTENSION, is_text_file};
use crate::error::{Result, StylometerError};

#[derive(Debug)]
enum Workdir {
    /// Extracted archive, deleted on drop.
    Temporary(TempDir),
    /// Existing directory, left untouched.
    Borrowed(PathBuf),
}

#[derive(Debug)]
pub struct Session {
    id: Uuid,
    workdir: Workdir,
    extracted: usize,
}

impl Session {
    /// Extract the top-level `.txt` entries of a zip archive into a new
    /// temporary directory.
    pub fn from_archive<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(StylometerError::input_format(format!(
                "archive not found: {}",
                path.display()
            )));
        }

        let file = File::open(path)?;
        let mut archive = ZipArchive::new(file).map_err(|e| {
            StylometerError::input_format(format!("{} is not a zip archive: {e}", path.display()))
        })?;

        let id = Uuid::new_v4();
        let dir = TempDir::new()?;
        let mut extracted = 0;

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            if entry.is_dir() {
                continue;
            }
            let Some(relative) = entry.enclosed_name() else {
                warn!("Skipping unsafe archive entry {}", entry.name());
                continue;
            };
            if relative.components().count() != 1 {
                warn!("Skipping nested archive entry {}", relative.display());
                continue;
            }
            if !is_text_file(&relative) {
                warn!("Skipping non-.{TEXT_EXTENSION} archive entry {}", relative.display());
                continue;
            }

            let target = dir.path().join(&relative);
            let mut out = File::create(&target)?;
            io::copy(&mut entry, &mut out)?;
            debug!("Extracted {}", relative.display());
            extracted += 1;
        }

        if extracted == 0 {
            return Err(StylometerError::input_format(format!(
                "{} contains no .{TEXT_EXTENSION} files at its top level",
                path.display()
            )));
        }

        info!(
            "Session {id}: extracted {extracted} texts from {} into {}",
            path.display(),
            dir.path().display()
        );
        Ok(Self {
            id,
            workdir: Workdir::Temporary(dir),
            extracted,
        })
    }

    /// Analyse an already extracted directory in place.
    pub fn from_directory<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_dir() {
            return Err(StylometerError::input_format(format!(
                "{} is not a directory",
                path.display()
            )));
        }
        let id = Uuid::new_v4();
        let extracted = fs::read_dir(path)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file() && is_text_file(&entry.path()))
            .count();
        info!("Session {id}: using {} ({extracted} texts)", path.display());
        Ok(Self {
            id,
            workdir: Workdir::Borrowed(path.to_path_buf()),
            extracted,
        })
    }

    /// Open `input` as an archive or a directory, whichever it is.
    pub fn open<P: AsRef<Path>>(input: P) -> Result<Self> {
        let input = input.as_ref();
        if input.is_dir() {
            Self::from_directory(input)
        } else {
            Self::from_archive(input)
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn path(&self) -> &Path {
        match &self.workdir {
            Workdir::Temporary(dir) => dir.path(),
            Workdir::Borrowed(path) => path,
        }
    }

    /// Number of text files available to the loader.
    pub fn text_count(&self) -> usize {
        self.extracted
    }

    pub fn is_temporary(&self) -> bool {
        matches!(self.workdir, Workdir::Temporary(_))
    }

    pub fn load_corpus(&self, config: &AnalysisConfig) -> Result<Corpus> {
        Corpus::load(self.path(), config)
    }
}
