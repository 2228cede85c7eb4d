//! The recovery/config facade: working directory, log duality, profile
//! endpoints.
//!
//! A run owns exactly one log. At startup it is either replayed (opened for
//! sequential read, version checked) or created fresh (append mode, version
//! written). The first stage that runs out of replayable records calls
//! [`Config::recovery_done`], which flips the log from input to output mode
//! for the rest of the process. Profile runs live next to the log, one file
//! per segment named by its decimal id.

use crate::error::{role, Error, Result};
use crate::io::{AppendFile, SequentialFile};
use crate::profile::{ProfileReader, ProfileWriter, SingletonFilter};
use crate::wal::{self, WalRecord};
use crate::workmem::MIN_SIZE;
use regex::Regex;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

const ENOTDIR: i32 = 20;

#[derive(Debug)]
pub struct Config {
    workdir: PathBuf,
    log_path: PathBuf,
    ilog: Option<SequentialFile>,
    olog: Option<AppendFile>,
}

impl Config {
    /// Bind to `workdir`, creating it when absent. An existing log is
    /// opened for replay and its version tag verified; otherwise a fresh
    /// log is created and tagged. A zero-length log (crash before the
    /// version sync reached disk) counts as absent.
    pub fn open(workdir: &Path) -> Result<Self> {
        match fs::metadata(workdir) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                fs::create_dir(workdir).map_err(|e| Error::io(workdir, role::WORKDIR, e))?;
            }
            Err(e) => return Err(Error::io(workdir, role::WORKDIR, e)),
            Ok(meta) if !meta.is_dir() => {
                return Err(Error::errno(workdir, role::WORKDIR, ENOTDIR));
            }
            Ok(_) => {}
        }

        let log_path = workdir.join("log");
        let fresh = match fs::metadata(&log_path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => true,
            Err(e) => return Err(Error::io(&log_path, role::LOG, e)),
            Ok(meta) if !meta.is_file() => {
                return Err(Error::LogCorrupt { path: log_path });
            }
            Ok(meta) => meta.len() == 0,
        };

        let mut cfg = Self {
            workdir: workdir.to_path_buf(),
            log_path,
            ilog: None,
            olog: None,
        };
        if fresh {
            let mut olog = AppendFile::log(&cfg.log_path, role::LOG)?;
            wal::write_version(&mut olog)?;
            cfg.olog = Some(olog);
        } else {
            let mut ilog = SequentialFile::open(&cfg.log_path, role::LOG, 0)?;
            wal::check_version(&mut ilog)?;
            cfg.ilog = Some(ilog);
        }
        Ok(cfg)
    }

    /// True once replay has finished and the log is in append mode.
    pub fn has_recovery_done(&self) -> bool {
        self.ilog.is_none()
    }

    /// The replay-side log. Only valid before `recovery_done`.
    pub fn ilog(&mut self) -> &mut SequentialFile {
        self.ilog.as_mut().expect("log already in append mode")
    }

    /// The append-side log. Only valid after `recovery_done`.
    pub fn olog(&mut self) -> &mut AppendFile {
        self.olog.as_mut().expect("log still in replay mode")
    }

    /// True when no replayable record remains (or replay is over).
    pub fn replay_eof(&mut self) -> bool {
        match &mut self.ilog {
            Some(ilog) => ilog.eof(),
            None => true,
        }
    }

    /// Decode the next replay record.
    pub fn next_record(&mut self) -> Result<WalRecord> {
        WalRecord::decode(self.ilog())
    }

    /// Close the replay side and reopen the log for appending.
    pub fn recovery_done(&mut self) -> Result<()> {
        if self.ilog.is_some() && self.olog.is_none() {
            self.ilog = None;
            self.olog = Some(AppendFile::log(&self.log_path, role::LOG)?);
        }
        Ok(())
    }

    /// Append `record` and flush it as one sync unit.
    pub fn log_record(&mut self, record: &WalRecord) -> Result<()> {
        let olog = self.olog();
        record.encode(olog)?;
        olog.sync()
    }

    /// The standard log-corruption failure for this run.
    pub fn log_corrupt<T>(&self) -> Result<T> {
        Err(self.log_corrupt_err())
    }

    pub fn log_corrupt_err(&self) -> Error {
        Error::LogCorrupt {
            path: self.log_path.clone(),
        }
    }

    /// Path of the run file named `name` inside the working directory.
    pub fn run_path(&self, name: &str) -> PathBuf {
        self.workdir.join(name)
    }

    pub fn open_output(&self, name: &str) -> Result<ProfileWriter> {
        ProfileWriter::create(&self.run_path(name))
    }

    pub fn open_input(&self, name: &str) -> Result<ProfileReader> {
        ProfileReader::open(&self.run_path(name))
    }

    pub fn open_singleton_input(&self, name: &str) -> Result<SingletonFilter<ProfileReader>> {
        SingletonFilter::new(self.open_input(name)?)
    }

    /// Best-effort delete of a run file; "not found" is not an error.
    pub fn remove(&self, name: &str) -> Result<()> {
        let path = self.run_path(name);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::io(path, role::PROFILE, e)),
        }
    }
}

/// Parse a `--memory-size` argument: a decimal byte count with an optional
/// `k`/`m`/`g`/`t` suffix (x1024 each) and an optional trailing `b`.
pub fn parse_memory_size(s: &str) -> std::result::Result<usize, String> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN
        .get_or_init(|| Regex::new(r"^([0-9]+)([kKmMgGtT]?)[bB]?$").expect("static pattern"));

    let caps = pattern
        .captures(s)
        .ok_or_else(|| format!("malformed memory size: {s:?}"))?;
    let value: usize = caps[1]
        .parse()
        .map_err(|_| format!("malformed memory size: {s:?}"))?;
    let shift: u32 = match &caps[2] {
        "k" | "K" => 10,
        "m" | "M" => 20,
        "g" | "G" => 30,
        "t" | "T" => 40,
        _ => 0,
    };
    let bytes = value
        .checked_shl(shift)
        .filter(|&b| b >> shift == value)
        .ok_or_else(|| format!("memory size overflows: {s:?}"))?;
    if bytes < MIN_SIZE {
        return Err(format!(
            "at least {MIN_SIZE} bytes of working memory is required"
        ));
    }
    Ok(bytes)
}
