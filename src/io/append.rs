//! Buffered append-only writer.

use crate::error::{Error, Result};
use crate::io::PAGE_SIZE;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug)]
enum Sink {
    /// Page-buffered writes; `sync` flushes to the OS with no durability
    /// claim. Used for profile runs.
    Buffered(BufWriter<File>),
    /// Writes accumulate in an unbounded stage; `sync` hands the whole
    /// stage to one `write` call and fsyncs. A crash between syncs leaves
    /// no trace of the staged bytes, which is what makes a log record
    /// all-or-nothing on disk.
    Log { file: File, stage: Vec<u8> },
}

/// Write-only file that grows at the end.
#[derive(Debug)]
pub struct AppendFile {
    sink: Sink,
    path: PathBuf,
    role: &'static str,
    tell: u64,
}

impl AppendFile {
    /// Open (or create) a page-buffered append file.
    pub fn buffered(path: &Path, role: &'static str) -> Result<Self> {
        let (file, tell) = Self::open_raw(path, role)?;
        Ok(Self {
            sink: Sink::Buffered(BufWriter::with_capacity(PAGE_SIZE, file)),
            path: path.to_path_buf(),
            role,
            tell,
        })
    }

    /// Open (or create) a log-mode append file with sync-unit semantics.
    pub fn log(path: &Path, role: &'static str) -> Result<Self> {
        let (file, tell) = Self::open_raw(path, role)?;
        Ok(Self {
            sink: Sink::Log {
                file,
                stage: Vec::new(),
            },
            path: path.to_path_buf(),
            role,
            tell,
        })
    }

    fn open_raw(path: &Path, role: &'static str) -> Result<(File, u64)> {
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)
            .map_err(|e| Error::io(path, role, e))?;
        let len = file
            .metadata()
            .map_err(|e| Error::io(path, role, e))?
            .len();
        Ok((file, len))
    }

    /// Logical position. Buffered mode counts every byte written; log mode
    /// advances only at `sync`, mirroring what a restart would observe.
    pub fn tell(&self) -> u64 {
        self.tell
    }

    pub fn write(&mut self, buf: &[u8]) -> Result<()> {
        match &mut self.sink {
            Sink::Buffered(w) => {
                w.write_all(buf)
                    .map_err(|e| Error::io(self.path.clone(), self.role, e))?;
                self.tell += buf.len() as u64;
            }
            Sink::Log { stage, .. } => stage.extend_from_slice(buf),
        }
        Ok(())
    }

    /// Flush buffered bytes. In log mode this is the sync-unit boundary:
    /// the stage is written in one call and fsynced before `tell` moves.
    pub fn sync(&mut self) -> Result<()> {
        match &mut self.sink {
            Sink::Buffered(w) => w
                .flush()
                .map_err(|e| Error::io(self.path.clone(), self.role, e)),
            Sink::Log { file, stage } => {
                file.write_all(stage)
                    .and_then(|()| file.sync_all())
                    .map_err(|e| Error::io(self.path.clone(), self.role, e))?;
                self.tell += stage.len() as u64;
                stage.clear();
                Ok(())
            }
        }
    }

    pub fn write_u8(&mut self, v: u8) -> Result<()> {
        self.write(&[v])
    }

    pub fn write_u64(&mut self, v: u64) -> Result<()> {
        self.write(&v.to_le_bytes())
    }

    /// Write a byte string followed by the NUL terminator.
    pub fn write_cstr(&mut self, s: &[u8]) -> Result<()> {
        debug_assert!(!s.contains(&0));
        self.write(s)?;
        self.write(&[0])
    }
}
