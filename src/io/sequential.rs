//! Buffered sequential reader.

use crate::error::{Error, Result};
use crate::io::PAGE_SIZE;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Read-only file scanned strictly front to back.
///
/// The reader tracks the absolute offset of the next unconsumed byte
/// (`tell`) and exposes the internal buffer through [`fill`]/[`consume`] so
/// callers can tokenize or scan for terminators without copying. `eof` is
/// exact: it prefetches one buffer when needed, so it only reports true once
/// no further byte exists.
///
/// [`fill`]: SequentialFile::fill
/// [`consume`]: SequentialFile::consume
#[derive(Debug)]
pub struct SequentialFile {
    reader: BufReader<File>,
    path: PathBuf,
    role: &'static str,
    pos: u64,
}

impl SequentialFile {
    /// Open `path` read-only, seeked to the absolute offset `seekset`.
    pub fn open(path: &Path, role: &'static str, seekset: u64) -> Result<Self> {
        let mut file = File::open(path).map_err(|e| Error::io(path, role, e))?;

        #[cfg(unix)]
        advise_sequential(&file);

        file.seek(SeekFrom::Start(seekset))
            .map_err(|e| Error::io(path, role, e))?;

        Ok(Self {
            reader: BufReader::with_capacity(PAGE_SIZE, file),
            path: path.to_path_buf(),
            role,
            pos: seekset,
        })
    }

    /// Absolute offset of the next byte to be consumed.
    pub fn tell(&self) -> u64 {
        self.pos
    }

    /// Path the file was opened under.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the file is exhausted. Prefetches one buffer if needed; a
    /// read error here is deferred to the next `read`/`fill`.
    pub fn eof(&mut self) -> bool {
        match self.reader.fill_buf() {
            Ok(buf) => buf.is_empty(),
            Err(_) => false,
        }
    }

    /// Borrow the unconsumed part of the internal buffer, refilling it when
    /// empty. An empty slice means end of file.
    pub fn fill(&mut self) -> Result<&[u8]> {
        let (path, role) = (&self.path, self.role);
        self.reader
            .fill_buf()
            .map_err(|e| Error::io(path.clone(), role, e))
    }

    /// Consume `n` bytes of the slice last returned by [`fill`].
    ///
    /// [`fill`]: SequentialFile::fill
    pub fn consume(&mut self, n: usize) {
        self.reader.consume(n);
        self.pos += n as u64;
    }

    /// Fill `buf` exactly; running off the end of the file is an error
    /// (premature EOF).
    pub fn read(&mut self, buf: &mut [u8]) -> Result<()> {
        match self.reader.read_exact(buf) {
            Ok(()) => {
                self.pos += buf.len() as u64;
                Ok(())
            }
            Err(e) => Err(Error::io(self.path.clone(), self.role, e)),
        }
    }

    /// Read one byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        let mut b = [0u8; 1];
        self.read(&mut b)?;
        Ok(b[0])
    }

    /// Read a little-endian u64.
    pub fn read_u64(&mut self) -> Result<u64> {
        let mut b = [0u8; 8];
        self.read(&mut b)?;
        Ok(u64::from_le_bytes(b))
    }

    /// Read a NUL-terminated byte string into `out` (terminator consumed,
    /// not stored). EOF before the terminator is premature EOF.
    pub fn read_cstr(&mut self, out: &mut Vec<u8>) -> Result<()> {
        loop {
            let buf = self.fill()?;
            if buf.is_empty() {
                return Err(Error::io(
                    self.path.clone(),
                    self.role,
                    io::Error::new(io::ErrorKind::UnexpectedEof, "unterminated string"),
                ));
            }
            match buf.iter().position(|&b| b == 0) {
                Some(i) => {
                    out.extend_from_slice(&buf[..i]);
                    self.consume(i + 1);
                    return Ok(());
                }
                None => {
                    let n = buf.len();
                    out.extend_from_slice(buf);
                    self.consume(n);
                }
            }
        }
    }
}

#[cfg(unix)]
fn advise_sequential(file: &File) {
    use std::os::unix::io::AsRawFd;
    // Advisory only; failure changes nothing about correctness.
    unsafe {
        libc::posix_fadvise(file.as_raw_fd(), 0, 0, libc::POSIX_FADV_SEQUENTIAL);
    }
}
