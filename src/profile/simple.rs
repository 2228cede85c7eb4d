//! The profile file codec.
//!
//! Record layout: `<word bytes> 0x00 <flag:u8>` followed by the occurrence
//! offset as a little-endian u64 when the flag is 0 (singleton). A nonzero
//! flag marks a repeated word and carries no offset. Words are sorted
//! strictly ascending within one file.

use crate::error::{role, Error, Result};
use crate::io::{AppendFile, SequentialFile};
use crate::profile::{ProfileItem, ProfileSource};
use std::path::{Path, PathBuf};

/// Append-side of the codec, over a page-buffered file.
pub struct ProfileWriter {
    file: AppendFile,
}

impl ProfileWriter {
    /// Open a profile run at `path` for appending. The caller removes any
    /// stale file of the same name first.
    pub fn create(path: &Path) -> Result<Self> {
        Ok(Self {
            file: AppendFile::buffered(path, role::PROFILE)?,
        })
    }

    pub fn push(&mut self, item: &ProfileItem) -> Result<()> {
        self.file.write_cstr(&item.word)?;
        if item.repeated {
            self.file.write_u8(1)
        } else {
            self.file.write_u8(0)?;
            self.file.write_u64(item.occur)
        }
    }

    /// Flush and return the physical size of the run in bytes.
    pub fn close(mut self) -> Result<u64> {
        self.file.sync()?;
        Ok(self.file.tell())
    }
}

/// Pull-side of the codec. The head record is prefetched on open, so
/// `peek`/`pop` never block on anything but the next refill.
#[derive(Debug)]
pub struct ProfileReader {
    file: SequentialFile,
    path: PathBuf,
    head: Option<ProfileItem>,
}

impl ProfileReader {
    pub fn open(path: &Path) -> Result<Self> {
        let file = SequentialFile::open(path, role::PROFILE, 0)?;
        let mut reader = Self {
            file,
            path: path.to_path_buf(),
            head: None,
        };
        reader.refill()?;
        Ok(reader)
    }

    /// Read the next record into `head`. EOF at a record boundary is clean
    /// emptiness; EOF inside a record means the file is corrupt.
    fn refill(&mut self) -> Result<()> {
        if self.file.eof() {
            self.head = None;
            return Ok(());
        }

        let mut word = Vec::new();
        self.file
            .read_cstr(&mut word)
            .map_err(|e| self.corrupt(e))?;
        let flag = self.file.read_u8().map_err(|e| self.corrupt(e))?;
        self.head = Some(if flag == 0 {
            let occur = self.file.read_u64().map_err(|e| self.corrupt(e))?;
            ProfileItem::singleton(word, occur)
        } else {
            ProfileItem::repeated(word)
        });
        Ok(())
    }

    fn corrupt(&self, err: Error) -> Error {
        if err.is_premature_eof() {
            Error::ProfileCorrupt {
                path: self.path.clone(),
            }
        } else {
            err
        }
    }
}

impl ProfileSource for ProfileReader {
    fn peek(&self) -> Option<&ProfileItem> {
        self.head.as_ref()
    }

    fn pop(&mut self) -> Result<Option<ProfileItem>> {
        let head = self.head.take();
        if head.is_some() {
            self.refill()?;
        }
        Ok(head)
    }
}
