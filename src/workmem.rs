//! The working memory region backing the in-memory dedup pool.
//!
//! One anonymous mapping of the user-requested size, allocated once at
//! startup. All of wprof's per-word storage lives inside it, so the hot
//! insertion loop touches the heap exactly never. The mapping is page
//! aligned, which the arena relies on for placing its fixed-size items.

use crate::error::{Error, Result};
use memmap2::MmapMut;

/// Smallest accepted region. Below this even the bookkeeping for a handful
/// of words does not fit.
pub const MIN_SIZE: usize = 4096;

pub struct WorkingMemory {
    map: MmapMut,
}

impl WorkingMemory {
    /// Map `size` bytes of anonymous memory, optionally pinned so the
    /// region cannot be swapped out.
    pub fn allocate(size: usize, page_pinned: bool) -> Result<Self> {
        let map = MmapMut::map_anon(size)
            .map_err(|e| Error::io("<anonymous mapping>", crate::error::role::WORKMEM, e))?;
        if page_pinned {
            map.lock()
                .map_err(|e| Error::io("<anonymous mapping>", crate::error::role::WORKMEM, e))?;
        }
        Ok(Self { map })
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.len() == 0
    }

    /// The whole region, handed to a fresh arena each fill-and-pour cycle.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.map[..]
    }
}
