//! Singleton filter: a profile source with the repeated records removed.

use crate::error::Result;
use crate::profile::{ProfileItem, ProfileSource};

/// Adapter that skips every `repeated` record of the wrapped source, so the
/// head is always a singleton (or the stream is empty).
pub struct SingletonFilter<S> {
    inner: S,
}

impl<S: ProfileSource> SingletonFilter<S> {
    pub fn new(mut inner: S) -> Result<Self> {
        Self::skip_repeated(&mut inner)?;
        Ok(Self { inner })
    }

    fn skip_repeated(inner: &mut S) -> Result<()> {
        while matches!(inner.peek(), Some(item) if item.repeated) {
            inner.pop()?;
        }
        Ok(())
    }
}

impl<S: ProfileSource> ProfileSource for SingletonFilter<S> {
    fn peek(&self) -> Option<&ProfileItem> {
        self.inner.peek()
    }

    fn pop(&mut self) -> Result<Option<ProfileItem>> {
        let item = self.inner.pop()?;
        Self::skip_repeated(&mut self.inner)?;
        Ok(item)
    }
}
