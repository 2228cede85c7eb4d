//! The final scan: pick the singleton with the smallest input offset.

use crate::config::Config;
use crate::error::Result;
use crate::profile::ProfileSource;

/// Scan the root run through the singleton filter and return the word whose
/// only occurrence comes first in the input, or an empty word when every
/// word repeats. Writes no log; rerunning is free.
pub fn wfindfirst(cfg: &mut Config, root: u64) -> Result<Vec<u8>> {
    let mut input = cfg.open_singleton_input(&root.to_string())?;

    let mut best: Option<(Vec<u8>, u64)> = None;
    while let Some(item) = input.pop()? {
        let replace = match &best {
            None => true,
            Some((_, occur)) => item.occur < *occur,
        };
        if replace {
            best = Some((item.word, item.occur));
        }
    }
    Ok(best.map(|(word, _)| word).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{ProfileItem, ProfileWriter};

    fn workdir_with_run(items: &[ProfileItem]) -> (tempfile::TempDir, Config) {
        let dir = tempfile::tempdir().unwrap();
        let workdir = dir.path().join("work");
        let cfg = Config::open(&workdir).unwrap();
        let mut out = cfg.open_output("9").unwrap();
        for item in items {
            out.push(item).unwrap();
        }
        out.close().unwrap();
        (dir, cfg)
    }

    #[test]
    fn earliest_offset_wins_regardless_of_sort_order() {
        let (_dir, mut cfg) = workdir_with_run(&[
            ProfileItem::repeated(b"apple".to_vec()),
            ProfileItem::singleton(b"banana".to_vec(), 6),
            ProfileItem::singleton(b"cherry".to_vec(), 19),
        ]);
        assert_eq!(wfindfirst(&mut cfg, 9).unwrap(), b"banana");
    }

    #[test]
    fn all_repeated_yields_empty_word() {
        let (_dir, mut cfg) = workdir_with_run(&[
            ProfileItem::repeated(b"a".to_vec()),
            ProfileItem::repeated(b"b".to_vec()),
        ]);
        assert_eq!(wfindfirst(&mut cfg, 9).unwrap(), b"");
    }

    #[test]
    fn empty_run_yields_empty_word() {
        let (_dir, mut cfg) = workdir_with_run(&[]);
        assert_eq!(wfindfirst(&mut cfg, 9).unwrap(), b"");
    }

    #[test]
    fn offset_zero_is_a_valid_winner() {
        let (_dir, mut cfg) = workdir_with_run(&[
            ProfileItem::singleton(b"w".to_vec(), 0),
            ProfileItem::singleton(b"x".to_vec(), 2),
            ProfileItem::singleton(b"y".to_vec(), 4),
            ProfileItem::singleton(b"z".to_vec(), 6),
        ]);
        assert_eq!(wfindfirst(&mut cfg, 9).unwrap(), b"w");
    }
}
