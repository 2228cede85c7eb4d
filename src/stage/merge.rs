//! The merger: planner-driven pairwise external merging of sorted runs.

use crate::config::Config;
use crate::error::Result;
use crate::plan::{MergePlanner, MergeSegment, Step};
use crate::profile::{ProfileItem, ProfileSource, ProfileWriter};
use crate::wal::WalRecord;

/// Merge every leaf run into a single root run and return its id.
///
/// Replay first: each logged merge must match the plan the planner would
/// have produced (anything else is log corruption), its inputs are
/// garbage-collected again (removal is idempotent), and its size is pushed
/// so re-planning sees the same history. Live execution then continues from
/// the first unlogged plan; every merge is made durable - output closed,
/// record synced - before its inputs are collected.
pub fn wmerge(cfg: &mut Config, planner: &mut dyn MergePlanner, disable_gc: bool) -> Result<u64> {
    if !cfg.has_recovery_done() {
        while !cfg.replay_eof() {
            match cfg.next_record()? {
                WalRecord::Merge {
                    left,
                    right,
                    out,
                    size,
                } => match planner.pop() {
                    Step::Merge(plan)
                        if plan.left == left && plan.right == right && plan.id == out =>
                    {
                        if !disable_gc {
                            cfg.remove(&left.to_string())?;
                            cfg.remove(&right.to_string())?;
                        }
                        planner.push(MergeSegment { plan, size });
                    }
                    _ => return cfg.log_corrupt(),
                },
                WalRecord::MergeEnd { root } => {
                    return match planner.pop() {
                        Step::Done { root: planned } if planned == root => Ok(root),
                        _ => cfg.log_corrupt(),
                    };
                }
                _ => return cfg.log_corrupt(),
            }
        }
    }
    cfg.recovery_done()?;

    loop {
        match planner.pop() {
            Step::Merge(plan) => {
                let mut left = cfg.open_input(&plan.left.to_string())?;
                let mut right = cfg.open_input(&plan.right.to_string())?;

                let out_name = plan.id.to_string();
                // A crash mid-merge leaves a partial output; appending to
                // it would corrupt the run, so start over.
                cfg.remove(&out_name)?;
                let mut out = cfg.open_output(&out_name)?;

                merge_streams(&mut left, &mut right, &mut out)?;
                let size = out.close()?;

                cfg.log_record(&WalRecord::Merge {
                    left: plan.left,
                    right: plan.right,
                    out: plan.id,
                    size,
                })?;
                if !disable_gc {
                    cfg.remove(&plan.left.to_string())?;
                    cfg.remove(&plan.right.to_string())?;
                }
                planner.push(MergeSegment { plan, size });
            }
            Step::Done { root } => {
                cfg.log_record(&WalRecord::MergeEnd { root })?;
                return Ok(root);
            }
        }
    }
}

/// One binary merge pass over two sorted, deduplicated profiles.
///
/// Distinct words pass through unchanged; a word present in both inputs is
/// repeated by definition and its offsets are dropped.
fn merge_streams<L, R>(left: &mut L, right: &mut R, out: &mut ProfileWriter) -> Result<()>
where
    L: ProfileSource,
    R: ProfileSource,
{
    loop {
        let ord = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => l.word.cmp(&r.word),
            _ => break,
        };
        match ord {
            std::cmp::Ordering::Less => {
                if let Some(item) = left.pop()? {
                    out.push(&item)?;
                }
            }
            std::cmp::Ordering::Greater => {
                if let Some(item) = right.pop()? {
                    out.push(&item)?;
                }
            }
            std::cmp::Ordering::Equal => {
                right.pop()?;
                if let Some(item) = left.pop()? {
                    out.push(&ProfileItem::repeated(item.word))?;
                }
            }
        }
    }

    while let Some(item) = left.pop()? {
        out.push(&item)?;
    }
    while let Some(item) = right.pop()? {
        out.push(&item)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::ProfileReader;
    use std::path::Path;

    fn write_run(path: &Path, items: &[ProfileItem]) {
        let mut out = ProfileWriter::create(path).unwrap();
        for item in items {
            out.push(item).unwrap();
        }
        out.close().unwrap();
    }

    fn merge_files(left: &Path, right: &Path, out_path: &Path) -> Vec<ProfileItem> {
        let mut left = ProfileReader::open(left).unwrap();
        let mut right = ProfileReader::open(right).unwrap();
        let mut out = ProfileWriter::create(out_path).unwrap();
        merge_streams(&mut left, &mut right, &mut out).unwrap();
        out.close().unwrap();

        let mut merged = ProfileReader::open(out_path).unwrap();
        let mut items = Vec::new();
        while let Some(item) = merged.pop().unwrap() {
            items.push(item);
        }
        items
    }

    fn s(word: &[u8], occur: u64) -> ProfileItem {
        ProfileItem::singleton(word.to_vec(), occur)
    }

    fn r(word: &[u8]) -> ProfileItem {
        ProfileItem::repeated(word.to_vec())
    }

    #[test]
    fn interleaved_words_stay_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let (a, b, o) = (dir.path().join("a"), dir.path().join("b"), dir.path().join("o"));
        write_run(&a, &[s(b"ant", 0), s(b"cow", 10), s(b"eel", 20)]);
        write_run(&b, &[s(b"bee", 5), s(b"dog", 15)]);

        let merged = merge_files(&a, &b, &o);
        assert_eq!(
            merged,
            vec![s(b"ant", 0), s(b"bee", 5), s(b"cow", 10), s(b"dog", 15), s(b"eel", 20)]
        );
    }

    #[test]
    fn word_in_both_inputs_becomes_repeated() {
        let dir = tempfile::tempdir().unwrap();
        let (a, b, o) = (dir.path().join("a"), dir.path().join("b"), dir.path().join("o"));
        write_run(&a, &[s(b"both", 3), s(b"only-left", 9)]);
        write_run(&b, &[s(b"both", 40)]);

        let merged = merge_files(&a, &b, &o);
        assert_eq!(merged, vec![r(b"both"), s(b"only-left", 9)]);
    }

    #[test]
    fn repeated_flag_survives_merging() {
        let dir = tempfile::tempdir().unwrap();
        let (a, b, o) = (dir.path().join("a"), dir.path().join("b"), dir.path().join("o"));
        write_run(&a, &[r(b"dup"), s(b"x", 1)]);
        write_run(&b, &[s(b"dup", 99), s(b"y", 2)]);

        let merged = merge_files(&a, &b, &o);
        assert_eq!(merged, vec![r(b"dup"), s(b"x", 1), s(b"y", 2)]);
    }

    #[test]
    fn empty_side_drains_the_other() {
        let dir = tempfile::tempdir().unwrap();
        let (a, b, o) = (dir.path().join("a"), dir.path().join("b"), dir.path().join("o"));
        write_run(&a, &[]);
        write_run(&b, &[s(b"solo", 7)]);

        let merged = merge_files(&a, &b, &o);
        assert_eq!(merged, vec![s(b"solo", 7)]);
    }
}
