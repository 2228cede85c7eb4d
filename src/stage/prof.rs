//! The profiler: scan the input once in bounded memory, pouring one sorted
//! run per fill of the dedup pool.

use crate::config::Config;
use crate::dedup::DedupPool;
use crate::error::{role, Error, Result};
use crate::io::SequentialFile;
use crate::stage::ProfileSegment;
use crate::wal::WalRecord;
use crate::workmem::WorkingMemory;
use std::fs;
use std::path::Path;

const EIO: i32 = 5;
const EISDIR: i32 = 21;

fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n')
}

/// Read the next whitespace-delimited token into `word` (reused across
/// calls so the hot loop stays allocation-free once the buffer has grown),
/// returning the offset of its first byte, or `None` at end of input.
/// Consumes the single delimiter that ends the token (when it is not EOF).
fn read_word(file: &mut SequentialFile, word: &mut Vec<u8>) -> Result<Option<u64>> {
    word.clear();
    loop {
        let buf = file.fill()?;
        if buf.is_empty() {
            return Ok(None);
        }
        match buf.iter().position(|&b| !is_whitespace(b)) {
            Some(i) => {
                file.consume(i);
                break;
            }
            None => {
                let n = buf.len();
                file.consume(n);
            }
        }
    }

    let start = file.tell();
    loop {
        let buf = file.fill()?;
        if buf.is_empty() {
            break;
        }
        match buf.iter().position(|&b| is_whitespace(b)) {
            Some(i) => {
                word.extend_from_slice(&buf[..i]);
                file.consume(i + 1);
                break;
            }
            None => {
                word.extend_from_slice(buf);
                let n = buf.len();
                file.consume(n);
            }
        }
    }
    Ok(Some(start))
}

/// Profile `input` into a contiguous sequence of sorted leaf runs.
///
/// Replays any `ProfSegment` records first; when the log already carries
/// `ProfEnd` the recorded segments are returned without touching the input.
/// Otherwise scanning resumes at the first unprofiled byte, and every
/// poured run is logged (and synced) before the next one starts.
pub fn wprof(
    cfg: &mut Config,
    workmem: &mut WorkingMemory,
    input: &Path,
) -> Result<Vec<ProfileSegment>> {
    let mut segments: Vec<ProfileSegment> = Vec::new();
    let mut offset: u64 = 0;

    if !cfg.has_recovery_done() {
        while !cfg.replay_eof() {
            match cfg.next_record()? {
                WalRecord::ProfSegment { start, end } => {
                    if start != offset {
                        return cfg.log_corrupt();
                    }
                    offset = end + 1;
                    let id = segments.len() as u64;
                    // Physical size only matters to the DP planner; a run
                    // already garbage-collected by a later stage reads 0.
                    let size = fs::metadata(cfg.run_path(&id.to_string()))
                        .map(|m| m.len())
                        .unwrap_or(0);
                    segments.push(ProfileSegment {
                        id,
                        start,
                        end,
                        size,
                    });
                }
                WalRecord::ProfEnd => return Ok(segments),
                _ => return cfg.log_corrupt(),
            }
        }
    }
    cfg.recovery_done()?;

    let meta = fs::metadata(input).map_err(|e| Error::io(input, role::ORIGINAL, e))?;
    if meta.is_dir() {
        return Err(Error::errno(input, role::ORIGINAL, EISDIR));
    }
    if !meta.is_file() {
        return Err(Error::errno(input, role::ORIGINAL, EIO));
    }
    if meta.len() < offset {
        // The input shrank below our resume point; nothing sane to do.
        return Err(Error::errno(input, role::ORIGINAL, EIO));
    }

    let mut file = SequentialFile::open(input, role::ORIGINAL, offset)?;

    let mut word = Vec::new();
    let mut leftover: Option<(Vec<u8>, u64)> = None;
    let mut at_eof = false;
    while !at_eof || leftover.is_some() {
        let mut pool = DedupPool::new(workmem.as_mut_slice());

        // The token that overflowed the previous pool goes in first; if
        // even an empty arena cannot hold it, no amount of pouring will.
        if let Some((carried, woff)) = leftover.take() {
            if !pool.insert(&carried, woff) {
                return Err(Error::InsufficientMemory);
            }
        }

        let mut resume = file.tell();
        while !at_eof {
            resume = file.tell();
            match read_word(&mut file, &mut word)? {
                Some(woff) => {
                    if !pool.insert(&word, woff) {
                        leftover = Some((std::mem::take(&mut word), woff));
                        break;
                    }
                }
                None => {
                    resume = file.tell();
                    at_eof = true;
                }
            }
        }

        if pool.is_empty() {
            if leftover.is_none() {
                // Whitespace-only remainder: no segment to write.
                break;
            }
            // The failed token gets retried against an empty pool above;
            // failing there is the insufficient-memory exit.
            continue;
        }

        let id = segments.len() as u64;
        let name = id.to_string();
        cfg.remove(&name)?;
        let size = pool.pour(cfg.open_output(&name)?)?;

        let end = resume - 1;
        cfg.log_record(&WalRecord::ProfSegment { start: offset, end })?;
        segments.push(ProfileSegment {
            id,
            start: offset,
            end,
            size,
        });
        offset = resume;
    }

    cfg.log_record(&WalRecord::ProfEnd)?;
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workmem::MIN_SIZE;
    use std::io::Write;

    fn fixture(dir: &Path, content: &[u8]) -> std::path::PathBuf {
        let path = dir.join("input");
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(content).unwrap();
        path
    }

    fn run(content: &[u8], memsize: usize) -> (tempfile::TempDir, Vec<ProfileSegment>) {
        let dir = tempfile::tempdir().unwrap();
        let input = fixture(dir.path(), content);
        let workdir = dir.path().join("work");
        let mut cfg = Config::open(&workdir).unwrap();
        let mut wm = WorkingMemory::allocate(memsize, false).unwrap();
        let segments = wprof(&mut cfg, &mut wm, &input).unwrap();
        (dir, segments)
    }

    #[test]
    fn tokenizer_reports_first_byte_offsets() {
        let dir = tempfile::tempdir().unwrap();
        let input = fixture(dir.path(), b"  apple\tbanana \n cherry");
        let mut file = SequentialFile::open(&input, role::ORIGINAL, 0).unwrap();
        let mut word = Vec::new();

        let off = read_word(&mut file, &mut word).unwrap().unwrap();
        assert_eq!((word.as_slice(), off), (&b"apple"[..], 2));
        let off = read_word(&mut file, &mut word).unwrap().unwrap();
        assert_eq!((word.as_slice(), off), (&b"banana"[..], 8));
        let off = read_word(&mut file, &mut word).unwrap().unwrap();
        assert_eq!((word.as_slice(), off), (&b"cherry"[..], 17));
        assert!(read_word(&mut file, &mut word).unwrap().is_none());
    }

    #[test]
    fn single_segment_covers_whole_input() {
        let (_dir, segments) = run(b"apple banana apple cherry", MIN_SIZE);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].start, 0);
        assert_eq!(segments[0].end, 24);
        assert!(segments[0].size > 0);
    }

    #[test]
    fn empty_input_yields_no_segments() {
        let (_dir, segments) = run(b"", MIN_SIZE);
        assert!(segments.is_empty());
    }

    #[test]
    fn whitespace_only_input_yields_no_segments() {
        let (_dir, segments) = run(b"  \n\t  \r\n ", MIN_SIZE);
        assert!(segments.is_empty());
    }

    #[test]
    fn segments_partition_the_input() {
        // Enough distinct words to overflow a minimal pool repeatedly.
        let mut content = Vec::new();
        for i in 0..2000 {
            content.extend_from_slice(format!("word{i:04} ").as_bytes());
        }
        let (_dir, segments) = run(&content, MIN_SIZE);
        assert!(segments.len() > 1, "expected multiple fills");
        assert_eq!(segments[0].start, 0);
        for pair in segments.windows(2) {
            assert_eq!(pair[1].start, pair[0].end + 1);
        }
        assert_eq!(segments.last().unwrap().end, content.len() as u64 - 1);
    }

    #[test]
    fn replay_returns_recorded_segments_without_io() {
        let dir = tempfile::tempdir().unwrap();
        let input = fixture(dir.path(), b"alpha beta gamma");
        let workdir = dir.path().join("work");
        let mut wm = WorkingMemory::allocate(MIN_SIZE, false).unwrap();

        let mut cfg = Config::open(&workdir).unwrap();
        let first = wprof(&mut cfg, &mut wm, &input).unwrap();
        drop(cfg);

        // Delete the input: a finished wprof must not read it again.
        fs::remove_file(&input).unwrap();
        let mut cfg = Config::open(&workdir).unwrap();
        let second = wprof(&mut cfg, &mut wm, &input).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn word_larger_than_memory_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let big = vec![b'x'; 2 * MIN_SIZE];
        let input = fixture(dir.path(), &big);
        let workdir = dir.path().join("work");
        let mut cfg = Config::open(&workdir).unwrap();
        let mut wm = WorkingMemory::allocate(MIN_SIZE, false).unwrap();
        let err = wprof(&mut cfg, &mut wm, &input).unwrap_err();
        assert!(matches!(err, Error::InsufficientMemory));
    }

    #[test]
    fn directory_input_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let workdir = dir.path().join("work");
        let mut cfg = Config::open(&workdir).unwrap();
        let mut wm = WorkingMemory::allocate(MIN_SIZE, false).unwrap();
        let err = wprof(&mut cfg, &mut wm, dir.path()).unwrap_err();
        assert_eq!(err.exit_errno(), EISDIR);
    }
}
