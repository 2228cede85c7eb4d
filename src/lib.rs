//! # wdedup - first non-repeating word in very large files
//!
//! wdedup scans a whitespace-tokenized input file and prints the first word
//! that occurs exactly once, using a fixed-size working memory region and a
//! recovery log that makes every stage restartable after a crash.
//!
//! ## Architecture
//!
//! The crate is organized into these main modules:
//!
//! - [`io`] - sequential-scan and append-only file primitives
//! - [`workmem`] - the caller-sized anonymous memory region
//! - [`dedup`] - bloom-ed keys, the double-ended arena, the dedup pool
//! - [`profile`] - sorted run files: codec, pull reader, singleton filter
//! - [`wal`] - recovery log records and the version tag
//! - [`config`] - the per-run facade: working directory, log duality
//! - [`plan`] - merge planners (level-order and minimum-I/O)
//! - [`stage`] - the pipeline: wprof, wmerge, wfindfirst
//!
//! ## Pipeline
//!
//! ```text
//! input file -> wprof -> leaf runs + log -> wmerge -> root run + log
//!            -> wfindfirst -> stdout
//! ```
//!
//! Each stage replays the recovery log before doing any work: a finished
//! stage returns its recorded result without touching the input, a
//! partially finished stage resumes at the first piece of progress that
//! never reached disk.
//!
//! ## Quick start
//!
//! ```no_run
//! use std::path::Path;
//! use wdedup::config::Config;
//! use wdedup::plan::SimplePlanner;
//! use wdedup::stage::{wfindfirst, wmerge, wprof};
//! use wdedup::workmem::WorkingMemory;
//!
//! let mut cfg = Config::open(Path::new("/tmp/wdedup-work")).unwrap();
//! let mut wm = WorkingMemory::allocate(1 << 30, false).unwrap();
//! let segments = wprof(&mut cfg, &mut wm, Path::new("input.txt")).unwrap();
//! if let Some(mut planner) = SimplePlanner::new(&segments) {
//!     let root = wmerge(&mut cfg, &mut planner, false).unwrap();
//!     let word = wfindfirst(&mut cfg, root).unwrap();
//!     println!("{}", String::from_utf8_lossy(&word));
//! }
//! ```

pub mod config;
pub mod dedup;
pub mod error;
pub mod io;
pub mod plan;
pub mod profile;
pub mod stage;
pub mod wal;
pub mod workmem;

pub use error::{Error, Result};
