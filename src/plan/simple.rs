//! Level-order merge planner.
//!
//! Leaves are paired off left to right; each level's outputs (plus a
//! carried odd run, appended last) form the next level, producing a
//! balanced tree of height ceil(log2 n). Sizes are ignored, so the whole
//! plan is a pure function of the leaf ids - which is why the driver uses
//! this planner: the WAL alone reproduces it exactly on restart.

use crate::plan::{MergePlan, MergePlanner, MergeSegment, Step};
use crate::stage::ProfileSegment;

pub struct SimplePlanner {
    plans: Vec<MergePlan>,
    cursor: usize,
    root: u64,
}

impl SimplePlanner {
    /// Plan over the given leaves. `None` when there are no leaves at all
    /// (the caller treats that as log corruption).
    pub fn new(segments: &[ProfileSegment]) -> Option<Self> {
        if segments.is_empty() {
            return None;
        }

        let mut next_id = segments.iter().map(|s| s.id).max().unwrap_or(0) + 1;
        let mut level: Vec<u64> = segments.iter().map(|s| s.id).collect();
        let mut plans = Vec::new();

        while level.len() > 1 {
            let mut merged = Vec::with_capacity(level.len().div_ceil(2));
            for pair in level.chunks(2) {
                if pair.len() == 2 {
                    plans.push(MergePlan {
                        id: next_id,
                        left: pair[0],
                        right: pair[1],
                    });
                    merged.push(next_id);
                    next_id += 1;
                } else {
                    // Odd run out: carried to the end of the next level.
                    merged.push(pair[0]);
                }
            }
            level = merged;
        }

        Some(Self {
            plans,
            cursor: 0,
            root: level[0],
        })
    }
}

impl MergePlanner for SimplePlanner {
    fn pop(&mut self) -> Step {
        if self.cursor < self.plans.len() {
            let plan = self.plans[self.cursor];
            self.cursor += 1;
            Step::Merge(plan)
        } else {
            Step::Done { root: self.root }
        }
    }

    fn push(&mut self, _segment: MergeSegment) {
        // The plan is fixed upfront; completion reports carry no news.
    }
}
