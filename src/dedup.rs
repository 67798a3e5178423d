//! Deciding whether an observed item was already accounted for.
//!
//! Two policies exist for two kinds of list. The task list is gathered from
//! captures whose coordinates are stable, so identity is the exact position
//! ([`ExactDedup`]). Video rows are gathered across scrolled captures that
//! drift by a few pixels, so rows are identified by a coarse vertical bucket
//! ([`CourseDedupIndex`]).

use crate::geometry::Point;
use std::collections::{HashMap, HashSet};

/// Default vertical bucket height, in pixels, for video rows.
pub const DEFAULT_BUCKET_SIZE: i32 = 30;

/// A set of "already seen" keys that only grows.
pub trait DedupPolicy {
    /// Returns `true` and records `point` when it is not a duplicate.
    fn is_new(&mut self, point: Point) -> bool;

    /// Number of retained items.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Exact coordinate identity.
#[derive(Clone, Debug, Default)]
pub struct ExactDedup {
    seen: HashSet<Point>,
}

impl ExactDedup {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DedupPolicy for ExactDedup {
    fn is_new(&mut self, point: Point) -> bool {
        self.seen.insert(point)
    }

    fn len(&self) -> usize {
        self.seen.len()
    }
}

/// Vertical bucketing of list rows.
///
/// A point's key is `y / bucket_size` rounded down. A point is new when no
/// retained point lies closer than `bucket_size` vertically; x is ignored.
/// Since two points sharing a key are always closer than that, no two
/// retained points share a key. Distinct rows less than one bucket apart are
/// merged, which is an accepted approximation.
#[derive(Clone, Debug)]
pub struct CourseDedupIndex {
    bucket_size: i32,
    retained: HashMap<i32, i32>,
}

impl Default for CourseDedupIndex {
    fn default() -> Self {
        Self::new(DEFAULT_BUCKET_SIZE)
    }
}

impl CourseDedupIndex {
    /// `bucket_size` is clamped to at least one pixel.
    pub fn new(bucket_size: i32) -> Self {
        Self {
            bucket_size: bucket_size.max(1),
            retained: HashMap::new(),
        }
    }

    /// Bucket key of a vertical coordinate.
    pub fn key(&self, y: i32) -> i32 {
        y.div_euclid(self.bucket_size)
    }

    /// Whether `point` would be reported as new, without recording it.
    pub fn contains(&self, point: Point) -> bool {
        let key = self.key(point.y);
        (key - 1..=key + 1).any(|k| {
            self.retained
                .get(&k)
                .is_some_and(|&y| (y - point.y).abs() < self.bucket_size)
        })
    }
}

impl DedupPolicy for CourseDedupIndex {
    fn is_new(&mut self, point: Point) -> bool {
        if self.contains(point) {
            return false;
        }
        let key = self.key(point.y);
        self.retained.insert(key, point.y);
        true
    }

    fn len(&self) -> usize {
        self.retained.len()
    }
}
