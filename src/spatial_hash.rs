//! Bucketed spatial map from 2D position to owned values.
//!
//! Values live in an arena and are addressed by stable [`Handle`]s; the bucket
//! map only stores handles. Values are never removed, so a handle stays valid
//! for the lifetime of the map. The stored key of an entry must be kept equal
//! to the position of its value by calling [`SpatialHash::update`] after every
//! move, otherwise range queries look in the wrong buckets.

use crate::random::RandomSource;
use cellpop_common::Point;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndexError {
    #[error("an entry is already stored at ({x}, {y})")]
    DuplicateKey { x: f64, y: f64 },
    #[error("no entry for handle {0:?}")]
    UnknownHandle(Handle),
    #[error("bucket size must be positive, got {0}")]
    InvalidBucketSize(f64),
    #[error("the spatial hash is empty")]
    Empty,
}

/// Stable address of an entry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(usize);

impl Handle {
    pub fn index(self) -> usize {
        self.0
    }
}

type BucketCoord = (i64, i64);

#[derive(Debug, Clone)]
struct Entry<T> {
    key: Point,
    value: T,
}

#[derive(Debug, Clone)]
pub struct SpatialHash<T> {
    inv_bucket_size: f64,
    buckets: HashMap<BucketCoord, Vec<Handle>>,
    entries: Vec<Entry<T>>,
}

impl<T> SpatialHash<T> {
    pub fn new(bucket_size: f64) -> Result<Self, IndexError> {
        if !(bucket_size > 0.0) {
            return Err(IndexError::InvalidBucketSize(bucket_size));
        }
        Ok(Self {
            inv_bucket_size: 1.0 / bucket_size,
            buckets: HashMap::new(),
            entries: Vec::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline(always)]
    fn bucket_of(&self, key: Point) -> BucketCoord {
        (
            (key.x * self.inv_bucket_size).floor() as i64,
            (key.y * self.inv_bucket_size).floor() as i64,
        )
    }

    fn key_taken(&self, key: Point) -> bool {
        self.buckets
            .get(&self.bucket_of(key))
            .is_some_and(|handles| handles.iter().any(|h| self.entries[h.0].key == key))
    }

    /// Adds a new entry. Fails if another entry already has exactly this key.
    pub fn insert(&mut self, key: Point, value: T) -> Result<Handle, IndexError> {
        if self.key_taken(key) {
            return Err(IndexError::DuplicateKey { x: key.x, y: key.y });
        }
        let handle = Handle(self.entries.len());
        let bucket = self.bucket_of(key);
        self.entries.push(Entry { key, value });
        self.buckets.entry(bucket).or_default().push(handle);
        Ok(handle)
    }

    /// Moves an entry to `new_key`, relocating it between buckets if needed.
    pub fn update(&mut self, handle: Handle, new_key: Point) -> Result<(), IndexError> {
        let old_key = self.key(handle)?;
        if old_key == new_key {
            return Ok(());
        }
        if self.key_taken(new_key) {
            return Err(IndexError::DuplicateKey { x: new_key.x, y: new_key.y });
        }

        let old_bucket = self.bucket_of(old_key);
        let new_bucket = self.bucket_of(new_key);
        if old_bucket != new_bucket {
            if let Some(handles) = self.buckets.get_mut(&old_bucket) {
                if let Some(pos) = handles.iter().position(|h| *h == handle) {
                    handles.swap_remove(pos);
                }
                if handles.is_empty() {
                    self.buckets.remove(&old_bucket);
                }
            }
            self.buckets.entry(new_bucket).or_default().push(handle);
        }
        self.entries[handle.0].key = new_key;
        Ok(())
    }

    /// The stored key of an entry.
    pub fn key(&self, handle: Handle) -> Result<Point, IndexError> {
        self.entries
            .get(handle.0)
            .map(|e| e.key)
            .ok_or(IndexError::UnknownHandle(handle))
    }

    pub fn get(&self, handle: Handle) -> Option<&T> {
        self.entries.get(handle.0).map(|e| &e.value)
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        self.entries.get_mut(handle.0).map(|e| &mut e.value)
    }

    /// A handle drawn uniformly over all live entries.
    pub fn random_handle<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Result<Handle, IndexError> {
        if self.entries.is_empty() {
            return Err(IndexError::Empty);
        }
        Ok(Handle(rng.index(self.entries.len())))
    }

    /// Every entry whose bucket intersects the bounding square of `radius`
    /// around `center`. This is a superset of the disk; callers filter by
    /// exact distance themselves.
    pub fn range(&self, center: Point, radius: f64) -> RangeIter<'_, T> {
        let radius = radius.max(0.0);
        let (x_min, y_min) = self.bucket_of(Point::new(center.x - radius, center.y - radius));
        let (x_max, y_max) = self.bucket_of(Point::new(center.x + radius, center.y + radius));
        RangeIter {
            hash: self,
            x_min,
            x_max,
            y_max,
            bx: x_min,
            by: y_min,
            slot: 0,
        }
    }

    /// Visits every entry exactly once. The order is unspecified.
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &T)> + '_ {
        self.entries.iter().enumerate().map(|(i, e)| (Handle(i), &e.value))
    }
}

/// Lazy iterator over the buckets touched by a range query.
pub struct RangeIter<'a, T> {
    hash: &'a SpatialHash<T>,
    x_min: i64,
    x_max: i64,
    y_max: i64,
    bx: i64,
    by: i64,
    slot: usize,
}

impl<'a, T> Iterator for RangeIter<'a, T> {
    type Item = (Handle, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        while self.by <= self.y_max {
            if let Some(handles) = self.hash.buckets.get(&(self.bx, self.by)) {
                if let Some(&handle) = handles.get(self.slot) {
                    self.slot += 1;
                    return Some((handle, &self.hash.entries[handle.0].value));
                }
            }
            // Advance to the next bucket, row by row.
            self.slot = 0;
            if self.bx < self.x_max {
                self.bx += 1;
            } else {
                self.bx = self.x_min;
                self.by += 1;
            }
        }
        None
    }
}
