use super::Packer;
use crate::error::{Result, SpriteFontError};
use crate::model::Rect;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Free bins this thin or thinner can never hold a bordered glyph.
const MIN_USEFUL_SPAN: u32 = 2;
/// Height of the initial free rectangle; effectively unbounded.
const SEED_HEIGHT: u32 = u32::MAX;

/// Guillotine packer over a fixed-width surface whose free space is kept in
/// buckets keyed by exact height.
///
/// Each bucket holds free rectangles ordered by width, then y, then x, so the
/// first wide-enough entry is also the narrowest fit. A cell whose height has
/// no bucket (or no wide-enough entry) is carved out of the shortest taller
/// bucket: the donor is cut into an exact-height bin plus a height remainder.
/// The bin is then cut left-to-right into the placed cell and a width
/// remainder. Remainders of `MIN_USEFUL_SPAN` or less are dropped.
pub struct GuillotinePacker {
    width: u32,
    buckets: BTreeMap<u32, Vec<Rect>>,
}

impl GuillotinePacker {
    /// Seeds the pool with one free rectangle of `width` and unbounded height.
    pub fn new(width: u32) -> Self {
        Self::with_height(width, SEED_HEIGHT)
    }

    pub fn with_height(width: u32, height: u32) -> Self {
        let mut packer = Self {
            width,
            buckets: BTreeMap::new(),
        };
        packer.insert_free(Rect::new(0, 0, width, height));
        packer
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    /// Snapshot of the free pool, for invariant checks.
    pub fn free_rects(&self) -> impl Iterator<Item = &Rect> {
        self.buckets.values().flatten()
    }

    fn by_width_xy(a: &Rect, b: &Rect) -> Ordering {
        a.w.cmp(&b.w)
            .then_with(|| a.y.cmp(&b.y))
            .then_with(|| a.x.cmp(&b.x))
    }

    fn insert_free(&mut self, r: Rect) {
        let bucket = self.buckets.entry(r.h).or_default();
        let pos = bucket
            .binary_search_by(|probe| Self::by_width_xy(probe, &r))
            .unwrap_or_else(|p| p);
        bucket.insert(pos, r);
    }

    /// Removes and returns the first rectangle in bucket `h` at least `w` wide.
    fn take_from_bucket(&mut self, h: u32, w: u32) -> Option<Rect> {
        let bucket = self.buckets.get_mut(&h)?;
        let pos = bucket.iter().position(|r| r.w >= w)?;
        let r = bucket.remove(pos);
        if bucket.is_empty() {
            self.buckets.remove(&h);
        }
        Some(r)
    }

    /// Produces a free bin of exactly height `h` and width at least `w`.
    fn exact_height_bin(&mut self, w: u32, h: u32) -> Option<Rect> {
        if let Some(bin) = self.take_from_bucket(h, w) {
            return Some(bin);
        }
        let donor_height = self
            .buckets
            .range(h + 1..)
            .find(|(_, rects)| rects.iter().any(|r| r.w >= w))
            .map(|(&bh, _)| bh)?;
        let donor = self.take_from_bucket(donor_height, w)?;
        let remainder = Rect::new(donor.x, donor.y + h, donor.w, donor.h - h);
        if remainder.h > MIN_USEFUL_SPAN {
            self.insert_free(remainder);
        }
        Some(Rect::new(donor.x, donor.y, donor.w, h))
    }
}

impl Packer for GuillotinePacker {
    fn pack(&mut self, w: u32, h: u32) -> Result<Rect> {
        let bin = self
            .exact_height_bin(w, h)
            .ok_or(SpriteFontError::OutOfSpace {
                width: w,
                height: h,
            })?;
        let remainder = Rect::new(bin.x + w, bin.y, bin.w - w, h);
        if remainder.w > MIN_USEFUL_SPAN {
            self.insert_free(remainder);
        }
        Ok(Rect::new(bin.x, bin.y, w, h))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_height_cells_share_a_row() {
        let mut p = GuillotinePacker::new(32);
        assert_eq!(p.pack(12, 22).unwrap(), Rect::new(0, 0, 12, 22));
        assert_eq!(p.pack(12, 22).unwrap(), Rect::new(12, 0, 12, 22));
        assert_eq!(p.pack(5, 5).unwrap(), Rect::new(24, 0, 5, 5));
    }

    #[test]
    fn buckets_are_removed_when_emptied() {
        let mut p = GuillotinePacker::with_height(8, 8);
        p.pack(8, 8).unwrap();
        assert_eq!(p.free_rects().count(), 0);
        assert!(matches!(
            p.pack(1, 1),
            Err(SpriteFontError::OutOfSpace { width: 1, height: 1 })
        ));
    }

    #[test]
    fn unbounded_seed_packs_past_the_largest_texture() {
        let mut p = GuillotinePacker::new(4);
        assert_eq!(p.pack(4, 16000).unwrap(), Rect::new(0, 0, 4, 16000));
        assert_eq!(p.pack(4, 16000).unwrap(), Rect::new(0, 16000, 4, 16000));
    }

    #[test]
    fn thin_remainders_are_dropped() {
        let mut p = GuillotinePacker::with_height(10, 12);
        // 2px width remainder and 2px height remainder are both discarded.
        p.pack(8, 10).unwrap();
        assert_eq!(p.free_rects().count(), 0);
    }
}
