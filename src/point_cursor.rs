//! Lazy random-access cursor over a point's serialized form
//!
//! The cursor walks the logical 36-byte concatenation `hash || index(LE)`
//! without materializing it. Each byte is computed on access:
//!
//! - offset 0..32: `hash[offset]`
//! - offset 32..36: little-endian byte `offset - 32` of `index`
//! - offset 36: end sentinel, dereferences to 0
//!
//! The cursor owns a copy of the point, so it never observes later mutation
//! of the source.

use crate::constants::{HASH_SIZE, POINT_SIZE};
use crate::point::Point;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// Bidirectional cursor over a point's wire bytes.
///
/// Two cursors are equal when they cover equal points at the same offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointCursor {
    point: Point,
    offset: usize,
}

impl PointCursor {
    /// Cursor at the first byte
    pub fn new(point: Point) -> Self {
        Self { point, offset: 0 }
    }

    /// Cursor at the end sentinel
    pub fn end(point: Point) -> Self {
        Self {
            point,
            offset: POINT_SIZE,
        }
    }

    /// Cursor at `offset`; anything past the end lands on the sentinel.
    pub fn at(point: Point, offset: usize) -> Self {
        Self {
            point,
            offset: offset.min(POINT_SIZE),
        }
    }

    pub fn point(&self) -> &Point {
        &self.point
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn is_end(&self) -> bool {
        self.offset >= POINT_SIZE
    }

    /// True while the cursor addresses a real byte
    pub fn has_remaining(&self) -> bool {
        !self.is_end()
    }

    /// Byte at the current offset, 0 at the end sentinel
    pub fn get(&self) -> u8 {
        let offset = self.offset;
        if offset < HASH_SIZE {
            self.point.hash()[offset]
        } else if offset < POINT_SIZE {
            self.point.index().to_le_bytes()[offset - HASH_SIZE]
        } else {
            0
        }
    }

    /// Same as [`PointCursor::get`]
    pub fn byte(&self) -> u8 {
        self.get()
    }

    pub fn value(&self) -> u8 {
        self.get()
    }

    /// Advance one byte (saturates at the end sentinel)
    pub fn increment(&mut self) -> &mut Self {
        if self.offset < POINT_SIZE {
            self.offset += 1;
        }
        self
    }

    /// Step back one byte (saturates at offset 0)
    pub fn decrement(&mut self) -> &mut Self {
        if self.offset > 0 {
            self.offset -= 1;
        }
        self
    }

    /// Advance, returning the cursor as it was before
    pub fn post_increment(&mut self) -> Self {
        let previous = *self;
        self.increment();
        previous
    }

    /// Step back, returning the cursor as it was before
    pub fn post_decrement(&mut self) -> Self {
        let previous = *self;
        self.decrement();
        previous
    }
}

impl Add<usize> for PointCursor {
    type Output = Self;

    fn add(self, distance: usize) -> Self {
        Self::at(self.point, self.offset.saturating_add(distance))
    }
}

impl Sub<usize> for PointCursor {
    type Output = Self;

    fn sub(self, distance: usize) -> Self {
        Self::at(self.point, self.offset.saturating_sub(distance))
    }
}

impl AddAssign<usize> for PointCursor {
    fn add_assign(&mut self, distance: usize) {
        *self = *self + distance;
    }
}

impl SubAssign<usize> for PointCursor {
    fn sub_assign(&mut self, distance: usize) {
        *self = *self - distance;
    }
}

impl Iterator for PointCursor {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        if self.is_end() {
            return None;
        }
        Some(self.post_increment().get())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = POINT_SIZE - self.offset;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for PointCursor {}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW_POINT: &str =
        "000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f00000015";

    fn sample_point() -> Point {
        Point::factory_from_data(&hex::decode(RAW_POINT).unwrap())
    }

    #[test]
    fn test_new_not_at_end() {
        let cursor = PointCursor::new(Point::default());
        assert!(cursor.has_remaining());
        assert_eq!(cursor.offset(), 0);
    }

    #[test]
    fn test_end_is_end() {
        let cursor = PointCursor::end(Point::default());
        assert!(cursor.is_end());
        assert!(!cursor.has_remaining());
        assert_eq!(cursor.get(), 0);
    }

    #[test]
    fn test_walk_matches_serialization() {
        let source = hex::decode(RAW_POINT).unwrap();
        let mut cursor = PointCursor::new(sample_point());

        for expected in &source {
            assert!(cursor.has_remaining());
            assert_eq!(cursor.get(), *expected);
            assert_eq!(cursor.byte(), *expected);
            assert_eq!(cursor.value(), *expected);
            cursor.post_increment();
        }

        assert!(cursor.is_end());
        assert_eq!(cursor.get(), 0);
    }

    #[test]
    fn test_index_bytes_little_endian() {
        let point = Point::new([0; 32], 0x04030201);
        assert_eq!(PointCursor::at(point, 32).get(), 0x01);
        assert_eq!(PointCursor::at(point, 33).get(), 0x02);
        assert_eq!(PointCursor::at(point, 34).get(), 0x03);
        assert_eq!(PointCursor::at(point, 35).get(), 0x04);
    }

    #[test]
    fn test_post_increment_decrement_roundtrip() {
        let mut cursor = PointCursor::at(sample_point(), 5);
        let expected = cursor;

        let initial = cursor.post_increment();
        assert_ne!(cursor, expected);
        assert_eq!(initial, expected);

        let modified = cursor.post_decrement();
        assert_eq!(cursor, expected);
        assert_ne!(modified, expected);
    }

    #[test]
    fn test_pre_increment_decrement_roundtrip() {
        let mut cursor = PointCursor::at(sample_point(), 5);
        let expected = cursor;

        cursor.increment();
        assert_ne!(cursor, expected);

        cursor.decrement();
        assert_eq!(cursor, expected);
    }

    #[test]
    fn test_boundaries_are_idempotent() {
        let mut cursor = PointCursor::new(sample_point());
        cursor.decrement().decrement();
        assert_eq!(cursor.offset(), 0);

        let mut cursor = PointCursor::end(sample_point());
        cursor.increment().increment();
        assert_eq!(cursor.offset(), POINT_SIZE);
        assert_eq!(cursor.get(), 0);
    }

    #[test]
    fn test_at_clamps_past_end() {
        let cursor = PointCursor::at(sample_point(), 1000);
        assert_eq!(cursor, PointCursor::end(sample_point()));
    }

    #[test]
    fn test_arithmetic() {
        let cursor = PointCursor::at(sample_point(), 10);
        assert_eq!((cursor + 1) - 1, cursor);
        assert_eq!((cursor + 100).offset(), POINT_SIZE);
        assert_eq!((cursor - 100).offset(), 0);

        let mut moved = cursor;
        moved += 3;
        moved -= 1;
        assert_eq!(moved.offset(), 12);
    }

    #[test]
    fn test_different_points_not_equal() {
        let a = PointCursor::new(Point::new([1; 32], 0));
        let b = PointCursor::new(Point::new([2; 32], 0));
        assert_ne!(a, b);
    }

    #[test]
    fn test_iterator_collects_serialization() {
        let point = sample_point();
        let bytes: Vec<u8> = point.cursor().collect();
        assert_eq!(bytes, point.to_data());
        assert_eq!(point.cursor().len(), POINT_SIZE);
        assert_eq!(point.cursor_end().len(), 0);
    }
}
