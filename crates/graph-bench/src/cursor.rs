use std::ops::Range;

/// Write position of the incremental patching pass.
///
/// Hands out consecutive `batch`-sized ranges of a buffer of `capacity`
/// points until the next range would run past the end. A remainder shorter
/// than one batch is never handed out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchCursor {
    offset: u32,
    batch: u32,
    capacity: u32,
}

impl BatchCursor {
    pub fn new(capacity: u32, batch: u32) -> Self {
        Self {
            offset: 0,
            batch,
            capacity,
        }
    }

    /// Points overwritten so far.
    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn batch_size(&self) -> u32 {
        self.batch
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// The range the next patch would cover, or `None` once
    /// `offset + batch > capacity`. A zero batch never yields a range.
    pub fn peek(&self) -> Option<Range<u32>> {
        if self.batch == 0 {
            return None;
        }
        let end = self.offset.checked_add(self.batch)?;
        (end <= self.capacity).then_some(self.offset..end)
    }

    /// Returns the next range and moves past it.
    pub fn advance(&mut self) -> Option<Range<u32>> {
        let range = self.peek()?;
        self.offset = range.end;
        Some(range)
    }

    pub fn is_exhausted(&self) -> bool {
        self.peek().is_none()
    }

    /// Points past `offset` that have not been overwritten.
    ///
    /// Once exhausted this is `capacity % batch`.
    pub fn remaining(&self) -> u32 {
        self.capacity - self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(cursor: &mut BatchCursor) -> Vec<Range<u32>> {
        std::iter::from_fn(|| cursor.advance()).collect()
    }

    #[test]
    fn even_split_covers_whole_buffer() {
        let mut cursor = BatchCursor::new(16, 4);
        assert_eq!(drain(&mut cursor), vec![0..4, 4..8, 8..12, 12..16]);
        assert_eq!(cursor.offset(), 16);
        assert_eq!(cursor.remaining(), 0);
        assert!(cursor.is_exhausted());
    }

    #[test]
    fn uneven_split_leaves_tail() {
        let mut cursor = BatchCursor::new(10, 4);
        assert_eq!(drain(&mut cursor), vec![0..4, 4..8]);
        assert_eq!(cursor.offset(), 8);
        assert_eq!(cursor.remaining(), 2);
    }

    #[test]
    fn patch_count_is_floor_of_ratio() {
        for (capacity, batch) in [(1, 1), (7, 3), (100, 7), (4096, 64), (5, 9)] {
            let mut cursor = BatchCursor::new(capacity, batch);
            let ranges = drain(&mut cursor);
            assert_eq!(ranges.len() as u32, capacity / batch, "{capacity}/{batch}");
            assert_eq!(cursor.remaining(), capacity % batch, "{capacity}/{batch}");
        }
    }

    #[test]
    fn offset_advances_by_exactly_one_batch() {
        let mut cursor = BatchCursor::new(30, 6);
        let mut last = cursor.offset();
        while let Some(range) = cursor.advance() {
            assert_eq!(range.len(), 6);
            assert_eq!(cursor.offset(), last + 6);
            assert!(cursor.offset() <= cursor.capacity());
            last = cursor.offset();
        }
    }

    #[test]
    fn peek_does_not_move() {
        let cursor = BatchCursor::new(8, 4);
        assert_eq!(cursor.peek(), Some(0..4));
        assert_eq!(cursor.peek(), Some(0..4));
        assert_eq!(cursor.offset(), 0);
    }

    #[test]
    fn zero_batch_never_patches() {
        let mut cursor = BatchCursor::new(8, 0);
        assert_eq!(cursor.advance(), None);
        assert_eq!(cursor.remaining(), 8);
    }

    #[test]
    fn overflowing_end_stops_instead_of_wrapping() {
        let mut cursor = BatchCursor::new(u32::MAX, u32::MAX - 1);
        assert_eq!(cursor.advance(), Some(0..u32::MAX - 1));
        assert_eq!(cursor.advance(), None);
        assert_eq!(cursor.remaining(), 1);
    }
}
