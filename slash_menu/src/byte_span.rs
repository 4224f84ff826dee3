use std::{marker::PhantomData, ops::Range};

/// Ordered byte span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ByteSpan {
    pub start: usize,
    pub end: usize,
    marker: PhantomData<()>,
}

impl ByteSpan {
    pub fn new(start: usize, end: usize) -> Self {
        let (start, end) = if start <= end {
            (start, end)
        } else {
            (end, start)
        };

        Self {
            start,
            end,
            marker: PhantomData,
        }
    }

    pub fn caret(pos: usize) -> Self {
        Self::new(pos, pos)
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(self) -> bool {
        self.end == self.start
    }

    pub fn unordered(&self) -> UnOrderedByteSpan {
        UnOrderedByteSpan::new(self.start, self.end)
    }
}

/// Byte span that remembers the selection direction, `end` is where the caret is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnOrderedByteSpan {
    pub start: usize,
    pub end: usize,
    marker: PhantomData<()>,
}

impl UnOrderedByteSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            marker: PhantomData,
        }
    }

    pub fn ordered(&self) -> ByteSpan {
        ByteSpan::new(self.start, self.end)
    }

    pub fn is_reversed(&self) -> bool {
        self.start > self.end
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum RangeRelation {
    Before,
    After,
    StartInside,
    EndInside,
    Inside,
    Contains,
    Equal,
}

impl ByteSpan {
    pub fn relative_to(&self, other: Self) -> RangeRelation {
        let (s_start, s_end) = (self.start, self.end);
        let (other_start, other_end) = (other.start, other.end);

        if s_start == other_start && s_end == other_end && !self.is_empty() {
            RangeRelation::Equal
        } else if s_end <= other_start {
            RangeRelation::Before
        } else if s_start >= other_end {
            RangeRelation::After
        } else if s_start >= other_start && s_end <= other_end {
            RangeRelation::Inside
        } else if s_start <= other_start && s_end >= other_end {
            RangeRelation::Contains
        }
        // note strict comparison here, due to range being not inclusive
        else if s_start < other_start {
            RangeRelation::EndInside
        } else {
            RangeRelation::StartInside
        }
    }
}
