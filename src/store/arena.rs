//! Flat string arena backing the record table.
//!
//! Every string in a snapshot (keys, names, contact fields) is appended to a
//! single buffer and addressed by a [`Span`]. Rows therefore hold a handful
//! of integers instead of owning heap strings.

/// Byte range inside a [`StringArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: u32,
    pub len: u32,
}

impl Span {
    #[inline]
    pub fn end(&self) -> usize {
        self.start as usize + self.len as usize
    }
}

/// Append-only string storage
#[derive(Debug, Default)]
pub struct StringArena {
    buf: String,
}

impl StringArena {
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            buf: String::with_capacity(bytes),
        }
    }

    /// Append a string and return its span.
    /// Returns `None` once the arena would exceed `u32::MAX` bytes.
    pub fn push(&mut self, s: &str) -> Option<Span> {
        let start = u32::try_from(self.buf.len()).ok()?;
        let len = u32::try_from(s.len()).ok()?;
        start.checked_add(len)?;
        self.buf.push_str(s);
        Some(Span { start, len })
    }

    /// Resolve a span. Spans are only ever produced by `push` on the same
    /// arena, so they always fall on char boundaries.
    #[inline]
    pub fn get(&self, span: Span) -> &str {
        self.buf.get(span.start as usize..span.end()).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn shrink_to_fit(&mut self) {
        self.buf.shrink_to_fit();
    }
}
