//! Pagination limits for paged searches
//!
//! Deep pages are expensive for the engine; requests beyond these limits are
//! refused before any query is built.

use athome_core::ValidationError;

/// Largest accepted `offset`.
pub const MAX_OFFSET: i64 = 1000;

/// Largest accepted `size`.
pub const MAX_SIZE: i64 = 1000;

/// Largest accepted `offset + size`.
pub const MAX_WINDOW: i64 = 5000;

/// Check an `(offset, size)` pair against the paging limits.
///
/// Pure; performs no I/O.
pub fn check_params(offset: i64, size: i64) -> Result<(), ValidationError> {
    let out_of_range = offset.saturating_add(size) > MAX_WINDOW
        || size > MAX_SIZE
        || offset > MAX_OFFSET
        || offset < 0
        || size < 0;

    if out_of_range {
        return Err(ValidationError::PaginationOutOfRange { offset, size });
    }
    Ok(())
}

/// A validated page window. Only constructible through [`Page::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Page {
    offset: u32,
    size: u32,
}

impl Page {
    pub fn new(offset: i64, size: i64) -> Result<Self, ValidationError> {
        check_params(offset, size)?;
        // Both are within 0..=1000 after the check.
        Ok(Self {
            offset: offset as u32,
            size: size as u32,
        })
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn size(&self) -> u32 {
        self.size
    }
}
