//! Pagination module
//!
//! Offset pagination within a modification-date window, with re-anchoring
//! of the window when the offset can no longer be trusted.
//!
//! # Overview
//!
//! Every request carries `cursor`, `limit`, `sort_field` and, when the window
//! has a bound, a JSON-encoded `constraints` list. After each page
//! [`WindowCursor::advance`] either bumps the cursor, narrows the window, or
//! reports that the server has nothing left.

mod types;
mod window;

pub use types::{
    Advance, ApiEnvelope, Constraint, ConstraintType, DateWindow, PageResponse, PaginationConfig,
    DEFAULT_PAGE_LIMIT, MODIFIED_DATE_FIELD,
};
pub use window::WindowCursor;
