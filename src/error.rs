//! Small shared error building blocks used by the workflow patterns.

use std::fmt;

/// Boxed-error cause standing in for "cancellation was observed" wherever a
/// pattern needs a concrete `cause` value rather than a bespoke variant
/// (spec.md §5, "Cancellation": cancellation always surfaces as the cause
/// inside a component-specific wrapper, never its own top-level error type).
#[derive(Debug, Clone, Copy, Default)]
pub struct Cancelled;

impl fmt::Display for Cancelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("operation was cancelled")
    }
}

impl std::error::Error for Cancelled {}
