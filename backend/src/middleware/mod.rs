//! Request middleware.
//!
//! Purpose: request lifecycle concerns — the failure boundary that owns
//! diagnostic scoping and failure-to-response translation.

pub mod boundary;

pub use boundary::FailureBoundary;
