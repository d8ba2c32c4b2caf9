//! Personal finance tracker library.
//!
//! Records income and expense entries, persists them as a single document,
//! and derives month views, totals, savings rate and grouped series from
//! them. [`tracker::Tracker`] ties the pieces together; the lower-level
//! modules can also be used directly.

extern crate alloc;

pub mod error;
pub mod export;
pub mod filter;
pub mod models;
pub mod repository;
pub mod storage;
pub mod summary;
pub mod tracker;
