// src/exec/mod.rs

//! Run execution layer.
//!
//! [`backend`] provides the `RunBackend` trait used by the watch runtime and
//! the production `SchedulerBackend`, which tests replace with a fake.

pub mod backend;

pub use backend::{RunBackend, SchedulerBackend};
