//! adaptutor-store — durable progress records.
//!
//! `JsonFileStore` keeps one pretty-printed JSON document per
//! (learner, subject) pair under a root directory and implements the
//! versioned compare-and-swap contract of `ProgressStore`.

pub mod json_file;
pub mod layout;

pub use json_file::JsonFileStore;
