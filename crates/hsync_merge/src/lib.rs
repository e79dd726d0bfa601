//! # hsync Merge
//!
//! Best-effort three-way text merge.
//!
//! This crate provides:
//! - [`MergePrimitive`]: "make an edit script from A to B" and "apply an edit
//!   script to C"
//! - [`TextPatcher`]: a character-level, context-matching implementation
//! - [`MergeEngine`]: the three-way operation the server runs on every push
//!
//! ## Failure Semantics
//!
//! Merging never fails. When part of an edit script cannot find its context in
//! the target, that part is dropped and the rest is applied. Callers get no
//! signal that this happened: a lossy merge and a clean merge look the same.
//!
//! ## Example
//!
//! ```rust
//! use hsync_merge::MergeEngine;
//!
//! let engine = MergeEngine::new();
//! let merged = engine.three_way("X", "X changed by B", "X changed by A");
//! assert!(merged.contains("changed by B"));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod engine;
mod patch;

pub use engine::MergeEngine;
pub use patch::{Hunk, MergePrimitive, Patch, PatchOutcome, TextPatcher};
