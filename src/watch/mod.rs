// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Deciding which files are eligible (`filter`).
//! - Remembering each eligible file's last modification time (`index`).
//! - Re-scanning the tree on every poll and reporting modifications
//!   (`detector`).
//!
//! Detection is pure polling; it knows nothing about builds or processes.

pub mod detector;
pub mod filter;
pub mod index;
pub mod path_utils;

pub use detector::{ChangeDetector, ScanReport};
pub use filter::WatchFilter;
pub use index::{FileIndex, Observation};
