//! File actions.
//!
//! Removal of confirmed duplicates, either unlinked outright or moved to the
//! system trash.
//!
//! ```no_run
//! use doppelganger::actions::{delete_batch, DeleteConfig};
//! use std::path::PathBuf;
//!
//! let result = delete_batch(&[PathBuf::from("/data/b/y.jpg")], &DeleteConfig::trash());
//! println!("{}", result.summary());
//! ```

pub mod delete;

pub use delete::{
    delete_batch, delete_file, BatchDeleteResult, DeleteConfig, DeleteError, DeleteResult,
    RemovalOutcome, RemovalReport,
};
