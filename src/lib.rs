//! # ffdb
//!
//! A read-optimized, append-only indexed flat-file database:
//! - A writer that appends byte records to a data file and emits a sorted
//!   text index
//! - A reader that maps the data file and answers O(log n) key lookups
//! - A binary index cache so repeated opens skip text parsing
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────┐  write   ┌───────────────────────────────┐
//! │   Writer    │─────────▶│ data file  +  text index file │
//! └─────────────┘          └───────────────┬───────────────┘
//!                                          │ open
//!                          ┌───────────────▼───────────────┐
//!                          │            Reader             │
//!                          │  ┌────────────┐ ┌───────────┐ │
//!                          │  │ DataRegion │ │SortedIndex│ │
//!                          │  │  (mmap)    │ │ Vec/cache │ │
//!                          │  └────────────┘ └─────┬─────┘ │
//!                          └───────────────────────┼───────┘
//!                                                  ▼
//!                                   index.cache.<mode>.<kind>
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use ffdb::{DataFormat, Key, KeyKind, OpenMode, Reader, Writer};
//!
//! # fn main() -> ffdb::Result<()> {
//! let mut writer = Writer::create("db.data", "db.index", DataFormat::Ascii)?;
//! writer.write(Key::Int(3), b"aaa")?;
//! writer.write(Key::Int(1), b"bb")?;
//! writer.close()?;
//!
//! let reader = Reader::open("db.data", "db.index", OpenMode::USE_DATA, KeyKind::Int)?;
//! let pos = reader.lookup_id(&Key::Int(1))?;
//! assert_eq!(reader.get_data(pos)?, b"bb\0");
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod key;
pub mod index;
pub mod storage;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{FfdbError, Result};
pub use config::{Config, DataFormat, OpenMode};
pub use index::IndexEntry;
pub use key::{Key, KeyKind};
pub use storage::{Reader, Writer};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of ffdb
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
