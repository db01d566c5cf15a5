//! Storage Module
//!
//! Append-only flat-file storage: a data file of concatenated records plus a
//! text index of `key → (offset, length)`.
//!
//! ## Responsibilities
//! - Append records and emit a sorted index (`Writer`)
//! - Map data files and answer key/position lookups (`Reader`)
//! - Build and reuse the binary index cache on open
//!
//! ## File Pair
//! ```text
//! data file                              index file
//! ┌────────────────┬──┬───────────┬──┐   ┌────────────────────────┐
//! │ record 0 bytes │\0│ record 1  │\0│   │ 1\t0\t15\n             │
//! └────────────────┴──┴───────────┴──┘   │ 2\t15\t12\n            │
//! ▲ offset 0          ▲ offset 15        └────────────────────────┘
//!
//! index.cache.<mode>.<kind>   (binary, written by the first reader)
//! ```

mod reader;
mod region;
mod writer;

pub use reader::Reader;
pub use region::DataRegion;
pub use writer::Writer;
