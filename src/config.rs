//! Configuration for ffdb
//!
//! Centralized configuration with sensible defaults, plus the small value
//! types (open mode flags, data format) shared by readers and writers.

use std::ops::BitOr;

use crate::error::{FfdbError, Result};
use crate::key::KeyKind;

/// Configuration for opening readers and creating writers
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Reader Configuration
    // -------------------------------------------------------------------------
    /// Key variant stored in the index. Writers ignore this and take the kind
    /// of the first key written.
    pub key_kind: KeyKind,

    /// Which parts of the file pair a reader maps
    pub mode: OpenMode,

    /// Whether readers load and persist the binary index cache
    pub cache_enabled: bool,

    // -------------------------------------------------------------------------
    // Writer Configuration
    // -------------------------------------------------------------------------
    /// Record storage format
    pub format: DataFormat,

    /// Capacity of the buffered writers (in bytes)
    pub write_buffer_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            key_kind: KeyKind::Int,
            mode: OpenMode::USE_DATA,
            cache_enabled: true,
            format: DataFormat::Ascii,
            write_buffer_size: 1024 * 1024, // 1 MB
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the key variant readers expect
    pub fn key_kind(mut self, kind: KeyKind) -> Self {
        self.config.key_kind = kind;
        self
    }

    /// Set the reader open mode
    pub fn mode(mut self, mode: OpenMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Enable or disable the binary index cache
    pub fn cache_enabled(mut self, enabled: bool) -> Self {
        self.config.cache_enabled = enabled;
        self
    }

    /// Set the writer data format
    pub fn format(mut self, format: DataFormat) -> Self {
        self.config.format = format;
        self
    }

    /// Set the writer buffer capacity (in bytes)
    pub fn write_buffer_size(mut self, size: usize) -> Self {
        self.config.write_buffer_size = size;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

// =============================================================================
// Open Mode
// =============================================================================

/// Reader mode flags
///
/// `USE_WRITABLE` only has an effect together with `USE_DATA`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OpenMode(u32);

impl OpenMode {
    /// Load the index only; data access fails with a mode error
    pub const INDEX_ONLY: OpenMode = OpenMode(0);

    /// Map the data file
    pub const USE_DATA: OpenMode = OpenMode(1);

    /// Map the data file privately writable (copy-on-write)
    pub const USE_WRITABLE: OpenMode = OpenMode(2);

    const ALL: u32 = Self::USE_DATA.0 | Self::USE_WRITABLE.0;

    /// Build a mode from raw flag bits, rejecting unknown bits
    pub fn from_bits(bits: u32) -> Result<Self> {
        if bits & !Self::ALL != 0 {
            return Err(FfdbError::Mode(format!("unknown mode flags {:#x}", bits)));
        }
        Ok(OpenMode(bits))
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: OpenMode) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for OpenMode {
    type Output = OpenMode;

    fn bitor(self, rhs: OpenMode) -> OpenMode {
        OpenMode(self.0 | rhs.0)
    }
}

// =============================================================================
// Data Format
// =============================================================================

/// How records are stored in the data file
///
/// Both formats store the caller's bytes verbatim; the distinction is kept
/// for callers that pass numeric format codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataFormat {
    #[default]
    Ascii,
    Binary,
}

impl DataFormat {
    /// Map a numeric format code (0 = ascii, 1 = binary)
    pub fn from_code(code: i32) -> Result<Self> {
        match code {
            0 => Ok(DataFormat::Ascii),
            1 => Ok(DataFormat::Binary),
            other => Err(FfdbError::Mode(format!("no data format with code {}", other))),
        }
    }

    pub fn code(self) -> i32 {
        match self {
            DataFormat::Ascii => 0,
            DataFormat::Binary => 1,
        }
    }
}
