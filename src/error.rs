// src/error.rs
// Error type shared by every decode stage

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrcError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("WAVEDESC marker not found in the first 32 bytes")]
    HeaderNotFound,

    #[error("Unsupported template version: {0:?} (expected LECROY_2_3)")]
    UnsupportedTemplateVersion(String),

    #[error("Invalid COMM_ORDER code: {0}")]
    InvalidByteOrderCode(i16),

    #[error("{field} code {code} is out of range")]
    EnumOutOfRange { field: &'static str, code: i16 },

    #[error("Header length mismatch: WAVE_DESCRIPTOR declares {declared} bytes, decoded {consumed}")]
    HeaderLengthMismatch { declared: i32, consumed: u64 },

    #[error("{points} data points cannot be split evenly into {segments} segments")]
    UnevenSegmentSplit { points: i32, segments: i32 },

    #[error("Unexpected end of input: needed {needed} bytes at offset {offset}")]
    TruncatedInput { offset: u64, needed: u64 },

    #[error("{field} is not valid UTF-8")]
    InvalidText { field: &'static str },

    #[error("{field} is negative: {value}")]
    NegativeCount { field: &'static str, value: i32 },
}

pub type Result<T> = std::result::Result<T, TrcError>;
