// src/error.rs

use thiserror::Error;

/// Errors surfaced by the kernel subsystem.
///
/// Only `Config` ever reaches the caller of the cache entry point; cache I/O
/// and decode problems are recovered internally by recomputing the kernel.
#[derive(Debug, Error)]
pub enum KernelError {
    /// Fatal configuration problem. No sensible kernel can be computed.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O failure while reading or writing a cache entry.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A cache entry decompressed to the wrong number of bytes for the
    /// padded grid it claims to describe. The entry is treated as corrupt.
    #[error("cache entry has wrong payload size: expected {expected} bytes, got {got}")]
    SizeMismatch { expected: usize, got: usize },
}

pub type Result<T> = std::result::Result<T, KernelError>;
