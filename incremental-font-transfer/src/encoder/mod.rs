//! Compiles fonts and subset definitions into Incremental Font Transfer encodings.
//!
//! This is the server/build-time counterpart to the rest of this crate: given an original
//! font and a description of how it should be segmented, it produces an IFT encoded initial
//! font plus the glyph-keyed and table-keyed patches needed to incrementally extend it.
//!
//! See: <https://w3c.github.io/IFT/Overview.html>

use read_fonts::ReadError;

pub mod candidate_merge;
pub mod compiler;
pub mod condition;
pub mod dependency_graph;
pub mod format2;
pub mod freq;
pub mod glyph_keyed_encode;
pub mod glyph_segmentation;
pub mod ift_table;
pub mod jump_graph;
pub mod merge_strategy;
pub mod oracle;
pub mod patch;
pub mod patch_size_cache;
pub mod segment;
pub mod segmenter;
pub mod subset_definition;
pub mod table_keyed_encode;
pub mod url_template;

/// Errors produced while compiling an IFT encoding.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EncoderError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed precondition: {0}")]
    FailedPrecondition(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Unimplemented: {0}")]
    Unimplemented(String),
}

impl From<ReadError> for EncoderError {
    fn from(value: ReadError) -> Self {
        EncoderError::Internal(format!("{value}"))
    }
}

impl From<skera::SubsetError> for EncoderError {
    fn from(value: skera::SubsetError) -> Self {
        EncoderError::Internal(format!("{value}"))
    }
}

pub use compiler::{Compiler, Encoding};
pub use subset_definition::SubsetDefinition;
