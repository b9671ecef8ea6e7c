//! The hmtx table

include!("../../generated/generated_hmtx.rs");
