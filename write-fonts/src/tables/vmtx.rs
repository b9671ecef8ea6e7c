//! The [vmtx (Vertical Metrics)](https://docs.microsoft.com/en-us/typography/opentype/spec/vmtx) table

pub use super::hmtx::LongMetric;

include!("../../generated/generated_vmtx.rs");
