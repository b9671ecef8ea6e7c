//! The Horizontal/Vertical Metrics tables.
//!
//! The [hmtx](https://docs.microsoft.com/en-us/typography/opentype/spec/hmtx)
//! and [vmtx](https://docs.microsoft.com/en-us/typography/opentype/spec/vmtx)
//! tables have the same structure and so we define them in the same module.

include!("../../generated/generated_hvmtx.rs");
