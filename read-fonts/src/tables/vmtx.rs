//! The [vmtx (Vertical Metrics)](https://docs.microsoft.com/en-us/typography/opentype/spec/vmtx) table

use font_types::Tag;

/// 'vmtx'
pub const TAG: Tag = Tag::new(b"vmtx");
