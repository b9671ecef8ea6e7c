//! the [vhea (Horizontal Header)](https://docs.microsoft.com/en-us/typography/opentype/spec/hhea) table

use font_types::Tag;

/// 'vhea'
pub const TAG: Tag = Tag::new(b"vhea");
