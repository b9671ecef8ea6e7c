//! The [hvar](https://learn.microsoft.com/en-us/typography/opentype/spec/hvar) table

include!("../../generated/generated_hvar.rs");

use super::variations::{DeltaSetIndexMap, ItemVariationStore};
