//! Field label mappings

mod entity;
mod grouping;

pub use entity::{
    validate_mapping, BulkAck, BulkDeleteAck, FieldLabelMapping, LabelMapping, MerchantMapping,
};
pub use grouping::group_by_field;
