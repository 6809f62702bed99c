use std::collections::HashMap;

use super::entity::{FieldLabelMapping, MerchantMapping};

/// Regroup flat mapping records by field name.
///
/// Groups appear in the order their field is first seen; within a group the
/// records keep their input order. Repeated placeholders are kept as
/// separate entries.
pub fn group_by_field<I>(records: I) -> Vec<FieldLabelMapping>
where
    I: IntoIterator<Item = MerchantMapping>,
{
    let mut groups: Vec<FieldLabelMapping> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records {
        let slot = *index.entry(record.field_name.clone()).or_insert_with(|| {
            groups.push(FieldLabelMapping::new(record.field_name.clone()));
            groups.len() - 1
        });

        groups[slot].mappings.push(record.label());
    }

    groups
}
