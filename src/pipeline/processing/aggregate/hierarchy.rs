use std::collections::HashMap;

use indexmap::IndexMap;
use tracing::debug;

use super::HierarchyNode;
use crate::constants::MISSING_PARENT;
use crate::pipeline::processing::normalize::{NormalizedDatasetRecord, RecordField};
use crate::types::GroupTable;

/// Count every value of `field` and bucket the counts under the groups of
/// `groups`, in table order. Values and groups with nothing to show are left out.
pub fn group_by_category_into_hierarchy(
    records: &[NormalizedDatasetRecord],
    groups: &GroupTable,
    field: RecordField,
) -> HierarchyNode {
    let mut field_counts: HashMap<String, u64> = HashMap::new();
    for record in records {
        for value in field.values(record) {
            *field_counts.entry(value).or_insert(0) += 1;
        }
    }

    let children = groups
        .iter()
        .filter_map(|(group_name, values)| {
            let leaves: Vec<HierarchyNode> = values
                .iter()
                .filter_map(|value| {
                    field_counts
                        .get(value)
                        .map(|count| HierarchyNode::leaf(value.clone(), *count))
                })
                .collect();
            (!leaves.is_empty()).then(|| HierarchyNode::branch(group_name.clone(), leaves))
        })
        .collect();

    HierarchyNode::branch(format!("{}_groups", field), children)
}

/// Two-level counts of `child` values under each `parent` value, both in
/// first-seen order. Records without a parent value count under
/// `MISSING_PARENT`.
pub fn count_by_parent_child(
    records: &[NormalizedDatasetRecord],
    parent: RecordField,
    child: RecordField,
) -> HierarchyNode {
    let mut mapping: IndexMap<String, IndexMap<String, u64>> = IndexMap::new();
    let mut missing = 0usize;

    for record in records {
        let parent_value = parent.scalar(record).unwrap_or_else(|| {
            missing += 1;
            MISSING_PARENT.to_string()
        });
        let children = mapping.entry(parent_value).or_default();
        for value in child.values(record) {
            *children.entry(value).or_insert(0) += 1;
        }
    }

    if missing > 0 {
        debug!(parent = %parent, missing, bucket = MISSING_PARENT, "Records without a parent value");
    }

    let children = mapping
        .into_iter()
        .map(|(parent_value, counts)| {
            let leaves = counts
                .into_iter()
                .map(|(name, count)| HierarchyNode::leaf(name, count))
                .collect();
            HierarchyNode::branch(parent_value, leaves)
        })
        .collect();

    HierarchyNode::branch(parent.as_str(), children)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::processing::normalize::{DefaultNormalizer, Normalizer};
    use serde_json::json;

    fn records() -> Vec<NormalizedDatasetRecord> {
        let raw = serde_json::from_value(json!({
            "1": {
                "Dataset Name": "a",
                "Task Categories": ["Question Answering", "Summarization"],
                "License Use (DataProvenance)": "commercial",
                "Inferred Metadata": {"Text Topics": ["Science", "News"]}
            },
            "2": {
                "Dataset Name": "b",
                "Task Categories": ["Question Answering", "Unlisted Task"],
                "License Use (DataProvenance)": "academic-only",
                "Inferred Metadata": {"Text Topics": ["Science"]}
            },
            "3": {
                "Dataset Name": "c",
                "Task Categories": ["Summarization"],
                "License Use (DataProvenance)": "commercial"
            },
            "4": {"Dataset Name": "d", "Task Categories": ["Question Answering"]}
        }))
        .unwrap();
        DefaultNormalizer::default().normalize(&raw)
    }

    fn task_groups() -> GroupTable {
        serde_json::from_value(json!({
            "Generation": ["Summarization", "Dialogue"],
            "Empty Group": ["Dialogue"],
            "Comprehension": ["Question Answering"]
        }))
        .unwrap()
    }

    #[test]
    fn test_group_hierarchy_follows_table_order() {
        let root = group_by_category_into_hierarchy(&records(), &task_groups(), RecordField::Tasks);

        assert_eq!(root.name, "tasks_groups");
        let names: Vec<&str> = root.children().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Generation", "Comprehension"]);

        let generation = root.child("Generation").unwrap();
        assert_eq!(generation.children().len(), 1);
        assert_eq!(generation.child("Summarization").unwrap().value, Some(2));
        assert_eq!(
            root.child("Comprehension").unwrap().child("Question Answering").unwrap().value,
            Some(3)
        );
    }

    #[test]
    fn test_group_hierarchy_totals_only_grouped_pairs() {
        let root = group_by_category_into_hierarchy(&records(), &task_groups(), RecordField::Tasks);

        // 5 (record, task) pairs with a grouped task; "Unlisted Task" is not counted
        assert_eq!(root.leaf_total(), 5);
        assert!(root.children().iter().all(|group| !group.children().is_empty()));
    }

    #[test]
    fn test_parent_child_counts() {
        let root = count_by_parent_child(
            &records(),
            RecordField::LicenseUseCategory,
            RecordField::TextTopics,
        );

        assert_eq!(root.name, "licenseUseCategory");
        let parents: Vec<&str> = root.children().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(parents, vec!["Commercial", "Non-Commercial/Academic", MISSING_PARENT]);

        // "d" has no license use but its tasks still count
        let tasks = count_by_parent_child(&records(), RecordField::LicenseUseCategory, RecordField::Tasks);
        let missing = tasks.child(MISSING_PARENT).unwrap();
        assert_eq!(missing.child("Question Answering").unwrap().value, Some(1));
        assert_eq!(tasks.leaf_total(), 6);

        let commercial = root.child("Commercial").unwrap();
        assert_eq!(commercial.child("Science").unwrap().value, Some(1));
        assert_eq!(commercial.child("News").unwrap().value, Some(1));

        let academic = root.child("Non-Commercial/Academic").unwrap();
        assert_eq!(academic.child("Science").unwrap().value, Some(1));
    }

    #[test]
    fn test_parent_without_children_is_kept() {
        let raw = serde_json::from_value(json!({
            "1": {"Dataset Name": "solo", "License Use (DataProvenance)": "unspecified"}
        }))
        .unwrap();
        let records = DefaultNormalizer::default().normalize(&raw);

        let root = count_by_parent_child(&records, RecordField::LicenseUseCategory, RecordField::TextTopics);

        let unspecified = root.child("Unspecified").unwrap();
        assert_eq!(unspecified.children, Some(Vec::new()));
    }
}
