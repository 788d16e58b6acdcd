//! Chart-ready aggregations over normalized records and the raw registry

use serde::{Deserialize, Serialize};

pub mod geo;
pub mod hierarchy;
pub mod summary;
pub mod text_metrics;
pub mod tree;

pub use geo::{creator_map, language_map, LanguageGeography, WorldAtlas, WorldMap};
pub use hierarchy::{count_by_parent_child, group_by_category_into_hierarchy};
pub use summary::{
    collection_table, compute_summary_metrics, inspect_dataset, CollectionRow, DatasetInspection,
    SummaryMetrics,
};
pub use text_metrics::{text_metric_scatter, ScatterPoint, ScatterSeries};
pub use tree::{source_tree, SourceTree};

/// Node in the shape `d3.hierarchy` consumes: leaves carry `value`, inner
/// nodes carry `children`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyNode {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<HierarchyNode>>,
}

impl HierarchyNode {
    pub fn leaf(name: impl Into<String>, value: u64) -> Self {
        Self {
            name: name.into(),
            value: Some(value),
            children: None,
        }
    }

    pub fn branch(name: impl Into<String>, children: Vec<HierarchyNode>) -> Self {
        Self {
            name: name.into(),
            value: None,
            children: Some(children),
        }
    }

    pub fn children(&self) -> &[HierarchyNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    pub fn child(&self, name: &str) -> Option<&HierarchyNode> {
        self.children().iter().find(|c| c.name == name)
    }

    /// Sum of every leaf value below this node
    pub fn leaf_total(&self) -> u64 {
        match &self.children {
            Some(children) => children.iter().map(HierarchyNode::leaf_total).sum(),
            None => self.value.unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serializes_like_d3_hierarchy() {
        let node = HierarchyNode::branch(
            "tasks_groups",
            vec![HierarchyNode::branch("QA", vec![HierarchyNode::leaf("Extractive", 3)])],
        );

        assert_eq!(
            serde_json::to_value(&node).unwrap(),
            json!({
                "name": "tasks_groups",
                "children": [{"name": "QA", "children": [{"name": "Extractive", "value": 3}]}]
            })
        );
        assert_eq!(node.leaf_total(), 3);
    }

    #[test]
    fn test_empty_branch_keeps_children_array() {
        let node = HierarchyNode::branch("Commercial", Vec::new());
        assert_eq!(
            serde_json::to_value(&node).unwrap(),
            json!({"name": "Commercial", "children": []})
        );
    }
}
