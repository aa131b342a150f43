//! Label flattening and item tree construction
//!
//! Both traversals follow the same rules so that every tree node matches
//! exactly one label:
//! - a map contributes each key, followed by whatever its value contributes
//! - a list contributes nothing itself; its elements attach to the parent
//! - a scalar contributes its string form
//!
//! A label the participant picks from the tree can therefore be compared to
//! the drawn target by plain string equality.

use crate::nested::NestedValue;

/// Every label of a dataset in traversal order, duplicates included
pub type LabelList = Vec<String>;

/// A node of the item tree shown to the participant
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemNode {
    /// Text shown for this node (empty for the synthetic root)
    pub label: String,
    /// Child nodes in dataset order
    pub children: Vec<ItemNode>,
}

impl ItemNode {
    /// Create a node with no children
    pub fn leaf(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            children: Vec::new(),
        }
    }

    /// Number of nodes below this one (the node itself is not counted)
    pub fn descendant_count(&self) -> usize {
        self.children
            .iter()
            .map(|child| 1 + child.descendant_count())
            .sum()
    }

    /// Labels of all descendants in pre-order
    pub fn descendant_labels(&self) -> Vec<&str> {
        let mut out = Vec::with_capacity(self.descendant_count());
        Self::collect_labels(&self.children, &mut out);
        out
    }

    fn collect_labels<'a>(nodes: &'a [ItemNode], out: &mut Vec<&'a str>) {
        for node in nodes {
            out.push(node.label.as_str());
            Self::collect_labels(&node.children, out);
        }
    }
}

/// Flatten a dataset into the list of labels a target is drawn from
pub fn flatten_labels(value: &NestedValue) -> LabelList {
    let mut labels = Vec::new();
    push_labels(value, &mut labels);
    labels
}

fn push_labels(value: &NestedValue, labels: &mut LabelList) {
    match value {
        NestedValue::Map(entries) => {
            for (key, child) in entries {
                labels.push(key.clone());
                push_labels(child, labels);
            }
        }
        NestedValue::List(items) => {
            for item in items {
                push_labels(item, labels);
            }
        }
        NestedValue::Scalar(text) => labels.push(text.clone()),
    }
}

/// Build the item tree under a synthetic, unlabelled root
pub fn build_tree(value: &NestedValue) -> ItemNode {
    let mut root = ItemNode::default();
    attach(value, &mut root);
    root
}

fn attach(value: &NestedValue, parent: &mut ItemNode) {
    match value {
        NestedValue::Map(entries) => {
            for (key, child) in entries {
                let mut node = ItemNode::leaf(key.clone());
                attach(child, &mut node);
                parent.children.push(node);
            }
        }
        NestedValue::List(items) => {
            for item in items {
                attach(item, parent);
            }
        }
        NestedValue::Scalar(text) => parent.children.push(ItemNode::leaf(text.clone())),
    }
}
