//! Text and JSON rendering for the terminal front end
//!
//! Text output mirrors what the analysis window shows: the record table,
//! a histogram of times, and the two mean tables.

use crate::aggregate::{AggregateError, AggregateView, GroupMean};
use crate::result_store::SessionRecord;
use crate::tree::ItemNode;
use serde::Serialize;

/// Longest histogram bar, in characters
const BAR_WIDTH: usize = 40;

/// Indented outline of the tree below `root` (the root itself is not shown)
pub fn render_tree(root: &ItemNode) -> String {
    let mut out = String::new();
    for child in &root.children {
        write_node(child, 0, &mut out);
    }
    out
}

fn write_node(node: &ItemNode, depth: usize, out: &mut String) {
    out.push_str(&format!("{}{}\n", "  ".repeat(depth), node.label));
    for child in &node.children {
        write_node(child, depth + 1, out);
    }
}

/// Full text report; `view` is `Err` when there is nothing to aggregate
pub fn render_report(
    records: &[SessionRecord],
    view: Result<&AggregateView, &AggregateError>,
) -> String {
    let mut out = String::new();

    let view = match view {
        Ok(view) => view,
        Err(e) => {
            out.push_str(&format!("No data: {}\n", e));
            return out;
        }
    };

    out.push_str("=== Results ===\n");
    out.push_str(&format!(
        "{:<20} {:>10} {:<32} {}\n",
        "Teilnehmer_in", "Zeit", "Datensatz", "Eintrag"
    ));
    out.push_str(&format!("{}\n", "-".repeat(78)));
    for record in records {
        out.push_str(&format!(
            "{:<20} {:>10.2} {:<32} {}\n",
            record.participant, record.elapsed_seconds, record.dataset_id, record.target_label
        ));
    }

    out.push_str("\n=== Histogram of times (s) ===\n");
    let peak = view.histogram.iter().map(|b| b.count).max().unwrap_or(0);
    for bin in &view.histogram {
        let bar = if peak > 0 {
            bin.count * BAR_WIDTH / peak
        } else {
            0
        };
        out.push_str(&format!(
            "{:>10.2} | {:<width$} {}\n",
            bin.lower_bound,
            "#".repeat(bar),
            bin.count,
            width = BAR_WIDTH
        ));
    }

    out.push_str("\n=== Average time per dataset ===\n");
    write_means(&view.mean_by_dataset, &mut out);

    out.push_str("\n=== Average time per participant ===\n");
    write_means(&view.mean_by_participant, &mut out);

    out
}

fn write_means(groups: &[GroupMean], out: &mut String) {
    for group in groups {
        out.push_str(&format!(
            "{:<32} {:>10.2} s  ({} sessions)\n",
            group.key, group.mean_seconds, group.count
        ));
    }
}

/// Machine-readable analysis output
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub records: &'a [SessionRecord],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<&'a AggregateView>,
}

/// Pretty-printed JSON report
pub fn render_json(
    records: &[SessionRecord],
    view: Option<&AggregateView>,
) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonReport {
        records,
        summary: view,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nested::NestedValue;
    use crate::tree::build_tree;
    use serde_json::json;

    fn records() -> Vec<SessionRecord> {
        vec![
            SessionRecord {
                participant: "alice".to_string(),
                elapsed_seconds: 2.0,
                dataset_id: "fs.json".to_string(),
                target_label: "bin".to_string(),
            },
            SessionRecord {
                participant: "bob".to_string(),
                elapsed_seconds: 6.0,
                dataset_id: "fs.json".to_string(),
                target_label: "etc".to_string(),
            },
        ]
    }

    #[test]
    fn test_render_tree_indents_children() {
        let tree = build_tree(&NestedValue::from(json!({"a": {"b": "leaf1"}, "c": "leaf2"})));
        assert_eq!(render_tree(&tree), "a\n  b\n    leaf1\nc\n  leaf2\n");
    }

    #[test]
    fn test_render_report_sections() {
        let records = records();
        let view = AggregateView::compute(&records, 2).unwrap();
        let text = render_report(&records, Ok(&view));
        assert!(text.contains("Teilnehmer_in"));
        assert!(text.contains("alice"));
        assert!(text.contains("Histogram"));
        assert!(text.contains("Average time per dataset"));
        assert!(text.contains("4.00 s  (2 sessions)"));
    }

    #[test]
    fn test_render_report_placeholder() {
        let text = render_report(&[], Err(&AggregateError::EmptyInput));
        assert!(text.starts_with("No data"));
    }

    #[test]
    fn test_render_json() {
        let records = records();
        let view = AggregateView::compute(&records, 2).unwrap();
        let text = render_json(&records, Some(&view)).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["records"][0]["Teilnehmer_in"], "alice");
        assert_eq!(parsed["summary"]["mean_by_dataset"][0]["mean_seconds"], 4.0);

        let empty = render_json(&[], None).unwrap();
        assert!(!empty.contains("summary"));
    }
}
