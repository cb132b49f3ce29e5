//! Source text and detail lookups for a single node.

use rusqlite::params;
use serde::Serialize;

use crate::db::converters::{row_to_metrics, row_to_node, NODE_COLUMNS_N};
use crate::db::store::{query_opt, GraphStore};
use crate::error::{CpgError, Result};
use crate::graph::{require_id, require_node};
use crate::types::{FunctionMetrics, Node};

const SOURCE_CONTENT_SQL: &str = "SELECT content FROM sources WHERE file = ?1";

/// The declaration's lines plus the whole file.
///
/// `source` is `None` when the node has no file or the file text is not
/// stored; `file` is reported whenever the node names one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceSlice {
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_line: Option<i64>,
    #[serde(rename = "fullSource", skip_serializing_if = "Option::is_none")]
    pub full_source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeDetail {
    #[serde(flatten)]
    pub node: Node,
    pub metrics: Option<FunctionMetrics>,
}

/// Lines `line..=end_line` (1-indexed) of `content`, clamped to its length.
///
/// Returns the whole text unless both bounds are positive.
pub fn slice_lines(content: &str, line: Option<i64>, end_line: Option<i64>) -> String {
    match (line, end_line) {
        (Some(start), Some(end)) if start > 0 && end > 0 => {
            let lines: Vec<&str> = content.split('\n').collect();
            let from = usize::try_from(start - 1).unwrap_or(0).min(lines.len());
            let to = usize::try_from(end).unwrap_or(0).min(lines.len());
            if from >= to {
                return String::new();
            }
            lines[from..to].join("\n")
        }
        _ => content.to_string(),
    }
}

pub fn source_slice(store: &GraphStore, id: &str) -> Result<SourceSlice> {
    let id = require_id(id)?;
    store.with_connection(|conn| {
        let node = require_node(conn, id)?;
        let Some(file) = node.file else {
            return Ok(SourceSlice::default());
        };

        let content: Option<String> =
            query_opt(conn, SOURCE_CONTENT_SQL, params![file], |row| row.get(0))?;
        let Some(content) = content else {
            tracing::debug!(id, %file, "no stored source for file");
            return Ok(SourceSlice {
                file: Some(file),
                ..SourceSlice::default()
            });
        };

        Ok(SourceSlice {
            source: Some(slice_lines(&content, node.line, node.end_line)),
            file: Some(file),
            line: node.line,
            end_line: node.end_line,
            full_source: Some(content),
        })
    })
}

/// The node with its metrics, if any were computed for it.
pub fn node_detail(store: &GraphStore, id: &str) -> Result<NodeDetail> {
    let id = require_id(id)?;
    let sql = format!(
        "SELECT {NODE_COLUMNS_N}, m.cyclomatic_complexity, m.fan_in, m.fan_out, m.loc, m.num_params \
         FROM nodes n LEFT JOIN metrics m ON m.function_id = n.id \
         WHERE n.id = ?1"
    );
    store
        .query_one(&sql, params![id], |row| {
            Ok(NodeDetail {
                node: row_to_node(row)?,
                metrics: row_to_metrics(row)?,
            })
        })?
        .ok_or_else(|| CpgError::NotFound(format!("node {id}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const TEXT: &str = "l1\nl2\nl3\nl4\nl5";

    #[test_case(Some(2), Some(3), "l2\nl3" ; "inner range")]
    #[test_case(Some(1), Some(1), "l1" ; "single line")]
    #[test_case(Some(4), Some(99), "l4\nl5" ; "end clamped to file")]
    #[test_case(Some(9), Some(12), "" ; "start past end of file")]
    #[test_case(Some(0), Some(3), TEXT ; "zero start means whole file")]
    #[test_case(None, Some(3), TEXT ; "missing start means whole file")]
    #[test_case(Some(2), None, TEXT ; "missing end means whole file")]
    #[test_case(Some(4), Some(2), "" ; "inverted range is empty")]
    fn slicing(line: Option<i64>, end_line: Option<i64>, expected: &str) {
        assert_eq!(slice_lines(TEXT, line, end_line), expected);
    }

    #[test]
    fn missing_file_serializes_as_null_source_only() {
        let json = serde_json::to_value(SourceSlice::default()).unwrap();
        assert_eq!(json, serde_json::json!({ "source": null }));
    }

    #[test]
    fn detail_nests_metrics() {
        let detail = NodeDetail {
            node: Node {
                id: "p.f".into(),
                name: "f".into(),
                kind: crate::types::NodeKind::Function,
                package: "p".into(),
                file: None,
                line: None,
                end_line: None,
                type_info: None,
            },
            metrics: None,
        };
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["id"], "p.f");
        assert!(json["metrics"].is_null());
    }
}
