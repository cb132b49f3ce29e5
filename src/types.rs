//! Core domain types for the code property graph.
//!
//! These mirror the logical schema written by the ingestion pipeline. The
//! JSON shapes produced by `Serialize` are the wire format of the HTTP API.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// NodeKind
// ---------------------------------------------------------------------------

/// Kind of a graph node. Unrecognised stored values map to [`NodeKind::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Function,
    Method,
    Class,
    Module,
    Package,
    Variable,
    Other,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Function => "function",
            Self::Method => "method",
            Self::Class => "class",
            Self::Module => "module",
            Self::Package => "package",
            Self::Variable => "variable",
            Self::Other => "other",
        }
    }

    /// Parse a stored kind. Never fails: anything unknown is `Other`.
    pub fn from_str_loose(s: &str) -> Self {
        match s {
            "function" | "func" => Self::Function,
            "method" => Self::Method,
            "class" | "struct" | "type" => Self::Class,
            "module" | "file" => Self::Module,
            "package" | "namespace" => Self::Package,
            "variable" | "var" | "const" => Self::Variable,
            _ => Self::Other,
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Node / edges / metrics
// ---------------------------------------------------------------------------

/// A code entity from the `nodes` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub name: String,
    pub kind: NodeKind,
    pub package: String,
    pub file: Option<String>,
    pub line: Option<i64>,
    pub end_line: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_info: Option<String>,
}

/// A directed call relationship between two nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CallEdge {
    pub source: String,
    pub target: String,
}

/// Static metrics precomputed for a function or method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionMetrics {
    pub cyclomatic_complexity: i64,
    pub fan_in: i64,
    pub fan_out: i64,
    pub loc: i64,
    pub num_params: i64,
}

/// Per-package totals from the package treemap view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSummary {
    pub package: String,
    pub function_count: i64,
    pub total_loc: i64,
    pub total_complexity: i64,
}

/// Aggregated call weight between two packages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageEdge {
    pub source: String,
    pub target: String,
    pub weight: i64,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("function", NodeKind::Function ; "function")]
    #[test_case("method", NodeKind::Method ; "method")]
    #[test_case("class", NodeKind::Class ; "class")]
    #[test_case("module", NodeKind::Module ; "module")]
    #[test_case("package", NodeKind::Package ; "package")]
    #[test_case("variable", NodeKind::Variable ; "variable")]
    #[test_case("macro", NodeKind::Other ; "unknown maps to other")]
    #[test_case("", NodeKind::Other ; "empty maps to other")]
    fn node_kind_from_stored_value(input: &str, expected: NodeKind) {
        assert_eq!(NodeKind::from_str_loose(input), expected);
    }

    #[test]
    fn node_kind_as_str_roundtrips() {
        for kind in [
            NodeKind::Function,
            NodeKind::Method,
            NodeKind::Class,
            NodeKind::Module,
            NodeKind::Package,
            NodeKind::Variable,
            NodeKind::Other,
        ] {
            assert_eq!(NodeKind::from_str_loose(kind.as_str()), kind);
            assert_eq!(kind.to_string(), kind.as_str());
        }
    }

    #[test]
    fn node_serializes_lowercase_kind_and_skips_missing_type_info() {
        let node = Node {
            id: "pkg/a.Foo".into(),
            name: "Foo".into(),
            kind: NodeKind::Method,
            package: "pkg/a".into(),
            file: None,
            line: Some(3),
            end_line: None,
            type_info: None,
        };
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["kind"], "method");
        assert!(json["file"].is_null());
        assert!(json.get("type_info").is_none());
    }
}
