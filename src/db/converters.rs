//! Row → domain type conversions.
//!
//! Columns are read by name so callers may select them in any order and
//! with table prefixes (`n.id` still surfaces as `id`).

use rusqlite::types::Value;
use rusqlite::Row;

use crate::types::{FunctionMetrics, Node, NodeKind, PackageEdge, PackageSummary};

/// Column list matching [`row_to_node`], for unprefixed `nodes` selects.
pub const NODE_COLUMNS: &str = "id, name, kind, package, file, line, end_line, type_info";

/// Same as [`NODE_COLUMNS`] but prefixed with the `n` table alias.
pub const NODE_COLUMNS_N: &str =
    "n.id, n.name, n.kind, n.package, n.file, n.line, n.end_line, n.type_info";

pub fn row_to_node(row: &Row<'_>) -> rusqlite::Result<Node> {
    let kind: String = row.get("kind")?;
    let package: Option<String> = row.get("package")?;
    Ok(Node {
        id: row.get("id")?,
        name: row.get("name")?,
        kind: NodeKind::from_str_loose(&kind),
        package: package.unwrap_or_default(),
        file: row.get("file")?,
        line: row.get("line")?,
        end_line: row.get("end_line")?,
        type_info: row.get("type_info")?,
    })
}

/// Metrics from a `LEFT JOIN metrics`; `None` when the join found no row.
pub fn row_to_metrics(row: &Row<'_>) -> rusqlite::Result<Option<FunctionMetrics>> {
    let complexity: Option<i64> = row.get("cyclomatic_complexity")?;
    let Some(cyclomatic_complexity) = complexity else {
        return Ok(None);
    };
    Ok(Some(FunctionMetrics {
        cyclomatic_complexity,
        fan_in: row.get::<_, Option<i64>>("fan_in")?.unwrap_or(0),
        fan_out: row.get::<_, Option<i64>>("fan_out")?.unwrap_or(0),
        loc: row.get::<_, Option<i64>>("loc")?.unwrap_or(0),
        num_params: row.get::<_, Option<i64>>("num_params")?.unwrap_or(0),
    }))
}

pub fn row_to_package_summary(row: &Row<'_>) -> rusqlite::Result<PackageSummary> {
    Ok(PackageSummary {
        package: row.get("package")?,
        function_count: row.get("function_count")?,
        total_loc: row.get("total_loc")?,
        total_complexity: row.get("total_complexity")?,
    })
}

pub fn row_to_package_edge(row: &Row<'_>) -> rusqlite::Result<PackageEdge> {
    Ok(PackageEdge {
        source: row.get("source")?,
        target: row.get("target")?,
        weight: row.get("weight")?,
    })
}

/// Convert a dynamically typed SQLite value into JSON, preserving its type.
pub fn sql_value_to_json(value: Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Integer(i) => serde_json::Value::from(i),
        Value::Real(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Text(s) => serde_json::Value::String(s),
        Value::Blob(b) => serde_json::Value::String(String::from_utf8_lossy(&b).into_owned()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::apply_schema;
    use rusqlite::Connection;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn row_to_node_reads_prefixed_columns() {
        let conn = setup();
        conn.execute(
            "INSERT INTO nodes VALUES ('pkg/a.Foo', 'method', 'Foo', 'pkg/a', 'a.go', 10, 20, 'func()')",
            [],
        )
        .unwrap();
        let sql = format!("SELECT {NODE_COLUMNS_N} FROM nodes n WHERE n.id = 'pkg/a.Foo'");
        let node = conn.query_row(&sql, [], row_to_node).unwrap();
        assert_eq!(node.id, "pkg/a.Foo");
        assert_eq!(node.kind, NodeKind::Method);
        assert_eq!(node.package, "pkg/a");
        assert_eq!(node.file.as_deref(), Some("a.go"));
        assert_eq!(node.line, Some(10));
        assert_eq!(node.end_line, Some(20));
        assert_eq!(node.type_info.as_deref(), Some("func()"));
    }

    #[test]
    fn row_to_node_maps_unknown_kind_to_other() {
        let conn = setup();
        conn.execute(
            "INSERT INTO nodes (id, kind, name, package) VALUES ('x', 'lambda', 'x', 'p')",
            [],
        )
        .unwrap();
        let sql = format!("SELECT {NODE_COLUMNS} FROM nodes");
        let node = conn.query_row(&sql, [], row_to_node).unwrap();
        assert_eq!(node.kind, NodeKind::Other);
    }

    #[test]
    fn row_to_metrics_is_none_without_joined_row() {
        let conn = setup();
        conn.execute(
            "INSERT INTO nodes (id, kind, name, package) VALUES ('f', 'function', 'f', 'p')",
            [],
        )
        .unwrap();
        let metrics = conn
            .query_row(
                "SELECT m.* FROM nodes n LEFT JOIN metrics m ON m.function_id = n.id",
                [],
                row_to_metrics,
            )
            .unwrap();
        assert!(metrics.is_none());
    }

    #[test]
    fn row_to_metrics_reads_joined_row() {
        let conn = setup();
        conn.execute(
            "INSERT INTO nodes (id, kind, name, package) VALUES ('f', 'function', 'f', 'p')",
            [],
        )
        .unwrap();
        conn.execute("INSERT INTO metrics VALUES ('f', 7, 2, 3, 40, 1)", [])
            .unwrap();
        let metrics = conn
            .query_row(
                "SELECT m.* FROM nodes n LEFT JOIN metrics m ON m.function_id = n.id",
                [],
                row_to_metrics,
            )
            .unwrap()
            .expect("metrics row");
        assert_eq!(metrics.cyclomatic_complexity, 7);
        assert_eq!(metrics.fan_in, 2);
        assert_eq!(metrics.fan_out, 3);
        assert_eq!(metrics.loc, 40);
        assert_eq!(metrics.num_params, 1);
    }

    #[test]
    fn sql_values_keep_their_type() {
        assert_eq!(sql_value_to_json(Value::Integer(42)), serde_json::json!(42));
        assert_eq!(sql_value_to_json(Value::Real(1.5)), serde_json::json!(1.5));
        assert_eq!(
            sql_value_to_json(Value::Text("go".into())),
            serde_json::json!("go")
        );
        assert!(sql_value_to_json(Value::Null).is_null());
        assert!(sql_value_to_json(Value::Real(f64::NAN)).is_null());
    }
}
