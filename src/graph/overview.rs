//! Passthrough of the precomputed dashboard views.

use rusqlite::types::Value;
use serde::Serialize;

use crate::db::converters::sql_value_to_json;
use crate::db::store::{query_rows, GraphStore};
use crate::error::Result;

/// Number of hotspots returned.
pub const MAX_HOTSPOTS: usize = 20;

const STATS_SQL: &str = "SELECT key, value FROM dashboard_overview";

const HOTSPOTS_SQL: &str = "\
SELECT function_id, name, package, hotspot_score, complexity, fan_in, fan_out, loc
FROM dashboard_hotspots
ORDER BY hotspot_score DESC, function_id
LIMIT ?1";

const NODE_DISTRIBUTION_SQL: &str = "\
SELECT node_kind AS kind, count
FROM dashboard_node_distribution
ORDER BY count DESC, kind";

const EDGE_DISTRIBUTION_SQL: &str = "\
SELECT edge_kind AS kind, count
FROM dashboard_edge_distribution
ORDER BY count DESC, kind";

/// One summary statistic; `value` keeps its stored type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stat {
    pub key: String,
    pub value: serde_json::Value,
}

/// A ranked hotspot row. Apart from the id every column keeps its stored
/// type, so a REAL complexity or a NULL package passes through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hotspot {
    pub function_id: String,
    pub name: serde_json::Value,
    pub package: serde_json::Value,
    pub hotspot_score: serde_json::Value,
    pub complexity: serde_json::Value,
    pub fan_in: serde_json::Value,
    pub fan_out: serde_json::Value,
    pub loc: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KindCount {
    pub kind: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub stats: Vec<Stat>,
    pub hotspots: Vec<Hotspot>,
    #[serde(rename = "nodeDistribution")]
    pub node_distribution: Vec<KindCount>,
    #[serde(rename = "edgeDistribution")]
    pub edge_distribution: Vec<KindCount>,
}

fn row_to_kind_count(row: &rusqlite::Row<'_>) -> rusqlite::Result<KindCount> {
    Ok(KindCount {
        kind: row.get("kind")?,
        count: row.get("count")?,
    })
}

fn row_to_hotspot(row: &rusqlite::Row<'_>) -> rusqlite::Result<Hotspot> {
    let column = |name: &str| -> rusqlite::Result<serde_json::Value> {
        Ok(sql_value_to_json(row.get::<_, Value>(name)?))
    };
    Ok(Hotspot {
        function_id: row.get("function_id")?,
        name: column("name")?,
        package: column("package")?,
        hotspot_score: column("hotspot_score")?,
        complexity: column("complexity")?,
        fan_in: column("fan_in")?,
        fan_out: column("fan_out")?,
        loc: column("loc")?,
    })
}

pub fn overview(store: &GraphStore) -> Result<Overview> {
    store.with_connection(|conn| {
        let stats = query_rows(conn, STATS_SQL, [], |row| {
            Ok(Stat {
                key: row.get("key")?,
                value: sql_value_to_json(row.get::<_, Value>("value")?),
            })
        })?;

        let hotspots = query_rows(conn, HOTSPOTS_SQL, [MAX_HOTSPOTS as i64], row_to_hotspot)?;

        let node_distribution = query_rows(conn, NODE_DISTRIBUTION_SQL, [], row_to_kind_count)?;
        let edge_distribution = query_rows(conn, EDGE_DISTRIBUTION_SQL, [], row_to_kind_count)?;

        Ok(Overview {
            stats,
            hotspots,
            node_distribution,
            edge_distribution,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overview_uses_camel_case_distribution_keys() {
        let overview = Overview {
            stats: vec![Stat {
                key: "total_functions".into(),
                value: serde_json::json!(12),
            }],
            hotspots: Vec::new(),
            node_distribution: vec![KindCount {
                kind: "function".into(),
                count: 12,
            }],
            edge_distribution: Vec::new(),
        };
        let json = serde_json::to_value(&overview).unwrap();
        assert_eq!(json["nodeDistribution"][0]["kind"], "function");
        assert!(json["edgeDistribution"].as_array().unwrap().is_empty());
        assert_eq!(json["stats"][0]["value"], 12);
    }

    #[test]
    fn hotspot_columns_keep_stored_types() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE h (function_id TEXT, name TEXT, package TEXT, hotspot_score REAL,
                             complexity, fan_in, fan_out, loc);
             INSERT INTO h VALUES ('p.f', 'f', NULL, 3.5, 7.25, 2, 1, '40');",
        )
        .unwrap();
        let hotspot = conn
            .query_row("SELECT * FROM h", [], row_to_hotspot)
            .unwrap();
        assert_eq!(hotspot.function_id, "p.f");
        assert_eq!(hotspot.package, serde_json::Value::Null);
        assert_eq!(hotspot.complexity, serde_json::json!(7.25));
        assert_eq!(hotspot.fan_in, serde_json::json!(2));
        assert_eq!(hotspot.loc, serde_json::json!("40"));
    }
}
