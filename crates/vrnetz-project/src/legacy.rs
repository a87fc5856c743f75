//! Migration of the single-layout node format.
//!
//! Older VRNetz files carry one layout per node as a nested list:
//!
//! ```json
//! {"id": 1, "layouts": [{"p": [x, y, z], "c": [r, g, b], "s": 12.0}]}
//! ```
//!
//! Migration rewrites each such row into flat columns:
//! - `cy_pos`: the position, min-max normalized over x/y, with `z = 0`
//! - `size`: the size divided by the largest size in the table
//! - `cy_col`: the RGB color plus an alpha of `floor(255 * size)`
//!
//! and removes the nested `layouts` field. Rows without it are untouched, so
//! a migrated table migrates to itself.

use serde_json::{json, Value};
use vrnetz_layout::normalize::normalize_points;
use vrnetz_layout::Point3;
use vrnetz_network::table::cell_f64;
use vrnetz_network::Row;

use crate::error::ProjectError;

pub const LEGACY_LAYOUTS: &str = "layouts";
pub const CY_POS: &str = "cy_pos";
pub const CY_COL: &str = "cy_col";
pub const SIZE: &str = "size";

struct LegacyLayout {
    row: usize,
    position: Point3,
    rgb: [u8; 3],
    size: f64,
}

pub fn has_legacy_layout(nodes: &[Row]) -> bool {
    nodes.iter().any(|row| row.contains_key(LEGACY_LAYOUTS))
}

fn numbers(value: Option<&Value>) -> Option<Vec<f64>> {
    value?.as_array()?.iter().map(cell_f64).collect()
}

fn extract(row_idx: usize, value: &Value) -> Result<LegacyLayout, ProjectError> {
    let invalid = |reason: &str| ProjectError::InvalidLegacyLayout {
        row: row_idx,
        reason: reason.to_string(),
    };
    let first = value
        .as_array()
        .and_then(|list| list.first())
        .ok_or_else(|| invalid("`layouts` must be a non-empty list"))?;

    let p = numbers(first.get("p")).ok_or_else(|| invalid("`p` must be a list of numbers"))?;
    if p.len() < 2 {
        return Err(invalid("`p` needs at least two coordinates"));
    }
    let c = numbers(first.get("c")).ok_or_else(|| invalid("`c` must be a list of numbers"))?;
    if c.len() < 3 {
        return Err(invalid("`c` needs three color channels"));
    }
    let size = first
        .get("s")
        .and_then(cell_f64)
        .ok_or_else(|| invalid("`s` must be a number"))?;

    let channel = |v: f64| v.round().clamp(0.0, 255.0) as u8;
    Ok(LegacyLayout {
        row: row_idx,
        position: Point3::new(p[0], p[1], 0.0),
        rgb: [channel(c[0]), channel(c[1]), channel(c[2])],
        size,
    })
}

/// Rewrite legacy rows in place. Returns the number of migrated rows.
///
/// Every legacy row is validated before any row is changed.
pub fn migrate_legacy_layout(nodes: &mut [Row]) -> Result<usize, ProjectError> {
    let legacy = nodes
        .iter()
        .enumerate()
        .filter_map(|(i, row)| row.get(LEGACY_LAYOUTS).map(|v| extract(i, v)))
        .collect::<Result<Vec<_>, _>>()?;
    if legacy.is_empty() {
        return Ok(0);
    }

    let mut positions: Vec<Point3> = legacy.iter().map(|l| l.position).collect();
    normalize_points(&mut positions, 2);
    let max_size = legacy.iter().map(|l| l.size).fold(f64::NEG_INFINITY, f64::max);

    for (layout, position) in legacy.iter().zip(positions) {
        let ratio = if max_size > 0.0 {
            layout.size / max_size
        } else {
            0.0
        };
        let alpha = (255.0 * ratio).floor().clamp(0.0, 255.0) as u8;
        let [r, g, b] = layout.rgb;

        let row = &mut nodes[layout.row];
        row.remove(LEGACY_LAYOUTS);
        row.insert(CY_POS.into(), json!([position.x, position.y, 0.0]));
        row.insert(CY_COL.into(), json!([r, g, b, alpha]));
        row.insert(SIZE.into(), json!(ratio));
    }

    tracing::info!(rows = legacy.len(), max_size, "migrated legacy layout columns");
    Ok(legacy.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(values: Vec<Value>) -> Vec<Row> {
        values
            .into_iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect()
    }

    #[test]
    fn alpha_scales_with_relative_size() {
        let mut nodes = rows(vec![
            json!({"id": 0, "layouts": [{"p": [0.0, 10.0, 3.0], "c": [255, 0, 0], "s": 10}]}),
            json!({"id": 1, "layouts": [{"p": [4.0, 20.0, 5.0], "c": [0, 255, 0], "s": 20}]}),
        ]);
        assert_eq!(migrate_legacy_layout(&mut nodes).unwrap(), 2);

        assert_eq!(nodes[0][CY_COL], json!([255, 0, 0, 127]));
        assert_eq!(nodes[1][CY_COL], json!([0, 255, 0, 255]));
        assert_eq!(nodes[0][SIZE], json!(0.5));
        assert_eq!(nodes[0][CY_POS], json!([0.0, 0.0, 0.0]));
        assert_eq!(nodes[1][CY_POS], json!([1.0, 1.0, 0.0]));
        assert!(!nodes[0].contains_key(LEGACY_LAYOUTS));
    }

    #[test]
    fn migration_is_idempotent() {
        let mut nodes = rows(vec![
            json!({"id": 0, "layouts": [{"p": [0.0, 1.0], "c": [1, 2, 3], "s": 1}]}),
            json!({"id": 1}),
        ]);
        migrate_legacy_layout(&mut nodes).unwrap();
        let once = nodes.clone();
        assert_eq!(migrate_legacy_layout(&mut nodes).unwrap(), 0);
        assert_eq!(nodes, once);
        assert!(!nodes[1].contains_key(CY_POS));
    }

    #[test]
    fn malformed_rows_leave_table_untouched() {
        let mut nodes = rows(vec![
            json!({"id": 0, "layouts": [{"p": [0.0, 1.0], "c": [1, 2, 3], "s": 1}]}),
            json!({"id": 1, "layouts": [{"p": [0.0], "c": [1, 2, 3], "s": 1}]}),
        ]);
        let before = nodes.clone();
        let err = migrate_legacy_layout(&mut nodes).unwrap_err();
        assert!(matches!(err, ProjectError::InvalidLegacyLayout { row: 1, .. }));
        assert_eq!(nodes, before);
    }
}
