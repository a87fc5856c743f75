//! Collects computed layouts and writes them into the node table.

use std::collections::HashMap;

use serde_json::json;
use vrnetz_layout::Layout;
use vrnetz_network::{id_key, Row, NODE_ID};

use crate::error::ProjectError;
use crate::legacy::{CY_COL, CY_POS, LEGACY_LAYOUTS, SIZE};

/// Node columns owned by legacy migration; no layout may write them.
pub const RESERVED_COLUMNS: [&str; 4] = [CY_POS, CY_COL, SIZE, LEGACY_LAYOUTS];

/// Column holding the full position of layout `name`.
pub fn position_column(name: &str) -> String {
    format!("{name}_pos")
}

/// Column holding the xy-projection (with `z = 0`) of layout `name`.
pub fn planar_column(name: &str) -> String {
    format!("{name}2d_pos")
}

/// Both columns written for layout `name`.
pub fn layout_columns(name: &str) -> [String; 2] {
    [position_column(name), planar_column(name)]
}

/// Reject layout sets whose columns overlap each other or a reserved column.
///
/// `a` and `a2d` both claim `a2d_pos`; `cy` claims the legacy `cy_pos`.
pub fn check_layout_columns<'a>(
    names: impl IntoIterator<Item = &'a str>,
) -> Result<(), ProjectError> {
    let mut owners: HashMap<String, &str> = HashMap::new();
    for name in names {
        if owners.values().any(|owner| *owner == name) {
            return Err(ProjectError::DuplicateLayoutName(name.to_string()));
        }
        for column in layout_columns(name) {
            if RESERVED_COLUMNS.contains(&column.as_str()) || owners.contains_key(&column) {
                return Err(ProjectError::ColumnCollision {
                    layout: name.to_string(),
                    column,
                });
            }
            owners.insert(column, name);
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct LayoutAccumulator {
    layouts: Vec<Layout>,
}

impl LayoutAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a computed layout. Its columns must not overlap those of the
    /// layouts already added or a reserved column.
    pub fn add(&mut self, layout: Layout) -> Result<(), ProjectError> {
        check_layout_columns(
            self.layouts
                .iter()
                .map(Layout::name)
                .chain(std::iter::once(layout.name())),
        )?;
        self.layouts.push(layout);
        Ok(())
    }

    pub fn layouts(&self) -> &[Layout] {
        &self.layouts
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }

    /// Write `<name>_pos` and `<name>2d_pos` on every row, in insertion order
    /// of the layouts. Row order is unchanged; rows whose id a layout does
    /// not cover get no column for that layout.
    pub fn merge_into_nodes(&self, nodes: &mut [Row]) {
        for layout in &self.layouts {
            let full = position_column(layout.name());
            let planar = planar_column(layout.name());
            let mut missing = 0usize;
            for row in nodes.iter_mut() {
                let Some(p) = row
                    .get(NODE_ID)
                    .and_then(id_key)
                    .and_then(|id| layout.positions.get(&id).copied())
                else {
                    missing += 1;
                    continue;
                };
                row.insert(full.clone(), json!([p.x, p.y, p.z]));
                row.insert(planar.clone(), json!([p.x, p.y, 0.0]));
            }
            if missing > 0 {
                tracing::warn!(
                    layout = %layout.name(),
                    missing,
                    "layout does not cover every node row"
                );
            }
        }
    }
}
