//! Link encoding: uniform default color and removal of join columns.

use serde_json::Value;
use vrnetz_network::Row;

/// Color column written on every link row.
pub const LINK_COLOR_COLUMN: &str = "all_col";

pub const DEFAULT_LINK_COLOR: [u8; 4] = [200, 200, 200, 255];

/// Internal join columns that must not reach an exported file.
pub const TRANSIENT_LINK_COLUMNS: [&str; 2] = ["s_suid", "e_suid"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkEncoder {
    color: [u8; 4],
}

impl Default for LinkEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_LINK_COLOR)
    }
}

impl LinkEncoder {
    pub fn new(color: [u8; 4]) -> Self {
        Self { color }
    }

    pub fn color(&self) -> [u8; 4] {
        self.color
    }

    /// Set the color on every row and drop the transient columns.
    pub fn encode(&self, links: &mut [Row]) {
        let color = Value::from(self.color.to_vec());
        let mut dropped = 0usize;
        for row in links.iter_mut() {
            row.insert(LINK_COLOR_COLUMN.to_string(), color.clone());
            for column in TRANSIENT_LINK_COLUMNS {
                dropped += usize::from(row.remove(column).is_some());
            }
        }
        tracing::debug!(links = links.len(), dropped, "encoded links");
    }
}
