use std::collections::HashMap;

use super::color::raw_distance;
use super::domain::{ItemUrl, WardrobeItem};

/// Pairwise raw RGB distances over the items of one generation cycle.
///
/// Rebuilt from scratch every cycle; wardrobes hold tens of items so the
/// quadratic build is cheap.
#[derive(Debug, Clone, Default)]
pub struct SimilarityMatrix {
    index: HashMap<ItemUrl, usize>,
    cells: Vec<Vec<f64>>,
}

impl SimilarityMatrix {
    pub fn build(items: &[WardrobeItem]) -> Self {
        let index = items
            .iter()
            .enumerate()
            .map(|(position, item)| (item.url.clone(), position))
            .collect();

        let mut cells = vec![vec![0.0; items.len()]; items.len()];
        for (i, first) in items.iter().enumerate() {
            for (j, second) in items.iter().enumerate().skip(i + 1) {
                let distance = raw_distance(first.rgb, second.rgb);
                cells[i][j] = distance;
                cells[j][i] = distance;
            }
        }

        Self { index, cells }
    }

    pub fn get(&self, row: usize, column: usize) -> Option<f64> {
        self.cells.get(row)?.get(column).copied()
    }

    /// Distance between two items by identity, `None` if either is unknown.
    pub fn distance(&self, first: &ItemUrl, second: &ItemUrl) -> Option<f64> {
        let row = *self.index.get(first)?;
        let column = *self.index.get(second)?;
        self.get(row, column)
    }
}
