//! Pairwise correlation over a frame's numeric columns.

use serde::Serialize;

use super::series::pearson;
use crate::domain::PriceFrame;

/// Square Pearson matrix; `values[i][j]` correlates `columns[i]` with `columns[j]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, row: &str, col: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == row)?;
        let j = self.columns.iter().position(|c| c == col)?;
        Some(self.values[i][j])
    }
}

/// Correlate every pair of numeric columns. Symmetric by construction.
pub fn correlation_matrix(frame: &PriceFrame) -> CorrelationMatrix {
    let columns = frame.numeric_columns();
    let series: Vec<Vec<f64>> = columns
        .iter()
        .map(|c| frame.column(c).unwrap_or_default())
        .collect();

    let n = columns.len();
    let mut values = vec![vec![f64::NAN; n]; n];
    for i in 0..n {
        for j in i..n {
            let r = pearson(&series[i], &series[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }
    CorrelationMatrix { columns, values }
}
