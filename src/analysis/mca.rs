//! Multiple correspondence analysis of an indicator matrix.
//!
//! Correspondence analysis of the indicator matrix `X`: with `P = X / n`,
//! row masses `r`, column masses `c`, the standardized residuals
//! `S = D_r^{-1/2} (P - r cᵀ) D_c^{-1/2}` are decomposed as `S = U Σ Vᵀ`.
//! Row principal coordinates are `F = D_r^{-1/2} U Σ`, column principal
//! coordinates `G = D_c^{-1/2} V Σ`.

use nalgebra::DMatrix;

use crate::error::{RecsError, Result};

/// Singular values below this are treated as zero.
const TOLERANCE: f64 = 1e-10;

#[derive(Debug, Clone)]
pub struct McaResult {
    /// One row per kept input row, one column per axis.
    pub row_coords: DMatrix<f64>,
    /// One row per kept indicator column, one column per axis.
    pub col_coords: DMatrix<f64>,
    /// Decreasing.
    pub singular_values: Vec<f64>,
    /// Input rows that carried mass, in input order.
    pub kept_rows: Vec<usize>,
    /// Input columns that carried mass, in input order.
    pub kept_columns: Vec<usize>,
}

impl McaResult {
    /// Squared singular values.
    pub fn inertia(&self) -> Vec<f64> {
        self.singular_values.iter().map(|s| s * s).collect()
    }

    pub fn axes(&self) -> usize {
        self.singular_values.len()
    }

    /// Coordinates of kept row `i` on the first two axes, `0.0` when an axis
    /// does not exist.
    pub fn row_point(&self, i: usize) -> (f64, f64) {
        let at = |axis: usize| {
            if axis < self.axes() {
                self.row_coords[(i, axis)]
            } else {
                0.0
            }
        };
        (at(0), at(1))
    }
}

pub fn mca(indicator: &[Vec<f64>]) -> Result<McaResult> {
    let width = indicator.first().map_or(0, Vec::len);
    if indicator.iter().any(|row| row.len() != width) {
        return Err(RecsError::Analysis("indicator rows differ in length".to_owned()));
    }

    let kept_rows: Vec<usize> = (0..indicator.len())
        .filter(|&i| indicator[i].iter().sum::<f64>() > 0.0)
        .collect();
    let kept_columns: Vec<usize> = (0..width)
        .filter(|&j| kept_rows.iter().map(|&i| indicator[i][j]).sum::<f64>() > 0.0)
        .collect();
    if kept_rows.len() < 2 || kept_columns.len() < 2 {
        return Err(RecsError::Analysis(format!(
            "need at least two non-empty rows and columns, got {}x{}",
            kept_rows.len(),
            kept_columns.len()
        )));
    }

    let x = DMatrix::from_fn(kept_rows.len(), kept_columns.len(), |i, j| {
        indicator[kept_rows[i]][kept_columns[j]]
    });
    let total = x.sum();
    let p = x / total;
    let r: Vec<f64> = p.row_iter().map(|row| row.sum()).collect();
    let c: Vec<f64> = p.column_iter().map(|col| col.sum()).collect();

    let s = DMatrix::from_fn(p.nrows(), p.ncols(), |i, j| {
        (p[(i, j)] - r[i] * c[j]) / (r[i] * c[j]).sqrt()
    });
    let svd = s.svd(true, true);
    let (Some(u), Some(v_t)) = (svd.u, svd.v_t) else {
        return Err(RecsError::Analysis("SVD did not produce singular vectors".to_owned()));
    };

    let mut order: Vec<usize> = (0..svd.singular_values.len())
        .filter(|&k| svd.singular_values[k] > TOLERANCE)
        .collect();
    order.sort_by(|&a, &b| svd.singular_values[b].total_cmp(&svd.singular_values[a]));
    let singular_values: Vec<f64> = order.iter().map(|&k| svd.singular_values[k]).collect();

    let row_coords = DMatrix::from_fn(r.len(), order.len(), |i, a| {
        u[(i, order[a])] * singular_values[a] / r[i].sqrt()
    });
    let col_coords = DMatrix::from_fn(c.len(), order.len(), |j, a| {
        v_t[(order[a], j)] * singular_values[a] / c[j].sqrt()
    });

    Ok(McaResult {
        row_coords,
        col_coords,
        singular_values,
        kept_rows,
        kept_columns,
    })
}
