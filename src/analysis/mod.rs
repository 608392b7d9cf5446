//! Descriptive charts and correspondence analysis of the collected table.

pub mod mca;
pub mod plot;
pub mod table;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{RecsError, Result};
use crate::model::Recommendation;
use crate::output::read_recommendations;

pub use mca::{mca, McaResult};
pub use table::{collapse_rare, one_hot, top_recommenders, ContingencyTable, Dimension, Indicator};

/// Categories seen this many times or fewer become "other" before MCA.
pub const RARE_THRESHOLD: usize = 3;
/// How many recommenders the MCA scatter compares.
pub const TOP_RECOMMENDERS: usize = 4;

/// Row profiles of the busiest recommenders projected onto the principal
/// axes.
#[derive(Debug, Clone)]
pub struct Projection {
    pub recommenders: Vec<String>,
    pub columns: Vec<String>,
    /// First two principal coordinates per analyzed record.
    pub points: Vec<(f64, f64)>,
    /// Recommender of each point.
    pub labels: Vec<String>,
    pub result: McaResult,
}

impl Projection {
    /// Share of the total inertia carried by each axis.
    pub fn explained(&self) -> Vec<f64> {
        let inertia = self.result.inertia();
        let total: f64 = inertia.iter().sum();
        inertia.iter().map(|i| i / total).collect()
    }

    /// Indicator column lying furthest from the origin on `axis`.
    pub fn leading_column(&self, axis: usize) -> Option<&str> {
        if axis >= self.result.axes() {
            return None;
        }
        let coords = self.result.col_coords.column(axis);
        let (j, _) = coords
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))?;
        let column = *self.result.kept_columns.get(j)?;
        self.columns.get(column).map(String::as_str)
    }
}

/// Collapses rare categories, keeps the `TOP_RECOMMENDERS` busiest
/// recommenders and runs MCA over cuisine, neighborhood and price.
pub fn project(records: &[Recommendation]) -> Result<Projection> {
    let mut records = records.to_vec();
    collapse_rare(&mut records, RARE_THRESHOLD);

    let recommenders = top_recommenders(&records, TOP_RECOMMENDERS);
    let subset: Vec<Recommendation> = records
        .into_iter()
        .filter(|r| recommenders.contains(&r.recommender))
        .collect();

    let indicator = one_hot(&subset, &Dimension::ALL);
    let result = mca(&indicator.rows)?;

    let points = (0..result.kept_rows.len()).map(|i| result.row_point(i)).collect();
    let labels = result
        .kept_rows
        .iter()
        .map(|&i| subset[i].recommender.clone())
        .collect();

    Ok(Projection {
        recommenders,
        columns: indicator.columns,
        points,
        labels,
        result,
    })
}

/// Renders every chart into `figures_dir` and returns the written paths.
pub fn analyze(records: &[Recommendation], figures_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(figures_dir)?;
    let mut written = Vec::new();

    for dimension in Dimension::ALL {
        let counts = ContingencyTable::counts(records, dimension);
        if counts.categories.is_empty() {
            warn!(dimension = dimension.name(), "no values to chart");
            continue;
        }

        let path = figures_dir.join(format!("recommender_{}.svg", dimension.name()));
        plot::stacked_bars(&counts, &format!("Recommendations by {}", dimension.name()), &path)?;
        written.push(path);

        let path = figures_dir.join(format!("recommender_{}_prop.svg", dimension.name()));
        plot::stacked_bars(
            &counts.proportions(),
            &format!("Share of each recommender's picks by {}", dimension.name()),
            &path,
        )?;
        written.push(path);
    }

    let projection = match project(records) {
        Ok(projection) => projection,
        Err(RecsError::Analysis(reason)) => {
            warn!(%reason, "skipping correspondence analysis scatter");
            return Ok(written);
        }
        Err(err) => return Err(err),
    };
    let explained = projection.explained();
    info!(
        rows = projection.points.len(),
        axes = projection.result.axes(),
        axis1 = explained.first().copied().unwrap_or_default(),
        axis2 = explained.get(1).copied().unwrap_or_default(),
        leading = projection.leading_column(0).unwrap_or("-"),
        "correspondence analysis done"
    );
    let path = figures_dir.join("top_recommenders.svg");
    plot::scatter(
        &projection.points,
        &projection.labels,
        &projection.recommenders,
        &path,
    )?;
    written.push(path);

    Ok(written)
}

pub fn analyze_csv(input: &Path, figures_dir: &Path) -> Result<Vec<PathBuf>> {
    let records = read_recommendations(input)?;
    info!(records = records.len(), input = %input.display(), "loaded recommendations");
    analyze(&records, figures_dir)
}
