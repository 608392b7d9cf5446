//! Recommender × category tables and the categorical encodings fed to MCA.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::model::Recommendation;

/// Label given to categories too rare to analyze on their own.
pub const OTHER: &str = "other";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Cuisine,
    Neighborhood,
    Price,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [Dimension::Cuisine, Dimension::Neighborhood, Dimension::Price];

    pub fn name(self) -> &'static str {
        match self {
            Self::Cuisine => "cuisine",
            Self::Neighborhood => "neighborhood",
            Self::Price => "price",
        }
    }

    /// The record's category on this dimension; prices use their ordinal
    /// labels.
    pub fn value(self, record: &Recommendation) -> Option<&str> {
        match self {
            Self::Cuisine => record.cuisine.as_deref(),
            Self::Neighborhood => record.neighborhood.as_deref(),
            Self::Price => record.price.label(),
        }
    }
}

/// Counts (or proportions) per recommender and category. Rows and columns
/// are sorted by label.
#[derive(Debug, Clone, PartialEq)]
pub struct ContingencyTable {
    pub dimension: Dimension,
    pub recommenders: Vec<String>,
    pub categories: Vec<String>,
    /// `cells[row][column]`.
    pub cells: Vec<Vec<f64>>,
}

impl ContingencyTable {
    /// Records without a value on `dimension` are not counted, so a
    /// recommender with no counted record gets no row.
    pub fn counts(records: &[Recommendation], dimension: Dimension) -> Self {
        let mut pivot: BTreeMap<&str, BTreeMap<&str, f64>> = BTreeMap::new();
        let mut categories = BTreeSet::new();
        for record in records {
            let Some(category) = dimension.value(record) else {
                continue;
            };
            categories.insert(category);
            *pivot
                .entry(record.recommender.as_str())
                .or_default()
                .entry(category)
                .or_default() += 1.0;
        }

        let categories: Vec<&str> = categories.into_iter().collect();
        let cells: Vec<Vec<f64>> = pivot
            .values()
            .map(|row| {
                categories
                    .iter()
                    .map(|c| row.get(c).copied().unwrap_or(0.0))
                    .collect()
            })
            .collect();

        Self {
            dimension,
            recommenders: pivot.keys().map(|r| (*r).to_owned()).collect(),
            categories: categories.into_iter().map(str::to_owned).collect(),
            cells,
        }
    }

    /// Each row divided by its total.
    pub fn proportions(&self) -> Self {
        let cells: Vec<Vec<f64>> = self
            .cells
            .iter()
            .map(|row| {
                let total: f64 = row.iter().sum();
                row.iter().map(|v| v / total).collect()
            })
            .collect();
        Self {
            cells,
            ..self.clone()
        }
    }

    /// Height of each stacked bar.
    pub fn column_totals(&self) -> Vec<f64> {
        (0..self.categories.len())
            .map(|c| self.cells.iter().map(|row| row[c]).sum())
            .collect()
    }
}

fn collapse_field<F>(records: &mut [Recommendation], threshold: usize, field: F)
where
    F: Fn(&mut Recommendation) -> &mut Option<String>,
{
    let mut counts: HashMap<String, usize> = HashMap::new();
    for record in records.iter_mut() {
        if let Some(value) = field(record).as_ref() {
            *counts.entry(value.clone()).or_default() += 1;
        }
    }
    for record in records.iter_mut() {
        let slot = field(record);
        if slot.as_ref().is_some_and(|v| counts[v] <= threshold) {
            *slot = Some(OTHER.to_owned());
        }
    }
}

/// Relabels cuisines and neighborhoods seen `threshold` times or fewer as
/// [`OTHER`].
pub fn collapse_rare(records: &mut [Recommendation], threshold: usize) {
    collapse_field(records, threshold, |r| &mut r.cuisine);
    collapse_field(records, threshold, |r| &mut r.neighborhood);
}

/// The `n` recommenders with the most records, busiest first. Ties go to
/// the alphabetically first name.
pub fn top_recommenders(records: &[Recommendation], n: usize) -> Vec<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for record in records {
        *counts.entry(record.recommender.as_str()).or_default() += 1;
    }
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(n)
        .map(|(name, _)| name.to_owned())
        .collect()
}

/// Indicator (one-hot) matrix of the records over `dimensions`.
#[derive(Debug, Clone, PartialEq)]
pub struct Indicator {
    /// `"<dimension>_<value>"`, grouped by dimension, sorted within each.
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

/// A record without a value on some dimension has all zeros in that
/// dimension's columns.
pub fn one_hot(records: &[Recommendation], dimensions: &[Dimension]) -> Indicator {
    let mut columns = Vec::new();
    let mut index: HashMap<(Dimension, &str), usize> = HashMap::new();
    for &dimension in dimensions {
        let values: BTreeSet<&str> = records.iter().filter_map(|r| dimension.value(r)).collect();
        for value in values {
            index.insert((dimension, value), columns.len());
            columns.push(format!("{}_{}", dimension.name(), value));
        }
    }

    let rows = records
        .iter()
        .map(|record| {
            let mut row = vec![0.0; columns.len()];
            for &dimension in dimensions {
                if let Some(&col) = dimension.value(record).and_then(|v| index.get(&(dimension, v))) {
                    row[col] = 1.0;
                }
            }
            row
        })
        .collect();

    Indicator { columns, rows }
}
