//! SVG charts rendered with plotters.

use std::error::Error;
use std::path::Path;

use plotters::coord::ranged1d::SegmentValue;
use plotters::prelude::*;

use super::table::ContingencyTable;
use crate::error::{RecsError, Result};

const SIZE: (u32, u32) = (1200, 600);

/// One color per recommender, cycled past twelve.
pub const STACK_PALETTE: [RGBColor; 12] = [
    RGBColor(0xd1, 0x6b, 0xa5),
    RGBColor(0xc7, 0x77, 0xb9),
    RGBColor(0xba, 0x83, 0xca),
    RGBColor(0xaa, 0x8f, 0xd8),
    RGBColor(0x9a, 0x9a, 0xe1),
    RGBColor(0x8a, 0xa7, 0xec),
    RGBColor(0x79, 0xb3, 0xf4),
    RGBColor(0x69, 0xbf, 0xf8),
    RGBColor(0x52, 0xcf, 0xfe),
    RGBColor(0x41, 0xdf, 0xff),
    RGBColor(0x46, 0xee, 0xfa),
    RGBColor(0x5f, 0xfb, 0xf1),
];

pub const SCATTER_PALETTE: [RGBColor; 4] = [
    RGBColor(0xd1, 0x6b, 0xa5),
    RGBColor(0xaa, 0x8f, 0xd8),
    RGBColor(0x79, 0xb3, 0xf4),
    RGBColor(0x41, 0xdf, 0xff),
];

fn plot_error(err: Box<dyn Error>) -> RecsError {
    RecsError::Plot(err.to_string())
}

/// Stacked bars, one bar per category, one segment per recommender.
pub fn stacked_bars(table: &ContingencyTable, title: &str, path: &Path) -> Result<()> {
    draw_stacked_bars(table, title, path).map_err(plot_error)
}

fn draw_stacked_bars(
    table: &ContingencyTable,
    title: &str,
    path: &Path,
) -> std::result::Result<(), Box<dyn Error>> {
    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let columns = table.categories.len() as i32;
    let top = table
        .column_totals()
        .into_iter()
        .fold(0.0_f64, f64::max)
        .max(1e-9)
        * 1.05;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(120)
        .y_label_area_size(60)
        .build_cartesian_2d((0..columns).into_segmented(), 0.0..top)?;

    let label = |v: &SegmentValue<i32>| match v {
        SegmentValue::CenterOf(i) => table
            .categories
            .get(*i as usize)
            .cloned()
            .unwrap_or_default(),
        _ => String::new(),
    };
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(table.categories.len().max(1))
        .x_label_formatter(&label)
        .x_label_style(
            ("sans-serif", 11)
                .into_font()
                .transform(FontTransform::Rotate90),
        )
        .x_desc(table.dimension.name())
        .draw()?;

    let mut bottoms = vec![0.0; table.categories.len()];
    for (row, recommender) in table.recommenders.iter().enumerate() {
        let color = STACK_PALETTE[row % STACK_PALETTE.len()];
        let bars: Vec<_> = table.cells[row]
            .iter()
            .enumerate()
            .map(|(col, &value)| {
                let base = bottoms[col];
                bottoms[col] += value;
                let x = col as i32;
                let mut bar = Rectangle::new(
                    [
                        (SegmentValue::Exact(x), base),
                        (SegmentValue::Exact(x + 1), base + value),
                    ],
                    color.filled(),
                );
                bar.set_margin(0, 0, 3, 3);
                bar
            })
            .collect();

        chart
            .draw_series(bars)?
            .label(recommender.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Points on the first two principal axes, colored by group. `groups` holds
/// one label per point; `order` fixes colors and legend order.
pub fn scatter(
    points: &[(f64, f64)],
    groups: &[String],
    order: &[String],
    path: &Path,
) -> Result<()> {
    draw_scatter(points, groups, order, path).map_err(plot_error)
}

fn padded_range(values: impl Iterator<Item = f64> + Clone) -> std::ops::Range<f64> {
    let lo = values.clone().fold(f64::INFINITY, f64::min);
    let hi = values.fold(f64::NEG_INFINITY, f64::max);
    if !lo.is_finite() || !hi.is_finite() {
        return -1.0..1.0;
    }
    let pad = ((hi - lo) * 0.05).max(0.1);
    (lo - pad)..(hi + pad)
}

fn draw_scatter(
    points: &[(f64, f64)],
    groups: &[String],
    order: &[String],
    path: &Path,
) -> std::result::Result<(), Box<dyn Error>> {
    let root = SVGBackend::new(path, (800, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Recommendations on the principal axes", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(
            padded_range(points.iter().map(|p| p.0)),
            padded_range(points.iter().map(|p| p.1)),
        )?;
    chart
        .configure_mesh()
        .x_desc("axis 1")
        .y_desc("axis 2")
        .draw()?;

    for (k, group) in order.iter().enumerate() {
        let color = SCATTER_PALETTE[k % SCATTER_PALETTE.len()];
        let members = points
            .iter()
            .zip(groups)
            .filter(|(_, g)| *g == group)
            .map(|(&p, _)| Circle::new(p, 4, color.filled()));
        chart
            .draw_series(members)?
            .label(group.as_str())
            .legend(move |(x, y)| Circle::new((x + 5, y), 4, color.filled()));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}
