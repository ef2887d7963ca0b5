//! SVG rendering of the confusion matrix and the corpus projections.

use std::path::Path;

use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::error::{Result, StylometerError};
use crate::ml::ConfusionMatrix;
use crate::projection::Embedding2d;

const CELL: i32 = 64;
const LEFT: i32 = 180;
const TOP: i32 = 90;
const FONT: &str = "sans-serif";

fn render_error<E: std::fmt::Display>(e: E) -> StylometerError {
    StylometerError::render(e.to_string())
}

fn text_style(size: u32, color: &RGBColor, h: HPos) -> TextStyle<'static> {
    (FONT, size).into_font().color(color).pos(Pos::new(h, VPos::Center))
}

/// Blue ramp from near-white (0) to dark blue (1).
fn blues(t: f64) -> RGBColor {
    let t = t.clamp(0.0, 1.0);
    let lerp = |a: f64, b: f64| (a + (b - a) * t).round() as u8;
    RGBColor(lerp(247.0, 8.0), lerp(251.0, 48.0), lerp(255.0, 107.0))
}

/// Heatmap of `matrix` with counts in each cell, true labels down the left
/// and predicted labels along the bottom.
pub fn render_confusion_matrix(matrix: &ConfusionMatrix, path: &Path) -> Result<()> {
    let k = matrix.labels.len() as i32;
    let width = (LEFT + k * CELL + 40) as u32;
    let height = (TOP + k * CELL + 110) as u32;

    let root = SVGBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE).map_err(render_error)?;

    let centered = |size: u32| text_style(size, &BLACK, HPos::Center);

    root.draw(&Text::new(
        "Confusion matrix".to_string(),
        (LEFT + k * CELL / 2, TOP / 3),
        centered(22),
    ))
    .map_err(render_error)?;

    let max = matrix.counts.iter().flatten().copied().max().unwrap_or(0).max(1) as f64;
    for (i, row) in matrix.counts.iter().enumerate() {
        for (j, &count) in row.iter().enumerate() {
            let x0 = LEFT + j as i32 * CELL;
            let y0 = TOP + i as i32 * CELL;
            let t = count as f64 / max;
            root.draw(&Rectangle::new(
                [(x0, y0), (x0 + CELL, y0 + CELL)],
                blues(t).filled(),
            ))
            .map_err(render_error)?;
            root.draw(&Rectangle::new(
                [(x0, y0), (x0 + CELL, y0 + CELL)],
                BLACK.mix(0.2).stroke_width(1),
            ))
            .map_err(render_error)?;

            let ink = if t > 0.5 { WHITE } else { BLACK };
            root.draw(&Text::new(
                count.to_string(),
                (x0 + CELL / 2, y0 + CELL / 2),
                text_style(16, &ink, HPos::Center),
            ))
            .map_err(render_error)?;
        }
    }

    let right = text_style(14, &BLACK, HPos::Right);
    for (i, label) in matrix.labels.iter().enumerate() {
        let y = TOP + i as i32 * CELL + CELL / 2;
        root.draw(&Text::new(label.clone(), (LEFT - 10, y), right.clone()))
            .map_err(render_error)?;

        let x = LEFT + i as i32 * CELL + CELL / 2;
        root.draw(&Text::new(label.clone(), (x, TOP + k * CELL + 18), centered(14)))
            .map_err(render_error)?;
    }

    root.draw(&Text::new(
        "Predicted label".to_string(),
        (LEFT + k * CELL / 2, TOP + k * CELL + 55),
        centered(16),
    ))
    .map_err(render_error)?;
    root.draw(&Text::new(
        "True label".to_string(),
        (LEFT / 2, TOP - 20),
        centered(16),
    ))
    .map_err(render_error)?;

    root.present().map_err(render_error)?;
    Ok(())
}

/// Scatter plot of `embedding`, one colour per label, each point annotated
/// with its document name.
pub fn render_scatter(
    title: &str,
    embedding: &Embedding2d,
    labels: &[String],
    names: &[String],
    point_size: u32,
    path: &Path,
) -> Result<()> {
    if embedding.len() != labels.len() || labels.len() != names.len() {
        return Err(StylometerError::render(format!(
            "{} points, {} labels and {} names do not line up",
            embedding.len(),
            labels.len(),
            names.len()
        )));
    }
    let Some((lo, hi)) = embedding.bounds() else {
        return Err(StylometerError::render("nothing to plot"));
    };

    let pad = |lo: f64, hi: f64| {
        let margin = ((hi - lo) * 0.08).max(1e-6);
        if hi - lo < 1e-9 {
            (lo - 1.0)..(hi + 1.0)
        } else {
            (lo - margin)..(hi + margin)
        }
    };

    let root = SVGBackend::new(path, (900, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(render_error)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, (FONT, 22))
        .margin(20)
        .x_label_area_size(35)
        .y_label_area_size(50)
        .build_cartesian_2d(pad(lo[0], hi[0]), pad(lo[1], hi[1]))
        .map_err(render_error)?;
    chart
        .configure_mesh()
        .x_desc("x")
        .y_desc("y")
        .draw()
        .map_err(render_error)?;

    let mut authors: Vec<&String> = labels.iter().collect();
    authors.sort();
    authors.dedup();

    let radius = point_size as i32;
    for (idx, author) in authors.iter().enumerate() {
        let color = Palette99::pick(idx).mix(0.85);
        let members = embedding
            .points
            .iter()
            .zip(labels.iter().zip(names))
            .filter(|(_, (label, _))| label == author);

        chart
            .draw_series(members.map(|(p, (_, name))| {
                EmptyElement::at((p[0], p[1]))
                    + Circle::new((0, 0), radius, color.filled())
                    + Text::new(name.clone(), (radius + 2, -radius - 2), (FONT, 11).into_font())
            }))
            .map_err(render_error)?
            .label(author.as_str())
            .legend(move |(x, y)| Circle::new((x, y), 5, color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(render_error)?;

    root.present().map_err(render_error)?;
    Ok(())
}
