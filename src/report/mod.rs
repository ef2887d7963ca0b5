//! Report artefacts: the distance table and the SVG plots.

pub mod distance;
pub mod plots;

pub use distance::{DISPLAY_PRECISION, DistanceRow, DistanceTable};
pub use plots::{render_confusion_matrix, render_scatter};

use crate::error::{Result, StylometerError};

/// Flush an in-memory CSV writer into a string.
pub(crate) fn finish_csv(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| StylometerError::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| StylometerError::other(e.to_string()))
}
