use ndarray::{s, Array2, ArrayView2, ArrayViewD, Axis, Ix1, Ix2};
use std::ops::Range;

use crate::prelude::{WaveformError, WaveformResult};

pub struct MatrixHelper;

impl MatrixHelper {
    /// Copy `samples` into an owned (n_samples, n_channels) matrix.
    ///
    /// Rank-1 input becomes a single column. Rank 0 and rank >= 3 are rejected
    /// rather than collapsed.
    pub fn promote(samples: ArrayViewD<'_, f64>) -> WaveformResult<Array2<f64>> {
        match samples.ndim() {
            1 => {
                let column = samples
                    .into_dimensionality::<Ix1>()
                    .map_err(|err| WaveformError::Shape(err.to_string()))?;
                Ok(column.insert_axis(Axis(1)).to_owned())
            }
            2 => {
                let matrix = samples
                    .into_dimensionality::<Ix2>()
                    .map_err(|err| WaveformError::Shape(err.to_string()))?;
                Ok(matrix.as_standard_layout().into_owned())
            }
            rank => Err(WaveformError::Shape(format!(
                "data dimensionality {} is not 1 or 2",
                rank
            ))),
        }
    }

    /// Resolve `[start:end]` against a length with Python slice rules:
    /// `None` means the open end, negatives count from the back, out-of-range
    /// bounds clamp.
    pub fn resolve_bounds(len: usize, start: Option<isize>, end: Option<isize>) -> Range<usize> {
        let clamp = |bound: isize| -> usize {
            if bound < 0 {
                (len as isize + bound).max(0) as usize
            } else {
                (bound as usize).min(len)
            }
        };
        let lo = start.map(clamp).unwrap_or(0);
        let hi = end.map(clamp).unwrap_or(len);
        lo..hi.max(lo)
    }

    /// `matrix[:, start:end]` as an owned copy.
    pub fn select_columns(
        matrix: ArrayView2<'_, f64>,
        start: Option<isize>,
        end: Option<isize>,
    ) -> Array2<f64> {
        let columns = Self::resolve_bounds(matrix.ncols(), start, end);
        matrix.slice(s![.., columns]).to_owned()
    }

    /// Swap the sample and channel axes, keeping standard layout.
    pub fn transpose(matrix: Array2<f64>) -> Array2<f64> {
        matrix.t().as_standard_layout().into_owned()
    }
}
