use ndarray::{Array2, Axis};

use crate::error::{MlpErr, Result};

/// Row-wise log-softmax: `x - max(x) - ln(sum(exp(x - max(x))))`.
///
/// The max shift keeps the exponentials bounded, so the output is finite
/// for any finite input.
#[derive(Debug, Default)]
pub struct LogSoftmax {
    // Output of the last forward, consumed by backward.
    logp: Option<Array2<f32>>,
}

impl LogSoftmax {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn forward(&mut self, x: Array2<f32>) -> Array2<f32> {
        let mut out = x;
        for mut row in out.rows_mut() {
            let max = row.fold(f32::NEG_INFINITY, |m, &v| m.max(v));
            row -= max;
            let lse = row.mapv(f32::exp).sum().ln();
            row -= lse;
        }

        self.logp = Some(out.clone());
        out
    }

    /// Maps a delta on the log-probabilities to a delta on the logits:
    /// `d - exp(logp) * rowsum(d)`.
    ///
    /// # Errors
    /// Returns `MlpErr::InvalidInput` when no forward state is cached and
    /// `MlpErr::ShapeMismatch` if the delta's shape differs from it.
    pub fn backward(&mut self, d: Array2<f32>) -> Result<Array2<f32>> {
        let logp = self
            .logp
            .take()
            .ok_or(MlpErr::InvalidInput("log-softmax backward called before forward"))?;

        if logp.nrows() != d.nrows() {
            return Err(MlpErr::ShapeMismatch {
                what: "log-softmax delta rows",
                got: d.nrows(),
                expected: logp.nrows(),
            });
        }
        if logp.ncols() != d.ncols() {
            return Err(MlpErr::ShapeMismatch {
                what: "log-softmax delta cols",
                got: d.ncols(),
                expected: logp.ncols(),
            });
        }

        let rowsum = d.sum_axis(Axis(1)).insert_axis(Axis(1));
        Ok(&d - &(logp.mapv(f32::exp) * &rowsum))
    }
}
