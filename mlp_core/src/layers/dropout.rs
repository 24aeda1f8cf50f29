use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{MlpErr, Result};
use crate::net::Mode;

/// Inverted dropout: in training mode each element is zeroed with
/// probability `p` and survivors are scaled by `1 / (1 - p)`, so the
/// expected activation is unchanged and inference needs no rescaling.
/// In eval mode the layer is the identity.
pub struct Dropout {
    p: f32,
    rng: StdRng,

    // Mask of the last training-mode forward, consumed by backward.
    mask: Option<Array2<f32>>,
}

impl Dropout {
    /// Creates a dropout layer with its own seeded rng.
    ///
    /// # Panics
    /// Panics if `p` is not in `[0, 1)`.
    pub fn new(p: f32, seed: u64) -> Self {
        assert!((0.0..1.0).contains(&p), "dropout probability must be in [0, 1)");
        Self {
            p,
            rng: StdRng::seed_from_u64(seed),
            mask: None,
        }
    }

    pub fn forward(&mut self, x: Array2<f32>, mode: Mode) -> Array2<f32> {
        match mode {
            Mode::Eval => {
                self.mask = None;
                x
            }
            Mode::Train => {
                let p = self.p;
                let scale = 1.0 / (1.0 - p);
                let rng = &mut self.rng;
                let mask = Array2::from_shape_fn(x.dim(), |_| {
                    if rng.random::<f32>() < p { 0.0 } else { scale }
                });

                let y = &x * &mask;
                self.mask = Some(mask);
                y
            }
        }
    }

    /// Applies the cached mask to the delta; identity if the last forward
    /// ran in eval mode.
    ///
    /// # Errors
    /// Returns `MlpErr::ShapeMismatch` if the delta's shape differs from
    /// the masked batch.
    pub fn backward(&mut self, d: Array2<f32>) -> Result<Array2<f32>> {
        match self.mask.take() {
            None => Ok(d),
            Some(mask) => {
                if mask.nrows() != d.nrows() {
                    return Err(MlpErr::ShapeMismatch {
                        what: "dropout delta rows",
                        got: d.nrows(),
                        expected: mask.nrows(),
                    });
                }
                if mask.ncols() != d.ncols() {
                    return Err(MlpErr::ShapeMismatch {
                        what: "dropout delta cols",
                        got: d.ncols(),
                        expected: mask.ncols(),
                    });
                }
                Ok(&d * &mask)
            }
        }
    }
}
