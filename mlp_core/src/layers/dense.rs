use ndarray::{linalg, prelude::*};

use crate::activations::ActFn;
use crate::error::{MlpErr, Result};

/// A fully-connected layer with an optional element-wise activation.
///
/// The layer owns no parameters: callers hand it a slice of a flat
/// parameter buffer holding `dim.0 * dim.1` weights followed by `dim.1`
/// biases. Forward caches the batch input and pre-activations so that a
/// single backward call can be made against the same batch.
pub struct Dense {
    dim: (usize, usize),
    act_fn: Option<ActFn>,
    size: usize,

    // Forward metadata, consumed by backward.
    x: Option<Array2<f32>>,
    z: Option<Array2<f32>>,
}

impl Dense {
    pub fn new(dim: (usize, usize), act_fn: Option<ActFn>) -> Self {
        Self {
            dim,
            act_fn,
            size: (dim.0 + 1) * dim.1,
            x: None,
            z: None,
        }
    }

    /// Returns the size of this layer.
    ///
    /// # Returns
    /// The amount of parameters this layer has.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Computes `act(x · W + b)` and caches the inputs for backward.
    ///
    /// # Errors
    /// Returns `MlpErr::ShapeMismatch` if `params` is not exactly this
    /// layer's size or `x` does not have `dim.0` columns.
    pub fn forward(&mut self, params: &[f32], x: Array2<f32>) -> Result<Array2<f32>> {
        self.check_params("dense params", params.len())?;
        if x.ncols() != self.dim.0 {
            return Err(MlpErr::ShapeMismatch {
                what: "dense input width",
                got: x.ncols(),
                expected: self.dim.0,
            });
        }

        let (w, b) = self.view_params(params);

        let mut z = Array2::zeros((x.nrows(), self.dim.1));
        linalg::general_mat_mul(1.0, &x, &w, 0.0, &mut z);
        z += &b;

        let a = match self.act_fn {
            Some(act_fn) => z.mapv(|v| act_fn.f(v)),
            None => z.clone(),
        };

        self.x = Some(x);
        self.z = Some(z);

        Ok(a)
    }

    /// Consumes the cached forward state, writes `dw`/`db` into `grad`
    /// and returns the delta for the previous layer.
    ///
    /// # Errors
    /// Returns `MlpErr::ShapeMismatch` on slice or delta size mismatches
    /// and `MlpErr::InvalidInput` when no forward state is cached.
    pub fn backward(
        &mut self,
        params: &[f32],
        grad: &mut [f32],
        mut d: Array2<f32>,
    ) -> Result<Array2<f32>> {
        self.check_params("dense params", params.len())?;
        self.check_params("dense grad", grad.len())?;

        let x = self
            .x
            .take()
            .ok_or(MlpErr::InvalidInput("dense backward called before forward"))?;
        let z = self
            .z
            .take()
            .ok_or(MlpErr::InvalidInput("dense backward called before forward"))?;

        if d.nrows() != x.nrows() {
            return Err(MlpErr::ShapeMismatch {
                what: "dense delta rows",
                got: d.nrows(),
                expected: x.nrows(),
            });
        }
        if d.ncols() != self.dim.1 {
            return Err(MlpErr::ShapeMismatch {
                what: "dense delta width",
                got: d.ncols(),
                expected: self.dim.1,
            });
        }

        if let Some(act_fn) = &self.act_fn {
            d.zip_mut_with(&z, |dv, &zv| *dv *= act_fn.df(zv));
        }

        let (mut dw, mut db) = self.view_grad(grad);
        linalg::general_mat_mul(1.0, &x.t(), &d, 0.0, &mut dw);
        db.assign(&d.sum_axis(Axis(0)));

        let (w, _) = self.view_params(params);
        let mut prev = Array2::zeros((d.nrows(), self.dim.0));
        linalg::general_mat_mul(1.0, &d, &w.t(), 0.0, &mut prev);

        Ok(prev)
    }

    fn check_params(&self, what: &'static str, got: usize) -> Result<()> {
        if got != self.size {
            return Err(MlpErr::ShapeMismatch { what, got, expected: self.size });
        }
        Ok(())
    }

    /// Gives a view of the raw parameter slice as the weights and biases
    /// of this layer. Callers must have checked the slice length.
    fn view_params<'a>(&self, params: &'a [f32]) -> (ArrayView2<'a, f32>, ArrayView1<'a, f32>) {
        let w_size = self.size - self.dim.1;
        let weights = ArrayView2::from_shape(self.dim, &params[..w_size]).unwrap();
        let biases = ArrayView1::from_shape(self.dim.1, &params[w_size..]).unwrap();
        (weights, biases)
    }

    /// Gives a view of the raw gradient slice as the delta weights and
    /// delta biases of this layer. Callers must have checked the slice length.
    fn view_grad<'a>(&self, grad: &'a mut [f32]) -> (ArrayViewMut2<'a, f32>, ArrayViewMut1<'a, f32>) {
        let w_size = self.size - self.dim.1;
        let (dw_raw, db_raw) = grad.split_at_mut(w_size);
        let dw = ArrayViewMut2::from_shape(self.dim, dw_raw).unwrap();
        let db = ArrayViewMut1::from_shape(self.dim.1, db_raw).unwrap();
        (dw, db)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_computes_affine_transform() {
        let mut layer = Dense::new((2, 2), None);
        let params = [1.0, 2.0, 3.0, 4.0, 0.5, -0.5];
        let x = ndarray::array![[1.0, 1.0], [2.0, 0.0]];

        let a = layer.forward(&params, x).unwrap();
        assert_eq!(a, ndarray::array![[4.5, 5.5], [2.5, 3.5]]);
    }

    #[test]
    fn backward_writes_grads_and_returns_delta() {
        let mut layer = Dense::new((2, 2), None);
        let params = [1.0, 2.0, 3.0, 4.0, 0.5, -0.5];
        let x = ndarray::array![[1.0, 1.0], [2.0, 0.0]];
        let mut grad = [0.0; 6];

        layer.forward(&params, x).unwrap();
        let d = ndarray::array![[1.0, 0.0], [0.0, 1.0]];
        let prev = layer.backward(&params, &mut grad, d).unwrap();

        // dw = x^T . d, db = column sums of d, prev = d . w^T
        assert_eq!(grad, [1.0, 2.0, 1.0, 0.0, 1.0, 1.0]);
        assert_eq!(prev, ndarray::array![[1.0, 3.0], [2.0, 4.0]]);
    }

    #[test]
    fn relu_masks_the_delta() {
        let mut layer = Dense::new((2, 1), Some(ActFn::Relu));
        let params = [1.0, -1.0, 0.0];
        let mut grad = [0.0; 3];

        // z = 1 - 2 = -1, so relu clamps the output and the gradient.
        let a = layer.forward(&params, ndarray::array![[1.0, 2.0]]).unwrap();
        assert_eq!(a, ndarray::array![[0.0]]);

        let prev = layer
            .backward(&params, &mut grad, ndarray::array![[1.0]])
            .unwrap();
        assert_eq!(grad, [0.0; 3]);
        assert_eq!(prev, ndarray::array![[0.0, 0.0]]);
    }

    #[test]
    fn rejects_bad_param_slice() {
        let mut layer = Dense::new((2, 2), None);
        let err = layer
            .forward(&[0.0; 5], Array2::zeros((1, 2)))
            .unwrap_err();
        assert_eq!(
            err,
            MlpErr::ShapeMismatch { what: "dense params", got: 5, expected: 6 }
        );
    }

    #[test]
    fn rejects_bad_input_width() {
        let mut layer = Dense::new((2, 2), None);
        let err = layer
            .forward(&[0.0; 6], Array2::zeros((1, 3)))
            .unwrap_err();
        assert_eq!(
            err,
            MlpErr::ShapeMismatch { what: "dense input width", got: 3, expected: 2 }
        );
    }

    #[test]
    fn backward_without_forward_fails() {
        let mut layer = Dense::new((2, 2), None);
        let mut grad = [0.0; 6];
        let err = layer
            .backward(&[0.0; 6], &mut grad, Array2::zeros((1, 2)))
            .unwrap_err();
        assert_eq!(err, MlpErr::InvalidInput("dense backward called before forward"));
    }
}
