use ndarray::Array2;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::activations::ActFn;
use crate::error::{MlpErr, Result};
use crate::init;
use crate::layers::{Dense, Dropout, LogSoftmax};
use crate::params::ParamLayout;

/// Width of one flattened MNIST image.
pub const INPUT_WIDTH: usize = 784;
/// Number of digit classes.
pub const NUM_CLASSES: usize = 10;

const HIDDEN_1: usize = 64;
const HIDDEN_2: usize = 32;
const DROPOUT_P: f32 = 0.5;

/// `(fan_in, fan_out)` of each dense layer, in forward order.
const LAYER_DIMS: [(usize, usize); 3] = [
    (INPUT_WIDTH, HIDDEN_1),
    (HIDDEN_1, HIDDEN_2),
    (HIDDEN_2, NUM_CLASSES),
];

/// Whether a forward pass is part of training or of evaluation.
///
/// The only layer that cares is dropout: it samples a fresh mask in
/// [`Mode::Train`] and is the identity in [`Mode::Eval`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Train,
    Eval,
}

/// The classifier: `784 -> 64 -> relu -> dropout -> 32 -> relu -> 10 ->
/// log-softmax`, producing per-class log-probabilities.
///
/// The network owns no parameters. Weights and gradients live in flat
/// `f32` buffers owned by the caller, laid out per [`Mlp::param_layout`];
/// forward and backward borrow slices of them. What the network does own
/// is per-layer forward state (cached inputs, dropout masks), so a
/// backward call must follow a forward call on the same batch.
pub struct Mlp {
    fc1: Dense,
    dropout: Dropout,
    fc2: Dense,
    fc3: Dense,
    out: LogSoftmax,
    layout: ParamLayout,
}

impl Mlp {
    pub fn new(seed: u64) -> Self {
        Self {
            fc1: Dense::new(LAYER_DIMS[0], Some(ActFn::Relu)),
            dropout: Dropout::new(DROPOUT_P, seed),
            fc2: Dense::new(LAYER_DIMS[1], Some(ActFn::Relu)),
            fc3: Dense::new(LAYER_DIMS[2], None),
            out: LogSoftmax::default(),
            layout: Self::param_layout(),
        }
    }

    /// Layout of the flat parameter buffer: per-layer weight matrices in
    /// `[fan_in, fan_out]` orientation, each followed by its bias vector.
    pub fn param_layout() -> ParamLayout {
        ParamLayout::new([
            ("fc1.weight", vec![INPUT_WIDTH, HIDDEN_1]),
            ("fc1.bias", vec![HIDDEN_1]),
            ("fc2.weight", vec![HIDDEN_1, HIDDEN_2]),
            ("fc2.bias", vec![HIDDEN_2]),
            ("fc3.weight", vec![HIDDEN_2, NUM_CLASSES]),
            ("fc3.bias", vec![NUM_CLASSES]),
        ])
    }

    #[inline]
    pub fn layout(&self) -> &ParamLayout {
        &self.layout
    }

    /// Samples a fresh parameter buffer, layer by layer, from the lecun
    /// uniform distribution for that layer's fan-in.
    ///
    /// # Errors
    /// Propagates `MlpErr::InvalidInput` from the underlying sampler.
    pub fn init_params(seed: u64) -> Result<Vec<f32>> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut params = Vec::with_capacity(Self::param_layout().len());
        for &(fan_in, fan_out) in &LAYER_DIMS {
            params.extend(init::lecun_uniform(&mut rng, fan_in, (fan_in + 1) * fan_out)?);
        }
        Ok(params)
    }

    /// Runs the batch through every layer and returns per-class
    /// log-probabilities, one row per sample.
    ///
    /// # Arguments
    /// * `params` - Flat parameter buffer, exactly [`ParamLayout::len`] long.
    /// * `x` - Batch of flattened images, one row of [`INPUT_WIDTH`] each.
    /// * `mode` - Train or eval; controls dropout only.
    ///
    /// # Errors
    /// Returns `MlpErr::ShapeMismatch` if the buffer or the batch has the
    /// wrong size.
    pub fn forward(&mut self, params: &[f32], x: Array2<f32>, mode: Mode) -> Result<Array2<f32>> {
        self.check_buffer("params", params.len())?;
        let (p1, p2, p3) = split_buffer(params, &self.fc1, &self.fc2);

        let a = self.fc1.forward(p1, x)?;
        let a = self.dropout.forward(a, mode);
        let a = self.fc2.forward(p2, a)?;
        let a = self.fc3.forward(p3, a)?;
        Ok(self.out.forward(a))
    }

    /// Backpropagates a loss delta through the layers, writing parameter
    /// gradients into `grads` and consuming the cached forward state.
    ///
    /// # Errors
    /// Returns `MlpErr::ShapeMismatch` on buffer or delta size mismatches
    /// and `MlpErr::InvalidInput` if no forward pass preceded this call.
    pub fn backward(
        &mut self,
        params: &[f32],
        grads: &mut [f32],
        d: Array2<f32>,
    ) -> Result<Array2<f32>> {
        self.check_buffer("params", params.len())?;
        self.check_buffer("grads", grads.len())?;
        let (p1, p2, p3) = split_buffer(params, &self.fc1, &self.fc2);
        let (g1, rest) = grads.split_at_mut(self.fc1.size());
        let (g2, g3) = rest.split_at_mut(self.fc2.size());

        let d = self.out.backward(d)?;
        let d = self.fc3.backward(p3, g3, d)?;
        let d = self.fc2.backward(p2, g2, d)?;
        let d = self.dropout.backward(d)?;
        self.fc1.backward(p1, g1, d)
    }

    fn check_buffer(&self, what: &'static str, got: usize) -> Result<()> {
        if got != self.layout.len() {
            return Err(MlpErr::ShapeMismatch { what, got, expected: self.layout.len() });
        }
        Ok(())
    }
}

#[inline]
fn split_buffer<'a>(buf: &'a [f32], fc1: &Dense, fc2: &Dense) -> (&'a [f32], &'a [f32], &'a [f32]) {
    let (first, rest) = buf.split_at(fc1.size());
    let (second, third) = rest.split_at(fc2.size());
    (first, second, third)
}
