use ndarray::Array2;

use crate::error::Result;
use crate::loss::{nll_loss, nll_loss_prime};
use crate::net::{Mlp, Mode};

/// Boundary between the training loop and the concrete math.
///
/// The loop hands an implementation one scheduled batch at a time together
/// with the shared parameter and gradient buffers; the implementation is
/// expected to fill `grads` with the gradient of the batch loss and return
/// that loss. Keeping the loop on this seam lets it be exercised in tests
/// with stub steps that never touch a real network.
pub trait TrainStep {
    /// Computes the loss of one batch and writes its parameter gradients.
    ///
    /// # Errors
    /// Implementations return `MlpErr` for buffer or batch shape problems.
    fn step(&mut self, params: &[f32], grads: &mut [f32], xs: Array2<f32>, ys: &[u8])
    -> Result<f32>;
}

/// The real thing: a training-mode forward pass through the network,
/// mean negative log-likelihood, and a full backward pass.
pub struct BackpropStep {
    net: Mlp,
}

impl BackpropStep {
    pub fn new(net: Mlp) -> Self {
        Self { net }
    }
}

impl TrainStep for BackpropStep {
    fn step(
        &mut self,
        params: &[f32],
        grads: &mut [f32],
        xs: Array2<f32>,
        ys: &[u8],
    ) -> Result<f32> {
        let logp = self.net.forward(params, xs, Mode::Train)?;
        let loss = nll_loss(&logp, ys)?;
        let d = nll_loss_prime(&logp, ys)?;
        self.net.backward(params, grads, d)?;
        Ok(loss)
    }
}
