use crate::error::{MlpErr, Result};

/// Strategy for folding a batch gradient into the parameters.
pub trait Optimizer {
    /// Updates the flat parameter buffer in place from `grads`.
    ///
    /// # Errors
    /// Returns `MlpErr::ShapeMismatch` if the two buffers disagree in length.
    fn update_params(&mut self, params: &mut [f32], grads: &[f32]) -> Result<()>;
}

/// Plain stochastic gradient descent: `p -= lr * g`.
#[derive(Debug)]
pub struct GradientDescent {
    learning_rate: f32,
}

impl GradientDescent {
    /// # Arguments
    /// * `learning_rate` - The small coefficient that modulates the amount
    ///   of training per update.
    pub fn new(learning_rate: f32) -> Self {
        Self { learning_rate }
    }
}

impl Optimizer for GradientDescent {
    fn update_params(&mut self, params: &mut [f32], grads: &[f32]) -> Result<()> {
        if grads.len() != params.len() {
            return Err(MlpErr::ShapeMismatch {
                what: "grads",
                got: grads.len(),
                expected: params.len(),
            });
        }

        let lr = self.learning_rate;
        for (p, g) in params.iter_mut().zip(grads) {
            *p -= lr * g;
        }

        Ok(())
    }
}
