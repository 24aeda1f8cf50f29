/// Persistent flat buffers reused across steps to avoid per-iteration
/// allocations.
#[derive(Debug)]
pub struct TrainState {
    /// Model parameters (flat, layout order).
    pub params: Vec<f32>,

    /// Gradient buffer (flat, same layout).
    pub grads: Vec<f32>,
}

impl TrainState {
    /// Wraps an initialized or loaded parameter buffer with a zeroed
    /// gradient buffer of the same length.
    pub fn new(params: Vec<f32>) -> Self {
        let grads = vec![0.0; params.len()];
        Self { params, grads }
    }

    #[inline]
    pub fn zero_grads(&mut self) {
        self.grads.fill(0.0);
    }
}
