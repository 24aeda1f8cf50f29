/// Element-wise activation functions usable by a dense layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActFn {
    Relu,
}

impl ActFn {
    /// Applies the activation to a pre-activation value.
    #[inline]
    pub fn f(&self, x: f32) -> f32 {
        match self {
            ActFn::Relu => x.max(0.0),
        }
    }

    /// Derivative of the activation at a pre-activation value.
    #[inline]
    pub fn df(&self, x: f32) -> f32 {
        match self {
            ActFn::Relu => {
                if x > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}
