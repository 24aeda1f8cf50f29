mod activations;
mod error;
mod init;
mod layers;
mod loss;
mod net;
mod optimizer;
mod params;
mod step;

pub use error::{MlpErr, Result};
pub use init::lecun_uniform;
pub use loss::{nll_loss, nll_loss_prime};
pub use net::{INPUT_WIDTH, Mlp, Mode, NUM_CLASSES};
pub use optimizer::{GradientDescent, Optimizer};
pub use params::{ParamLayout, TensorSpec};
pub use step::{BackpropStep, TrainStep};
