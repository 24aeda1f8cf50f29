mod dense;
mod dropout;
mod log_softmax;

pub use dense::Dense;
pub use dropout::Dropout;
pub use log_softmax::LogSoftmax;
