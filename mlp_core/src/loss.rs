use ndarray::Array2;

use crate::error::{MlpErr, Result};

/// Mean negative log-likelihood of the target classes under the given
/// log-probabilities: `-mean(logp[i, target_i])`.
///
/// # Errors
/// Returns `MlpErr::ShapeMismatch` if `targets` and `log_probs` disagree
/// on the batch size, and `MlpErr::InvalidInput` for an empty batch or an
/// out-of-range class label.
pub fn nll_loss(log_probs: &Array2<f32>, targets: &[u8]) -> Result<f32> {
    check_batch(log_probs, targets)?;

    let mut sum = 0.0;
    for (i, &t) in targets.iter().enumerate() {
        sum -= log_probs[(i, class_index(log_probs, t)?)];
    }

    Ok(sum / targets.len() as f32)
}

/// Gradient of [`nll_loss`] with respect to the log-probabilities:
/// `-1/batch_size` at each `(i, target_i)`, zero elsewhere.
///
/// # Errors
/// Same conditions as [`nll_loss`].
pub fn nll_loss_prime(log_probs: &Array2<f32>, targets: &[u8]) -> Result<Array2<f32>> {
    check_batch(log_probs, targets)?;

    let scale = 1.0 / targets.len() as f32;
    let mut d = Array2::zeros(log_probs.dim());
    for (i, &t) in targets.iter().enumerate() {
        d[(i, class_index(log_probs, t)?)] = -scale;
    }

    Ok(d)
}

fn check_batch(log_probs: &Array2<f32>, targets: &[u8]) -> Result<()> {
    if targets.len() != log_probs.nrows() {
        return Err(MlpErr::ShapeMismatch {
            what: "targets",
            got: targets.len(),
            expected: log_probs.nrows(),
        });
    }
    if targets.is_empty() {
        return Err(MlpErr::InvalidInput("empty batch"));
    }
    Ok(())
}

fn class_index(log_probs: &Array2<f32>, t: u8) -> Result<usize> {
    let t = t as usize;
    if t >= log_probs.ncols() {
        return Err(MlpErr::InvalidInput("class label out of range"));
    }
    Ok(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn uniform_distribution_costs_ln_c() {
        let c = 10;
        let logp = Array2::from_elem((4, c), -(c as f32).ln());
        let loss = nll_loss(&logp, &[0, 3, 7, 9]).unwrap();
        assert!((loss - (c as f32).ln()).abs() < 1e-5);
    }

    #[test]
    fn confident_correct_prediction_costs_little() {
        let logp = array![[-0.001f32, -7.0, -8.0]];
        let loss = nll_loss(&logp, &[0]).unwrap();
        assert!(loss >= 0.0);
        assert!(loss < 0.01);
    }

    #[test]
    fn prime_marks_target_entries() {
        let logp = Array2::from_elem((2, 3), -1.0f32);
        let d = nll_loss_prime(&logp, &[1, 0]).unwrap();

        assert_eq!(d[(0, 1)], -0.5);
        assert_eq!(d[(1, 0)], -0.5);
        assert_eq!(d.iter().filter(|&&v| v != 0.0).count(), 2);
    }

    #[test]
    fn batch_size_mismatch_is_rejected() {
        let logp = Array2::from_elem((2, 3), -1.0f32);
        let err = nll_loss(&logp, &[0]).unwrap_err();
        assert_eq!(err, MlpErr::ShapeMismatch { what: "targets", got: 1, expected: 2 });
    }

    #[test]
    fn out_of_range_label_is_rejected() {
        let logp = Array2::from_elem((1, 3), -1.0f32);
        assert_eq!(
            nll_loss(&logp, &[3]).unwrap_err(),
            MlpErr::InvalidInput("class label out of range")
        );
    }

    #[test]
    fn empty_batch_is_rejected() {
        let logp = Array2::zeros((0, 3));
        assert_eq!(nll_loss(&logp, &[]).unwrap_err(), MlpErr::InvalidInput("empty batch"));
    }
}
