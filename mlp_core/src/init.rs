use rand::Rng;
use rand_distr::{Distribution, Uniform};

use crate::error::{MlpErr, Result};

/// Samples `n` values from a LeCun-style uniform distribution with range
/// `±sqrt(3 / fan_in)`.
///
/// # Arguments
/// * `rng` - A random number generator.
/// * `fan_in` - The number of input units feeding the tensor.
/// * `n` - The number of values to sample.
///
/// # Errors
/// Returns `MlpErr::InvalidInput` if the computed range is not a valid
/// uniform interval (e.g. `fan_in` is 0).
pub fn lecun_uniform<R: Rng>(rng: &mut R, fan_in: usize, n: usize) -> Result<Vec<f32>> {
    let range = (3.0 / fan_in as f32).sqrt();
    let dist = Uniform::new(-range, range)
        .map_err(|_| MlpErr::InvalidInput("invalid uniform init range"))?;

    Ok((0..n).map(|_| dist.sample(rng)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn respects_the_fan_in_bound() {
        let mut rng = StdRng::seed_from_u64(42);
        let bound = (3.0f32 / 12.0).sqrt();

        let sample = lecun_uniform(&mut rng, 12, 1000).unwrap();
        assert_eq!(sample.len(), 1000);
        assert!(sample.iter().all(|v| v.abs() <= bound));
    }

    #[test]
    fn deterministic_for_a_seed() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        assert_eq!(
            lecun_uniform(&mut a, 8, 64).unwrap(),
            lecun_uniform(&mut b, 8, 64).unwrap()
        );
    }

    #[test]
    fn zero_fan_in_is_rejected() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(lecun_uniform(&mut rng, 0, 4).is_err());
    }
}
