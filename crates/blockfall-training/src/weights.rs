//! Weight vector operations for the genetic algorithm.
//!
//! These are the building blocks used by
//! [`PopulationEvolver`](crate::genetic::PopulationEvolver):
//!
//! - **Initialization**: [`random`] draws every component from `U(-1, 1)`
//! - **Crossover**: [`single_point_crossover`] splices two parents at one cut point
//! - **Mutation**: [`mutate`] perturbs components by bounded uniform noise
//!
//! Weights are never normalized or clamped. A linear evaluator only ranks
//! placements, so the scale of a vector does not change the moves it picks,
//! and negative components are what penalize holes and height.

use blockfall_evaluator::{board_feature::BoardFeature, placement_evaluator::FeatureWeights};
use rand::Rng;

/// Number of components in a weight vector.
pub const LEN: usize = BoardFeature::LEN;

/// Range of valid crossover cut points: both parents contribute at least one gene.
pub const CROSSOVER_POINTS: std::ops::Range<usize> = 1..LEN;

/// Generates a weight vector with every component uniform in `[-1, 1]`.
pub fn random<R>(rng: &mut R) -> FeatureWeights
where
    R: Rng + ?Sized,
{
    FeatureWeights::new(std::array::from_fn(|_| rng.random_range(-1.0..=1.0)))
}

/// Takes the first `point` components from `p1` and the rest from `p2`.
///
/// # Panics
///
/// Panics if `point` is greater than [`LEN`].
#[must_use]
pub fn single_point_crossover(
    p1: &FeatureWeights,
    p2: &FeatureWeights,
    point: usize,
) -> FeatureWeights {
    assert!(point <= LEN, "crossover point {point} out of range");
    let (head, tail) = (p1.as_array(), p2.as_array());
    FeatureWeights::new(std::array::from_fn(|i| {
        if i < point { head[i] } else { tail[i] }
    }))
}

/// Crossover at a cut point drawn from [`CROSSOVER_POINTS`].
pub fn random_crossover<R>(
    p1: &FeatureWeights,
    p2: &FeatureWeights,
    rng: &mut R,
) -> FeatureWeights
where
    R: Rng + ?Sized,
{
    single_point_crossover(p1, p2, rng.random_range(CROSSOVER_POINTS))
}

/// Mutates `weights` in place.
///
/// Each component is independently chosen with probability `rate`; a chosen
/// component is shifted by a value drawn from `U(-magnitude, magnitude)`.
pub fn mutate<R>(weights: &mut FeatureWeights, rate: f64, magnitude: f32, rng: &mut R)
where
    R: Rng + ?Sized,
{
    let rate = rate.clamp(0.0, 1.0);
    for w in weights.as_mut_array() {
        if rng.random_bool(rate) && magnitude > 0.0 {
            *w += rng.random_range(-magnitude..magnitude);
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64Mcg;

    use super::*;

    #[test]
    fn test_random_is_within_unit_range() {
        let mut rng = Pcg64Mcg::seed_from_u64(7);
        for _ in 0..100 {
            let weights = random(&mut rng);
            assert!(weights.as_array().iter().all(|w| (-1.0..=1.0).contains(w)));
        }
    }

    #[test]
    fn test_crossover_splices_at_point() {
        let p1 = FeatureWeights::new([1.0; LEN]);
        let p2 = FeatureWeights::new([2.0; LEN]);
        let child = single_point_crossover(&p1, &p2, 2);
        assert_eq!(child.as_array(), &[1.0, 1.0, 2.0, 2.0, 2.0, 2.0]);
    }

    #[test]
    fn test_mutation_rate_zero_is_identity() {
        let mut rng = Pcg64Mcg::seed_from_u64(1);
        let original = random(&mut rng);
        let mut weights = original;
        mutate(&mut weights, 0.0, 0.4, &mut rng);
        assert_eq!(weights, original);
    }

    #[test]
    fn test_mutation_is_bounded_by_magnitude() {
        let mut rng = Pcg64Mcg::seed_from_u64(3);
        let original = random(&mut rng);
        for _ in 0..50 {
            let mut weights = original;
            mutate(&mut weights, 1.0, 0.4, &mut rng);
            for (a, b) in original.as_array().iter().zip(weights.as_array()) {
                assert!((a - b).abs() <= 0.4 + f32::EPSILON);
            }
        }
    }
}
