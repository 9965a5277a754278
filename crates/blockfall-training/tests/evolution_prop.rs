//! Property tests for the genetic operators.

use blockfall_evaluator::placement_evaluator::FeatureWeights;
use blockfall_training::{
    genetic::{Individual, Population, PopulationEvolver},
    weights,
};
use proptest::prelude::*;
use rand::SeedableRng as _;
use rand_pcg::Pcg64Mcg;

fn arb_weights() -> impl Strategy<Value = FeatureWeights> {
    prop::array::uniform6(-10.0_f32..10.0).prop_map(FeatureWeights::new)
}

proptest! {
    #[test]
    fn crossover_is_prefix_of_first_and_suffix_of_second(
        p1 in arb_weights(),
        p2 in arb_weights(),
        point in weights::CROSSOVER_POINTS,
    ) {
        let child = weights::single_point_crossover(&p1, &p2, point);
        prop_assert_eq!(&child.as_array()[..point], &p1.as_array()[..point]);
        prop_assert_eq!(&child.as_array()[point..], &p2.as_array()[point..]);
    }

    #[test]
    fn random_crossover_mixes_both_parents(
        seed in any::<u64>(),
    ) {
        let p1 = FeatureWeights::new([1.0; weights::LEN]);
        let p2 = FeatureWeights::new([2.0; weights::LEN]);
        let mut rng = Pcg64Mcg::seed_from_u64(seed);
        let child = weights::random_crossover(&p1, &p2, &mut rng);
        let array = child.as_array();
        prop_assert_eq!(array[0], 1.0);
        prop_assert_eq!(array[weights::LEN - 1], 2.0);
        prop_assert!(array.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn evolve_keeps_size_and_elites(
        fitness in prop::collection::vec(0.0_f32..1000.0, 1..40),
        elitism_rate in 0.0_f64..0.5,
        seed in any::<u64>(),
    ) {
        let mut rng = Pcg64Mcg::seed_from_u64(seed);
        let population = Population::from_individuals(
            fitness
                .iter()
                .map(|&f| Individual::random(&mut rng).with_fitness(f))
                .collect(),
        );
        let evolver = PopulationEvolver {
            elitism_rate,
            crossover_rate: 0.8,
            mutation_rate: 0.17,
            mutation_magnitude: 0.4,
        };
        let next = evolver.evolve(&population, &mut rng);
        prop_assert_eq!(next.len(), population.len());

        let elites = evolver.elite_count(population.len());
        let mut ranked = population.individuals().to_vec();
        ranked.sort_by(|a, b| b.fitness().total_cmp(&a.fitness()));
        for (kept, expected) in next.individuals()[..elites].iter().zip(&ranked) {
            prop_assert_eq!(kept.weights(), expected.weights());
            prop_assert_eq!(kept.fitness(), expected.fitness());
        }
    }
}
