use crate::tree;
use rand::prelude::*;
use rand_distr;
use rand_xoshiro;
use std::collections::HashMap;

pub struct DemandSampler {
    pub distributions: Vec<rand_distr::Normal<f64>>, // indexed by demand_id
    pub num_demands: usize,
}

impl DemandSampler {
    pub fn new(distributions: Vec<rand_distr::Normal<f64>>) -> Self {
        let num_demands = distributions.len();
        Self {
            distributions,
            num_demands,
        }
    }
}

/// Sampled demand values for every scenario in a tree: scenario name
/// mapped to the ordered sequence of (demand id, value) pairs consumed
/// by instance creation.
#[derive(Debug, Clone)]
pub struct SampleData {
    samples: HashMap<String, Vec<(usize, f64)>>,
}

impl SampleData {
    pub fn new() -> Self {
        Self {
            samples: HashMap::new(),
        }
    }

    pub fn get(&self, scenario_name: &str) -> Option<&[(usize, f64)]> {
        self.samples
            .get(scenario_name)
            .map(|pairs| pairs.as_slice())
    }

    pub fn num_scenarios(&self) -> usize {
        self.samples.len()
    }

    pub fn set_scenario_samples(
        &mut self,
        scenario_name: &str,
        pairs: Vec<(usize, f64)>,
    ) {
        self.samples.insert(scenario_name.to_string(), pairs);
    }
}

/// Draws one demand vector per tree leaf. Negative draws are clamped at
/// zero since demands are physical quantities.
pub fn sample_into_tree(
    sampler: &DemandSampler,
    tree: &tree::ScenarioTree,
    seed: u64,
) -> SampleData {
    let mut rng = rand_xoshiro::Xoshiro256Plus::seed_from_u64(seed);

    let mut sample_data = SampleData::new();
    for scenario_name in tree.scenario_names() {
        let pairs: Vec<(usize, f64)> = sampler
            .distributions
            .iter()
            .enumerate()
            .map(|(demand_id, distribution)| {
                (demand_id, distribution.sample(&mut rng).max(0.0))
            })
            .collect();
        sample_data.set_scenario_samples(scenario_name, pairs);
    }

    sample_data
}

#[cfg(test)]
mod tests {

    use super::*;

    fn default_sampler() -> DemandSampler {
        DemandSampler::new(vec![
            rand_distr::Normal::new(150.0, 25.0).unwrap(),
            rand_distr::Normal::new(80.0, 15.0).unwrap(),
        ])
    }

    #[test]
    fn test_sample_into_tree_counts() {
        let sampler = default_sampler();
        let tree = tree::generate_scenario_tree(100);
        let sample_data = sample_into_tree(&sampler, &tree, 0);
        assert_eq!(sample_data.num_scenarios(), 100);
    }

    #[test]
    fn test_sampled_pairs_are_ordered_by_demand_id() {
        let sampler = default_sampler();
        let tree = tree::generate_scenario_tree(10);
        let sample_data = sample_into_tree(&sampler, &tree, 0);
        let pairs = sample_data.get("s_1").unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].0, 0);
        assert_eq!(pairs[1].0, 1);
    }

    #[test]
    fn test_sampled_values_are_non_negative() {
        let sampler = DemandSampler::new(vec![
            rand_distr::Normal::new(0.0, 100.0).unwrap(),
        ]);
        let tree = tree::generate_scenario_tree(100);
        let sample_data = sample_into_tree(&sampler, &tree, 17);
        for scenario_name in tree.scenario_names() {
            let pairs = sample_data.get(scenario_name).unwrap();
            assert!(pairs.iter().all(|(_, value)| *value >= 0.0));
        }
    }

    #[test]
    fn test_sampling_is_reproducible_for_seed() {
        let sampler = default_sampler();
        let tree = tree::generate_scenario_tree(10);
        let first = sample_into_tree(&sampler, &tree, 42);
        let second = sample_into_tree(&sampler, &tree, 42);
        for scenario_name in tree.scenario_names() {
            assert_eq!(
                first.get(scenario_name).unwrap(),
                second.get(scenario_name).unwrap()
            );
        }
    }
}
