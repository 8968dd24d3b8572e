use crate::scenario;
use crate::subproblem;
use crate::system;
use crate::tree;

/// Scenario count requested on every tree build.
pub const NUM_SCENARIOS: usize = 100;

/// Associates a stochastic demand parameter with the demand balance row
/// whose RHS it feeds. Instance creation is the only consumer.
#[derive(Debug, Clone)]
pub struct StochasticRhs {
    pub demand_id: usize,
    pub row: usize,
}

/// The two-stage stochastic program: the base model, the stochastic-RHS
/// registry and the sample data published by the tree build. Instances
/// may only be created after the tree has been built and sampled.
pub struct StochasticProgram {
    pub system: system::System,
    pub base: subproblem::Subproblem,
    stochastic_rhs: Vec<StochasticRhs>,
    tree: Option<tree::ScenarioTree>,
    sample_data: Option<scenario::SampleData>,
}

impl StochasticProgram {
    pub fn new(system: system::System) -> Self {
        let base = subproblem::Subproblem::new(&system);
        let stochastic_rhs = base
            .accessors
            .demand_balance
            .iter()
            .enumerate()
            .map(|(demand_id, row)| StochasticRhs {
                demand_id,
                row: *row,
            })
            .collect();
        Self {
            system,
            base,
            stochastic_rhs,
            tree: None,
            sample_data: None,
        }
    }

    /// Builds the scenario tree, samples demand values into it and
    /// publishes the sample data for instance creation. Intended to run
    /// exactly once per program; a failure here is fatal to the run.
    pub fn build_scenario_tree(
        &mut self,
        sampler: &scenario::DemandSampler,
        seed: u64,
    ) -> &tree::ScenarioTree {
        let tree = tree::generate_scenario_tree(NUM_SCENARIOS);
        tree.validate_probabilities()
            .expect("Error while validating scenario tree probabilities");
        let sample_data = scenario::sample_into_tree(sampler, &tree, seed);
        self.sample_data = Some(sample_data);
        self.tree = Some(tree);
        self.tree.as_ref().unwrap()
    }

    pub fn sample_data(&self) -> Option<&scenario::SampleData> {
        self.sample_data.as_ref()
    }

    pub fn tree(&self) -> Option<&tree::ScenarioTree> {
        self.tree.as_ref()
    }

    pub fn scenario_names(&self) -> Vec<String> {
        match &self.tree {
            Some(tree) => tree
                .scenario_names()
                .iter()
                .map(|name| name.to_string())
                .collect(),
            None => vec![],
        }
    }

    /// Clones the base model into an independent instance and overwrites
    /// every registered stochastic RHS with the scenario's sampled value.
    /// Instances share no mutable state and may be solved concurrently.
    pub fn create_instance(&self, scenario_name: &str) -> ScenarioInstance {
        assert!(
            self.sample_data.is_some(),
            "sample data must be generated before creating instances"
        );
        let sample_data = self.sample_data.as_ref().unwrap();
        let pairs = sample_data.get(scenario_name).unwrap_or_else(|| {
            panic!("Unknown scenario name {}", scenario_name)
        });

        let mut instance = self.base.clone();
        for (demand_id, value) in pairs.iter() {
            // registry lookup: stable structural indices re-applied
            // against the fresh clone
            let registered = self
                .stochastic_rhs
                .iter()
                .find(|rhs| rhs.demand_id == *demand_id)
                .unwrap_or_else(|| {
                    panic!("Demand {} has no registered RHS", demand_id)
                });
            instance.template.set_row_bounds(registered.row, *value, *value);
        }

        let probability = self
            .tree
            .as_ref()
            .unwrap()
            .probability_of(scenario_name)
            .unwrap();

        ScenarioInstance {
            name: scenario_name.to_string(),
            probability,
            subproblem: instance,
        }
    }
}

/// A fully parameterized clone of the base model for a single scenario.
pub struct ScenarioInstance {
    pub name: String,
    pub probability: f64,
    pub subproblem: subproblem::Subproblem,
}

impl ScenarioInstance {
    pub fn solve(
        &self,
        system: &system::System,
    ) -> subproblem::Realization {
        self.subproblem.realize(system)
    }
}

/// A solved scenario instance together with its tree probability.
pub struct ScenarioEvaluation {
    pub name: String,
    pub probability: f64,
    pub realization: subproblem::Realization,
}

impl ScenarioEvaluation {
    pub fn new(
        name: String,
        probability: f64,
        realization: subproblem::Realization,
    ) -> Self {
        Self {
            name,
            probability,
            realization,
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use rand_distr::Normal;

    fn default_sampler() -> scenario::DemandSampler {
        scenario::DemandSampler::new(vec![
            Normal::new(150.0, 25.0).unwrap(),
            Normal::new(80.0, 15.0).unwrap(),
        ])
    }

    #[test]
    #[should_panic(expected = "sample data must be generated")]
    fn test_create_instance_before_tree_build_panics() {
        let program = StochasticProgram::new(system::System::default());
        program.create_instance("s_1");
    }

    #[test]
    fn test_build_scenario_tree_samples_all_scenarios() {
        let mut program = StochasticProgram::new(system::System::default());
        let sampler = default_sampler();
        let tree = program.build_scenario_tree(&sampler, 0);
        assert_eq!(tree.num_scenarios(), NUM_SCENARIOS);
        assert_eq!(
            program.sample_data().unwrap().num_scenarios(),
            NUM_SCENARIOS
        );
    }

    #[test]
    fn test_instance_differs_from_base_only_in_demand_rows() {
        let mut program = StochasticProgram::new(system::System::default());
        let sampler = default_sampler();
        program.build_scenario_tree(&sampler, 0);
        let instance = program.create_instance("s_1");

        let base = &program.base.template;
        let clone = &instance.subproblem.template;
        assert_eq!(base.num_col, clone.num_col);
        assert_eq!(base.num_row, clone.num_row);
        assert_eq!(base.num_nz, clone.num_nz);
        assert_eq!(base.col_cost, clone.col_cost);
        assert_eq!(base.col_lower, clone.col_lower);
        assert_eq!(base.col_upper, clone.col_upper);

        let demand_rows = &program.base.accessors.demand_balance;
        for row in 0..base.num_row {
            if demand_rows.contains(&row) {
                continue;
            }
            assert_eq!(base.row_lower[row], clone.row_lower[row]);
            assert_eq!(base.row_upper[row], clone.row_upper[row]);
        }
    }

    #[test]
    fn test_instances_of_same_scenario_are_independent() {
        let mut program = StochasticProgram::new(system::System::default());
        let sampler = default_sampler();
        program.build_scenario_tree(&sampler, 0);

        let first = program.create_instance("s_1");
        let mut second = program.create_instance("s_1");
        assert_eq!(
            first.subproblem.demand_rhs(),
            second.subproblem.demand_rhs()
        );

        // mutating one clone must not leak into the other
        second.subproblem.set_demand_rhs(0, 999.0);
        assert_ne!(first.subproblem.demand_rhs()[0], 999.0);
    }

    #[test]
    fn test_instance_carries_sampled_demands() {
        let mut program = StochasticProgram::new(system::System::default());
        let sampler = default_sampler();
        program.build_scenario_tree(&sampler, 0);

        let instance = program.create_instance("s_1");
        let pairs = program.sample_data().unwrap().get("s_1").unwrap();
        let rhs = instance.subproblem.demand_rhs();
        for (demand_id, value) in pairs.iter() {
            assert_eq!(rhs[*demand_id], *value);
        }
        assert_eq!(instance.probability, 1.0 / NUM_SCENARIOS as f64);
    }

    #[test]
    fn test_solved_instance_holds_demand_balances() {
        let mut program = StochasticProgram::new(system::System::default());
        let sampler = default_sampler();
        program.build_scenario_tree(&sampler, 0);

        let instance = program.create_instance("s_1");
        let realization = instance.solve(&program.system);
        // d1: w11 + u1 equals the sampled first demand
        let first_demand =
            realization.allocation[0] + realization.shortage[0];
        // d2: w12 + w22 + u2 equals the sampled second demand
        let second_demand = realization.allocation[1]
            + realization.allocation[2]
            + realization.shortage[1];
        assert!((first_demand - realization.demands[0]).abs() < 1e-6);
        assert!((second_demand - realization.demands[1]).abs() < 1e-6);
    }
}
