pub mod input;
mod log;
pub mod output;
pub mod program;
pub mod scenario;
mod smps;
pub mod solver;
pub mod subproblem;
pub mod system;
pub mod tree;
pub mod utils;
use input::Input;
use program::{ScenarioEvaluation, StochasticProgram};
use rayon::prelude::*;
use std::error::Error;
use std::time::Instant;

pub fn run(input_args: &InputArgs) -> Result<(), Box<dyn Error>> {
    log::show_greeting();

    let begin = Instant::now();
    let input = Input::build(&input_args.path);
    let config = &input.config;

    log::input_reading_line(&input_args.path);

    let system = input.system.build_system();
    let sampler = input.recourse.build_demand_sampler(&system);

    let mut program = StochasticProgram::new(system);
    let tree = program.build_scenario_tree(&sampler, config.seed);
    log::tree_building_line(tree.num_scenarios());

    log::evaluation_greeting();
    let scenario_names = program.scenario_names();
    let evaluations: Vec<ScenarioEvaluation> = scenario_names
        .par_iter()
        .map(|scenario_name| {
            let instance = program.create_instance(scenario_name);
            let realization = instance.solve(&program.system);
            ScenarioEvaluation::new(
                instance.name,
                instance.probability,
                realization,
            )
        })
        .collect();

    let mean: f64 = evaluations
        .iter()
        .map(|e| e.probability * e.realization.total_objective)
        .sum();
    let variance: f64 = evaluations
        .iter()
        .map(|e| {
            e.probability * (e.realization.total_objective - mean).powi(2)
        })
        .sum();
    log::evaluation_stats(mean, variance.sqrt());

    log::output_generation_line(&input_args.path);
    output::generate_outputs(&evaluations, &input_args.path)?;
    if config.export_smps {
        smps::export_smps(
            &program.system,
            program.tree().unwrap(),
            program.sample_data().unwrap(),
            &input_args.path,
        )?;
    }

    log::show_farewell(begin.elapsed());

    Ok(())
}

pub struct InputArgs {
    pub path: String,
}

impl InputArgs {
    pub fn build(args: &[String]) -> Result<Self, &'static str> {
        if args.len() < 2 {
            return Err("Not enough arguments [PATH]");
        }

        let path = args[1].clone();

        Ok(Self { path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_input_args() {
        let args =
            vec!["recourse".to_string(), "example".to_string()];
        let input_args = InputArgs::build(&args).unwrap();
        assert_eq!(input_args.path, "example");
    }

    #[test]
    fn test_build_input_args_without_path() {
        let args = vec!["recourse".to_string()];
        assert!(InputArgs::build(&args).is_err());
    }
}
