//! Writes the stochastic program in SMPS form (core, time and stoch
//! files) so external stochastic solvers can consume the same instance.
//!
//! The core file is a plain MPS file with one coefficient per record.
//! The time file assigns production columns to the first period and
//! everything else to the second. The stoch file enumerates the sampled
//! scenarios as a SCENARIOS DISCRETE section, one block per leaf with
//! its probability and demand RHS records.

use crate::scenario;
use crate::system;
use crate::tree;
use std::error::Error;
use std::fmt::Write as FmtWrite;
use std::fs;

fn production_column_name(product_id: usize) -> String {
    format!("X{}", product_id + 1)
}

fn surplus_column_name(product_id: usize) -> String {
    format!("V{}", product_id + 1)
}

fn shortage_column_name(demand_id: usize) -> String {
    format!("U{}", demand_id + 1)
}

fn allocation_column_name(substitution: &system::Substitution) -> String {
    format!(
        "W{}{}",
        substitution.product_id + 1,
        substitution.demand_id + 1
    )
}

fn demand_row_name(demand_id: usize) -> String {
    format!("D{}", demand_id + 1)
}

fn supply_row_name(product_id: usize) -> String {
    format!("S{}", product_id + 1)
}

const OBJECTIVE_ROW_NAME: &str = "COST";

fn push_column_record(
    contents: &mut String,
    column_name: &str,
    row_name: &str,
    value: f64,
) {
    writeln!(
        contents,
        "    {:<10}{:<10}{:.6}",
        column_name, row_name, value
    )
    .unwrap();
}

fn core_file_contents(
    system: &system::System,
    demand_means: &[f64],
    problem_name: &str,
) -> String {
    let mut contents = String::new();
    writeln!(contents, "NAME          {}", problem_name).unwrap();

    writeln!(contents, "ROWS").unwrap();
    writeln!(contents, " N  {}", OBJECTIVE_ROW_NAME).unwrap();
    for demand in system.demands.iter() {
        writeln!(contents, " E  {}", demand_row_name(demand.id)).unwrap();
    }
    for product in system.products.iter() {
        writeln!(contents, " E  {}", supply_row_name(product.id)).unwrap();
    }

    writeln!(contents, "COLUMNS").unwrap();
    for product in system.products.iter() {
        let name = production_column_name(product.id);
        push_column_record(
            &mut contents,
            &name,
            OBJECTIVE_ROW_NAME,
            product.production_cost,
        );
        push_column_record(
            &mut contents,
            &name,
            &supply_row_name(product.id),
            -1.0,
        );
    }
    for product in system.products.iter() {
        let name = surplus_column_name(product.id);
        push_column_record(
            &mut contents,
            &name,
            OBJECTIVE_ROW_NAME,
            product.holding_cost,
        );
        push_column_record(
            &mut contents,
            &name,
            &supply_row_name(product.id),
            1.0,
        );
    }
    for demand in system.demands.iter() {
        let name = shortage_column_name(demand.id);
        push_column_record(
            &mut contents,
            &name,
            OBJECTIVE_ROW_NAME,
            demand.shortage_cost,
        );
        push_column_record(
            &mut contents,
            &name,
            &demand_row_name(demand.id),
            1.0,
        );
    }
    for substitution in system.substitutions.iter() {
        let name = allocation_column_name(substitution);
        push_column_record(
            &mut contents,
            &name,
            OBJECTIVE_ROW_NAME,
            -substitution.revenue,
        );
        push_column_record(
            &mut contents,
            &name,
            &demand_row_name(substitution.demand_id),
            1.0,
        );
        push_column_record(
            &mut contents,
            &name,
            &supply_row_name(substitution.product_id),
            1.0,
        );
    }

    writeln!(contents, "RHS").unwrap();
    for demand in system.demands.iter() {
        push_column_record(
            &mut contents,
            "RHS",
            &demand_row_name(demand.id),
            demand_means[demand.id],
        );
    }

    writeln!(contents, "BOUNDS").unwrap();
    for product in system.products.iter() {
        writeln!(
            contents,
            " UP BND       {:<10}{:.6}",
            production_column_name(product.id),
            product.max_production
        )
        .unwrap();
    }

    writeln!(contents, "ENDATA").unwrap();
    contents
}

fn time_file_contents(
    system: &system::System,
    problem_name: &str,
) -> String {
    let mut contents = String::new();
    writeln!(contents, "TIME          {}", problem_name).unwrap();
    writeln!(contents, "PERIODS       IMPLICIT").unwrap();
    writeln!(
        contents,
        "    {:<10}{:<10}STAGE1",
        production_column_name(0),
        OBJECTIVE_ROW_NAME
    )
    .unwrap();
    writeln!(
        contents,
        "    {:<10}{:<10}STAGE2",
        surplus_column_name(0),
        demand_row_name(system.demands[0].id)
    )
    .unwrap();
    writeln!(contents, "ENDATA").unwrap();
    contents
}

fn stoch_file_contents(
    tree: &tree::ScenarioTree,
    sample_data: &scenario::SampleData,
    problem_name: &str,
) -> String {
    let mut contents = String::new();
    writeln!(contents, "STOCH         {}", problem_name).unwrap();
    writeln!(contents, "SCENARIOS     DISCRETE").unwrap();
    for scenario_name in tree.scenario_names() {
        let probability = tree.probability_of(scenario_name).unwrap();
        writeln!(
            contents,
            " SC {:<10}{:<10}{:<10.6}STAGE2",
            scenario_name, "ROOT", probability
        )
        .unwrap();
        let pairs = sample_data.get(scenario_name).unwrap_or_else(|| {
            panic!("Scenario {} has no sampled data", scenario_name)
        });
        for (demand_id, value) in pairs.iter() {
            push_column_record(
                &mut contents,
                "RHS",
                &demand_row_name(*demand_id),
                *value,
            );
        }
    }
    writeln!(contents, "ENDATA").unwrap();
    contents
}

/// Mean sampled value per demand over all scenarios, used as the core
/// file's reference RHS.
fn demand_means(
    tree: &tree::ScenarioTree,
    sample_data: &scenario::SampleData,
    num_demands: usize,
) -> Vec<f64> {
    let mut means = vec![0.0; num_demands];
    let num_scenarios = tree.num_scenarios();
    for scenario_name in tree.scenario_names() {
        let pairs = sample_data.get(scenario_name).unwrap();
        for (demand_id, value) in pairs.iter() {
            means[*demand_id] += value / num_scenarios as f64;
        }
    }
    means
}

pub fn export_smps(
    system: &system::System,
    tree: &tree::ScenarioTree,
    sample_data: &scenario::SampleData,
    path: &str,
) -> Result<(), Box<dyn Error>> {
    let problem_name = "RECOURSE";
    let means = demand_means(tree, sample_data, system.meta.demands_count);
    fs::write(
        path.to_owned() + "/problem.cor",
        core_file_contents(system, &means, problem_name),
    )?;
    fs::write(
        path.to_owned() + "/problem.tim",
        time_file_contents(system, problem_name),
    )?;
    fs::write(
        path.to_owned() + "/problem.sto",
        stoch_file_contents(tree, sample_data, problem_name),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {

    use super::*;

    fn default_tree_and_samples(
    ) -> (tree::ScenarioTree, scenario::SampleData) {
        let tree = tree::generate_scenario_tree(2);
        let mut sample_data = scenario::SampleData::new();
        sample_data
            .set_scenario_samples("s_1", vec![(0, 150.0), (1, 80.0)]);
        sample_data
            .set_scenario_samples("s_2", vec![(0, 170.0), (1, 60.0)]);
        (tree, sample_data)
    }

    #[test]
    fn test_core_file_sections() {
        let system = system::System::default();
        let contents =
            core_file_contents(&system, &[160.0, 70.0], "RECOURSE");
        assert!(contents.starts_with("NAME          RECOURSE"));
        assert!(contents.contains("ROWS"));
        assert!(contents.contains(" N  COST"));
        assert!(contents.contains(" E  D1"));
        assert!(contents.contains(" E  S2"));
        assert!(contents.contains("COLUMNS"));
        assert!(contents.contains("X1"));
        assert!(contents.contains("W12"));
        assert!(contents.contains("BOUNDS"));
        assert!(contents.contains("ENDATA"));
    }

    #[test]
    fn test_core_file_objective_records() {
        let system = system::System::default();
        let contents =
            core_file_contents(&system, &[160.0, 70.0], "RECOURSE");
        assert!(contents.contains("X1        COST      4.000000"));
        assert!(contents.contains("W11       COST      -8.000000"));
        assert!(contents.contains("U2        COST      10.000000"));
    }

    #[test]
    fn test_time_file_periods() {
        let system = system::System::default();
        let contents = time_file_contents(&system, "RECOURSE");
        assert!(contents.contains("PERIODS       IMPLICIT"));
        assert!(contents.contains("X1        COST      STAGE1"));
        assert!(contents.contains("V1        D1        STAGE2"));
    }

    #[test]
    fn test_stoch_file_scenario_blocks() {
        let (tree, sample_data) = default_tree_and_samples();
        let contents = stoch_file_contents(&tree, &sample_data, "RECOURSE");
        assert!(contents.contains("SCENARIOS     DISCRETE"));
        assert!(contents.contains("SC s_1"));
        assert!(contents.contains("SC s_2"));
        assert!(contents.contains("RHS       D1        150.000000"));
        assert!(contents.contains("RHS       D2        60.000000"));
    }

    #[test]
    fn test_demand_means_over_scenarios() {
        let (tree, sample_data) = default_tree_and_samples();
        let means = demand_means(&tree, &sample_data, 2);
        assert!((means[0] - 160.0).abs() < 1e-9);
        assert!((means[1] - 70.0).abs() < 1e-9);
    }
}
