use crate::program;

use csv::Writer;
use serde;
use std::error::Error;

#[derive(serde::Serialize)]
struct ScenarioDemandOutput {
    scenario: String,
    demand_index: usize,
    sampled_value: f64,
}

fn write_sampled_scenarios(
    evaluations: &Vec<program::ScenarioEvaluation>,
    path: &str,
) -> Result<(), Box<dyn Error>> {
    let mut wtr = Writer::from_path(&(path.to_owned() + "/scenarios.csv"))?;
    for evaluation in evaluations.iter() {
        for (demand_index, value) in
            evaluation.realization.demands.iter().enumerate()
        {
            wtr.serialize(ScenarioDemandOutput {
                scenario: evaluation.name.clone(),
                demand_index,
                sampled_value: *value,
            })?;
        }
    }
    wtr.flush()?;
    Ok(())
}

#[derive(serde::Serialize)]
struct ProductEvaluationOutput {
    scenario: String,
    product_index: usize,
    production: f64,
    surplus: f64,
}

fn write_products_evaluation_results(
    evaluations: &Vec<program::ScenarioEvaluation>,
    path: &str,
) -> Result<(), Box<dyn Error>> {
    let mut wtr =
        Writer::from_path(&(path.to_owned() + "/evaluation_products.csv"))?;
    for evaluation in evaluations.iter() {
        let num_products = evaluation.realization.production.len();
        for product_index in 0..num_products {
            wtr.serialize(ProductEvaluationOutput {
                scenario: evaluation.name.clone(),
                product_index,
                production: evaluation.realization.production
                    [product_index],
                surplus: evaluation.realization.surplus[product_index],
            })?;
        }
    }
    wtr.flush()?;
    Ok(())
}

#[derive(serde::Serialize)]
struct DemandEvaluationOutput {
    scenario: String,
    demand_index: usize,
    demand: f64,
    shortage: f64,
    marginal_value: f64,
}

fn write_demands_evaluation_results(
    evaluations: &Vec<program::ScenarioEvaluation>,
    path: &str,
) -> Result<(), Box<dyn Error>> {
    let mut wtr =
        Writer::from_path(&(path.to_owned() + "/evaluation_demands.csv"))?;
    for evaluation in evaluations.iter() {
        let num_demands = evaluation.realization.demands.len();
        for demand_index in 0..num_demands {
            wtr.serialize(DemandEvaluationOutput {
                scenario: evaluation.name.clone(),
                demand_index,
                demand: evaluation.realization.demands[demand_index],
                shortage: evaluation.realization.shortage[demand_index],
                marginal_value: evaluation.realization.demand_marginal
                    [demand_index],
            })?;
        }
    }
    wtr.flush()?;
    Ok(())
}

#[derive(serde::Serialize)]
struct AllocationEvaluationOutput {
    scenario: String,
    substitution_index: usize,
    allocation: f64,
}

fn write_allocations_evaluation_results(
    evaluations: &Vec<program::ScenarioEvaluation>,
    path: &str,
) -> Result<(), Box<dyn Error>> {
    let mut wtr = Writer::from_path(
        &(path.to_owned() + "/evaluation_allocations.csv"),
    )?;
    for evaluation in evaluations.iter() {
        let num_substitutions = evaluation.realization.allocation.len();
        for substitution_index in 0..num_substitutions {
            wtr.serialize(AllocationEvaluationOutput {
                scenario: evaluation.name.clone(),
                substitution_index,
                allocation: evaluation.realization.allocation
                    [substitution_index],
            })?;
        }
    }
    wtr.flush()?;
    Ok(())
}

#[derive(serde::Serialize)]
struct CostEvaluationOutput {
    scenario: String,
    probability: f64,
    first_stage_cost: f64,
    second_stage_cost: f64,
    total_objective: f64,
}

fn write_costs_evaluation_results(
    evaluations: &Vec<program::ScenarioEvaluation>,
    path: &str,
) -> Result<(), Box<dyn Error>> {
    let mut wtr =
        Writer::from_path(&(path.to_owned() + "/evaluation_costs.csv"))?;
    for evaluation in evaluations.iter() {
        wtr.serialize(CostEvaluationOutput {
            scenario: evaluation.name.clone(),
            probability: evaluation.probability,
            first_stage_cost: evaluation.realization.first_stage_cost,
            second_stage_cost: evaluation.realization.second_stage_cost,
            total_objective: evaluation.realization.total_objective,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn generate_outputs(
    evaluations: &Vec<program::ScenarioEvaluation>,
    path: &str,
) -> Result<(), Box<dyn Error>> {
    write_sampled_scenarios(evaluations, path)?;
    write_products_evaluation_results(evaluations, path)?;
    write_demands_evaluation_results(evaluations, path)?;
    write_allocations_evaluation_results(evaluations, path)?;
    write_costs_evaluation_results(evaluations, path)?;
    Ok(())
}
