use crate::scenario;
use crate::system;
use rand_distr::Normal;
use serde::Deserialize;
use serde_json;
use std::fs;

#[derive(Deserialize)]
pub struct Config {
    pub seed: u64,
    pub export_smps: bool,
}

pub fn read_config_input(filepath: &str) -> Config {
    let contents =
        fs::read_to_string(filepath).expect("Error while reading config file");
    let parsed: Config = serde_json::from_str(&contents).unwrap();
    parsed
}

#[derive(Deserialize)]
pub struct ProductInput {
    pub id: usize,
    pub production_cost: f64,
    pub max_production: f64,
    pub holding_cost: f64,
}

#[derive(Deserialize)]
pub struct DemandInput {
    pub id: usize,
    pub shortage_cost: f64,
}

#[derive(Deserialize)]
pub struct SubstitutionInput {
    pub id: usize,
    pub product_id: usize,
    pub demand_id: usize,
    pub revenue: f64,
}

#[derive(Deserialize)]
pub struct SystemInput {
    pub products: Vec<ProductInput>,
    pub demands: Vec<DemandInput>,
    pub substitutions: Vec<SubstitutionInput>,
}

pub fn read_system_input(filepath: &str) -> SystemInput {
    let contents =
        fs::read_to_string(filepath).expect("Error while reading system file");
    let parsed: SystemInput = serde_json::from_str(&contents).unwrap();
    parsed
}

fn validate_id_range(ids: &[usize], elem_name: &str) {
    let num_elements = ids.len();
    for elem_id in 0..num_elements {
        if ids.iter().find(|id| **id == elem_id).is_none() {
            panic!("ID {} not found for {}", elem_id, elem_name);
        }
    }
}

fn validate_entity_count(ids: &[usize], count: usize, elem_name: &str) {
    let entity_count = ids.len();
    if entity_count != count {
        panic!(
            "Error matching recourse for {}: {} != {}",
            elem_name, entity_count, count
        );
    }
}

impl SystemInput {
    pub fn build_system(&self) -> system::System {
        // ensure valid id ranges (0..)
        let product_ids: Vec<usize> =
            self.products.iter().map(|p| p.id).collect();
        let demand_ids: Vec<usize> =
            self.demands.iter().map(|d| d.id).collect();
        let substitution_ids: Vec<usize> =
            self.substitutions.iter().map(|s| s.id).collect();
        validate_id_range(&product_ids, "products");
        validate_id_range(&demand_ids, "demands");
        validate_id_range(&substitution_ids, "substitutions");

        let num_products = product_ids.len();
        let mut products =
            Vec::<system::Product>::with_capacity(num_products);
        for id in 0..num_products {
            let product = self.products.iter().find(|p| p.id == id).unwrap();
            products.push(system::Product::new(
                id,
                product.production_cost,
                product.max_production,
                product.holding_cost,
            ));
        }

        let num_demands = demand_ids.len();
        let mut demands = Vec::<system::Demand>::with_capacity(num_demands);
        for id in 0..num_demands {
            let demand = self.demands.iter().find(|d| d.id == id).unwrap();
            demands.push(system::Demand::new(id, demand.shortage_cost));
        }

        let num_substitutions = substitution_ids.len();
        let mut substitutions =
            Vec::<system::Substitution>::with_capacity(num_substitutions);
        for id in 0..num_substitutions {
            let substitution =
                self.substitutions.iter().find(|s| s.id == id).unwrap();
            if substitution.product_id >= num_products {
                panic!(
                    "Substitution {} references unknown product {}",
                    id, substitution.product_id
                );
            }
            if substitution.demand_id >= num_demands {
                panic!(
                    "Substitution {} references unknown demand {}",
                    id, substitution.demand_id
                );
            }
            substitutions.push(system::Substitution::new(
                id,
                substitution.product_id,
                substitution.demand_id,
                substitution.revenue,
            ));
        }

        system::System::new(products, demands, substitutions)
    }
}

#[derive(Deserialize)]
pub struct NormalParams {
    pub mu: f64,
    pub sigma: f64,
}

#[derive(Deserialize)]
pub struct DemandDistribution {
    pub demand_id: usize,
    pub normal: NormalParams,
}

#[derive(Deserialize)]
pub struct Recourse {
    pub demand_distributions: Vec<DemandDistribution>,
}

pub fn read_recourse_input(filepath: &str) -> Recourse {
    let contents = fs::read_to_string(filepath)
        .expect("Error while reading recourse file");
    let parsed: Recourse = serde_json::from_str(&contents).unwrap();
    parsed
}

impl Recourse {
    pub fn build_demand_sampler(
        &self,
        system: &system::System,
    ) -> scenario::DemandSampler {
        let num_demands = system.meta.demands_count;
        let distribution_demand_ids: Vec<usize> = self
            .demand_distributions
            .iter()
            .map(|d| d.demand_id)
            .collect();
        validate_id_range(&distribution_demand_ids, "demand distributions");
        validate_entity_count(
            distribution_demand_ids.as_slice(),
            num_demands,
            "demand distributions",
        );
        let mut distributions =
            Vec::<Normal<f64>>::with_capacity(num_demands);
        for id in 0..num_demands {
            let d = self
                .demand_distributions
                .iter()
                .find(|d| d.demand_id == id)
                .unwrap();
            distributions
                .push(Normal::new(d.normal.mu, d.normal.sigma).unwrap());
        }
        scenario::DemandSampler::new(distributions)
    }
}

pub struct Input {
    pub config: Config,
    pub system: SystemInput,
    pub recourse: Recourse,
}

impl Input {
    pub fn build(path: &str) -> Self {
        let config = read_config_input(&(path.to_owned() + "/config.json"));
        let system = read_system_input(&(path.to_owned() + "/system.json"));
        let recourse =
            read_recourse_input(&(path.to_owned() + "/recourse.json"));
        return Self {
            config,
            system,
            recourse,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_config() {
        let filepath = "example/config.json";
        let config = read_config_input(filepath);
        assert_eq!(config.seed, 0);
        assert_eq!(config.export_smps, true);
    }

    #[test]
    fn test_read_system() {
        let filepath = "example/system.json";
        let system = read_system_input(filepath);
        assert_eq!(system.products.len(), 2);
        assert_eq!(system.demands.len(), 2);
        assert_eq!(system.substitutions.len(), 3);
    }

    #[test]
    fn test_build_system() {
        let filepath = "example/system.json";
        let system_input = read_system_input(filepath);
        let system = system_input.build_system();
        assert_eq!(system.products[0].max_production, 217.0);
        assert_eq!(system.substitutions[0].revenue, 8.0);
    }

    #[test]
    fn test_read_recourse() {
        let filepath = "example/recourse.json";
        let recourse = read_recourse_input(filepath);
        assert_eq!(recourse.demand_distributions.len(), 2);
        assert_eq!(recourse.demand_distributions[0].normal.mu, 150.0);
    }

    #[test]
    fn test_build_demand_sampler() {
        let system_input = read_system_input("example/system.json");
        let system = system_input.build_system();
        let recourse = read_recourse_input("example/recourse.json");
        let sampler = recourse.build_demand_sampler(&system);
        assert_eq!(sampler.num_demands, 2);
    }

    #[test]
    fn test_read_input() {
        let path = "example";
        let input = Input::build(path);
        assert_eq!(input.config.seed, 0);
    }
}
