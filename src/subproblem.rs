use crate::solver;
use crate::system;
use crate::utils;

/// Helper function for setting the same default solver options on
/// every solved instance.
fn set_default_solver_options(model: &mut solver::Model) {
    model.set_option("presolve", "off");
    model.set_option("solver", "simplex");
    model.set_option("parallel", "off");
    model.set_option("threads", 1);
    model.set_option("primal_feasibility_tolerance", 1e-7);
    model.set_option("dual_feasibility_tolerance", 1e-7);
    model.set_option("time_limit", 300);
}

/// First-stage cost expression: production costs over first-stage
/// quantities.
pub fn first_stage_cost(
    system: &system::System,
    production: &[f64],
) -> f64 {
    let costs: Vec<f64> = system
        .products
        .iter()
        .map(|product| product.production_cost)
        .collect();
    utils::dot_product(&costs, production)
}

/// Second-stage (recourse) cost expression: allocation revenues enter as
/// negative costs, surplus holding and demand shortage as positive costs.
pub fn second_stage_cost(
    system: &system::System,
    allocation: &[f64],
    surplus: &[f64],
    shortage: &[f64],
) -> f64 {
    let revenues: Vec<f64> = system
        .substitutions
        .iter()
        .map(|substitution| -substitution.revenue)
        .collect();
    let holding_costs: Vec<f64> = system
        .products
        .iter()
        .map(|product| product.holding_cost)
        .collect();
    let shortage_costs: Vec<f64> = system
        .demands
        .iter()
        .map(|demand| demand.shortage_cost)
        .collect();
    utils::dot_product(&revenues, allocation)
        + utils::dot_product(&holding_costs, surplus)
        + utils::dot_product(&shortage_costs, shortage)
}

/// Helper accessor for indexing desired variables and constraints
/// in each instance. Indices are structural: they survive template
/// cloning and are re-applied against every clone.
#[derive(Debug, Clone)]
pub struct Accessors {
    pub production: Vec<usize>,
    pub surplus: Vec<usize>,
    pub shortage: Vec<usize>,
    pub allocation: Vec<usize>,
    pub demand_balance: Vec<usize>,
    pub supply_balance: Vec<usize>,
}

/// The base model of the two-stage problem: a not-yet-optimised problem
/// template plus the structural indices of its columns and rows. Cloning
/// the subproblem is the deep-copy step behind scenario instances.
#[derive(Debug, Clone)]
pub struct Subproblem {
    pub template: solver::Problem,
    pub accessors: Accessors,
}

impl Subproblem {
    pub fn new(system: &system::System) -> Self {
        let mut pb = solver::Problem::new();

        // VARIABLES
        let production: Vec<usize> = system
            .products
            .iter()
            .map(|product| {
                pb.add_column(
                    product.production_cost,
                    0.0..product.max_production,
                )
            })
            .collect();
        let surplus: Vec<usize> = system
            .products
            .iter()
            .map(|product| pb.add_column(product.holding_cost, 0.0..))
            .collect();
        let shortage: Vec<usize> = system
            .demands
            .iter()
            .map(|demand| pb.add_column(demand.shortage_cost, 0.0..))
            .collect();
        let allocation: Vec<usize> = system
            .substitutions
            .iter()
            .map(|substitution| pb.add_column(-substitution.revenue, 0.0..))
            .collect();

        // Adds demand balance with 0.0 as RHS. The actual demand value is
        // stochastic and written per scenario instance.
        let mut demand_balance: Vec<usize> =
            vec![0; system.meta.demands_count];
        for demand in system.demands.iter() {
            let mut factors: Vec<(usize, f64)> =
                vec![(shortage[demand.id], 1.0)];
            for substitution_id in demand.substitution_ids.iter() {
                factors.push((allocation[*substitution_id], 1.0));
            }
            demand_balance[demand.id] = pb.add_row(0.0..0.0, factors);
        }

        // Adds supply balance with 0.0 as RHS
        let mut supply_balance: Vec<usize> =
            vec![0; system.meta.products_count];
        for product in system.products.iter() {
            let mut factors: Vec<(usize, f64)> = vec![
                (production[product.id], -1.0),
                (surplus[product.id], 1.0),
            ];
            for substitution_id in product.substitution_ids.iter() {
                factors.push((allocation[*substitution_id], 1.0));
            }
            supply_balance[product.id] = pb.add_row(0.0..0.0, factors);
        }

        let accessors = Accessors {
            production,
            surplus,
            shortage,
            allocation,
            demand_balance,
            supply_balance,
        };

        Subproblem {
            template: pb,
            accessors,
        }
    }

    /// Overwrites the RHS of a single demand balance row in the template.
    pub fn set_demand_rhs(&mut self, demand_id: usize, value: f64) {
        let row = self.accessors.demand_balance[demand_id];
        self.template.set_row_bounds(row, value, value);
    }

    /// The demand RHS values currently written in the template, ordered
    /// by demand id.
    pub fn demand_rhs(&self) -> Vec<f64> {
        self.accessors
            .demand_balance
            .iter()
            .map(|row| self.template.row_lower[*row])
            .collect()
    }

    /// Solves the instance with the demand values currently written in
    /// the template and extracts the realization record.
    pub fn realize(&self, system: &system::System) -> Realization {
        let mut model =
            self.template.clone().optimise(solver::Sense::Minimise);
        set_default_solver_options(&mut model);
        model.solve();

        match model.status() {
            solver::HighsModelStatus::Optimal => {
                let solution = model.get_solution();
                let demands = self.demand_rhs();
                let production =
                    self.get_production_from_solution(&solution);
                let surplus = self.get_surplus_from_solution(&solution);
                let shortage = self.get_shortage_from_solution(&solution);
                let allocation =
                    self.get_allocation_from_solution(&solution);
                let demand_marginal =
                    self.get_demand_marginal_from_solution(&solution);
                let first_stage =
                    first_stage_cost(system, &production);
                let second_stage = second_stage_cost(
                    system,
                    &allocation,
                    &surplus,
                    &shortage,
                );
                let total_objective = model.get_objective_value();

                Realization::new(
                    demands,
                    production,
                    surplus,
                    shortage,
                    allocation,
                    demand_marginal,
                    first_stage,
                    second_stage,
                    total_objective,
                )
            }
            _ => panic!("Error while solving scenario instance"),
        }
    }

    pub fn get_production_from_solution(
        &self,
        solution: &solver::Solution,
    ) -> Vec<f64> {
        let first = *self.accessors.production.first().unwrap();
        let last = *self.accessors.production.last().unwrap() + 1;
        solution.colvalue[first..last].to_vec()
    }

    pub fn get_surplus_from_solution(
        &self,
        solution: &solver::Solution,
    ) -> Vec<f64> {
        let first = *self.accessors.surplus.first().unwrap();
        let last = *self.accessors.surplus.last().unwrap() + 1;
        solution.colvalue[first..last].to_vec()
    }

    pub fn get_shortage_from_solution(
        &self,
        solution: &solver::Solution,
    ) -> Vec<f64> {
        let first = *self.accessors.shortage.first().unwrap();
        let last = *self.accessors.shortage.last().unwrap() + 1;
        solution.colvalue[first..last].to_vec()
    }

    pub fn get_allocation_from_solution(
        &self,
        solution: &solver::Solution,
    ) -> Vec<f64> {
        match self.accessors.allocation.is_empty() {
            true => vec![],
            false => {
                let first = *self.accessors.allocation.first().unwrap();
                let last = *self.accessors.allocation.last().unwrap() + 1;
                solution.colvalue[first..last].to_vec()
            }
        }
    }

    pub fn get_demand_marginal_from_solution(
        &self,
        solution: &solver::Solution,
    ) -> Vec<f64> {
        let first = *self.accessors.demand_balance.first().unwrap();
        let last = *self.accessors.demand_balance.last().unwrap() + 1;
        solution.rowdual[first..last].to_vec()
    }
}

/// The results of solving a single scenario instance.
#[derive(Debug, Clone)]
pub struct Realization {
    pub demands: Vec<f64>,
    pub production: Vec<f64>,
    pub surplus: Vec<f64>,
    pub shortage: Vec<f64>,
    pub allocation: Vec<f64>,
    pub demand_marginal: Vec<f64>,
    pub first_stage_cost: f64,
    pub second_stage_cost: f64,
    pub total_objective: f64,
}

impl Realization {
    pub fn new(
        demands: Vec<f64>,
        production: Vec<f64>,
        surplus: Vec<f64>,
        shortage: Vec<f64>,
        allocation: Vec<f64>,
        demand_marginal: Vec<f64>,
        first_stage_cost: f64,
        second_stage_cost: f64,
        total_objective: f64,
    ) -> Self {
        Self {
            demands,
            production,
            surplus,
            shortage,
            allocation,
            demand_marginal,
            first_stage_cost,
            second_stage_cost,
            total_objective,
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn test_create_subproblem_with_default_system() {
        let system = system::System::default();
        let subproblem = Subproblem::new(&system);
        assert_eq!(subproblem.accessors.production.len(), 2);
        assert_eq!(subproblem.accessors.surplus.len(), 2);
        assert_eq!(subproblem.accessors.shortage.len(), 2);
        assert_eq!(subproblem.accessors.allocation.len(), 3);
        assert_eq!(subproblem.accessors.demand_balance.len(), 2);
        assert_eq!(subproblem.accessors.supply_balance.len(), 2);
        assert_eq!(subproblem.template.num_col, 9);
        assert_eq!(subproblem.template.num_row, 4);
    }

    #[test]
    fn test_first_stage_cost_expression() {
        let system = system::System::default();
        let cost = first_stage_cost(&system, &[100.0, 50.0]);
        assert_eq!(cost, 500.0);
    }

    #[test]
    fn test_solve_subproblem_with_default_system() {
        let system = system::System::default();
        let mut subproblem = Subproblem::new(&system);
        subproblem.set_demand_rhs(0, 150.0);
        subproblem.set_demand_rhs(1, 80.0);

        let realization = subproblem.realize(&system);
        assert!((realization.total_objective - (-760.0)).abs() < 1e-6);
        assert!((realization.production[0] - 150.0).abs() < 1e-6);
        assert!((realization.production[1] - 80.0).abs() < 1e-6);
    }

    #[test]
    fn test_objective_matches_cost_split() {
        let system = system::System::default();
        let mut subproblem = Subproblem::new(&system);
        subproblem.set_demand_rhs(0, 150.0);
        subproblem.set_demand_rhs(1, 80.0);

        let realization = subproblem.realize(&system);
        let split =
            realization.first_stage_cost + realization.second_stage_cost;
        assert!((realization.total_objective - split).abs() < 1e-9);
    }

    #[test]
    fn test_demand_rows_hold_at_solution() {
        let system = system::System::default();
        let mut subproblem = Subproblem::new(&system);
        subproblem.set_demand_rhs(0, 150.0);
        subproblem.set_demand_rhs(1, 80.0);

        let realization = subproblem.realize(&system);
        // d1: w11 + u1 = 150
        let first_demand = realization.allocation[0]
            + realization.shortage[0];
        // d2: w12 + w22 + u2 = 80
        let second_demand = realization.allocation[1]
            + realization.allocation[2]
            + realization.shortage[1];
        assert!((first_demand - 150.0).abs() < 1e-6);
        assert!((second_demand - 80.0).abs() < 1e-6);
    }
}
