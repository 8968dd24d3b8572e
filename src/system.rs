#[derive(Debug)]
pub struct Product {
    pub id: usize,
    pub production_cost: f64,
    pub max_production: f64,
    pub holding_cost: f64,
    pub substitution_ids: Vec<usize>,
}

impl Product {
    pub fn new(
        id: usize,
        production_cost: f64,
        max_production: f64,
        holding_cost: f64,
    ) -> Self {
        Self {
            id,
            production_cost,
            max_production,
            holding_cost,
            substitution_ids: vec![],
        }
    }

    pub fn add_substitution(&mut self, substitution_id: usize) {
        self.substitution_ids.push(substitution_id);
    }
}

#[derive(Debug)]
pub struct Demand {
    pub id: usize,
    pub shortage_cost: f64,
    pub substitution_ids: Vec<usize>,
}

impl Demand {
    pub fn new(id: usize, shortage_cost: f64) -> Self {
        Self {
            id,
            shortage_cost,
            substitution_ids: vec![],
        }
    }

    pub fn add_substitution(&mut self, substitution_id: usize) {
        self.substitution_ids.push(substitution_id);
    }
}

/// An admissible allocation arc: units of `product_id` may be sold
/// against `demand_id` at the given unit revenue.
#[derive(Debug)]
pub struct Substitution {
    pub id: usize,
    pub product_id: usize,
    pub demand_id: usize,
    pub revenue: f64,
}

impl Substitution {
    pub fn new(
        id: usize,
        product_id: usize,
        demand_id: usize,
        revenue: f64,
    ) -> Self {
        Self {
            id,
            product_id,
            demand_id,
            revenue,
        }
    }
}

#[allow(dead_code)]
#[derive(Debug)]
pub struct SystemMetadata {
    pub products_count: usize,
    pub demands_count: usize,
    pub substitutions_count: usize,
}

#[derive(Debug)]
pub struct System {
    pub products: Vec<Product>,
    pub demands: Vec<Demand>,
    pub substitutions: Vec<Substitution>,
    pub meta: SystemMetadata,
}

impl System {
    pub fn new(
        mut products: Vec<Product>,
        mut demands: Vec<Demand>,
        substitutions: Vec<Substitution>,
    ) -> Self {
        for s in substitutions.iter() {
            products[s.product_id].add_substitution(s.id);
            demands[s.demand_id].add_substitution(s.id);
        }

        let products_count = products.len();
        let demands_count = demands.len();
        let substitutions_count = substitutions.len();

        Self {
            products,
            demands,
            substitutions,
            meta: SystemMetadata {
                products_count,
                demands_count,
                substitutions_count,
            },
        }
    }

    pub fn default() -> Self {
        let products = vec![
            Product::new(0, 4.0, 217.0, 0.2),
            Product::new(1, 2.0, 217.0, 0.2),
        ];
        let demands = vec![Demand::new(0, 10.0), Demand::new(1, 10.0)];
        let substitutions = vec![
            Substitution::new(0, 0, 0, 8.0),
            Substitution::new(1, 0, 1, 4.0),
            Substitution::new(2, 1, 1, 4.0),
        ];

        Self::new(products, demands, substitutions)
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn test_create_default_system() {
        let system = System::default();
        assert_eq!(system.products.len(), 2);
        assert_eq!(system.demands.len(), 2);
        assert_eq!(system.substitutions.len(), 3);
    }

    #[test]
    fn test_default_system_substitution_wiring() {
        let system = System::default();
        assert_eq!(system.products[0].substitution_ids, vec![0, 1]);
        assert_eq!(system.products[1].substitution_ids, vec![2]);
        assert_eq!(system.demands[0].substitution_ids, vec![0]);
        assert_eq!(system.demands[1].substitution_ids, vec![1, 2]);
    }
}
