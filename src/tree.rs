#[derive(Debug)]
pub struct TreeNode {
    pub id: usize,
    pub name: String,
    pub probability: f64,
}

impl TreeNode {
    pub fn new(id: usize, name: &str, probability: f64) -> Self {
        Self {
            id,
            name: name.to_string(),
            probability,
        }
    }
}

#[derive(Debug)]
pub enum TreeBuildingError {
    NodeNotFound(usize),
    NodeAlreadyExists,
    InvalidProbability(f64),
}

/// A two-stage scenario tree: a single root holding the first-stage
/// decision and one leaf per sampled scenario. Since the tree is only
/// built at the beginning of the run, the `push` calls are not
/// expensive for the total time.
pub struct ScenarioTree {
    nodes: Vec<TreeNode>,
    // adjacency_list[i] contains the IDs of nodes that node 'i' points to
    adjacency_list: Vec<Vec<usize>>,
}

impl ScenarioTree {
    pub fn new() -> Self {
        ScenarioTree {
            nodes: vec![TreeNode::new(0, "root", 1.0)],
            adjacency_list: vec![vec![]],
        }
    }

    /// Adds a leaf node below the root for a new scenario.
    pub fn add_scenario(
        &mut self,
        name: &str,
        probability: f64,
    ) -> Result<usize, TreeBuildingError> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(TreeBuildingError::InvalidProbability(probability));
        }
        if self.nodes.iter().any(|node| node.name == name) {
            return Err(TreeBuildingError::NodeAlreadyExists);
        }
        let id = self.nodes.len();
        self.nodes.push(TreeNode::new(id, name, probability));
        self.adjacency_list.push(vec![]);
        self.adjacency_list[0].push(id);
        Ok(id)
    }

    pub fn get_node(&self, id: usize) -> Option<&TreeNode> {
        self.nodes.get(id)
    }

    pub fn get_node_by_name(&self, name: &str) -> Option<&TreeNode> {
        self.nodes.iter().find(|node| node.name == name)
    }

    /// Leaf node ids in insertion order.
    pub fn scenario_ids(&self) -> &[usize] {
        self.adjacency_list[0].as_slice()
    }

    /// Scenario (leaf) names in insertion order.
    pub fn scenario_names(&self) -> Vec<&str> {
        self.scenario_ids()
            .iter()
            .map(|id| self.nodes[*id].name.as_str())
            .collect()
    }

    pub fn probability_of(&self, name: &str) -> Option<f64> {
        self.get_node_by_name(name).map(|node| node.probability)
    }

    pub fn num_scenarios(&self) -> usize {
        self.adjacency_list[0].len()
    }

    pub fn is_leaf(&self, id: usize) -> bool {
        match self.adjacency_list.get(id) {
            Some(children) => children.is_empty(),
            None => false,
        }
    }

    /// Checks that the leaf probabilities form a distribution.
    pub fn validate_probabilities(&self) -> Result<(), TreeBuildingError> {
        let total: f64 = self
            .scenario_ids()
            .iter()
            .map(|id| self.nodes[*id].probability)
            .sum();
        if (total - 1.0).abs() > 1e-9 {
            return Err(TreeBuildingError::InvalidProbability(total));
        }
        Ok(())
    }
}

/// Builds an equiprobable two-stage tree with leaves named `s_1`..`s_n`.
pub fn generate_scenario_tree(num_scenarios: usize) -> ScenarioTree {
    let mut tree = ScenarioTree::new();
    let probability = 1.0 / num_scenarios as f64;
    for index in 1..=num_scenarios {
        tree.add_scenario(&format!("s_{}", index), probability)
            .expect("Error while building scenario tree");
    }
    tree
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn test_create_scenario_tree() {
        let tree = ScenarioTree::new();
        assert_eq!(tree.num_scenarios(), 0);
        assert!(tree.get_node(0).is_some());
    }

    #[test]
    fn test_add_scenario_to_tree() {
        let mut tree = ScenarioTree::new();
        let id = tree.add_scenario("s_1", 0.5).unwrap();
        assert_eq!(tree.num_scenarios(), 1);
        assert!(tree.is_leaf(id));
        assert!(!tree.is_leaf(0));
    }

    #[test]
    fn test_add_duplicate_scenario_name() {
        let mut tree = ScenarioTree::new();
        tree.add_scenario("s_1", 0.5).unwrap();
        let result = tree.add_scenario("s_1", 0.5);
        assert!(result.is_err());
    }

    #[test]
    fn test_generate_equiprobable_tree() {
        let tree = generate_scenario_tree(100);
        assert_eq!(tree.num_scenarios(), 100);
        let names = tree.scenario_names();
        assert_eq!(names[0], "s_1");
        assert_eq!(names[99], "s_100");
        assert_eq!(tree.probability_of("s_1"), Some(0.01));
        assert!(tree.validate_probabilities().is_ok());
    }
}
