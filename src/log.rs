use std::time::Duration;

/// Helper function for displaying the greeting banner
pub fn show_greeting() {
    println!("\n# recourse-rs");
    println!("Two-stage stochastic recourse evaluation");
}

pub fn input_reading_line(path: &str) {
    println!("\nReading input files from: {path}");
}

/// Helper function for displaying the scenario tree data
pub fn tree_building_line(num_scenarios: usize) {
    println!("\n# Scenario tree");
    println!("- Scenarios: {num_scenarios}");
}

pub fn evaluation_greeting() {
    println!("\n# Evaluating scenario instances\n");
}

pub fn evaluation_stats(mean: f64, std: f64) {
    println!("Expected cost ($): {:.2} +- {:.2}", mean, std);
}

pub fn output_generation_line(path: &str) {
    println!("\nGenerating outputs in: {path}");
}

pub fn show_farewell(time: Duration) {
    println!("\nTotal time: {:.2} s", time.as_millis() as f64 / 1000.0)
}
