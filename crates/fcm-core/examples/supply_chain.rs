//! Supply Chain Example
//!
//! A five-concept map of a distribution channel. Holding regular
//! meetings (C3) is switched on at step 0 and the effect ripples
//! through trust, volume and the competitors' response.
//!
//! Run with: `cargo run --example supply_chain`

use fcm_core::{sweep_lambda, FuzzyCognitiveMap, SimulationConfig, WeightMatrix};

fn main() -> fcm_core::Result<()> {
	println!("=== Supply Chain FCM ===\n");

	let concepts = vec![
		"C1 Cultural products".to_string(),
		"C2 Competitor capability".to_string(),
		"C3 Regular meetings".to_string(),
		"C4 Distribution volume".to_string(),
		"C5 Supply-chain trust".to_string(),
	];

	// W[i][j]: influence of concept i on concept j
	let weights = WeightMatrix::from_rows(vec![
		vec![0.0, 0.6, -0.2, 0.0, 0.5],
		vec![0.0, 0.0, 0.4, -0.5, 0.0],
		vec![0.3, 0.0, 0.0, 0.7, 0.8],
		vec![0.0, 0.0, 0.0, 0.0, 0.4],
		vec![0.2, -0.3, 0.0, 0.0, 0.0],
	])?;
	let map = FuzzyCognitiveMap::new(concepts, weights)?;

	let initial = map.initial_state(&[("C3 Regular meetings", 1.0)])?;
	let config = SimulationConfig::default();
	let history = map.simulate(&initial, &config)?;

	println!("Trend (λ = {}):", config.lambda);
	for (step, state) in history.states().iter().enumerate() {
		let row: Vec<String> = state.iter().map(|a| format!("{a:.4}")).collect();
		println!("  step {step:>2}: [{}]", row.join(", "));
	}

	match history.convergence_step() {
		Some(step) => println!("\nConverged at step {step}"),
		None => println!("\nNo convergence within {} steps", config.max_steps),
	}

	println!("\n{:<28} {:>8} {:>8} {:>8}", "Concept", "Initial", "Final", "Change");
	for row in map.summarize(&history)? {
		println!(
			"{:<28} {:>8.4} {:>8.4} {:>+8.4}",
			row.name, row.initial, row.final_value, row.change
		);
	}

	// How sensitive is the outcome to the steepness?
	println!("\n=== Lambda Sensitivity ===\n");
	let points = sweep_lambda(map.weights(), &initial, &config, &[0.5, 1.0, 2.0, 5.0])?;
	for point in points {
		let last = point.history.final_state();
		println!(
			"  λ = {:<4} steps = {:>2}  C4 volume = {:.4}",
			point.lambda,
			point.history.iterations(),
			last[3]
		);
	}

	Ok(())
}
