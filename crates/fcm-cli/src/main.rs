use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use fcm_core::{
	sweep_lambda, ActivationVector, FuzzyCognitiveMap, History, Outcome, SimulationConfig,
	TransferFunction,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Parser)]
#[command(name = "fcm", version, about = "Fuzzy Cognitive Map simulator")]
struct Cli {
	/// Enable verbose debug output
	#[arg(long, global = true)]
	verbose: bool,

	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Simulate a map until it converges or the step budget runs out
	Run {
		/// Map file (JSON: concepts + weights)
		map: PathBuf,

		/// Transfer-function steepness
		#[arg(long)]
		lambda: Option<f64>,

		#[command(flatten)]
		params: Params,

		/// Print the full history as JSON instead of the summary table
		#[arg(long)]
		json: bool,
	},

	/// Run the same map once per lambda value
	Sweep {
		/// Map file (JSON: concepts + weights)
		map: PathBuf,

		/// Steepness values, comma separated
		#[arg(long, value_delimiter = ',', required = true)]
		lambdas: Vec<f64>,

		#[command(flatten)]
		params: Params,
	},

	/// Print a random map as JSON
	Random {
		/// Number of concepts
		#[arg(long)]
		concepts: usize,

		/// Probability that an off-diagonal link exists
		#[arg(long, default_value_t = 0.4)]
		density: f64,

		/// Seed for reproducible output
		#[arg(long)]
		seed: Option<u64>,
	},
}

#[derive(Args)]
struct Params {
	/// Simulation config file (JSON); flags below override it
	#[arg(long)]
	config: Option<PathBuf>,

	/// Maximum propagation steps
	#[arg(long)]
	max_steps: Option<usize>,

	/// Convergence threshold
	#[arg(long)]
	epsilon: Option<f64>,

	/// Transfer function: sigmoid or tanh
	#[arg(long)]
	transfer: Option<TransferFunction>,

	/// Keep iterating after convergence until max-steps
	#[arg(long)]
	full_length: bool,

	/// Initial activation of a concept (repeatable); others start at 0
	#[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
	assignments: Vec<(String, f64)>,
}

impl Params {
	fn config(&self, lambda: Option<f64>) -> Result<SimulationConfig> {
		let mut config = match &self.config {
			Some(path) => {
				let json = std::fs::read_to_string(path)
					.with_context(|| format!("failed to read config {}", path.display()))?;
				SimulationConfig::from_json(&json)
					.with_context(|| format!("invalid config {}", path.display()))?
			}
			None => SimulationConfig::default(),
		};

		if let Some(lambda) = lambda {
			config.lambda = lambda;
		}
		if let Some(max_steps) = self.max_steps {
			config.max_steps = max_steps;
		}
		if let Some(epsilon) = self.epsilon {
			config.epsilon = epsilon;
		}
		if let Some(transfer) = self.transfer {
			config.transfer = transfer;
		}
		config.force_full_length |= self.full_length;

		config.validate()?;
		tracing::debug!(?config, "resolved simulation config");
		Ok(config)
	}

	fn initial_state(&self, map: &FuzzyCognitiveMap) -> Result<ActivationVector> {
		let values: Vec<(&str, f64)> = self
			.assignments
			.iter()
			.map(|(name, value)| (name.as_str(), *value))
			.collect();
		Ok(map.initial_state(&values)?)
	}
}

fn parse_assignment(s: &str) -> std::result::Result<(String, f64), String> {
	let (name, value) = s
		.rsplit_once('=')
		.ok_or_else(|| format!("expected NAME=VALUE, got `{s}`"))?;
	let value: f64 = value
		.trim()
		.parse()
		.map_err(|e| format!("invalid value in `{s}`: {e}"))?;
	Ok((name.trim().to_string(), value))
}

fn init_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = if verbose {
		EnvFilter::new("debug")
	} else {
		EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
	};

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(false)
		.init();
}

fn main() -> Result<()> {
	let cli = Cli::parse();
	init_tracing(cli.verbose);

	match &cli.command {
		Commands::Run {
			map,
			lambda,
			params,
			json,
		} => cmd_run(map, *lambda, params, *json),
		Commands::Sweep {
			map,
			lambdas,
			params,
		} => cmd_sweep(map, lambdas, params),
		Commands::Random {
			concepts,
			density,
			seed,
		} => cmd_random(*concepts, *density, *seed),
	}
}

fn load_map(path: &Path) -> Result<FuzzyCognitiveMap> {
	FuzzyCognitiveMap::load(path).with_context(|| format!("failed to load map {}", path.display()))
}

fn describe(history: &History) -> String {
	match history.outcome() {
		Outcome::Converged { step } if history.iterations() > step => format!(
			"converged at step {step}, ran to {} steps",
			history.iterations()
		),
		Outcome::Converged { step } => format!("converged at step {step}"),
		Outcome::Exhausted => format!("no convergence after {} steps", history.iterations()),
		Outcome::Stopped => format!("stopped after {} steps", history.iterations()),
	}
}

fn format_state(state: &ActivationVector) -> String {
	let values: Vec<String> = state.iter().map(|a| format!("{a:.4}")).collect();
	format!("[{}]", values.join(", "))
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_run(path: &Path, lambda: Option<f64>, params: &Params, json: bool) -> Result<()> {
	let map = load_map(path)?;
	let config = params.config(lambda)?;
	let initial = params.initial_state(&map)?;

	let history = map.simulate(&initial, &config)?;
	tracing::info!(states = history.len(), "simulation finished");

	if json {
		println!("{}", serde_json::to_string_pretty(&history)?);
		return Ok(());
	}

	println!(
		"{} ({} states, {}, λ = {})",
		describe(&history),
		history.len(),
		config.transfer,
		config.lambda
	);
	let width = map.concepts().iter().map(String::len).max().unwrap_or(0).max(7);
	println!("{:<width$}  {:>8}  {:>8}  {:>8}", "concept", "initial", "final", "change");
	for row in map.summarize(&history)? {
		println!(
			"{:<width$}  {:>8.4}  {:>8.4}  {:>+8.4}",
			row.name, row.initial, row.final_value, row.change
		);
	}
	Ok(())
}

fn cmd_sweep(path: &Path, lambdas: &[f64], params: &Params) -> Result<()> {
	let map = load_map(path)?;
	let config = params.config(None)?;
	let initial = params.initial_state(&map)?;

	let points = sweep_lambda(map.weights(), &initial, &config, lambdas)?;
	for point in &points {
		println!(
			"lambda={}  {}  final={}",
			point.lambda,
			describe(&point.history),
			format_state(point.history.final_state())
		);
	}
	Ok(())
}

fn cmd_random(concepts: usize, density: f64, seed: Option<u64>) -> Result<()> {
	let mut rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
	let map = FuzzyCognitiveMap::random(concepts, density, &mut rng)?;
	tracing::debug!(concepts, density, ?seed, "generated random map");
	println!("{}", map.to_json()?);
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_assignment() {
		assert_eq!(parse_assignment("C3=1.0").unwrap(), ("C3".to_string(), 1.0));
		assert_eq!(
			parse_assignment("C3 Regular meetings = 0.5").unwrap(),
			("C3 Regular meetings".to_string(), 0.5)
		);
		assert!(parse_assignment("C3").is_err());
		assert!(parse_assignment("C3=high").is_err());
	}
}
