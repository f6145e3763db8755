use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use dj_qsim::{
    analyze, build_oracle, run_with_options, verify_oracle, ConstantOutput, FunctionType,
    RunOptions,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// How many recorded shots `--memory` prints.
const MEMORY_PREVIEW: usize = 16;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ConstantArg {
    Zero,
    One,
}

impl From<ConstantArg> for ConstantOutput {
    fn from(arg: ConstantArg) -> Self {
        match arg {
            ConstantArg::Zero => ConstantOutput::Zero,
            ConstantArg::One => ConstantOutput::One,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "dj-qsim",
    version,
    about = "Run the Deutsch-Jozsa algorithm on a constant and a balanced oracle"
)]
struct Cli {
    /// Number of input qubits
    #[arg(short = 'n', long, default_value_t = 3, env = "DJ_QUBITS")]
    qubits: usize,

    /// Measurement shots per run
    #[arg(short, long, default_value_t = 1024, env = "DJ_SHOTS")]
    shots: u64,

    /// Seed for reproducible sampling
    #[arg(long)]
    seed: Option<u64>,

    /// Output of the constant oracle
    #[arg(long, value_enum, default_value_t = ConstantArg::Zero)]
    constant_output: ConstantArg,

    /// Write circuit diagrams and histograms
    #[arg(long)]
    plot: bool,

    /// Directory for --plot images
    #[arg(long, default_value = "docs", env = "DJ_OUTPUT_DIR")]
    output_dir: PathBuf,

    /// Also record individual shots and print the first few
    #[arg(long)]
    memory: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn run_case(cli: &Cli, function_type: FunctionType, rng: &mut StdRng) -> Result<()> {
    let n = cli.qubits;
    let options = RunOptions { memory: cli.memory };
    let result = run_with_options(n, function_type, cli.shots, options, rng)?;

    println!("\nCircuit depth: {}", result.circuit.depth());
    println!("Gate count: {}", result.circuit.len());
    println!("Measurement distribution:");
    print!("{}", result.counts);

    if let Some(memory) = &result.memory {
        let preview = memory
            .iter()
            .take(MEMORY_PREVIEW)
            .map(String::as_str)
            .collect::<Vec<_>>();
        println!("First shots: {}", preview.join(" "));
    }

    let oracle = build_oracle(n, function_type)?;
    let table = verify_oracle(&oracle, n)?;

    println!("\nOracle Function Pattern:");
    println!("{}", "-".repeat(20));
    print!("{}", table);

    println!("\nAlgorithm Analysis:");
    println!("{}", "-".repeat(20));
    println!("{}", analyze(&result.counts, function_type, n)?);

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    info!(qubits = cli.qubits, shots = cli.shots, seed = ?cli.seed, "starting");

    let function_types = [
        FunctionType::Constant(cli.constant_output.into()),
        FunctionType::Balanced,
    ];

    for function_type in function_types {
        println!("\n{}", "=".repeat(50));
        println!(
            "Deutsch-Jozsa Algorithm: {} Function Test",
            function_type.name().to_uppercase()
        );
        println!("{}", "=".repeat(50));

        if let Err(e) = run_case(&cli, function_type, &mut rng) {
            warn!(%function_type, "run failed");
            println!("Error: {}", e);
        }
    }

    if cli.plot {
        let written = dj_qsim::visualize::run_visualization(
            cli.qubits,
            &cli.output_dir,
            cli.shots,
            &function_types,
            &mut rng,
        )?;
        info!(files = written.len(), dir = %cli.output_dir.display(), "visualization done");
    }

    Ok(())
}
