//! The Deutsch-Jozsa circuit and a full simulated run.

use rand::Rng;
use tracing::debug;

use crate::circuit::Circuit;
use crate::error::{DjError, Result};
use crate::oracle::{build_oracle, check_num_inputs, FunctionType};
use crate::qstate::QState;
use crate::sampling::{sample_counts, sample_recorded, Counts, Distribution};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Also record every shot in the order it was drawn.
    pub memory: bool,
}

#[derive(Clone, Debug)]
pub struct RunResult {
    pub circuit: Circuit,
    pub distribution: Distribution,
    pub counts: Counts,
    pub memory: Option<Vec<String>>,
}

/// Wrap `oracle` with state preparation and the final Hadamards.
///
/// X on the ancilla, H on all n+1 qubits, the oracle, then H on the n inputs.
pub fn deutsch_jozsa_circuit(n: usize, oracle: &Circuit) -> Result<Circuit> {
    check_num_inputs(n)?;
    Circuit::new(n + 1)
        .X(n)?
        .H_range(0..n + 1)?
        .compose(oracle)?
        .H_range(0..n)
}

/// Probability of each n-bit input register outcome, with the ancilla
/// summed out.
pub fn final_distribution(n: usize, circuit: &Circuit) -> Result<Distribution> {
    let state = circuit.apply(&QState::zero_state(n + 1))?;
    Distribution::new(state.marginal_probabilities(n)?)
}

pub fn run<R: Rng>(
    n: usize,
    function_type: FunctionType,
    shots: u64,
    rng: &mut R,
) -> Result<RunResult> {
    run_with_options(n, function_type, shots, RunOptions::default(), rng)
}

/// Same as [`run`], drawing from the thread-local entropy source.
pub fn run_with_entropy(n: usize, function_type: FunctionType, shots: u64) -> Result<RunResult> {
    run(n, function_type, shots, &mut rand::rng())
}

pub fn run_with_options<R: Rng>(
    n: usize,
    function_type: FunctionType,
    shots: u64,
    options: RunOptions,
    rng: &mut R,
) -> Result<RunResult> {
    check_num_inputs(n)?;
    if shots == 0 {
        return Err(DjError::invalid_argument("Number of shots must be positive"));
    }

    let oracle = build_oracle(n, function_type)?;
    let circuit = deutsch_jozsa_circuit(n, &oracle)?;
    let distribution = final_distribution(n, &circuit)?;
    debug!(
        n,
        %function_type,
        gates = circuit.len(),
        depth = circuit.depth(),
        "simulated Deutsch-Jozsa circuit"
    );

    // Recorded shots and counts must describe the same experiment.
    let (counts, memory) = if options.memory {
        let (counts, memory) = sample_recorded(&distribution, shots, rng)?;
        (counts, Some(memory))
    } else {
        (sample_counts(&distribution, shots, rng)?, None)
    };

    Ok(RunResult {
        circuit,
        distribution,
        counts,
        memory,
    })
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::assert_approx_eq;
    use crate::oracle::ConstantOutput;
    use crate::sampling::Outcomes;

    #[test]
    fn test_constant_collapses_to_zero() -> anyhow::Result<()> {
        for constant in [ConstantOutput::Zero, ConstantOutput::One] {
            let oracle = build_oracle(3, FunctionType::Constant(constant))?;
            let circuit = deutsch_jozsa_circuit(3, &oracle)?;
            let distribution = final_distribution(3, &circuit)?;

            assert_approx_eq!(1.0, distribution.probability("000"));
            assert_eq!(1, distribution.support().count());
        }
        Ok(())
    }

    #[test]
    fn test_balanced_excludes_zero() -> anyhow::Result<()> {
        let n = 2;
        let oracle = build_oracle(n, FunctionType::Balanced)?;
        let distribution = final_distribution(n, &deutsch_jozsa_circuit(n, &oracle)?)?;

        assert_eq!(0.0, distribution.probability("00"));
        assert_approx_eq!(1.0, distribution.total());
        // parity oracle kicks its phase back onto |11> only
        assert_approx_eq!(1.0, distribution.probability("11"));
        Ok(())
    }

    #[test]
    fn test_circuit_layout() -> anyhow::Result<()> {
        let oracle = build_oracle(3, FunctionType::Balanced)?;
        let circuit = deutsch_jozsa_circuit(3, &oracle)?;

        assert_eq!(4, circuit.num_of_qbits());
        assert_eq!(1 + 4 + 3 + 3, circuit.len());
        assert_eq!(6, circuit.depth());
        Ok(())
    }

    #[test]
    fn test_run_records_memory_on_request() -> anyhow::Result<()> {
        let mut rng = StdRng::seed_from_u64(11);
        let options = RunOptions { memory: true };
        let result = run_with_options(2, FunctionType::constant(), 64, options, &mut rng)?;

        let memory = result.memory.unwrap_or_default();
        assert_eq!(64, memory.len());
        assert!(memory.iter().all(|bits| bits == "00"));
        assert_eq!(64, result.counts.get("00"));

        let result = run(2, FunctionType::constant(), 64, &mut rng)?;
        assert!(result.memory.is_none());
        Ok(())
    }

    #[test]
    fn test_recorded_memory_matches_counts() -> anyhow::Result<()> {
        // the balanced run is deterministic, so spread the shots with a
        // hand-made distribution run through the same sampling path
        let n = 2;
        let mut rng = StdRng::seed_from_u64(1);
        let options = RunOptions { memory: true };
        let result = run_with_options(n, FunctionType::Balanced, 100, options, &mut rng)?;
        let memory = result.memory.clone().unwrap_or_default();
        assert_eq!(Counts::from_memory(n, &memory)?, result.counts);

        let spread = Distribution::new(vec![0.25; 4])?;
        let (counts, memory) = sample_recorded(&spread, 100, &mut rng)?;
        assert_eq!(Counts::from_memory(n, &memory)?, counts);
        assert!(counts.len() > 1);
        Ok(())
    }

    #[test]
    fn test_invalid_arguments() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            run(0, FunctionType::Balanced, 1024, &mut rng),
            Err(DjError::InvalidArgument(_))
        ));
        assert!(matches!(
            run(2, FunctionType::Balanced, 0, &mut rng),
            Err(DjError::InvalidArgument(_))
        ));
    }
}
