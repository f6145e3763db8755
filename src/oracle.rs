//! Oracle construction for constant and balanced functions.

use std::fmt::Display;
use std::str::FromStr;

use tracing::debug;

use crate::circuit::Circuit;
use crate::error::{DjError, Result};

/// Simulation cost doubles with every qubit; beyond this the state vector
/// (2^(n+1) amplitudes) stops being practical.
pub const MAX_INPUT_QUBITS: usize = 20;

/// Output of a constant oracle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ConstantOutput {
    /// f(x) = 0
    #[default]
    Zero,
    /// f(x) = 1
    One,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FunctionType {
    Constant(ConstantOutput),
    Balanced,
}

impl FunctionType {
    /// The default constant oracle, f(x) = 0.
    pub fn constant() -> Self {
        FunctionType::Constant(ConstantOutput::Zero)
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, FunctionType::Constant(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            FunctionType::Constant(_) => "constant",
            FunctionType::Balanced => "balanced",
        }
    }
}

impl Display for FunctionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FunctionType {
    type Err = DjError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "constant" => Ok(FunctionType::constant()),
            "balanced" => Ok(FunctionType::Balanced),
            _ => Err(DjError::invalid_argument(format!(
                "Function type must be 'constant' or 'balanced', got {s:?}"
            ))),
        }
    }
}

/// Reject register sizes the simulator cannot handle.
pub fn check_num_inputs(n: usize) -> Result<()> {
    if n == 0 {
        return Err(DjError::invalid_argument("Number of qubits must be positive"));
    }
    if n > MAX_INPUT_QUBITS {
        return Err(DjError::invalid_argument(format!(
            "Number of qubits must be at most {MAX_INPUT_QUBITS}, got {n}"
        )));
    }
    Ok(())
}

/// Build the oracle over `n` input qubits plus the ancilla at index `n`.
///
/// A balanced oracle computes the parity of the input with one CNOT per
/// input qubit. A constant oracle is empty for f(x) = 0 and a single X on
/// the ancilla for f(x) = 1.
pub fn build_oracle(n: usize, function_type: FunctionType) -> Result<Circuit> {
    check_num_inputs(n)?;

    let oracle = match function_type {
        FunctionType::Constant(ConstantOutput::Zero) => Circuit::new(n + 1),
        FunctionType::Constant(ConstantOutput::One) => Circuit::new(n + 1).X(n)?,
        FunctionType::Balanced => {
            (0..n).try_fold(Circuit::new(n + 1), |oracle, i| oracle.cnot(i, n))?
        }
    };

    debug!(n, %function_type, gates = oracle.len(), "built oracle");
    Ok(oracle)
}
