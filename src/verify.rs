//! Classical truth-table enumeration of an oracle.

use std::collections::BTreeMap;
use std::fmt::Display;

use tracing::{debug, warn};

use crate::circuit::{Circuit, Gate};
use crate::error::{DjError, Result};
use crate::oracle::check_num_inputs;

/// Which side of the constant/balanced promise a truth table falls on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Classification {
    Constant(bool),
    Balanced,
}

/// Output of the oracle for each of the 2^n inputs.
///
/// Inputs are stored by basis index: bit `j` of the index is input qubit `j`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TruthTable {
    num_inputs: usize,
    outputs: Vec<bool>,
}

impl TruthTable {
    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    pub fn output(&self, input: usize) -> Option<bool> {
        self.outputs.get(input).copied()
    }

    /// Look up an input written as a bitstring, highest qubit first.
    pub fn get(&self, bits: &str) -> Option<bool> {
        if bits.len() != self.num_inputs {
            return None;
        }
        let input = usize::from_str_radix(bits, 2).ok()?;
        self.output(input)
    }

    pub fn ones(&self) -> usize {
        self.outputs.iter().filter(|&&out| out).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (String, bool)> + '_ {
        let width = self.num_inputs;
        self.outputs
            .iter()
            .enumerate()
            .map(move |(input, &out)| (format!("{:0width$b}", input, width = width), out))
    }

    pub fn to_map(&self) -> BTreeMap<String, bool> {
        self.iter().collect()
    }

    pub fn classify(&self) -> Result<Classification> {
        let ones = self.ones();
        let total = self.outputs.len();
        if ones == 0 {
            Ok(Classification::Constant(false))
        } else if ones == total {
            Ok(Classification::Constant(true))
        } else if 2 * ones == total {
            Ok(Classification::Balanced)
        } else {
            Err(DjError::invalid_oracle(format!(
                "neither constant nor balanced ({ones} of {total} inputs map to 1)"
            )))
        }
    }
}

impl Display for TruthTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (input, out) in self.iter() {
            writeln!(f, "f(|{}⟩) = |{}⟩", input, u8::from(out))?;
        }
        Ok(())
    }
}

/// Run `oracle` on every classical input and record the ancilla.
///
/// Basis states stay basis states under X and CNOT, so each input is tracked
/// as a plain bitmask instead of a full state vector.
pub fn verify_oracle(oracle: &Circuit, n: usize) -> Result<TruthTable> {
    check_num_inputs(n)?;
    if oracle.num_of_qbits() != n + 1 {
        return Err(DjError::invalid_argument(format!(
            "Oracle acts on {} qubits, expected {} inputs plus an ancilla",
            oracle.num_of_qbits(),
            n
        )));
    }

    let ancilla = 1_usize << n;
    let outputs = (0..1_usize << n)
        .map(|input| run_classical(oracle, input).map(|bits| bits & ancilla != 0))
        .collect::<Result<Vec<_>>>()?;

    let table = TruthTable {
        num_inputs: n,
        outputs,
    };
    match table.classify() {
        Ok(class) => {
            debug!(n, ones = table.ones(), ?class, "verified oracle");
            Ok(table)
        }
        Err(e) => {
            warn!(n, ones = table.ones(), "oracle breaks the constant/balanced promise");
            Err(e)
        }
    }
}

fn run_classical(oracle: &Circuit, input: usize) -> Result<usize> {
    oracle.gates().iter().try_fold(input, |bits, gate| match *gate {
        Gate::X(target) => Ok(bits ^ (1 << target)),
        Gate::CNot { control, target } => {
            if bits & (1 << control) != 0 {
                Ok(bits ^ (1 << target))
            } else {
                Ok(bits)
            }
        }
        Gate::H(_) => Err(DjError::invalid_oracle(
            "Hadamard does not map basis states to basis states",
        )),
    })
}
