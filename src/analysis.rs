//! Interpretation of measured Deutsch-Jozsa outcomes.

use std::fmt::Display;

use crate::error::{DjError, Result};
use crate::oracle::FunctionType;
use crate::sampling::Outcomes;

/// Share of shots that must land in |0...0> to call a function constant-0.
pub const CONSTANT_THRESHOLD: f64 = 0.9;

#[derive(Clone, Debug, PartialEq)]
pub enum Analysis {
    ConstantZero { zero_state: String, probability: f64 },
    ConstantOne,
    Balanced { classical_queries: u64 },
}

impl Display for Analysis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Analysis::ConstantZero {
                zero_state,
                probability,
            } => {
                writeln!(f, "Function is CONSTANT-0:")?;
                writeln!(
                    f,
                    "- High probability in |{}⟩ state ({:.2}%)",
                    zero_state,
                    probability * 100.0
                )?;
                writeln!(f, "- Classical: requires 2^n queries")?;
                write!(f, "- Quantum: solved in 1 query")
            }
            Analysis::ConstantOne => {
                writeln!(f, "Function is CONSTANT-1:")?;
                writeln!(f, "- No measurements in |0...0⟩ state")?;
                writeln!(f, "- Classical: requires 2^n queries")?;
                write!(f, "- Quantum: solved in 1 query")
            }
            Analysis::Balanced { classical_queries } => {
                writeln!(f, "Function is BALANCED:")?;
                writeln!(f, "- No measurements in |0...0⟩ state")?;
                writeln!(f, "- Equal 0s and 1s in output")?;
                writeln!(f, "- Classical: requires {classical_queries} queries minimum")?;
                write!(f, "- Quantum: solved in 1 query")
            }
        }
    }
}

/// Classify measured outcomes against the function type the oracle was built as.
pub fn analyze<O: Outcomes + ?Sized>(
    outcomes: &O,
    function_type: FunctionType,
    n: usize,
) -> Result<Analysis> {
    if n == 0 || outcomes.num_of_bits() != n {
        return Err(DjError::invalid_argument(format!(
            "Outcomes have {} bits, expected {}",
            outcomes.num_of_bits(),
            n
        )));
    }

    let zero_state = "0".repeat(n);
    match function_type {
        FunctionType::Constant(_) => {
            let probability = outcomes.probability(&zero_state);
            if probability > CONSTANT_THRESHOLD {
                Ok(Analysis::ConstantZero {
                    zero_state,
                    probability,
                })
            } else {
                Ok(Analysis::ConstantOne)
            }
        }
        FunctionType::Balanced => {
            if outcomes.contains(&zero_state) {
                return Err(DjError::UnexpectedResult {
                    function_type: function_type.to_string(),
                    detail: format!(
                        "|{}⟩ observed with probability {:.4}",
                        zero_state,
                        outcomes.probability(&zero_state)
                    ),
                });
            }
            Ok(Analysis::Balanced {
                classical_queries: (1_u64 << (n - 1)) + 1,
            })
        }
    }
}
