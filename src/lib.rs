//! A small statevector simulator built around the Deutsch-Jozsa algorithm.
//!
//! Simulation cost is exponential in the number of qubits: a run over `n`
//! inputs holds 2^(n+1) amplitudes, so `n` is capped at
//! [`oracle::MAX_INPUT_QUBITS`].

pub mod algorithm;
pub mod analysis;
pub mod circuit;
pub mod error;
pub mod gates;
pub mod oracle;
pub mod qstate;
pub mod sampling;
pub mod simulator;
pub mod verify;
pub mod visualize;

#[cfg(test)]
mod test_util;

use num_complex::Complex;

pub type Qbit = Complex<f64>;

pub use algorithm::{run, run_with_entropy, run_with_options, RunOptions, RunResult};
pub use analysis::{analyze, Analysis};
pub use circuit::{Circuit, Gate};
pub use error::{DjError, Result};
pub use oracle::{build_oracle, ConstantOutput, FunctionType};
pub use qstate::QState;
pub use sampling::{Counts, Distribution, Outcomes};
pub use verify::{verify_oracle, TruthTable};
