use std::fmt::Display;

use nalgebra::DVector;
use num_complex::Complex;

use crate::error::{DjError, Result};
use crate::Qbit;

/// Tolerance used when checking that a state is normalized.
pub const NORM_TOLERANCE: f64 = 1e-9;

/// Owned amplitude vector over `num_of_qbits` qubits.
///
/// Qubit `q` corresponds to bit `q` of the basis index, so qubit 0 is the
/// least significant bit and the highest qubit is printed leftmost.
#[derive(Clone, Debug, PartialEq)]
pub struct QState {
    pub(crate) state: DVector<Qbit>,
}

impl QState {
    pub fn new(state: &[Qbit]) -> Result<Self> {
        let len = state.len();
        if len == 0 || (len & (len - 1)) != 0 {
            return Err(DjError::invalid_argument(
                "State vector length must be a non-zero power of 2",
            ));
        }

        let state = DVector::from_row_slice(state);
        Ok(Self { state })
    }

    pub fn zero_state(num_of_qbits: usize) -> Self {
        let mut state = DVector::zeros(1_usize << num_of_qbits);
        state[0] = Complex::new(1.0, 0.0);
        Self { state }
    }

    /// The computational basis state `|index>`.
    pub fn basis_state(num_of_qbits: usize, index: usize) -> Result<Self> {
        let size = u32::try_from(num_of_qbits)
            .ok()
            .and_then(|bits| 1_usize.checked_shl(bits))
            .ok_or_else(|| {
                DjError::invalid_argument(format!("{num_of_qbits} qubits is too many to simulate"))
            })?;
        if index >= size {
            return Err(DjError::invalid_argument(format!(
                "Basis index {} does not fit in {} qubits",
                index, num_of_qbits
            )));
        }

        let mut state = DVector::zeros(size);
        state[index] = Complex::new(1.0, 0.0);
        Ok(Self { state })
    }

    pub fn from_str(qbits: &str) -> Result<Self> {
        if qbits.is_empty() {
            return Err(DjError::invalid_argument("Empty bitstring"));
        }
        let index = usize::from_str_radix(qbits, 2)
            .map_err(|e| DjError::invalid_argument(format!("Bad bitstring {qbits:?}: {e}")))?;
        Self::basis_state(qbits.len(), index)
    }

    pub fn num_of_qbits(&self) -> usize {
        self.state.len().ilog2() as usize
    }

    pub fn amplitudes(&self) -> &[Qbit] {
        self.state.as_slice()
    }

    pub fn amplitude(&self, index: usize) -> Option<Qbit> {
        self.state.get(index).copied()
    }

    /// Sum of squared amplitude magnitudes.
    pub fn norm_sqr(&self) -> f64 {
        self.state.iter().map(|a| a.norm_sqr()).sum()
    }

    pub fn is_normalized(&self) -> bool {
        (self.norm_sqr() - 1.0).abs() < NORM_TOLERANCE
    }

    pub fn probabilities(&self) -> Vec<f64> {
        self.state.iter().map(|a| a.norm_sqr()).collect()
    }

    /// Probability distribution over the lowest `num_of_kept` qubits, summing
    /// out every higher qubit.
    pub fn marginal_probabilities(&self, num_of_kept: usize) -> Result<Vec<f64>> {
        if num_of_kept > self.num_of_qbits() {
            return Err(DjError::invalid_argument(format!(
                "Cannot keep {} qubits of a {}-qubit state",
                num_of_kept,
                self.num_of_qbits()
            )));
        }

        let mask = (1_usize << num_of_kept) - 1;
        let mut marginal = vec![0.0; 1 << num_of_kept];
        for (i, amp) in self.state.iter().enumerate() {
            marginal[i & mask] += amp.norm_sqr();
        }
        Ok(marginal)
    }
}

impl Display for QState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bin_width = self.num_of_qbits();

        for (i, value) in self.state.iter().enumerate() {
            writeln!(f, "|{:0width$b}>: {}", i, value, width = bin_width)?;
        }

        Ok(())
    }
}

impl From<QState> for DVector<Qbit> {
    fn from(qstate: QState) -> Self {
        qstate.state
    }
}
