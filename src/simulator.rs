//! Bit-level gate kernels over an owned amplitude vector.
//!
//! Every function here is pure: it takes the input state by reference and
//! returns a fresh state.

use nalgebra::Matrix2;

use crate::circuit::Gate;
use crate::error::{DjError, Result};
use crate::gates::{h_dence_matrix, x_dence_matrix};
use crate::qstate::QState;
use crate::Qbit;

/// Apply a single gate to `state`.
pub fn apply(state: &QState, gate: &Gate) -> Result<QState> {
    let num_of_qbits = state.num_of_qbits();
    for index in gate.qubits() {
        check_index(index, num_of_qbits)?;
    }

    match *gate {
        Gate::H(target) => Ok(apply_single_qubit(state, target, &h_dence_matrix())),
        Gate::X(target) => Ok(apply_single_qubit(state, target, &x_dence_matrix())),
        Gate::CNot { control, target } => {
            if control == target {
                return Err(DjError::invalid_argument(
                    "Control and target qubits cannot be the same",
                ));
            }
            Ok(apply_cnot(state, control, target))
        }
    }
}

fn check_index(index: usize, num_of_qbits: usize) -> Result<()> {
    if index >= num_of_qbits {
        return Err(DjError::invalid_argument(format!(
            "Index {} out of bounds for the number of qubits {}",
            index, num_of_qbits
        )));
    }
    Ok(())
}

/// Multiply each amplitude pair that differs only in bit `target` by `gate`.
fn apply_single_qubit(state: &QState, target: usize, gate: &Matrix2<Qbit>) -> QState {
    let mut result = state.state.clone();
    let mask = 1_usize << target;

    for i0 in (0..result.len()).filter(|i| i & mask == 0) {
        let i1 = i0 | mask;
        let a0 = state.state[i0];
        let a1 = state.state[i1];
        result[i0] = gate[(0, 0)] * a0 + gate[(0, 1)] * a1;
        result[i1] = gate[(1, 0)] * a0 + gate[(1, 1)] * a1;
    }

    QState { state: result }
}

/// Swap the pairs differing in bit `target` whose bit `control` is set.
fn apply_cnot(state: &QState, control: usize, target: usize) -> QState {
    let mut result = state.state.clone();
    let control_mask = 1_usize << control;
    let target_mask = 1_usize << target;

    for i in 0..result.len() {
        if i & control_mask != 0 && i & target_mask == 0 {
            result.swap_rows(i, i | target_mask);
        }
    }

    QState { state: result }
}
