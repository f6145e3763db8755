use std::fmt::Display;
use std::ops::Range;

use nalgebra_sparse::{coo::CooMatrix, csr::CsrMatrix};

use crate::error::{DjError, Result};
use crate::gates::{h_matrix, one_projector, x_matrix, zero_projector};
use crate::qstate::QState;
use crate::simulator;
use crate::Qbit;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Gate {
    X(usize),
    H(usize),
    CNot { control: usize, target: usize },
}

impl Gate {
    /// Qubits touched by the gate, control first.
    pub fn qubits(&self) -> Vec<usize> {
        match *self {
            Gate::X(target) | Gate::H(target) => vec![target],
            Gate::CNot { control, target } => vec![control, target],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Gate::X(_) => "X",
            Gate::H(_) => "H",
            Gate::CNot { .. } => "CX",
        }
    }
}

impl Display for Gate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Gate::X(target) | Gate::H(target) => write!(f, "{} q{}", self.label(), target),
            Gate::CNot { control, target } => write!(f, "CX q{} -> q{}", control, target),
        }
    }
}

/// An ordered gate sequence over a fixed number of qubits.
#[derive(Clone, Debug, PartialEq)]
pub struct Circuit {
    gates: Vec<Gate>,
    num_of_qbits: usize,
}

impl Circuit {
    pub fn new(num_of_qbits: usize) -> Self {
        Self {
            gates: Vec::new(),
            num_of_qbits,
        }
    }

    pub fn num_of_qbits(&self) -> usize {
        self.num_of_qbits
    }

    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// Number of gates in the sequence.
    pub fn len(&self) -> usize {
        self.gates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.num_of_qbits {
            return Err(DjError::invalid_argument(format!(
                "Index {} out of bounds for the number of qubits {}",
                index, self.num_of_qbits
            )));
        }
        Ok(())
    }

    fn check_and_revsere_index(&self, index: usize) -> Result<usize> {
        self.check_index(index)?;
        Ok(self.num_of_qbits - 1 - index)
    }

    pub fn add_gate(&mut self, gate: Gate) -> Result<()> {
        for index in gate.qubits() {
            self.check_index(index)?;
        }
        if let Gate::CNot { control, target } = gate {
            if control == target {
                return Err(DjError::invalid_argument(
                    "Control and target qubits cannot be the same",
                ));
            }
        }

        self.gates.push(gate);
        Ok(())
    }

    #[allow(non_snake_case)]
    pub fn X(mut self, index: usize) -> Result<Self> {
        self.add_gate(Gate::X(index))?;
        Ok(self)
    }

    #[allow(non_snake_case)]
    pub fn H(mut self, index: usize) -> Result<Self> {
        self.add_gate(Gate::H(index))?;
        Ok(self)
    }

    /// Hadamard on every qubit of a contiguous range. The single-qubit
    /// Hadamards commute, so they are appended in ascending order.
    #[allow(non_snake_case)]
    pub fn H_range(self, mut range: Range<usize>) -> Result<Self> {
        range.try_fold(self, |circuit, index| circuit.H(index))
    }

    pub fn cnot(mut self, control: usize, target: usize) -> Result<Self> {
        self.add_gate(Gate::CNot { control, target })?;
        Ok(self)
    }

    /// Append every gate of `other`, which must have the same width.
    pub fn compose(mut self, other: &Circuit) -> Result<Self> {
        if other.num_of_qbits != self.num_of_qbits {
            return Err(DjError::invalid_argument(format!(
                "Cannot compose a {}-qubit circuit onto a {}-qubit circuit",
                other.num_of_qbits, self.num_of_qbits
            )));
        }
        self.gates.extend_from_slice(&other.gates);
        Ok(self)
    }

    /// Assign every gate to the earliest column after all gates it depends on.
    pub fn layers(&self) -> Vec<(usize, Gate)> {
        let mut levels = vec![0; self.num_of_qbits];
        self.gates
            .iter()
            .map(|gate| {
                let qubits = gate.qubits();
                let column = qubits.iter().map(|&q| levels[q]).max().unwrap_or(0);
                for &q in &qubits {
                    levels[q] = column + 1;
                }
                (column, *gate)
            })
            .collect()
    }

    /// Number of layers when gates on disjoint qubits run in parallel.
    pub fn depth(&self) -> usize {
        self.layers()
            .iter()
            .map(|(column, _)| column + 1)
            .max()
            .unwrap_or(0)
    }

    pub fn apply(&self, state: &QState) -> Result<QState> {
        if state.num_of_qbits() != self.num_of_qbits {
            return Err(DjError::invalid_argument(format!(
                "Circuit has {} qubits but the state has {}",
                self.num_of_qbits,
                state.num_of_qbits()
            )));
        }

        self.gates
            .iter()
            .try_fold(state.clone(), |state, gate| simulator::apply(&state, gate))
    }

    /// The full 2^n x 2^n unitary of the circuit, built by Kronecker products.
    ///
    /// Runs never go through this; [`Circuit::apply`] is the simulator. The
    /// matrix only exists to check the bit-level kernels against, and its
    /// size limits it to small circuits.
    pub fn unitary(&self) -> Result<CsrMatrix<Qbit>> {
        let mut result = CsrMatrix::identity(1 << self.num_of_qbits);
        for gate in &self.gates {
            let matrix = match *gate {
                Gate::X(index) => self.create_gate_for_index(index, &x_matrix())?,
                Gate::H(index) => self.create_gate_for_index(index, &h_matrix())?,
                Gate::CNot { control, target } => {
                    self.build_control_matrix(control, target, &x_matrix())?
                }
            };
            result = &matrix * &result;
        }
        Ok(result)
    }

    fn create_gate_for_index(
        &self,
        index: usize,
        gate: &CsrMatrix<Qbit>,
    ) -> Result<CsrMatrix<Qbit>> {
        let index = self.check_and_revsere_index(index)?;

        let mut matrix = CsrMatrix::identity(1);
        for i in 0..self.num_of_qbits {
            if i == index {
                matrix = kronecker_product(&matrix, gate);
            } else {
                matrix = kronecker_product(&matrix, &CsrMatrix::identity(2));
            }
        }

        Ok(matrix)
    }

    fn build_control_matrix(
        &self,
        control: usize,
        target: usize,
        gate: &CsrMatrix<Qbit>,
    ) -> Result<CsrMatrix<Qbit>> {
        let control = self.check_and_revsere_index(control)?;
        let target = self.check_and_revsere_index(target)?;

        if control == target {
            return Err(DjError::invalid_argument(
                "Control and target qubits cannot be the same",
            ));
        }

        let zero_zero = zero_projector();
        let one_one = one_projector();
        let id = CsrMatrix::identity(2);

        let mut zero_matrix = CsrMatrix::identity(1);
        let mut one_matrix = CsrMatrix::identity(1);
        for i in 0..self.num_of_qbits {
            if i == control {
                zero_matrix = kronecker_product(&zero_matrix, &zero_zero);
                one_matrix = kronecker_product(&one_matrix, &one_one);
            } else if i == target {
                zero_matrix = kronecker_product(&zero_matrix, &id);
                one_matrix = kronecker_product(&one_matrix, gate);
            } else {
                zero_matrix = kronecker_product(&zero_matrix, &id);
                one_matrix = kronecker_product(&one_matrix, &id);
            }
        }

        Ok(zero_matrix + one_matrix)
    }
}

impl Display for Circuit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{} qubits, {} gates, depth {}",
            self.num_of_qbits,
            self.len(),
            self.depth()
        )?;
        for gate in &self.gates {
            writeln!(f, "  {}", gate)?;
        }
        Ok(())
    }
}

pub fn kronecker_product(x: &CsrMatrix<Qbit>, y: &CsrMatrix<Qbit>) -> CsrMatrix<Qbit> {
    let mut result = CooMatrix::new(x.nrows() * y.nrows(), x.ncols() * y.ncols());

    for (rx, cx, value_x) in x.triplet_iter() {
        for (ry, cy, value_y) in y.triplet_iter() {
            let new_row = rx * y.nrows() + ry;
            let new_col = cx * y.ncols() + cy;
            let new_value = value_x * value_y;
            result.push(new_row, new_col, new_value);
        }
    }

    CsrMatrix::from(&result)
}

#[cfg(test)]
mod tests {
    use nalgebra::DVector;

    use crate::assert_approx_complex_eq;

    use super::*;

    #[test]
    fn test_bell_state() -> anyhow::Result<()> {
        let q00 = QState::from_str("00")?;
        let result = Circuit::new(q00.num_of_qbits())
            .H(0)?
            .cnot(0, 1)?
            .apply(&q00)?;

        // Bell state |00> + |11>
        assert_approx_complex_eq!(1.0 / 2f64.sqrt(), 0.0, result.state[0]);
        assert_approx_complex_eq!(0.0, 0.0, result.state[1]);
        assert_approx_complex_eq!(0.0, 0.0, result.state[2]);
        assert_approx_complex_eq!(1.0 / 2f64.sqrt(), 0.0, result.state[3]);

        Ok(())
    }

    #[test]
    fn test_uniform_superposition_is_normalized() -> anyhow::Result<()> {
        let n = 4;
        let result = Circuit::new(n + 1)
            .X(n)?
            .H_range(0..n + 1)?
            .apply(&QState::zero_state(n + 1))?;

        assert!((result.norm_sqr() - 1.0).abs() < 1e-9);
        let magnitude = 1.0 / ((1 << (n + 1)) as f64).sqrt();
        for amp in result.amplitudes() {
            assert!((amp.norm() - magnitude).abs() < 1e-12);
        }
        Ok(())
    }

    #[test]
    fn test_bitwise_kernels_match_unitary() -> anyhow::Result<()> {
        let circuit = Circuit::new(3)
            .X(2)?
            .H_range(0..3)?
            .cnot(0, 2)?
            .cnot(1, 2)?
            .H_range(0..2)?;
        let unitary = circuit.unitary()?;

        for input in ["000", "011", "101", "110"] {
            let state = QState::from_str(input)?;
            let expected = circuit.apply(&state)?;
            let actual: DVector<Qbit> = &unitary * DVector::from(state);

            for (e, a) in expected.amplitudes().iter().zip(actual.iter()) {
                assert_approx_complex_eq!(e.re, e.im, *a);
            }
        }
        Ok(())
    }

    #[test]
    fn test_depth_packs_parallel_gates() -> anyhow::Result<()> {
        // X(3) | H all | CX 0->3, 1->3, 2->3 | H 0..3
        let circuit = Circuit::new(4)
            .X(3)?
            .H_range(0..4)?
            .cnot(0, 3)?
            .cnot(1, 3)?
            .cnot(2, 3)?
            .H_range(0..3)?;

        assert_eq!(11, circuit.len());
        assert_eq!(6, circuit.depth());
        assert_eq!(0, Circuit::new(2).depth());
        Ok(())
    }

    #[test]
    fn test_h_range_appends_one_hadamard_per_qubit() -> anyhow::Result<()> {
        let circuit = Circuit::new(3).H_range(1..3)?;
        assert_eq!(&[Gate::H(1), Gate::H(2)], circuit.gates());

        assert!(Circuit::new(3).H_range(0..0)?.is_empty());
        assert!(Circuit::new(2).H_range(0..3).is_err());
        Ok(())
    }

    #[test]
    fn test_compose_and_errors() -> anyhow::Result<()> {
        let oracle = Circuit::new(2).cnot(0, 1)?;
        let circuit = Circuit::new(2).H(0)?.compose(&oracle)?;
        assert_eq!(
            &[Gate::H(0), Gate::CNot { control: 0, target: 1 }],
            circuit.gates()
        );

        assert!(Circuit::new(3).compose(&oracle).is_err());
        assert!(Circuit::new(2).H(2).is_err());
        assert!(Circuit::new(2).cnot(1, 1).is_err());
        assert!(circuit.apply(&QState::zero_state(3)).is_err());
        Ok(())
    }
}
