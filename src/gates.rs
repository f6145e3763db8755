use nalgebra::Matrix2;
use nalgebra_sparse::{coo::CooMatrix, csr::CsrMatrix};
use num_complex::Complex;

use crate::Qbit;

pub fn h_dence_matrix() -> Matrix2<Qbit> {
    let root2 = 2.0_f64.sqrt();
    let one = Complex::new(1.0, 0.0);
    Matrix2::from_row_slice(&[one / root2, one / root2, one / root2, -one / root2])
}

pub fn x_dence_matrix() -> Matrix2<Qbit> {
    let zero = Complex::new(0.0, 0.0);
    let one = Complex::new(1.0, 0.0);
    Matrix2::from_row_slice(&[zero, one, one, zero])
}

// The sparse forms below only feed `Circuit::unitary`.

pub fn h_matrix() -> CsrMatrix<Qbit> {
    let h = h_dence_matrix();
    let mut h_coo = CooMatrix::new(2, 2);
    for row in 0..2 {
        for col in 0..2 {
            h_coo.push(row, col, h[(row, col)]);
        }
    }
    CsrMatrix::from(&h_coo)
}

pub fn x_matrix() -> CsrMatrix<Qbit> {
    let mut x_coo = CooMatrix::new(2, 2);
    x_coo.push(0, 1, Complex::new(1.0, 0.0));
    x_coo.push(1, 0, Complex::new(1.0, 0.0));
    CsrMatrix::from(&x_coo)
}

/// |0><0|
pub fn zero_projector() -> CsrMatrix<Qbit> {
    let mut coo = CooMatrix::new(2, 2);
    coo.push(0, 0, Complex::new(1.0, 0.0));
    CsrMatrix::from(&coo)
}

/// |1><1|
pub fn one_projector() -> CsrMatrix<Qbit> {
    let mut coo = CooMatrix::new(2, 2);
    coo.push(1, 1, Complex::new(1.0, 0.0));
    CsrMatrix::from(&coo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_approx_complex_eq;

    #[test]
    fn test_hadamard_is_self_inverse() {
        let h = h_dence_matrix();
        let id = h * h;

        assert_approx_complex_eq!(1.0, 0.0, id[(0, 0)]);
        assert_approx_complex_eq!(0.0, 0.0, id[(0, 1)]);
        assert_approx_complex_eq!(0.0, 0.0, id[(1, 0)]);
        assert_approx_complex_eq!(1.0, 0.0, id[(1, 1)]);
    }

    #[test]
    fn test_sparse_matches_dense() {
        let sparse = h_matrix();
        let dense = h_dence_matrix();
        for (row, col, value) in sparse.triplet_iter() {
            assert_approx_complex_eq!(dense[(row, col)].re, dense[(row, col)].im, *value);
        }
        assert_eq!(4, sparse.nnz());
        assert_eq!(2, x_matrix().nnz());
    }
}
