//! # Mortar operator tables
//! The four fixed matrices of a 1-to-2 interface split: forward
//! interpolation from the big face onto the lower/upper small face
//! and the L2-type projection back. Built once at initialization
//! from the basis engine; a separate pair exists for the
//! finite-volume sub-cell representation when enabled.
use crate::bases::{interpolation_matrix, DgBasis};
use crate::mesh::ElemTag;
use ndarray::{Array1, Array2};

/// Operator pair set of one polynomial (or sub-cell) representation
///
/// `m_0_1`/`m_0_2` interpolate big-face nodal values to the small
/// face covering `[-1, 0]` respectively `[0, 1]` of the big face;
/// `m_1_0`/`m_2_0` project small-face values back. With exact
/// quadrature the round trip is the identity:
/// `m_1_0 m_0_1 + m_2_0 m_0_2 = I`.
#[derive(Debug, Clone)]
pub struct MortarBasis {
    /// Big face to lower small face
    pub m_0_1: Array2<f64>,
    /// Big face to upper small face
    pub m_0_2: Array2<f64>,
    /// Lower small face back to the big face
    pub m_1_0: Array2<f64>,
    /// Upper small face back to the big face
    pub m_2_0: Array2<f64>,
}

impl MortarBasis {
    /// Build the polynomial operator pair for a nodal DG basis.
    /// The backward operators are the discrete-norm adjoints of the
    /// forward ones, `m_1_0(i,j) = w_j / (2 w_i) m_0_1(j,i)`
    pub fn dg(basis: &DgBasis<f64>) -> Self {
        let np = basis.n + 1;
        let x_lower: Array1<f64> = basis.x.mapv(|x| 0.5 * (x - 1.0));
        let x_upper: Array1<f64> = basis.x.mapv(|x| 0.5 * (x + 1.0));
        let m_0_1 = interpolation_matrix(&basis.x, &basis.wbary, &x_lower);
        let m_0_2 = interpolation_matrix(&basis.x, &basis.wbary, &x_upper);
        let adjoint = |fwd: &Array2<f64>| {
            Array2::from_shape_fn((np, np), |(i, j)| {
                0.5 * basis.w[j] / basis.w[i] * fwd[[j, i]]
            })
        };
        let m_1_0 = adjoint(&m_0_1);
        let m_2_0 = adjoint(&m_0_2);
        Self {
            m_0_1,
            m_0_2,
            m_1_0,
            m_2_0,
        }
    }

    /// Build the piecewise-constant operator pair for `n + 1`
    /// equidistant finite-volume sub-cells per face direction.
    /// Forward is injection of the containing big cell, backward
    /// averages the two small cells covering each big cell
    pub fn fv(n: usize) -> Self {
        let np = n + 1;
        let mut m_0_1 = Array2::<f64>::zeros((np, np));
        let mut m_0_2 = Array2::<f64>::zeros((np, np));
        let mut m_1_0 = Array2::<f64>::zeros((np, np));
        let mut m_2_0 = Array2::<f64>::zeros((np, np));
        for i in 0..np {
            // big cell containing small cell i of the lower/upper face
            let lower = i / 2;
            let upper = (np + i) / 2;
            m_0_1[[i, lower]] = 1.0;
            m_0_2[[i, upper]] = 1.0;
            m_1_0[[lower, i]] = 0.5;
            m_2_0[[upper, i]] = 0.5;
        }
        Self {
            m_0_1,
            m_0_2,
            m_1_0,
            m_2_0,
        }
    }
}

/// The operator pairs of a run: one DG set and, when finite-volume
/// interfaces are enabled, one FV set. Immutable after construction
/// and shared read-only by all sides
#[derive(Debug, Clone)]
pub struct MortarTables {
    /// Polynomial operators
    pub dg: MortarBasis,
    /// Sub-cell operators, present when FV support is enabled
    pub fv: Option<MortarBasis>,
}

impl MortarTables {
    /// Build the tables for the given basis; `fv_enabled` also
    /// builds the sub-cell pair
    pub fn new(basis: &DgBasis<f64>, fv_enabled: bool) -> Self {
        Self {
            dg: MortarBasis::dg(basis),
            fv: if fv_enabled {
                Some(MortarBasis::fv(basis.n))
            } else {
                None
            },
        }
    }

    /// Operator pair for a big-side element with the given
    /// discretization tag
    ///
    /// # Panics
    /// If an FV-tagged side is encountered while FV support is
    /// disabled; that is a setup error
    pub fn select(&self, tag: ElemTag) -> &MortarBasis {
        match tag {
            ElemTag::Dg => &self.dg,
            ElemTag::Fv => self.fv.as_ref().unwrap_or_else(|| {
                panic!("MortarTables::select: FV-tagged side but FV support is disabled")
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bases::NodeType;
    use ndarray::Array1;

    fn approx_eq(a: f64, b: f64, tol: f64) {
        if (a - b).abs() > tol {
            panic!("Large difference of values, got {} expected {}.", a, b)
        }
    }

    #[test]
    fn test_round_trip_is_identity_on_gauss_nodes() {
        // Gauss quadrature of degree n is exact to 2n + 1, so the
        // projection undoes the interpolation exactly
        for n in 1..6 {
            let basis = DgBasis::<f64>::new(n, NodeType::Gauss);
            let ops = MortarBasis::dg(&basis);
            let id = ops.m_1_0.dot(&ops.m_0_1) + ops.m_2_0.dot(&ops.m_0_2);
            for i in 0..=n {
                for j in 0..=n {
                    let expected = if i == j { 1.0 } else { 0.0 };
                    approx_eq(id[[i, j]], expected, 1e-12);
                }
            }
        }
    }

    #[test]
    fn test_constant_preserved_on_lobatto_nodes() {
        // constants survive the round trip on any quadrature set
        let basis = DgBasis::<f64>::new(4, NodeType::GaussLobatto);
        let ops = MortarBasis::dg(&basis);
        let ones = Array1::from_elem(5, 1.0);
        let down = ops.m_1_0.dot(&ops.m_0_1.dot(&ones)) + ops.m_2_0.dot(&ops.m_0_2.dot(&ones));
        for v in down.iter() {
            approx_eq(*v, 1.0, 1e-13);
        }
    }

    #[test]
    fn test_forward_interpolates_polynomials() {
        let n = 3;
        let basis = DgBasis::<f64>::new(n, NodeType::Gauss);
        let ops = MortarBasis::dg(&basis);
        let f = basis.x.mapv(|x| x * x - 0.5 * x);
        let lower = ops.m_0_1.dot(&f);
        let upper = ops.m_0_2.dot(&f);
        for i in 0..=n {
            let xl = 0.5 * (basis.x[i] - 1.0);
            let xu = 0.5 * (basis.x[i] + 1.0);
            approx_eq(lower[i], xl * xl - 0.5 * xl, 1e-13);
            approx_eq(upper[i], xu * xu - 0.5 * xu, 1e-13);
        }
    }

    #[test]
    fn test_fv_round_trip_and_constants() {
        for n in 1..6 {
            let ops = MortarBasis::fv(n);
            let np = n + 1;
            let id = ops.m_1_0.dot(&ops.m_0_1) + ops.m_2_0.dot(&ops.m_0_2);
            for i in 0..np {
                for j in 0..np {
                    let expected = if i == j { 1.0 } else { 0.0 };
                    approx_eq(id[[i, j]], expected, 1e-14);
                }
            }
        }
    }

    #[test]
    fn test_select_by_tag() {
        let basis = DgBasis::<f64>::new(2, NodeType::Gauss);
        let tables = MortarTables::new(&basis, true);
        // FV forward operators are boolean injections
        assert_eq!(tables.select(ElemTag::Fv).m_0_1[[0, 0]], 1.0);
        assert!((tables.select(ElemTag::Dg).m_0_1[[0, 0]] - 1.0).abs() > 1e-3);
    }

    #[test]
    #[should_panic(expected = "FV support is disabled")]
    fn test_select_fv_without_tables() {
        let basis = DgBasis::<f64>::new(2, NodeType::Gauss);
        let tables = MortarTables::new(&basis, false);
        let _ = tables.select(ElemTag::Fv);
    }
}
