//! # Nodal polynomial bases
//! One-dimensional node sets, quadrature weights and the dense
//! operators derived from them: Vandermonde (interpolation)
//! matrices between node sets, differentiation matrices and
//! boundary evaluation vectors.
//!
//! Implemented node sets:
//! - `Gauss` (Legendre-Gauss)
//! - `GaussLobatto` (Legendre-Gauss-Lobatto)
//! - `ChebyshevGaussLobatto`
//! - `Equidistant`
//!
//! Quadrature weights exist for the Legendre type sets only;
//! operators that need a discrete norm (lifted boundary
//! coefficients, mortar projections) reject the other sets at
//! construction time.
use crate::types::FloatNum;
use ndarray::{Array1, Array2};

/// Distribution of the `n + 1` interpolation nodes on `[-1, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    /// Uniformly spaced nodes, no quadrature rule
    Equidistant,
    /// Legendre-Gauss nodes, interior only, exact to degree `2n + 1`
    Gauss,
    /// Legendre-Gauss-Lobatto nodes including `-1` and `1`,
    /// exact to degree `2n - 1`
    GaussLobatto,
    /// Chebyshev-Gauss-Lobatto nodes, no Legendre quadrature rule
    ChebyshevGaussLobatto,
}

/// Evaluate the Legendre polynomial of given degree and its
/// derivative at `x` by the three term recurrence
pub fn legendre_polynomial_and_derivative<A: FloatNum>(degree: usize, x: A) -> (A, A) {
    let one = A::one();
    if degree == 0 {
        return (one, A::zero());
    }
    if degree == 1 {
        return (x, one);
    }
    let mut l_m2 = one;
    let mut l_m1 = x;
    let mut d_m2 = A::zero();
    let mut d_m1 = one;
    let mut l = x;
    let mut d = one;
    for k in 2..=degree {
        let kf = A::from_usize(k).unwrap();
        let two_km1 = A::from_usize(2 * k - 1).unwrap();
        let km1 = A::from_usize(k - 1).unwrap();
        l = (two_km1 * x * l_m1 - km1 * l_m2) / kf;
        d = d_m2 + two_km1 * l_m1;
        l_m2 = l_m1;
        l_m1 = l;
        d_m2 = d_m1;
        d_m1 = d;
    }
    (l, d)
}

/// Evaluate `q = L_{n+1} - L_{n-1}`, its derivative and `L_n` at `x`.
/// Needed by the Newton iteration for the interior Gauss-Lobatto nodes
fn q_and_l_evaluation<A: FloatNum>(n: usize, x: A) -> (A, A, A) {
    let (l_nm1, d_nm1) = legendre_polynomial_and_derivative(n - 1, x);
    let (l_n, d_n) = legendre_polynomial_and_derivative(n, x);
    let np1 = A::from_usize(n + 1).unwrap();
    let two_np1 = A::from_usize(2 * n + 1).unwrap();
    let nf = A::from_usize(n).unwrap();
    let l_np1 = (two_np1 * x * l_n - nf * l_nm1) / np1;
    let d_np1 = d_nm1 + two_np1 * l_n;
    (l_np1 - l_nm1, d_np1 - d_nm1, l_n)
}

const NEWTON_TOL: f64 = 4.0 * f64::EPSILON;
const NEWTON_MAXITER: usize = 100;

/// Legendre-Gauss nodes and weights for polynomial degree `n`
/// (`n + 1` nodes), Newton iteration on the Legendre polynomial
/// with Chebyshev initial guesses
pub fn gauss_nodes_and_weights<A: FloatNum>(n: usize) -> (Array1<A>, Array1<A>) {
    let np = n + 1;
    let mut x = Array1::<A>::zeros(np);
    let mut w = Array1::<A>::zeros(np);
    let two = A::one() + A::one();
    if n == 0 {
        x[0] = A::zero();
        w[0] = two;
        return (x, w);
    }
    if n == 1 {
        let r = A::one() / A::from_f64(3.0).unwrap().sqrt();
        x[0] = -r;
        x[1] = r;
        w[0] = A::one();
        w[1] = A::one();
        return (x, w);
    }
    let tol = A::from_f64(NEWTON_TOL).unwrap();
    let half_nodes = (n + 1) / 2;
    for j in 0..=half_nodes {
        if j > n - j {
            break;
        }
        let guess = -(A::PI() * A::from_f64((2 * j + 1) as f64 / (2 * n + 2) as f64).unwrap()).cos();
        let mut xj = guess;
        for it in 0..=NEWTON_MAXITER {
            let (l, d) = legendre_polynomial_and_derivative(np, xj);
            let delta = -l / d;
            xj += delta;
            if delta.abs() <= tol * xj.abs() || delta.abs() <= tol {
                break;
            }
            assert!(
                it < NEWTON_MAXITER,
                "gauss_nodes_and_weights: Newton iteration failed to converge for n = {}",
                n
            );
        }
        let (_, d) = legendre_polynomial_and_derivative(np, xj);
        let wj = two / ((A::one() - xj * xj) * d * d);
        x[j] = xj;
        w[j] = wj;
        x[n - j] = -xj;
        w[n - j] = wj;
    }
    if n % 2 == 0 {
        // center node is an exact root
        let (_, d) = legendre_polynomial_and_derivative(np, A::zero());
        x[n / 2] = A::zero();
        w[n / 2] = two / (d * d);
    }
    (x, w)
}

/// Legendre-Gauss-Lobatto nodes and weights for polynomial degree
/// `n >= 1`, endpoints included
pub fn gauss_lobatto_nodes_and_weights<A: FloatNum>(n: usize) -> (Array1<A>, Array1<A>) {
    assert!(
        n >= 1,
        "gauss_lobatto_nodes_and_weights: degree must be at least 1"
    );
    let np = n + 1;
    let mut x = Array1::<A>::zeros(np);
    let mut w = Array1::<A>::zeros(np);
    let two = A::one() + A::one();
    let n_f = A::from_usize(n).unwrap();
    let w_end = two / (n_f * (n_f + A::one()));
    x[0] = -A::one();
    x[n] = A::one();
    w[0] = w_end;
    w[n] = w_end;
    if n == 1 {
        return (x, w);
    }
    let tol = A::from_f64(NEWTON_TOL).unwrap();
    let half_nodes = (n + 1) / 2;
    for j in 1..=half_nodes {
        if j > n - j {
            break;
        }
        let jf = A::from_f64(j as f64 + 0.25).unwrap();
        let n_pi = A::PI() / n_f;
        let guess = -(jf * n_pi).cos()
            - A::from_f64(3.0 / 8.0).unwrap() / (n_f * A::PI() * jf);
        let mut xj = guess;
        for it in 0..=NEWTON_MAXITER {
            let (q, qp, _) = q_and_l_evaluation(n, xj);
            let delta = -q / qp;
            xj += delta;
            if delta.abs() <= tol * xj.abs() || delta.abs() <= tol {
                break;
            }
            assert!(
                it < NEWTON_MAXITER,
                "gauss_lobatto_nodes_and_weights: Newton iteration failed to converge for n = {}",
                n
            );
        }
        let (_, _, l_n) = q_and_l_evaluation(n, xj);
        let wj = two / (n_f * (n_f + A::one()) * l_n * l_n);
        x[j] = xj;
        w[j] = wj;
        x[n - j] = -xj;
        w[n - j] = wj;
    }
    (x, w)
}

/// Chebyshev-Gauss-Lobatto nodes for polynomial degree `n >= 1`
pub fn chebyshev_gauss_lobatto_nodes<A: FloatNum>(n: usize) -> Array1<A> {
    assert!(
        n >= 1,
        "chebyshev_gauss_lobatto_nodes: degree must be at least 1"
    );
    let n_f = A::from_usize(n).unwrap();
    Array1::from_shape_fn(n + 1, |j| {
        -(A::PI() * A::from_usize(j).unwrap() / n_f).cos()
    })
}

/// Equidistant nodes on `[-1, 1]` for polynomial degree `n`
pub fn equidistant_nodes<A: FloatNum>(n: usize) -> Array1<A> {
    let two = A::one() + A::one();
    if n == 0 {
        return Array1::from_elem(1, A::zero());
    }
    let n_f = A::from_usize(n).unwrap();
    Array1::from_shape_fn(n + 1, |j| {
        -A::one() + two * A::from_usize(j).unwrap() / n_f
    })
}

/// Nodes of the given set, plus quadrature weights where the set
/// admits a Legendre quadrature rule
pub fn nodes_and_weights<A: FloatNum>(
    n: usize,
    kind: NodeType,
) -> (Array1<A>, Option<Array1<A>>) {
    match kind {
        NodeType::Equidistant => (equidistant_nodes(n), None),
        NodeType::Gauss => {
            let (x, w) = gauss_nodes_and_weights(n);
            (x, Some(w))
        }
        NodeType::GaussLobatto => {
            let (x, w) = gauss_lobatto_nodes_and_weights(n);
            (x, Some(w))
        }
        NodeType::ChebyshevGaussLobatto => (chebyshev_gauss_lobatto_nodes(n), None),
    }
}

/// Barycentric weights of a node set (Berrut & Trefethen form)
pub fn barycentric_weights<A: FloatNum>(x: &Array1<A>) -> Array1<A> {
    let np = x.len();
    let mut w = Array1::<A>::from_elem(np, A::one());
    for j in 1..np {
        for k in 0..j {
            let dist = x[k] - x[j];
            w[k] *= dist;
            w[j] *= -dist;
        }
    }
    w.mapv_into(|v| A::one() / v)
}

/// Lagrange basis values `l_j(point)` of the node set `x`,
/// evaluated with the barycentric formula
pub fn lagrange_basis_at<A: FloatNum>(x: &Array1<A>, wbary: &Array1<A>, point: A) -> Array1<A> {
    let np = x.len();
    let tol = A::from_f64(1e-14).unwrap();
    let mut l = Array1::<A>::zeros(np);
    // exact hit on a node
    for j in 0..np {
        if (point - x[j]).abs() <= tol {
            l[j] = A::one();
            return l;
        }
    }
    let mut denom = A::zero();
    for j in 0..np {
        let t = wbary[j] / (point - x[j]);
        l[j] = t;
        denom += t;
    }
    l.mapv_into(|v| v / denom)
}

/// Dense interpolation matrix from the node set `x_in` to the
/// points `x_out`. Row `i` holds the Lagrange basis of `x_in`
/// evaluated at `x_out[i]`
pub fn interpolation_matrix<A: FloatNum>(
    x_in: &Array1<A>,
    wbary_in: &Array1<A>,
    x_out: &Array1<A>,
) -> Array2<A> {
    let mut vdm = Array2::<A>::zeros((x_out.len(), x_in.len()));
    for (i, row) in vdm.rows_mut().into_iter().enumerate() {
        let l = lagrange_basis_at(x_in, wbary_in, x_out[i]);
        let mut row = row;
        row.assign(&l);
    }
    vdm
}

/// Vandermonde matrix mapping nodal values of degree `n_in` on
/// `kind_in` nodes to nodal values of degree `n_out` on `kind_out`
/// nodes. Built once, immutable afterwards
pub fn vandermonde<A: FloatNum>(
    n_in: usize,
    kind_in: NodeType,
    n_out: usize,
    kind_out: NodeType,
) -> Array2<A> {
    let (x_in, _) = nodes_and_weights::<A>(n_in, kind_in);
    let (x_out, _) = nodes_and_weights::<A>(n_out, kind_out);
    let wbary = barycentric_weights(&x_in);
    interpolation_matrix(&x_in, &wbary, &x_out)
}

/// Polynomial differentiation matrix of the node set `x`
/// (barycentric form, negative sum trick on the diagonal)
pub fn derivative_matrix<A: FloatNum>(x: &Array1<A>, wbary: &Array1<A>) -> Array2<A> {
    let np = x.len();
    let mut d = Array2::<A>::zeros((np, np));
    for i in 0..np {
        let mut acc = A::zero();
        for j in 0..np {
            if i == j {
                continue;
            }
            let dij = wbary[j] / (wbary[i] * (x[i] - x[j]));
            d[[i, j]] = dij;
            acc -= dij;
        }
        d[[i, i]] = acc;
    }
    d
}

/// Precomputed one-dimensional operators of a nodal DG element:
/// nodes, quadrature weights, barycentric weights, differentiation
/// matrix and boundary evaluation vectors.
///
/// Built once per run from `(degree, node type)` and shared
/// read-only by all elements.
///
/// # Example
///```
/// use dgsem::bases::{DgBasis, NodeType};
///
/// let basis = DgBasis::<f64>::new(3, NodeType::Gauss);
/// assert_eq!(basis.x.len(), 4);
///```
#[derive(Debug, Clone)]
pub struct DgBasis<A> {
    /// Polynomial degree per direction
    pub n: usize,
    /// Node distribution
    pub kind: NodeType,
    /// Interpolation nodes on `[-1, 1]`
    pub x: Array1<A>,
    /// Quadrature weights
    pub w: Array1<A>,
    /// Barycentric weights
    pub wbary: Array1<A>,
    /// Differentiation matrix
    pub d: Array2<A>,
    /// Lagrange basis evaluated at `-1`
    pub l_minus: Array1<A>,
    /// Lagrange basis evaluated at `+1`
    pub l_plus: Array1<A>,
    /// Boundary lift coefficients `l_j(-1) / w_j`
    pub l_hat_minus: Array1<A>,
    /// Boundary lift coefficients `l_j(+1) / w_j`
    pub l_hat_plus: Array1<A>,
}

impl<A: FloatNum> DgBasis<A> {
    /// Build the operator set for degree `n` on `kind` nodes
    ///
    /// # Panics
    /// For node sets without a Legendre quadrature rule; the lifted
    /// boundary coefficients require one
    pub fn new(n: usize, kind: NodeType) -> Self {
        let (x, w) = nodes_and_weights::<A>(n, kind);
        let w = w.unwrap_or_else(|| {
            panic!(
                "DgBasis::new: node type {:?} has no quadrature weights",
                kind
            )
        });
        let wbary = barycentric_weights(&x);
        let d = derivative_matrix(&x, &wbary);
        let l_minus = lagrange_basis_at(&x, &wbary, -A::one());
        let l_plus = lagrange_basis_at(&x, &wbary, A::one());
        let l_hat_minus = Array1::from_shape_fn(n + 1, |j| l_minus[j] / w[j]);
        let l_hat_plus = Array1::from_shape_fn(n + 1, |j| l_plus[j] / w[j]);
        Self {
            n,
            kind,
            x,
            w,
            wbary,
            d,
            l_minus,
            l_plus,
            l_hat_minus,
            l_hat_plus,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;

    fn approx_eq(a: f64, b: f64, tol: f64) {
        if (a - b).abs() > tol {
            panic!("Large difference of values, got {} expected {}.", a, b)
        }
    }

    #[test]
    fn test_gauss_weights_sum_to_two() {
        for n in 0..9 {
            let (_, w) = gauss_nodes_and_weights::<f64>(n);
            approx_eq(w.sum(), 2.0, 1e-13);
        }
    }

    #[test]
    fn test_gauss_nodes_are_legendre_roots() {
        for n in 1..9 {
            let (x, _) = gauss_nodes_and_weights::<f64>(n);
            for &xj in x.iter() {
                let (l, _) = legendre_polynomial_and_derivative(n + 1, xj);
                approx_eq(l, 0.0, 1e-12);
            }
        }
    }

    #[test]
    fn test_gauss_lobatto_endpoints_and_weights() {
        for n in 1..9 {
            let (x, w) = gauss_lobatto_nodes_and_weights::<f64>(n);
            approx_eq(x[0], -1.0, 1e-15);
            approx_eq(x[n], 1.0, 1e-15);
            approx_eq(w.sum(), 2.0, 1e-13);
        }
    }

    #[test]
    fn test_gauss_quadrature_integrates_monomials() {
        // degree n rule is exact up to 2n + 1
        let n = 3;
        let (x, w) = gauss_nodes_and_weights::<f64>(n);
        for p in 0..=(2 * n + 1) {
            let num: f64 = x.iter().zip(w.iter()).map(|(xi, wi)| wi * xi.powi(p as i32)).sum();
            let exact = if p % 2 == 0 { 2.0 / (p as f64 + 1.0) } else { 0.0 };
            approx_eq(num, exact, 1e-13);
        }
    }

    #[test]
    fn test_chebyshev_nodes() {
        let x = chebyshev_gauss_lobatto_nodes::<f64>(2);
        approx_eq(x[0], -1.0, 1e-15);
        approx_eq(x[1], 0.0, 1e-15);
        approx_eq(x[2], 1.0, 1e-15);
    }

    #[test]
    fn test_lagrange_partition_of_unity() {
        let (x, _) = gauss_nodes_and_weights::<f64>(4);
        let wb = barycentric_weights(&x);
        for &pt in &[-0.7, -0.11, 0.3, 0.95] {
            let l = lagrange_basis_at(&x, &wb, pt);
            approx_eq(l.sum(), 1.0, 1e-13);
        }
    }

    #[test]
    fn test_interpolation_matrix_identity() {
        let (x, _) = gauss_lobatto_nodes_and_weights::<f64>(5);
        let wb = barycentric_weights(&x);
        let vdm = interpolation_matrix(&x, &wb, &x);
        for i in 0..x.len() {
            for j in 0..x.len() {
                let expected = if i == j { 1.0 } else { 0.0 };
                approx_eq(vdm[[i, j]], expected, 1e-14);
            }
        }
    }

    #[test]
    fn test_derivative_matrix_exact_for_polynomials() {
        let n = 5;
        let (x, _) = gauss_lobatto_nodes_and_weights::<f64>(n);
        let wb = barycentric_weights(&x);
        let d = derivative_matrix(&x, &wb);
        // f = x^3 - 2x, f' = 3x^2 - 2
        let f = Array1::from_shape_fn(n + 1, |i| x[i].powi(3) - 2.0 * x[i]);
        let df = d.dot(&f);
        for i in 0..=n {
            approx_eq(df[i], 3.0 * x[i] * x[i] - 2.0, 1e-12);
        }
    }

    #[test]
    fn test_boundary_evaluation() {
        let basis = DgBasis::<f64>::new(4, NodeType::Gauss);
        // l_minus/l_plus reproduce polynomial boundary values
        let f = Array1::from_shape_fn(5, |i| 0.5 * basis.x[i] * basis.x[i] + basis.x[i]);
        let at_minus: f64 = basis.l_minus.iter().zip(f.iter()).map(|(l, v)| l * v).sum();
        let at_plus: f64 = basis.l_plus.iter().zip(f.iter()).map(|(l, v)| l * v).sum();
        approx_eq(at_minus, -0.5, 1e-13);
        approx_eq(at_plus, 1.5, 1e-13);
    }

    #[test]
    #[should_panic(expected = "no quadrature weights")]
    fn test_basis_rejects_weightless_nodes() {
        let _ = DgBasis::<f64>::new(3, NodeType::Equidistant);
    }
}
