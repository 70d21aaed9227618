//! # Basis change by tensor contraction
//! Interpolation of nodal tensor-product fields from one
//! polynomial representation to another. Each spatial direction is
//! contracted in turn with a one-dimensional Vandermonde matrix,
//! always in the fixed order xi, then eta, then zeta, so that the
//! accumulated rounding error is reproducible.
//!
//! Variants exist for 1-D/2-D/3-D fields, isotropic or
//! per-direction matrices, vector-valued (leading variable axis) or
//! scalar data, and for out-of-place or in-place application. The
//! in-place variants contract into a scratch buffer and copy back;
//! both forms produce bit-identical results.
//!
//! Dimension mismatches are programming errors and panic.
use crate::types::FloatNum;
use ndarray::{Array2, Array3, Array4, ArrayBase, Axis, Data, Ix2, Ix3, Ix4};

/// Contract the node axis of a 1-D field `(var, i)` with `vdm`
pub fn change_basis_1d<A, S>(vdm: &Array2<A>, x: &ArrayBase<S, Ix2>) -> Array2<A>
where
    A: FloatNum,
    S: Data<Elem = A>,
{
    let (nvar, ni) = x.dim();
    assert_eq!(
        vdm.ncols(),
        ni,
        "change_basis_1d: matrix columns do not match input nodes"
    );
    let no = vdm.nrows();
    let mut out = Array2::<A>::zeros((nvar, no));
    for v in 0..nvar {
        for io in 0..no {
            let mut acc = A::zero();
            for ii in 0..ni {
                acc += vdm[[io, ii]] * x[[v, ii]];
            }
            out[[v, io]] = acc;
        }
    }
    out
}

/// Contract the first node axis (p) of a face field `(var, p, q)`
pub fn contract_p<A, S>(vdm: &Array2<A>, x: &ArrayBase<S, Ix3>) -> Array3<A>
where
    A: FloatNum,
    S: Data<Elem = A>,
{
    let (nvar, ni, nj) = x.dim();
    assert_eq!(
        vdm.ncols(),
        ni,
        "contract_p: matrix columns do not match input nodes"
    );
    let no = vdm.nrows();
    let mut out = Array3::<A>::zeros((nvar, no, nj));
    for v in 0..nvar {
        for io in 0..no {
            for j in 0..nj {
                let mut acc = A::zero();
                for ii in 0..ni {
                    acc += vdm[[io, ii]] * x[[v, ii, j]];
                }
                out[[v, io, j]] = acc;
            }
        }
    }
    out
}

/// Contract the second node axis (q) of a face field `(var, p, q)`
pub fn contract_q<A, S>(vdm: &Array2<A>, x: &ArrayBase<S, Ix3>) -> Array3<A>
where
    A: FloatNum,
    S: Data<Elem = A>,
{
    let (nvar, ni, nj) = x.dim();
    assert_eq!(
        vdm.ncols(),
        nj,
        "contract_q: matrix columns do not match input nodes"
    );
    let no = vdm.nrows();
    let mut out = Array3::<A>::zeros((nvar, ni, no));
    for v in 0..nvar {
        for i in 0..ni {
            for jo in 0..no {
                let mut acc = A::zero();
                for jj in 0..nj {
                    acc += vdm[[jo, jj]] * x[[v, i, jj]];
                }
                out[[v, i, jo]] = acc;
            }
        }
    }
    out
}

/// Change the basis of a 2-D field `(var, i, j)` with separate
/// matrices per direction, xi first, then eta
pub fn change_basis_2d_xy<A, S>(
    vdm_xi: &Array2<A>,
    vdm_eta: &Array2<A>,
    x: &ArrayBase<S, Ix3>,
) -> Array3<A>
where
    A: FloatNum,
    S: Data<Elem = A>,
{
    let tmp = contract_p(vdm_xi, x);
    contract_q(vdm_eta, &tmp)
}

/// Change the basis of a 2-D field `(var, i, j)` with one matrix
/// applied to both directions
pub fn change_basis_2d<A, S>(vdm: &Array2<A>, x: &ArrayBase<S, Ix3>) -> Array3<A>
where
    A: FloatNum,
    S: Data<Elem = A>,
{
    change_basis_2d_xy(vdm, vdm, x)
}

/// Change the basis of a 3-D field `(var, i, j, k)` with separate
/// matrices per direction, contracted in the order xi, eta, zeta
pub fn change_basis_3d_xyz<A, S>(
    vdm_xi: &Array2<A>,
    vdm_eta: &Array2<A>,
    vdm_zeta: &Array2<A>,
    x: &ArrayBase<S, Ix4>,
) -> Array4<A>
where
    A: FloatNum,
    S: Data<Elem = A>,
{
    let (nvar, ni, nj, nk) = x.dim();
    assert_eq!(
        vdm_xi.ncols(),
        ni,
        "change_basis_3d: xi matrix columns do not match input nodes"
    );
    assert_eq!(
        vdm_eta.ncols(),
        nj,
        "change_basis_3d: eta matrix columns do not match input nodes"
    );
    assert_eq!(
        vdm_zeta.ncols(),
        nk,
        "change_basis_3d: zeta matrix columns do not match input nodes"
    );
    let (no_i, no_j, no_k) = (vdm_xi.nrows(), vdm_eta.nrows(), vdm_zeta.nrows());

    // xi
    let mut buf1 = Array4::<A>::zeros((nvar, no_i, nj, nk));
    for v in 0..nvar {
        for io in 0..no_i {
            for j in 0..nj {
                for k in 0..nk {
                    let mut acc = A::zero();
                    for ii in 0..ni {
                        acc += vdm_xi[[io, ii]] * x[[v, ii, j, k]];
                    }
                    buf1[[v, io, j, k]] = acc;
                }
            }
        }
    }
    // eta
    let mut buf2 = Array4::<A>::zeros((nvar, no_i, no_j, nk));
    for v in 0..nvar {
        for i in 0..no_i {
            for jo in 0..no_j {
                for k in 0..nk {
                    let mut acc = A::zero();
                    for jj in 0..nj {
                        acc += vdm_eta[[jo, jj]] * buf1[[v, i, jj, k]];
                    }
                    buf2[[v, i, jo, k]] = acc;
                }
            }
        }
    }
    // zeta
    let mut out = Array4::<A>::zeros((nvar, no_i, no_j, no_k));
    for v in 0..nvar {
        for i in 0..no_i {
            for j in 0..no_j {
                for ko in 0..no_k {
                    let mut acc = A::zero();
                    for kk in 0..nk {
                        acc += vdm_zeta[[ko, kk]] * buf2[[v, i, j, kk]];
                    }
                    out[[v, i, j, ko]] = acc;
                }
            }
        }
    }
    out
}

/// Change the basis of a 3-D field `(var, i, j, k)` with one matrix
/// applied to all three directions
pub fn change_basis_3d<A, S>(vdm: &Array2<A>, x: &ArrayBase<S, Ix4>) -> Array4<A>
where
    A: FloatNum,
    S: Data<Elem = A>,
{
    change_basis_3d_xyz(vdm, vdm, vdm, x)
}

/// Scalar 2-D variant; the field carries no variable axis
pub fn change_basis_2d_scalar<A, S>(vdm: &Array2<A>, x: &ArrayBase<S, Ix2>) -> Array2<A>
where
    A: FloatNum,
    S: Data<Elem = A>,
{
    let with_var = x.view().insert_axis(Axis(0));
    let out = change_basis_2d(vdm, &with_var);
    out.remove_axis(Axis(0))
}

/// Scalar 3-D variant; the field carries no variable axis
pub fn change_basis_3d_scalar<A, S>(vdm: &Array2<A>, x: &ArrayBase<S, Ix3>) -> Array3<A>
where
    A: FloatNum,
    S: Data<Elem = A>,
{
    let with_var = x.view().insert_axis(Axis(0));
    let out = change_basis_3d(vdm, &with_var);
    out.remove_axis(Axis(0))
}

/// In-place 1-D basis change; requires a square matrix
pub fn change_basis_1d_inplace<A: FloatNum>(vdm: &Array2<A>, x: &mut Array2<A>) {
    assert_eq!(
        vdm.nrows(),
        vdm.ncols(),
        "change_basis_1d_inplace: matrix must be square"
    );
    let out = change_basis_1d(vdm, x);
    x.assign(&out);
}

/// In-place 2-D basis change; requires a square matrix
pub fn change_basis_2d_inplace<A: FloatNum>(vdm: &Array2<A>, x: &mut Array3<A>) {
    assert_eq!(
        vdm.nrows(),
        vdm.ncols(),
        "change_basis_2d_inplace: matrix must be square"
    );
    let out = change_basis_2d(vdm, x);
    x.assign(&out);
}

/// In-place 3-D basis change; requires a square matrix
pub fn change_basis_3d_inplace<A: FloatNum>(vdm: &Array2<A>, x: &mut Array4<A>) {
    assert_eq!(
        vdm.nrows(),
        vdm.ncols(),
        "change_basis_3d_inplace: matrix must be square"
    );
    let out = change_basis_3d(vdm, x);
    x.assign(&out);
}
