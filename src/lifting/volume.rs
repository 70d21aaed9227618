//! # Volume contribution to the lifted gradient
//! Reference-space derivatives of the primitive field combined with
//! the contravariant metric terms, per element. Polynomial elements
//! differentiate with the spectral derivative matrix in either the
//! non-conservative form (differentiate, then transform) or the
//! conservative form (transform, then differentiate); the selection
//! is fixed per run. Finite-volume elements use central differences
//! on the sub-cell grid with the Jacobian scaling baked into their
//! metric terms.
use crate::bases::DgBasis;
use crate::mesh::{ElemTag, Mesh};
use ndarray::{s, Array2, Array4, Array5, ArrayBase, Axis, Data, Ix4, Zip};

/// Derivative along one reference direction of an element block
/// `(var, i, j, k)`
fn ref_derivative<S>(dmat: &Array2<f64>, f: &ArrayBase<S, Ix4>, axis: usize) -> Array4<f64>
where
    S: Data<Elem = f64>,
{
    let (nvar, ni, nj, nk) = f.dim();
    let mut out = Array4::<f64>::zeros((nvar, ni, nj, nk));
    for v in 0..nvar {
        for i in 0..ni {
            for j in 0..nj {
                for k in 0..nk {
                    let mut acc = 0.0;
                    match axis {
                        0 => {
                            for l in 0..ni {
                                acc += dmat[[i, l]] * f[[v, l, j, k]];
                            }
                        }
                        1 => {
                            for l in 0..nj {
                                acc += dmat[[j, l]] * f[[v, i, l, k]];
                            }
                        }
                        _ => {
                            for l in 0..nk {
                                acc += dmat[[k, l]] * f[[v, i, j, l]];
                            }
                        }
                    }
                    out[[v, i, j, k]] = acc;
                }
            }
        }
    }
    out
}

/// Volume derivative of the primitive field for polynomial elements
#[enum_dispatch]
pub trait VolumeIntegral {
    /// Accumulate the metric-weighted reference derivatives of `u`
    /// into `grad` for every DG-tagged element. The result still
    /// carries the Jacobian; [`apply_jacobian`] maps it to physical
    /// space
    fn gradient(&self, mesh: &Mesh, basis: &DgBasis<f64>, u: &Array5<f64>, grad: &mut [Array5<f64>; 3]);
}

/// Transform the field with the metric terms first, then
/// differentiate the product
#[derive(Debug, Clone, Copy)]
pub struct Conservative;

/// Differentiate the field first, then combine with the metric
/// terms at each node
#[derive(Debug, Clone, Copy)]
pub struct NonConservative;

impl VolumeIntegral for NonConservative {
    fn gradient(&self, mesh: &Mesh, basis: &DgBasis<f64>, u: &Array5<f64>, grad: &mut [Array5<f64>; 3]) {
        let (nvar, np, _, nz, _) = u.dim();
        let [gx, gy, gz] = grad;
        // elements are independent, iterate them in parallel
        Zip::indexed(u.axis_iter(Axis(4)))
            .and(gx.axis_iter_mut(Axis(4)))
            .and(gy.axis_iter_mut(Axis(4)))
            .and(gz.axis_iter_mut(Axis(4)))
            .par_for_each(|e, u_e, mut gx_e, mut gy_e, mut gz_e| {
                if mesh.tags[e] != ElemTag::Dg {
                    return;
                }
                let mut g_e = [&mut gx_e, &mut gy_e, &mut gz_e];
                for d in 0..mesh.dim {
                    let du = ref_derivative(&basis.d, &u_e, d);
                    let mt = mesh.metrics.mtilde[d].slice(s![.., .., .., .., e]);
                    for c in 0..mesh.dim {
                        for v in 0..nvar {
                            for i in 0..np {
                                for j in 0..np {
                                    for k in 0..nz {
                                        g_e[c][[v, i, j, k]] +=
                                            mt[[c, i, j, k]] * du[[v, i, j, k]];
                                    }
                                }
                            }
                        }
                    }
                }
            });
    }
}

impl VolumeIntegral for Conservative {
    fn gradient(&self, mesh: &Mesh, basis: &DgBasis<f64>, u: &Array5<f64>, grad: &mut [Array5<f64>; 3]) {
        let (nvar, np, _, nz, _) = u.dim();
        let [gx, gy, gz] = grad;
        Zip::indexed(u.axis_iter(Axis(4)))
            .and(gx.axis_iter_mut(Axis(4)))
            .and(gy.axis_iter_mut(Axis(4)))
            .and(gz.axis_iter_mut(Axis(4)))
            .par_for_each(|e, u_e, mut gx_e, mut gy_e, mut gz_e| {
                if mesh.tags[e] != ElemTag::Dg {
                    return;
                }
                let mut g_e = [&mut gx_e, &mut gy_e, &mut gz_e];
                for d in 0..mesh.dim {
                    let mt = mesh.metrics.mtilde[d].slice(s![.., .., .., .., e]);
                    for c in 0..mesh.dim {
                        let mut f = Array4::<f64>::zeros((nvar, np, np, nz));
                        for v in 0..nvar {
                            for i in 0..np {
                                for j in 0..np {
                                    for k in 0..nz {
                                        f[[v, i, j, k]] = mt[[c, i, j, k]] * u_e[[v, i, j, k]];
                                    }
                                }
                            }
                        }
                        let df = ref_derivative(&basis.d, &f, d);
                        for v in 0..nvar {
                            for i in 0..np {
                                for j in 0..np {
                                    for k in 0..nz {
                                        g_e[c][[v, i, j, k]] += df[[v, i, j, k]];
                                    }
                                }
                            }
                        }
                    }
                }
            });
    }
}

/// Volume integral selection, fixed per run
#[derive(Debug, Clone, Copy)]
pub enum VolumeMode {
    /// Transform, then differentiate
    Conservative(Conservative),
    /// Differentiate, then transform
    NonConservative(NonConservative),
}

impl VolumeMode {
    /// Differentiate-then-transform selection
    pub fn non_conservative() -> Self {
        VolumeMode::NonConservative(NonConservative)
    }

    /// Transform-then-differentiate selection
    pub fn conservative() -> Self {
        VolumeMode::Conservative(Conservative)
    }
}

impl VolumeIntegral for VolumeMode {
    fn gradient(&self, mesh: &Mesh, basis: &DgBasis<f64>, u: &Array5<f64>, grad: &mut [Array5<f64>; 3]) {
        match self {
            VolumeMode::Conservative(m) => m.gradient(mesh, basis, u, grad),
            VolumeMode::NonConservative(m) => m.gradient(mesh, basis, u, grad),
        }
    }
}

/// Gradients of finite-volume elements: central differences between
/// neighboring sub-cell values, one-sided at the element boundary,
/// combined with the Jacobian-pre-scaled FV metric terms
pub fn fv_gradient(mesh: &Mesh, u: &Array5<f64>, grad: &mut [Array5<f64>; 3]) {
    let (nvar, np, _, nz, _) = u.dim();
    // sub-cell width on the reference interval [-1, 1]
    let delta = 2.0 / np as f64;
    let diff = |lo: f64, hi: f64, width: f64| (hi - lo) / width;
    for e in 0..mesh.n_elems {
        if mesh.tags[e] != ElemTag::Fv {
            continue;
        }
        for d in 0..mesh.dim {
            let mut du = Array4::<f64>::zeros((nvar, np, np, nz));
            let n_axis = if d == 2 { nz } else { np };
            if n_axis > 1 {
                for v in 0..nvar {
                    for i in 0..np {
                        for j in 0..np {
                            for k in 0..nz {
                                let idx = [i, j, k][d];
                                let at = |l: usize| match d {
                                    0 => u[[v, l, j, k, e]],
                                    1 => u[[v, i, l, k, e]],
                                    _ => u[[v, i, j, l, e]],
                                };
                                du[[v, i, j, k]] = if idx == 0 {
                                    diff(at(0), at(1), delta)
                                } else if idx == n_axis - 1 {
                                    diff(at(n_axis - 2), at(n_axis - 1), delta)
                                } else {
                                    diff(at(idx - 1), at(idx + 1), 2.0 * delta)
                                };
                            }
                        }
                    }
                }
            }
            let mt = &mesh.metrics.fv_mtilde_sj[d];
            for c in 0..mesh.dim {
                for v in 0..nvar {
                    for i in 0..np {
                        for j in 0..np {
                            for k in 0..nz {
                                grad[c][[v, i, j, k, e]] += mt[[c, i, j, k, e]] * du[[v, i, j, k]];
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Map the accumulated DG volume derivatives from computational to
/// physical space by multiplying with the inverse Jacobian.
/// Finite-volume elements are untouched, their metric terms carry
/// the scaling already
pub fn apply_jacobian(mesh: &Mesh, grad: &mut [Array5<f64>; 3]) {
    for g in grad.iter_mut().take(mesh.dim) {
        Zip::indexed(g.axis_iter_mut(Axis(4)))
            .and(mesh.metrics.sj.axis_iter(Axis(3)))
            .par_for_each(|e, mut g_e, sj_e| {
                if mesh.tags[e] != ElemTag::Dg {
                    return;
                }
                g_e *= &sj_e;
            });
    }
}
