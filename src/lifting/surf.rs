//! # Surface contribution to the lifted gradient
//! Scatter of the penalized surface flux into the volume gradient
//! at face-adjacent nodes, plus the matching correction of the face
//! traces that were prolonged before this step. Slave slots of all
//! sides are processed first, then master slots, so that two slots
//! of one element never race on the scatter-add.
use super::prolong::face_weight;
use super::LiftingParams;
use crate::bases::DgBasis;
use crate::mesh::{side_to_volume, ElemTag, Flip, LocalSide, Mesh};
use ndarray::{Array4, Array5};

/// Lifted test-function weight of the node `layer` steps below a
/// face
fn lift_weight(basis: &DgBasis<f64>, is_plus: bool, layer: usize) -> f64 {
    if is_plus {
        basis.l_hat_plus[basis.n - layer]
    } else {
        basis.l_hat_minus[layer]
    }
}

#[allow(clippy::too_many_arguments)]
fn accumulate_slot(
    mesh: &Mesh,
    basis: &DgBasis<f64>,
    eta: f64,
    flux: &Array4<f64>,
    sid: usize,
    elem: usize,
    lside: LocalSide,
    flip: Option<Flip>,
    grad: &mut [Array5<f64>; 3],
    trace: &mut [Array4<f64>; 3],
) {
    // FV gradients are complete after central differencing
    if mesh.tags[elem] == ElemTag::Fv {
        return;
    }
    let (nvar, np, nq, _) = flux.dim();
    for v in 0..nvar {
        for p in 0..np {
            for q in 0..nq {
                let (sp, sq) = match flip {
                    Some(f) => f.map(p, q, mesh.n, mesh.dim),
                    None => (p, q),
                };
                // the stored master-frame normal is correct for both
                // slots: the jump sign and the normal sign flip
                // together between master and slave
                let f = eta * flux[[v, p, q, sid]];
                let mut trace_scale = 0.0;
                for l in 0..np {
                    let (i, j, k) = side_to_volume(mesh.n, mesh.dim, lside, sp, sq, l);
                    let lw = lift_weight(basis, lside.is_plus(), l);
                    let sj = mesh.metrics.sj[[i, j, k, elem]];
                    for c in 0..mesh.dim {
                        grad[c][[v, i, j, k, elem]] +=
                            f * mesh.metrics.normal[[c, p, q, sid]] * lw * sj;
                    }
                    trace_scale += face_weight(basis, lside.is_plus(), l) * lw * sj;
                }
                for c in 0..mesh.dim {
                    trace[c][[v, p, q, sid]] +=
                        f * mesh.metrics.normal[[c, p, q, sid]] * trace_scale;
                }
            }
        }
    }
}

/// Accumulate the BR2 penalty term into the volume gradients and
/// the already-prolonged face traces of every DG element. The
/// penalty coefficient is selected per side from its boundary
/// condition type
pub fn surf_integral_lifting(
    mesh: &Mesh,
    basis: &DgBasis<f64>,
    params: &LiftingParams,
    flux: &Array4<f64>,
    grad: &mut [Array5<f64>; 3],
    grad_master: &mut [Array4<f64>; 3],
    grad_slave: &mut [Array4<f64>; 3],
) {
    for sid in 0..mesh.n_sides() {
        if let Some((elem, lside, flip)) = mesh.sides[sid].slave {
            let eta = params.penalty(mesh.sides[sid].bc_type);
            accumulate_slot(
                mesh, basis, eta, flux, sid, elem, lside, Some(flip), grad, grad_slave,
            );
        }
    }
    for sid in 0..mesh.n_sides() {
        if let Some((elem, lside)) = mesh.sides[sid].master {
            let eta = params.penalty(mesh.sides[sid].bc_type);
            accumulate_slot(
                mesh, basis, eta, flux, sid, elem, lside, None, grad, grad_master,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bases::NodeType;
    use crate::lifting::prolong::prolong_to_face;
    use crate::lifting::VolumeMode;

    fn approx_eq(a: f64, b: f64, tol: f64) {
        if (a - b).abs() > tol {
            panic!("Large difference of values, got {} expected {}.", a, b)
        }
    }

    fn params(eta: f64) -> LiftingParams {
        LiftingParams {
            eta_br2: eta,
            eta_br2_wall: eta,
            volume_mode: VolumeMode::non_conservative(),
            fv_enabled: false,
        }
    }

    #[test]
    fn test_step_jump_integrates_to_jump_area() {
        // piecewise constant field with a jump of 2 across the inner
        // side: the lifted gradient must integrate to jump * area
        let n = 3;
        let mesh = Mesh::cartesian(3, n, [2, 1, 1], [2.0, 1.0, 1.0], 1);
        let basis = DgBasis::<f64>::new(n, NodeType::Gauss);
        let shape = (1, mesh.np(), mesh.nq(), mesh.n_sides());
        let sid = mesh.ranges.inner.start;
        let mut flux = Array4::<f64>::zeros(shape);
        // jump of 2, half jump times surface element
        for p in 0..mesh.np() {
            for q in 0..mesh.nq() {
                flux[[0, p, q, sid]] = 1.0 * mesh.metrics.surf_elem[[p, q, sid]];
            }
        }
        let eta = 1.5;
        let vol_shape = (1, mesh.np(), mesh.np(), mesh.nz(), 2);
        let mut grad = [
            Array5::<f64>::zeros(vol_shape),
            Array5::<f64>::zeros(vol_shape),
            Array5::<f64>::zeros(vol_shape),
        ];
        let mut gm = [
            Array4::<f64>::zeros(shape),
            Array4::<f64>::zeros(shape),
            Array4::<f64>::zeros(shape),
        ];
        let mut gs = [
            Array4::<f64>::zeros(shape),
            Array4::<f64>::zeros(shape),
            Array4::<f64>::zeros(shape),
        ];
        surf_integral_lifting(&mesh, &basis, &params(eta), &flux, &mut grad, &mut gm, &mut gs);

        let mut integral = 0.0;
        for e in 0..2 {
            for i in 0..mesh.np() {
                for j in 0..mesh.np() {
                    for k in 0..mesh.nz() {
                        let w = basis.w[i] * basis.w[j] * basis.w[k];
                        integral += w * grad[0][[0, i, j, k, e]] / mesh.metrics.sj[[i, j, k, e]];
                    }
                }
            }
        }
        // jump 2 across a unit face, scaled by the penalty
        approx_eq(integral, 2.0 * eta, 1e-11);

        // y and z components receive nothing from an x-normal side
        for g in grad[1].iter().chain(grad[2].iter()) {
            approx_eq(*g, 0.0, 1e-15);
        }
    }

    #[test]
    fn test_trace_correction_matches_prolongation() {
        // the face-trace update must equal prolonging the corrected
        // volume gradient from scratch
        let n = 2;
        let mesh = Mesh::cartesian(3, n, [2, 1, 1], [2.0, 1.0, 1.0], 1);
        let basis = DgBasis::<f64>::new(n, NodeType::Gauss);
        let shape = (1, mesh.np(), mesh.nq(), mesh.n_sides());
        let sid = mesh.ranges.inner.start;
        let mut flux = Array4::<f64>::zeros(shape);
        for p in 0..mesh.np() {
            for q in 0..mesh.nq() {
                flux[[0, p, q, sid]] =
                    (0.3 + 0.1 * p as f64 - 0.05 * q as f64) * mesh.metrics.surf_elem[[p, q, sid]];
            }
        }
        let vol_shape = (1, mesh.np(), mesh.np(), mesh.nz(), 2);
        let mut grad = [
            Array5::<f64>::zeros(vol_shape),
            Array5::<f64>::zeros(vol_shape),
            Array5::<f64>::zeros(vol_shape),
        ];
        let mut gm = [
            Array4::<f64>::zeros(shape),
            Array4::<f64>::zeros(shape),
            Array4::<f64>::zeros(shape),
        ];
        let mut gs = [
            Array4::<f64>::zeros(shape),
            Array4::<f64>::zeros(shape),
            Array4::<f64>::zeros(shape),
        ];
        surf_integral_lifting(&mesh, &basis, &params(2.0), &flux, &mut grad, &mut gm, &mut gs);

        let mut check_m = Array4::<f64>::zeros(shape);
        let mut check_s = Array4::<f64>::zeros(shape);
        prolong_to_face(&mesh, &basis, &grad[0], &mut check_m, &mut check_s, false);
        for p in 0..mesh.np() {
            for q in 0..mesh.nq() {
                approx_eq(gm[0][[0, p, q, sid]], check_m[[0, p, q, sid]], 1e-12);
                approx_eq(gs[0][[0, p, q, sid]], check_s[[0, p, q, sid]], 1e-12);
            }
        }
    }
}
