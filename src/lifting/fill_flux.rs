//! # Lifting surface fluxes
//! The BR1/BR2 surface flux of the gradient equation is half the
//! jump of the primitive trace across a side, weighted with the
//! surface element. No Riemann solver is involved; the flux of the
//! auxiliary equation is the trace average itself.
use crate::mesh::Mesh;
use ndarray::Array4;

/// Fill the lifting flux of the conforming and small mortar sides
/// in the selected group. `mpi_sides` restricts the pass to the
/// inter-process sides whose flux this rank computes
pub fn fill_flux(
    mesh: &Mesh,
    u_master: &Array4<f64>,
    u_slave: &Array4<f64>,
    flux: &mut Array4<f64>,
    mpi_sides: bool,
) {
    let (nvar, np, nq, _) = flux.dim();
    let range = if mpi_sides {
        mesh.ranges.mpi_mine.clone()
    } else {
        mesh.ranges.inner.clone()
    };
    for sid in range {
        for v in 0..nvar {
            for p in 0..np {
                for q in 0..nq {
                    let jump = 0.5 * (u_slave[[v, p, q, sid]] - u_master[[v, p, q, sid]]);
                    flux[[v, p, q, sid]] = jump * mesh.metrics.surf_elem[[p, q, sid]];
                }
            }
        }
    }
}

/// Fill the lifting flux of the boundary sides. With a prescribed
/// boundary state the jump is taken against it; without one the
/// boundary trace is its own exterior state and the flux vanishes
pub fn fill_flux_bc(
    mesh: &Mesh,
    u_master: &Array4<f64>,
    bc_state: Option<&Array4<f64>>,
    flux: &mut Array4<f64>,
) {
    let (nvar, np, nq, _) = flux.dim();
    for sid in mesh.ranges.bc.clone() {
        match bc_state {
            Some(ubc) => {
                for v in 0..nvar {
                    for p in 0..np {
                        for q in 0..nq {
                            let jump = 0.5 * (ubc[[v, p, q, sid]] - u_master[[v, p, q, sid]]);
                            flux[[v, p, q, sid]] = jump * mesh.metrics.surf_elem[[p, q, sid]];
                        }
                    }
                }
            }
            None => {
                for v in 0..nvar {
                    for p in 0..np {
                        for q in 0..nq {
                            flux[[v, p, q, sid]] = 0.0;
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) {
        if (a - b).abs() > tol {
            panic!("Large difference of values, got {} expected {}.", a, b)
        }
    }

    #[test]
    fn test_flux_is_half_jump_times_surface() {
        let n = 1;
        let mesh = Mesh::cartesian(3, n, [2, 1, 1], [2.0, 4.0, 1.0], 1);
        let shape = (1, mesh.np(), mesh.nq(), mesh.n_sides());
        let mut u_master = Array4::<f64>::from_elem(shape, 1.0);
        let u_slave = Array4::<f64>::from_elem(shape, 3.0);
        let mut flux = Array4::<f64>::zeros(shape);
        fill_flux(&mesh, &u_master, &u_slave, &mut flux, false);
        let sid = mesh.ranges.inner.start;
        let surf = mesh.metrics.surf_elem[[0, 0, sid]];
        approx_eq(flux[[0, 0, 0, sid]], surf, 1e-14);
        // boundary sides are untouched by the inner pass
        approx_eq(flux[[0, 0, 0, mesh.ranges.bc.start]], 0.0, 1e-15);

        // boundary pass against a prescribed exterior state
        u_master.fill(2.0);
        let ubc = Array4::<f64>::from_elem(shape, 6.0);
        fill_flux_bc(&mesh, &u_master, Some(&ubc), &mut flux);
        let bid = mesh.ranges.bc.start;
        let surf_bc = mesh.metrics.surf_elem[[0, 0, bid]];
        approx_eq(flux[[0, 0, 0, bid]], 2.0 * surf_bc, 1e-14);

        // without one the boundary flux vanishes
        fill_flux_bc(&mesh, &u_master, None, &mut flux);
        approx_eq(flux[[0, 0, 0, bid]], 0.0, 1e-15);
    }
}
