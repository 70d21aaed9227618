//! # Boundary prolongation
//! Evaluation of element volume fields at face nodes. Polynomial
//! elements extrapolate with the boundary evaluation weights of the
//! basis; finite-volume elements take the boundary sub-cell value
//! unchanged. Traces are stored per side in the side's master
//! frame, so slave elements write through their flip permutation.
use crate::bases::DgBasis;
use crate::mesh::{side_to_volume, ElemTag, LocalSide, Mesh};
use ndarray::{Array4, Array5};

/// Boundary extrapolation weight of the node `layer` steps below a
/// face
pub(crate) fn face_weight(basis: &DgBasis<f64>, is_plus: bool, layer: usize) -> f64 {
    if is_plus {
        basis.l_plus[basis.n - layer]
    } else {
        basis.l_minus[layer]
    }
}

fn trace_value(
    mesh: &Mesh,
    basis: &DgBasis<f64>,
    vol: &Array5<f64>,
    elem: usize,
    side: LocalSide,
    v: usize,
    p: usize,
    q: usize,
) -> f64 {
    match mesh.tags[elem] {
        ElemTag::Fv => {
            // boundary sub-cell value, no extrapolation
            let (i, j, k) = side_to_volume(mesh.n, mesh.dim, side, p, q, 0);
            vol[[v, i, j, k, elem]]
        }
        ElemTag::Dg => {
            let mut acc = 0.0;
            for l in 0..mesh.np() {
                let (i, j, k) = side_to_volume(mesh.n, mesh.dim, side, p, q, l);
                acc += face_weight(basis, side.is_plus(), l) * vol[[v, i, j, k, elem]];
            }
            acc
        }
    }
}

/// Evaluate `vol` at the face nodes of every side in the selected
/// group, filling the master and slave trace storage. `mpi_sides`
/// selects the inter-process sides so that their traces can be
/// handed to the exchange before the local sides are processed;
/// big mortar faces with remote small faces belong to that group
/// too, their master element is local
pub fn prolong_to_face(
    mesh: &Mesh,
    basis: &DgBasis<f64>,
    vol: &Array5<f64>,
    master: &mut Array4<f64>,
    slave: &mut Array4<f64>,
    mpi_sides: bool,
) {
    let nvar = vol.dim().0;
    let groups = if mpi_sides {
        [mesh.ranges.mpi(), mesh.ranges.mpi_mortar.clone()]
    } else {
        [0..mesh.ranges.inner.end, 0..0]
    };
    for sid in groups.iter().cloned().flatten() {
        let info = &mesh.sides[sid];
        if let Some((elem, lside)) = info.master {
            for v in 0..nvar {
                for p in 0..mesh.np() {
                    for q in 0..mesh.nq() {
                        master[[v, p, q, sid]] =
                            trace_value(mesh, basis, vol, elem, lside, v, p, q);
                    }
                }
            }
        }
        if let Some((elem, lside, flip)) = info.slave {
            for v in 0..nvar {
                for p in 0..mesh.np() {
                    for q in 0..mesh.nq() {
                        let (sp, sq) = flip.map(p, q, mesh.n, mesh.dim);
                        slave[[v, p, q, sid]] =
                            trace_value(mesh, basis, vol, elem, lside, v, sp, sq);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bases::NodeType;

    fn approx_eq(a: f64, b: f64, tol: f64) {
        if (a - b).abs() > tol {
            panic!("Large difference of values, got {} expected {}.", a, b)
        }
    }

    #[test]
    fn test_trace_of_reference_polynomial() {
        // single element, all sides are boundaries; the trace of a
        // polynomial in reference coordinates is its value at +-1
        let n = 3;
        let mesh = Mesh::cartesian(3, n, [1, 1, 1], [1.0, 1.0, 1.0], 1);
        let basis = DgBasis::<f64>::new(n, NodeType::Gauss);
        let f = |x: f64, y: f64, z: f64| x * x * x - 0.5 * x * y + 2.0 * z;
        let np = mesh.np();
        let mut vol = Array5::<f64>::zeros((1, np, np, np, 1));
        for i in 0..np {
            for j in 0..np {
                for k in 0..np {
                    vol[[0, i, j, k, 0]] = f(basis.x[i], basis.x[j], basis.x[k]);
                }
            }
        }
        let mut master = Array4::<f64>::zeros((1, np, np, mesh.n_sides()));
        let mut slave = Array4::<f64>::zeros((1, np, np, mesh.n_sides()));
        prolong_to_face(&mesh, &basis, &vol, &mut master, &mut slave, false);

        for sid in 0..mesh.n_sides() {
            let (_, lside) = mesh.sides[sid].master.unwrap();
            let face = if lside.is_plus() { 1.0 } else { -1.0 };
            for p in 0..np {
                for q in 0..np {
                    let (xp, xq) = (basis.x[p], basis.x[q]);
                    let expected = match lside.axis() {
                        0 => f(face, xp, xq),
                        1 => f(xp, face, xq),
                        _ => f(xp, xq, face),
                    };
                    approx_eq(master[[0, p, q, sid]], expected, 1e-12);
                }
            }
        }
    }

    #[test]
    fn test_continuous_field_has_matching_traces() {
        // a globally linear field must produce equal master and
        // slave traces on the shared side
        let n = 2;
        let mesh = Mesh::cartesian(3, n, [2, 1, 1], [2.0, 1.0, 1.0], 1);
        let basis = DgBasis::<f64>::new(n, NodeType::Gauss);
        let np = mesh.np();
        let mut vol = Array5::<f64>::zeros((1, np, np, np, 2));
        for e in 0..2 {
            for i in 0..np {
                for j in 0..np {
                    for k in 0..np {
                        // x in [0, 2] across the two elements
                        let x = e as f64 + 0.5 * (basis.x[i] + 1.0);
                        vol[[0, i, j, k, e]] = 3.0 * x - 1.0;
                    }
                }
            }
        }
        let mut master = Array4::<f64>::zeros((1, np, np, mesh.n_sides()));
        let mut slave = Array4::<f64>::zeros((1, np, np, mesh.n_sides()));
        prolong_to_face(&mesh, &basis, &vol, &mut master, &mut slave, false);
        let sid = mesh.ranges.inner.start;
        for p in 0..np {
            for q in 0..np {
                approx_eq(master[[0, p, q, sid]], 2.0, 1e-12);
                approx_eq(slave[[0, p, q, sid]], 2.0, 1e-12);
            }
        }
    }

    #[test]
    fn test_remote_mortar_big_face_prolonged_with_mpi_group() {
        // a big mortar face whose small faces live on another rank
        // keeps its master element local; its trace must be filled
        // by the inter-process pass, not the local one
        let n = 2;
        let mut mesh = Mesh::cartesian(3, n, [1, 1, 1], [1.0, 1.0, 1.0], 1);
        let last = mesh.n_sides() - 1;
        mesh.ranges.bc = 0..last;
        mesh.ranges.inner_mortar = last..last;
        mesh.ranges.inner = last..last;
        mesh.ranges.mpi_mine = last..last;
        mesh.ranges.mpi_your = last..last;
        mesh.ranges.mpi_mortar = last..last + 1;
        mesh.sides[last].bc_type = None;
        assert_eq!(mesh.sides[last].master, Some((0, LocalSide::ZetaPlus)));

        let basis = DgBasis::<f64>::new(n, NodeType::Gauss);
        let np = mesh.np();
        let mut vol = Array5::<f64>::zeros((1, np, np, np, 1));
        for i in 0..np {
            for j in 0..np {
                for k in 0..np {
                    // z in [0, 1], so the zeta-plus trace is 1
                    vol[[0, i, j, k, 0]] = 0.5 * (basis.x[k] + 1.0);
                }
            }
        }
        let mut master = Array4::<f64>::zeros((1, np, np, mesh.n_sides()));
        let mut slave = Array4::<f64>::zeros((1, np, np, mesh.n_sides()));
        prolong_to_face(&mesh, &basis, &vol, &mut master, &mut slave, false);
        for p in 0..np {
            for q in 0..np {
                approx_eq(master[[0, p, q, last]], 0.0, 1e-15);
            }
        }
        prolong_to_face(&mesh, &basis, &vol, &mut master, &mut slave, true);
        for p in 0..np {
            for q in 0..np {
                approx_eq(master[[0, p, q, last]], 1.0, 1e-12);
            }
        }
    }

    #[test]
    fn test_fv_trace_takes_boundary_subcell() {
        let n = 2;
        let mut mesh = Mesh::cartesian(3, n, [1, 1, 1], [1.0, 1.0, 1.0], 1);
        mesh.tags[0] = ElemTag::Fv;
        let basis = DgBasis::<f64>::new(n, NodeType::Gauss);
        let np = mesh.np();
        let mut vol = Array5::<f64>::zeros((1, np, np, np, 1));
        for i in 0..np {
            vol[[0, i, 1, 1, 0]] = i as f64 + 1.0;
        }
        let mut master = Array4::<f64>::zeros((1, np, np, mesh.n_sides()));
        let mut slave = Array4::<f64>::zeros((1, np, np, mesh.n_sides()));
        prolong_to_face(&mesh, &basis, &vol, &mut master, &mut slave, false);
        for sid in 0..mesh.n_sides() {
            let (_, lside) = mesh.sides[sid].master.unwrap();
            if lside.axis() == 0 {
                let expected = if lside.is_plus() { np as f64 } else { 1.0 };
                approx_eq(master[[0, 1, 1, sid]], expected, 1e-15);
            }
        }
    }
}
