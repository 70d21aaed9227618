//! # Structured affine mesh builders
//! Cartesian box meshes with exact metric terms, used by the unit
//! tests and benchmarks; production meshes come from the external
//! mesh reader. A conforming box builder and a three-element
//! 1-to-2 mortar configuration are provided.
use super::{
    ElemTag, Flip, LocalSide, Mesh, Metrics, MortarKind, MortarSide, SideInfo, SideRanges,
};
use ndarray::{Array3, Array4, Array5};

struct SideSeed {
    master: Option<(usize, LocalSide)>,
    slave: Option<(usize, LocalSide, Flip)>,
    bc_type: Option<i32>,
    /// outward normal in the master frame
    normal: [f64; 3],
    /// constant surface element of the affine face
    surf: f64,
}

fn local_side(axis: usize, plus: bool) -> LocalSide {
    match (axis, plus) {
        (0, false) => LocalSide::XiMinus,
        (0, true) => LocalSide::XiPlus,
        (1, false) => LocalSide::EtaMinus,
        (1, true) => LocalSide::EtaPlus,
        (2, false) => LocalSide::ZetaMinus,
        (2, true) => LocalSide::ZetaPlus,
        _ => unreachable!(),
    }
}

/// Surface element of an affine face normal to `axis` for an
/// element of extents `h`; reference face measure is 4 (3-D)
/// or 2 (2-D)
fn face_surf(dim: usize, axis: usize, h: [f64; 3]) -> f64 {
    if dim == 3 {
        match axis {
            0 => h[1] * h[2] / 4.0,
            1 => h[0] * h[2] / 4.0,
            _ => h[0] * h[1] / 4.0,
        }
    } else {
        match axis {
            0 => h[1] / 2.0,
            _ => h[0] / 2.0,
        }
    }
}

/// Constant metric terms of an affine box element of extents `h`:
/// Jacobian-weighted contravariant vectors and inverse Jacobian
fn box_metrics(dim: usize, h: [f64; 3]) -> (Vec<[f64; 3]>, f64) {
    if dim == 3 {
        let mt = vec![
            [h[1] * h[2] / 4.0, 0.0, 0.0],
            [0.0, h[0] * h[2] / 4.0, 0.0],
            [0.0, 0.0, h[0] * h[1] / 4.0],
        ];
        (mt, 8.0 / (h[0] * h[1] * h[2]))
    } else {
        let mt = vec![[h[1] / 2.0, 0.0, 0.0], [0.0, h[0] / 2.0, 0.0]];
        (mt, 4.0 / (h[0] * h[1]))
    }
}

fn assemble(
    dim: usize,
    n: usize,
    n_elems: usize,
    elem_h: &[[f64; 3]],
    bc_seeds: Vec<SideSeed>,
    inner_mortar_seeds: Vec<SideSeed>,
    inner_seeds: Vec<SideSeed>,
    mut mortars: Vec<MortarSide>,
) -> Mesh {
    let np = n + 1;
    let nz = if dim == 3 { np } else { 1 };
    let nq = nz;

    let n_bc = bc_seeds.len();
    let n_im = inner_mortar_seeds.len();
    let n_in = inner_seeds.len();
    let n_sides = n_bc + n_im + n_in;
    let ranges = SideRanges {
        bc: 0..n_bc,
        inner_mortar: n_bc..n_bc + n_im,
        inner: n_bc + n_im..n_sides,
        mpi_mine: n_sides..n_sides,
        mpi_your: n_sides..n_sides,
        mpi_mortar: n_sides..n_sides,
    };
    // seed lists were built with indices relative to their group
    let offset_im = n_bc;
    let offset_in = n_bc + n_im;
    for m in &mut mortars {
        m.big += offset_im;
        for s in &mut m.smalls {
            s.0 += offset_in;
        }
    }

    let mut sides = Vec::with_capacity(n_sides);
    let mut normal = Array4::<f64>::zeros((3, np, nq, n_sides));
    let mut surf_elem = Array3::<f64>::zeros((np, nq, n_sides));
    for (sid, seed) in bc_seeds
        .into_iter()
        .chain(inner_mortar_seeds)
        .chain(inner_seeds)
        .enumerate()
    {
        for p in 0..np {
            for q in 0..nq {
                for c in 0..3 {
                    normal[[c, p, q, sid]] = seed.normal[c];
                }
                surf_elem[[p, q, sid]] = seed.surf;
            }
        }
        sides.push(SideInfo {
            master: seed.master,
            slave: seed.slave,
            bc_type: seed.bc_type,
        });
    }

    let mut mtilde = vec![Array5::<f64>::zeros((3, np, np, nz, n_elems)); dim];
    let mut fv_mtilde_sj = vec![Array5::<f64>::zeros((3, np, np, nz, n_elems)); dim];
    let mut sj = Array4::<f64>::zeros((np, np, nz, n_elems));
    for e in 0..n_elems {
        let (mt, sj_e) = box_metrics(dim, elem_h[e]);
        for d in 0..dim {
            for c in 0..3 {
                for i in 0..np {
                    for j in 0..np {
                        for k in 0..nz {
                            mtilde[d][[c, i, j, k, e]] = mt[d][c];
                            fv_mtilde_sj[d][[c, i, j, k, e]] = mt[d][c] * sj_e;
                        }
                    }
                }
            }
        }
        for i in 0..np {
            for j in 0..np {
                for k in 0..nz {
                    sj[[i, j, k, e]] = sj_e;
                }
            }
        }
    }

    let n_inner_mortars = mortars.len();
    let mesh = Mesh {
        dim,
        n,
        n_elems,
        sides,
        ranges,
        mortars,
        n_inner_mortars,
        tags: vec![ElemTag::Dg; n_elems],
        metrics: Metrics {
            mtilde,
            sj,
            fv_mtilde_sj,
            normal,
            surf_elem,
        },
    };
    mesh.validate();
    mesh
}

impl Mesh {
    /// Conforming Cartesian box mesh of `n_elems_dir` elements per
    /// direction over the given physical side lengths, all boundary
    /// sides typed `bc_type`. For `dim == 2` the third entries are
    /// ignored
    ///
    /// # Panics
    /// For dimensions other than 2 or 3 or an empty element count
    pub fn cartesian(
        dim: usize,
        n: usize,
        n_elems_dir: [usize; 3],
        lengths: [f64; 3],
        bc_type: i32,
    ) -> Self {
        assert!(dim == 2 || dim == 3, "Mesh::cartesian: dimension must be 2 or 3");
        let nd = [
            n_elems_dir[0],
            n_elems_dir[1],
            if dim == 3 { n_elems_dir[2] } else { 1 },
        ];
        assert!(
            nd.iter().all(|&c| c > 0),
            "Mesh::cartesian: element count must be positive in every direction"
        );
        let h = [
            lengths[0] / nd[0] as f64,
            lengths[1] / nd[1] as f64,
            if dim == 3 { lengths[2] / nd[2] as f64 } else { 1.0 },
        ];
        let n_elems = nd[0] * nd[1] * nd[2];
        let eid = |ix: usize, iy: usize, iz: usize| ix + nd[0] * (iy + nd[1] * iz);

        let mut bc_seeds = Vec::new();
        let mut inner_seeds = Vec::new();
        for iz in 0..nd[2] {
            for iy in 0..nd[1] {
                for ix in 0..nd[0] {
                    let e = eid(ix, iy, iz);
                    let idx = [ix, iy, iz];
                    for axis in 0..dim {
                        // minus boundary face
                        if idx[axis] == 0 {
                            let mut nvec = [0.0; 3];
                            nvec[axis] = -1.0;
                            bc_seeds.push(SideSeed {
                                master: Some((e, local_side(axis, false))),
                                slave: None,
                                bc_type: Some(bc_type),
                                normal: nvec,
                                surf: face_surf(dim, axis, h),
                            });
                        }
                        // plus face: boundary or interior interface
                        let mut nvec = [0.0; 3];
                        nvec[axis] = 1.0;
                        if idx[axis] + 1 == nd[axis] {
                            bc_seeds.push(SideSeed {
                                master: Some((e, local_side(axis, true))),
                                slave: None,
                                bc_type: Some(bc_type),
                                normal: nvec,
                                surf: face_surf(dim, axis, h),
                            });
                        } else {
                            let mut up = idx;
                            up[axis] += 1;
                            let e_up = eid(up[0], up[1], up[2]);
                            inner_seeds.push(SideSeed {
                                master: Some((e, local_side(axis, true))),
                                slave: Some((e_up, local_side(axis, false), Flip::Aligned)),
                                bc_type: None,
                                normal: nvec,
                                surf: face_surf(dim, axis, h),
                            });
                        }
                    }
                }
            }
        }

        assemble(
            dim,
            n,
            n_elems,
            &vec![h; n_elems],
            bc_seeds,
            Vec::new(),
            inner_seeds,
            Vec::new(),
        )
    }

    /// Three-element 2-D configuration with one non-conforming
    /// interface: a unit box element whose right face is split 1-to-2
    /// between two half-height neighbor elements. All boundary sides
    /// are typed `bc_type`
    pub fn two_to_one_2d(n: usize, bc_type: i32) -> Self {
        let dim = 2;
        // element 0: [0,1]x[0,1]; element 1: [1,2]x[0,0.5]; element 2: [1,2]x[0.5,1]
        let elem_h = [[1.0, 1.0, 1.0], [1.0, 0.5, 1.0], [1.0, 0.5, 1.0]];
        let bc = |elem: usize, side: LocalSide, normal: [f64; 3], surf: f64| SideSeed {
            master: Some((elem, side)),
            slave: None,
            bc_type: Some(bc_type),
            normal,
            surf,
        };
        let bc_seeds = vec![
            bc(0, LocalSide::XiMinus, [-1.0, 0.0, 0.0], 0.5),
            bc(0, LocalSide::EtaMinus, [0.0, -1.0, 0.0], 0.5),
            bc(0, LocalSide::EtaPlus, [0.0, 1.0, 0.0], 0.5),
            bc(1, LocalSide::XiPlus, [1.0, 0.0, 0.0], 0.25),
            bc(1, LocalSide::EtaMinus, [0.0, -1.0, 0.0], 0.5),
            bc(2, LocalSide::XiPlus, [1.0, 0.0, 0.0], 0.25),
            bc(2, LocalSide::EtaPlus, [0.0, 1.0, 0.0], 0.5),
        ];
        // big mortar face of element 0
        let inner_mortar_seeds = vec![SideSeed {
            master: Some((0, LocalSide::XiPlus)),
            slave: None,
            bc_type: None,
            normal: [1.0, 0.0, 0.0],
            surf: 0.5,
        }];
        let inner_seeds = vec![
            // conforming side between the two small elements
            SideSeed {
                master: Some((1, LocalSide::EtaPlus)),
                slave: Some((2, LocalSide::EtaMinus, Flip::Aligned)),
                bc_type: None,
                normal: [0.0, 1.0, 0.0],
                surf: 0.5,
            },
            // small mortar faces; big-face data occupies the master slot
            SideSeed {
                master: None,
                slave: Some((1, LocalSide::XiMinus, Flip::Aligned)),
                bc_type: None,
                normal: [1.0, 0.0, 0.0],
                surf: 0.25,
            },
            SideSeed {
                master: None,
                slave: Some((2, LocalSide::XiMinus, Flip::Aligned)),
                bc_type: None,
                normal: [1.0, 0.0, 0.0],
                surf: 0.25,
            },
        ];
        let mortars = vec![MortarSide {
            big: 0,
            kind: MortarKind::XiSplit,
            smalls: vec![(1, Flip::Aligned), (2, Flip::Aligned)],
        }];
        assemble(
            dim,
            n,
            3,
            &elem_h,
            bc_seeds,
            inner_mortar_seeds,
            inner_seeds,
            mortars,
        )
    }
}
