//! # Mortar fan-out and fan-in
//! Propagation of face data across non-conforming interfaces.
//! `u_mortar` fans big-face solution traces out onto the 2 or 4
//! small faces before the flux computation; `flux_mortar` fans the
//! small-face fluxes back in and projects them onto the big face.
//! Orientation flips are applied on the way out and undone on the
//! way in, so that all mortar arithmetic happens in the big face's
//! frame.
//!
//! Both passes run over either the inner mortar group or the
//! inter-process group, selected by [`MortarFilter`], so that
//! inner work can overlap pending communication.
use super::operators::{MortarBasis, MortarTables};
use crate::interpolation::{contract_p, contract_q};
use crate::mesh::{ElemTag, Flip, Mesh, MortarKind};
use ndarray::{s, Array3, Array4};

/// Mortar group selection of one propagation pass
#[derive(Debug, Clone, Copy)]
pub struct MortarFilter {
    /// Process the mortars with inter-process small faces instead
    /// of the purely local ones
    pub mpi_sides: bool,
    /// Skip mortars whose big-side element is finite-volume tagged
    pub dg_only: bool,
}

impl MortarFilter {
    /// Purely local mortars
    pub fn inner() -> Self {
        Self {
            mpi_sides: false,
            dg_only: false,
        }
    }

    /// Mortars with at least one inter-process small face
    pub fn mpi() -> Self {
        Self {
            mpi_sides: true,
            dg_only: false,
        }
    }

    /// Restrict the pass to polynomial big-side elements
    pub fn dg_only(self) -> Self {
        Self {
            dg_only: true,
            ..self
        }
    }
}

fn mortar_group<'a>(mesh: &'a Mesh, filter: MortarFilter) -> &'a [crate::mesh::MortarSide] {
    if filter.mpi_sides {
        &mesh.mortars[mesh.n_inner_mortars..]
    } else {
        &mesh.mortars[..mesh.n_inner_mortars]
    }
}

/// Interpolate big-face data onto the small faces, ordered as in
/// `MortarSide::smalls`. The four-way split contracts the q
/// direction first, then the p direction of each half
fn split_big(dim: usize, kind: MortarKind, ops: &MortarBasis, big: &Array3<f64>) -> Vec<Array3<f64>> {
    match kind {
        MortarKind::XiSplit => vec![contract_p(&ops.m_0_1, big), contract_p(&ops.m_0_2, big)],
        MortarKind::EtaSplit => {
            assert_eq!(
                dim, 3,
                "mortar: a q-direction split is not realizable on a 2-d mesh"
            );
            vec![contract_q(&ops.m_0_1, big), contract_q(&ops.m_0_2, big)]
        }
        MortarKind::FourWay => {
            assert_eq!(
                dim, 3,
                "mortar: a q-direction split is not realizable on a 2-d mesh"
            );
            let lo_q = contract_q(&ops.m_0_1, big);
            let hi_q = contract_q(&ops.m_0_2, big);
            vec![
                contract_p(&ops.m_0_1, &lo_q),
                contract_p(&ops.m_0_2, &lo_q),
                contract_p(&ops.m_0_1, &hi_q),
                contract_p(&ops.m_0_2, &hi_q),
            ]
        }
    }
}

/// Project small-face data back onto the big face, undoing the
/// split of [`split_big`]
fn merge_smalls(
    dim: usize,
    kind: MortarKind,
    ops: &MortarBasis,
    smalls: &[Array3<f64>],
) -> Array3<f64> {
    match kind {
        MortarKind::XiSplit => {
            contract_p(&ops.m_1_0, &smalls[0]) + contract_p(&ops.m_2_0, &smalls[1])
        }
        MortarKind::EtaSplit => {
            assert_eq!(
                dim, 3,
                "mortar: a q-direction split is not realizable on a 2-d mesh"
            );
            contract_q(&ops.m_1_0, &smalls[0]) + contract_q(&ops.m_2_0, &smalls[1])
        }
        MortarKind::FourWay => {
            assert_eq!(
                dim, 3,
                "mortar: a q-direction split is not realizable on a 2-d mesh"
            );
            let lo_q = contract_p(&ops.m_1_0, &smalls[0]) + contract_p(&ops.m_2_0, &smalls[1]);
            let hi_q = contract_p(&ops.m_1_0, &smalls[2]) + contract_p(&ops.m_2_0, &smalls[3]);
            contract_q(&ops.m_1_0, &lo_q) + contract_q(&ops.m_2_0, &hi_q)
        }
    }
}

/// Fan big-face solution traces out onto the small faces.
///
/// An `Aligned` small face receives the data in its master storage
/// unchanged; any other flip writes into the slave storage with the
/// face indices permuted into the small element's frame
pub fn u_mortar(
    mesh: &Mesh,
    tables: &MortarTables,
    u_master: &mut Array4<f64>,
    u_slave: &mut Array4<f64>,
    filter: MortarFilter,
) {
    for mortar in mortar_group(mesh, filter) {
        if filter.dg_only && mesh.big_side_tag(mortar) == ElemTag::Fv {
            continue;
        }
        let ops = tables.select(mesh.big_side_tag(mortar));
        let big = u_master.slice(s![.., .., .., mortar.big]).to_owned();
        let smalls = split_big(mesh.dim, mortar.kind, ops, &big);
        for (&(side, flip), small) in mortar.smalls.iter().zip(smalls.iter()) {
            if flip == Flip::Aligned {
                u_master.slice_mut(s![.., .., .., side]).assign(small);
            } else {
                let (nvar, np, nq) = small.dim();
                for v in 0..nvar {
                    for p in 0..np {
                        for q in 0..nq {
                            let (fp, fq) = flip.map(p, q, mesh.n, mesh.dim);
                            u_slave[[v, fp, fq, side]] = small[[v, p, q]];
                        }
                    }
                }
            }
        }
    }
}

/// Fan small-face fluxes back in and project them onto the big
/// face, overwriting its entry in `flux`.
///
/// The flux carries one value per side, stored in the side's master
/// frame, and changes sign when that frame is reversed (the
/// half-jump lifting flux and normal-projected residual fluxes
/// both do). An aligned small face carries the big party in its
/// master slot, so its flux is already oriented like the big face;
/// a flipped small face has the small element as master, so its
/// reads are permutation-undone and negated
pub fn flux_mortar(
    mesh: &Mesh,
    tables: &MortarTables,
    flux: &mut Array4<f64>,
    filter: MortarFilter,
) {
    let (nvar, np, nq, _) = flux.dim();
    for mortar in mortar_group(mesh, filter) {
        if filter.dg_only && mesh.big_side_tag(mortar) == ElemTag::Fv {
            continue;
        }
        let ops = tables.select(mesh.big_side_tag(mortar));
        let mut smalls = Vec::with_capacity(mortar.kind.n_small());
        for &(side, flip) in &mortar.smalls {
            if flip == Flip::Aligned {
                smalls.push(flux.slice(s![.., .., .., side]).to_owned());
            } else {
                let mut small = Array3::<f64>::zeros((nvar, np, nq));
                for v in 0..nvar {
                    for p in 0..np {
                        for q in 0..nq {
                            let (fp, fq) = flip.map(p, q, mesh.n, mesh.dim);
                            small[[v, p, q]] = -flux[[v, fp, fq, side]];
                        }
                    }
                }
                smalls.push(small);
            }
        }
        let big = merge_smalls(mesh.dim, mortar.kind, ops, &smalls);
        flux.slice_mut(s![.., .., .., mortar.big]).assign(&big);
    }
}

/// [`u_mortar`] applied to each spatial component of the lifted
/// gradient traces in turn
pub fn u_mortar_lifting(
    mesh: &Mesh,
    tables: &MortarTables,
    grad_master: &mut [Array4<f64>; 3],
    grad_slave: &mut [Array4<f64>; 3],
    filter: MortarFilter,
) {
    for d in 0..mesh.dim {
        u_mortar(mesh, tables, &mut grad_master[d], &mut grad_slave[d], filter);
    }
}
