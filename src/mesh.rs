//! # Mesh connectivity and metric terms
//! Data model of the unstructured hexahedral mesh as the numerical
//! core consumes it: side lists with master/slave attribution and
//! orientation flips, mortar descriptors for non-conforming
//! interfaces, per-element discretization tags and the precomputed
//! metric arrays (contravariant terms, inverse Jacobian, surface
//! normals).
//!
//! Mesh file input and partitioning are external collaborators;
//! this module only defines the arrays they fill, plus structured
//! builders used by tests and benchmarks.
pub mod cartesian;

use ndarray::{Array3, Array4, Array5};
use std::ops::Range;

/// Boundary condition type code of a no-slip adiabatic wall
pub const BC_TYPE_WALL_ADIABATIC: i32 = 3;
/// Boundary condition type code of a no-slip isothermal wall
pub const BC_TYPE_WALL_ISOTHERMAL: i32 = 4;

/// Relative orientation of a slave face's local frame versus the
/// master frame of its side.
///
/// The closed set of admissible hexahedral face orientations; each
/// code is a pure index permutation of the face coordinates `(p, q)`
/// and every permutation is its own inverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flip {
    /// Code 0, master orientation, identity map
    Aligned,
    /// Code 1, `(p, q) -> (q, p)`; the single non-trivial 2-D
    /// orientation, where it degenerates to `p -> n - p`
    Swapped,
    /// Code 2, `(p, q) -> (n - p, q)`
    ReversedP,
    /// Code 3, `(p, q) -> (n - q, n - p)`
    Rotated,
    /// Code 4, `(p, q) -> (p, n - q)`
    ReversedQ,
}

impl Flip {
    /// All recognized codes
    pub const ALL: [Flip; 5] = [
        Flip::Aligned,
        Flip::Swapped,
        Flip::ReversedP,
        Flip::Rotated,
        Flip::ReversedQ,
    ];

    /// Construct from the integer code 0..=4
    ///
    /// # Panics
    /// For unrecognized codes
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => Flip::Aligned,
            1 => Flip::Swapped,
            2 => Flip::ReversedP,
            3 => Flip::Rotated,
            4 => Flip::ReversedQ,
            _ => panic!("Flip::from_code: unrecognized flip code {}", code),
        }
    }

    /// The integer code
    pub fn code(self) -> u8 {
        match self {
            Flip::Aligned => 0,
            Flip::Swapped => 1,
            Flip::ReversedP => 2,
            Flip::Rotated => 3,
            Flip::ReversedQ => 4,
        }
    }

    /// Permute face indices `(p, q)` on a face of degree `n`.
    /// Every code is an involution, so the same map also undoes it.
    ///
    /// # Panics
    /// In 2-D (`dim == 2`) only codes 0 and 1 describe realizable
    /// orientations; the others panic
    pub fn map(self, p: usize, q: usize, n: usize, dim: usize) -> (usize, usize) {
        if dim == 2 {
            return match self {
                Flip::Aligned => (p, q),
                Flip::Swapped => (n - p, q),
                _ => panic!(
                    "Flip::map: flip code {} is not realizable on a 2-d mesh",
                    self.code()
                ),
            };
        }
        match self {
            Flip::Aligned => (p, q),
            Flip::Swapped => (q, p),
            Flip::ReversedP => (n - p, q),
            Flip::Rotated => (n - q, n - p),
            Flip::ReversedQ => (p, n - q),
        }
    }
}

/// Local face of a hexahedral (or quadrilateral) element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalSide {
    /// Face at `xi = -1`
    XiMinus,
    /// Face at `xi = +1`
    XiPlus,
    /// Face at `eta = -1`
    EtaMinus,
    /// Face at `eta = +1`
    EtaPlus,
    /// Face at `zeta = -1` (3-D only)
    ZetaMinus,
    /// Face at `zeta = +1` (3-D only)
    ZetaPlus,
}

impl LocalSide {
    /// Reference direction normal to the face (0 = xi, 1 = eta, 2 = zeta)
    pub fn axis(self) -> usize {
        match self {
            LocalSide::XiMinus | LocalSide::XiPlus => 0,
            LocalSide::EtaMinus | LocalSide::EtaPlus => 1,
            LocalSide::ZetaMinus | LocalSide::ZetaPlus => 2,
        }
    }

    /// True for the `+1` faces
    pub fn is_plus(self) -> bool {
        matches!(
            self,
            LocalSide::XiPlus | LocalSide::EtaPlus | LocalSide::ZetaPlus
        )
    }
}

/// Map face coordinates `(p, q)` at depth `layer` below a local
/// face to volume node indices `(i, j, k)`.
///
/// Face frames: xi faces carry `(p, q) = (j, k)`, eta faces
/// `(p, q) = (i, k)`, zeta faces `(p, q) = (i, j)`. `layer = 0` is
/// the face itself. In 2-D the `q` and `k` indices collapse to 0
/// and the zeta faces are unreachable.
pub fn side_to_volume(
    n: usize,
    dim: usize,
    side: LocalSide,
    p: usize,
    q: usize,
    layer: usize,
) -> (usize, usize, usize) {
    if dim == 2 {
        debug_assert_eq!(q, 0, "side_to_volume: q must collapse to 0 in 2-d");
        assert!(
            side.axis() < 2,
            "side_to_volume: zeta faces are unreachable on a 2-d mesh"
        );
    }
    match side {
        LocalSide::XiMinus => (layer, p, q),
        LocalSide::XiPlus => (n - layer, p, q),
        LocalSide::EtaMinus => (p, layer, q),
        LocalSide::EtaPlus => (p, n - layer, q),
        LocalSide::ZetaMinus => (p, q, layer),
        LocalSide::ZetaPlus => (p, q, n - layer),
    }
}

/// Per-element discretization treatment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElemTag {
    /// High-order polynomial element
    Dg,
    /// Finite-volume sub-cell element, gradients by central
    /// differences on the sub-cell grid
    Fv,
}

/// Split pattern of a non-conforming (mortar) interface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MortarKind {
    /// Split in both face directions, four small faces (3-D only)
    FourWay,
    /// Split along the face's q direction, two small faces (3-D only)
    EtaSplit,
    /// Split along the face's p direction, two small faces
    XiSplit,
}

impl MortarKind {
    /// Number of small faces of this split
    pub fn n_small(self) -> usize {
        match self {
            MortarKind::FourWay => 4,
            MortarKind::EtaSplit | MortarKind::XiSplit => 2,
        }
    }
}

/// One non-conforming interface: a big face reconciled with its
/// 2 or 4 small neighbor faces.
///
/// Small faces are ordered low-p/low-q first, p running fastest for
/// the four-way split.
#[derive(Debug, Clone)]
pub struct MortarSide {
    /// Side index of the big face
    pub big: usize,
    /// Split pattern
    pub kind: MortarKind,
    /// Side index and orientation of each small face. `Aligned`
    /// means the big-face data occupies the small side's master
    /// storage; any other flip means it lands in the slave storage,
    /// permuted into the small element's frame
    pub smalls: Vec<(usize, Flip)>,
}

/// Master/slave attribution of one mesh side.
///
/// A `None` slot carries no locally owned element: the remote half
/// of an inter-process side, or the virtual slot of a mortar face
/// that the interface propagator fills.
#[derive(Debug, Clone)]
pub struct SideInfo {
    /// Element owning the master storage and its local face
    pub master: Option<(usize, LocalSide)>,
    /// Element owning the slave storage, its local face and its
    /// orientation relative to the master frame
    pub slave: Option<(usize, LocalSide, Flip)>,
    /// Boundary condition type code; `Some` on boundary sides only
    pub bc_type: Option<i32>,
}

/// Contiguous side index ranges, ordered so that communication
/// dependent groups can be processed separately
#[derive(Debug, Clone)]
pub struct SideRanges {
    /// Physical boundary sides
    pub bc: Range<usize>,
    /// Big mortar faces whose small faces are all local
    pub inner_mortar: Range<usize>,
    /// Conforming sides between two local elements (includes local
    /// small mortar faces)
    pub inner: Range<usize>,
    /// Inter-process sides whose flux this rank computes
    pub mpi_mine: Range<usize>,
    /// Inter-process sides whose flux arrives from the neighbor rank
    pub mpi_your: Range<usize>,
    /// Big mortar faces with at least one inter-process small face
    pub mpi_mortar: Range<usize>,
}

impl SideRanges {
    /// Ranges holding no sides at all (single element test meshes)
    pub fn empty() -> Self {
        Self {
            bc: 0..0,
            inner_mortar: 0..0,
            inner: 0..0,
            mpi_mine: 0..0,
            mpi_your: 0..0,
            mpi_mortar: 0..0,
        }
    }

    /// All inter-process sides
    pub fn mpi(&self) -> Range<usize> {
        self.mpi_mine.start..self.mpi_your.end
    }
}

/// Precomputed metric terms of the mesh.
///
/// `mtilde[d]` holds the Jacobian-weighted contravariant vector of
/// reference direction `d` (Cartesian component leading axis); `sj`
/// the inverse Jacobian. The finite-volume variant is pre-divided
/// by the Jacobian, so FV gradients need no separate scaling step.
#[derive(Debug, Clone)]
pub struct Metrics {
    /// Contravariant metric terms per reference direction,
    /// shape `(3, i, j, k, elem)` each
    pub mtilde: Vec<Array5<f64>>,
    /// Inverse Jacobian, shape `(i, j, k, elem)`
    pub sj: Array4<f64>,
    /// FV sub-cell metric terms, Jacobian scaling baked in
    pub fv_mtilde_sj: Vec<Array5<f64>>,
    /// Outward unit normal of each side in the master frame,
    /// shape `(3, p, q, side)`
    pub normal: Array4<f64>,
    /// Surface element (area weight) per face node,
    /// shape `(p, q, side)`
    pub surf_elem: Array3<f64>,
}

/// Hexahedral mesh with side attribution, mortar interfaces,
/// element tags and metric terms, fixed for the lifetime of a run
/// except for the per-element tags
#[derive(Debug, Clone)]
pub struct Mesh {
    /// Spatial dimension, 2 or 3
    pub dim: usize,
    /// Polynomial degree per direction
    pub n: usize,
    /// Number of local elements
    pub n_elems: usize,
    /// Side attributions, indexed by side id
    pub sides: Vec<SideInfo>,
    /// Side index ranges by category
    pub ranges: SideRanges,
    /// Mortar interfaces; the first `n_inner_mortars` entries have
    /// only local small faces
    pub mortars: Vec<MortarSide>,
    /// Number of mortars without inter-process small faces
    pub n_inner_mortars: usize,
    /// Per-element discretization tag, read-only during a pass
    pub tags: Vec<ElemTag>,
    /// Metric terms
    pub metrics: Metrics,
}

impl Mesh {
    /// Nodes per direction
    pub fn np(&self) -> usize {
        self.n + 1
    }

    /// Nodes in the zeta direction: collapsed to one layer in 2-D
    pub fn nz(&self) -> usize {
        if self.dim == 3 {
            self.n + 1
        } else {
            1
        }
    }

    /// Nodes along the second face direction
    pub fn nq(&self) -> usize {
        self.nz()
    }

    /// Number of sides
    pub fn n_sides(&self) -> usize {
        self.sides.len()
    }

    /// Discretization tag of the element behind a mortar's big face
    ///
    /// # Panics
    /// If the big face has no master element; a mortar table without
    /// an attributed big element is malformed
    pub fn big_side_tag(&self, mortar: &MortarSide) -> ElemTag {
        let (elem, _) = self.sides[mortar.big].master.unwrap_or_else(|| {
            panic!(
                "Mesh::big_side_tag: mortar big side {} has no master element",
                mortar.big
            )
        });
        self.tags[elem]
    }

    /// Sanity checks on array shapes versus `n`, `dim` and the side
    /// count. Violations are programming errors and abort
    pub fn validate(&self) {
        let (np, nz, nq) = (self.np(), self.nz(), self.nq());
        assert!(
            self.dim == 2 || self.dim == 3,
            "Mesh::validate: dimension must be 2 or 3, got {}",
            self.dim
        );
        assert_eq!(
            self.metrics.mtilde.len(),
            self.dim,
            "Mesh::validate: one contravariant metric set per direction required"
        );
        for m in &self.metrics.mtilde {
            assert_eq!(m.dim(), (3, np, np, nz, self.n_elems), "Mesh::validate: mtilde shape");
        }
        assert_eq!(
            self.metrics.sj.dim(),
            (np, np, nz, self.n_elems),
            "Mesh::validate: sj shape"
        );
        assert_eq!(
            self.metrics.normal.dim(),
            (3, np, nq, self.n_sides()),
            "Mesh::validate: normal shape"
        );
        assert_eq!(
            self.metrics.surf_elem.dim(),
            (np, nq, self.n_sides()),
            "Mesh::validate: surf_elem shape"
        );
        assert_eq!(self.tags.len(), self.n_elems, "Mesh::validate: tags length");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_flip_codes_round_trip() {
        for code in 0..5 {
            assert_eq!(Flip::from_code(code).code(), code);
        }
    }

    #[test]
    #[should_panic(expected = "unrecognized flip code")]
    fn test_flip_code_out_of_range() {
        let _ = Flip::from_code(5);
    }

    #[test]
    fn test_flip_involution_3d() {
        let n = 4;
        for flip in Flip::ALL {
            for p in 0..=n {
                for q in 0..=n {
                    let (p1, q1) = flip.map(p, q, n, 3);
                    let (p2, q2) = flip.map(p1, q1, n, 3);
                    assert_eq!((p2, q2), (p, q), "flip {} not an involution", flip.code());
                }
            }
        }
    }

    #[test]
    fn test_flip_bijection_3d() {
        let n = 3;
        for flip in Flip::ALL {
            let mut seen = HashSet::new();
            for p in 0..=n {
                for q in 0..=n {
                    assert!(seen.insert(flip.map(p, q, n, 3)));
                }
            }
            assert_eq!(seen.len(), (n + 1) * (n + 1));
        }
    }

    #[test]
    fn test_flip_involution_2d() {
        let n = 5;
        for flip in [Flip::Aligned, Flip::Swapped] {
            for p in 0..=n {
                let (p1, q1) = flip.map(p, 0, n, 2);
                assert_eq!(q1, 0);
                assert_eq!(flip.map(p1, 0, n, 2), (p, 0));
            }
        }
    }

    #[test]
    #[should_panic(expected = "not realizable on a 2-d mesh")]
    fn test_flip_3d_codes_rejected_in_2d() {
        let _ = Flip::ReversedP.map(0, 0, 3, 2);
    }

    #[test]
    fn test_side_to_volume_covers_faces() {
        let n = 3;
        // each face covers exactly the boundary layer of its axis
        for side in [
            LocalSide::XiMinus,
            LocalSide::XiPlus,
            LocalSide::EtaMinus,
            LocalSide::EtaPlus,
            LocalSide::ZetaMinus,
            LocalSide::ZetaPlus,
        ] {
            let mut seen = HashSet::new();
            for p in 0..=n {
                for q in 0..=n {
                    let (i, j, k) = side_to_volume(n, 3, side, p, q, 0);
                    let fixed = match side.axis() {
                        0 => i,
                        1 => j,
                        _ => k,
                    };
                    assert_eq!(fixed, if side.is_plus() { n } else { 0 });
                    assert!(seen.insert((i, j, k)));
                }
            }
            assert_eq!(seen.len(), (n + 1) * (n + 1));
        }
    }

    #[test]
    fn test_side_to_volume_shared_side_consistency() {
        // two elements joined in x with flip 0: the master's XiPlus
        // and the slave's XiMinus frame must address the same (j, k)
        let n = 2;
        for p in 0..=n {
            for q in 0..=n {
                let (_, jm, km) = side_to_volume(n, 3, LocalSide::XiPlus, p, q, 0);
                let (_, js, ks) = side_to_volume(n, 3, LocalSide::XiMinus, p, q, 0);
                assert_eq!((jm, km), (js, ks));
            }
        }
    }

    #[test]
    #[should_panic(expected = "zeta faces are unreachable")]
    fn test_zeta_face_unreachable_in_2d() {
        let _ = side_to_volume(3, 2, LocalSide::ZetaMinus, 0, 0, 0);
    }
}
