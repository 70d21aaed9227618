//! # `dgsem`: Discontinuous Galerkin spectral element core
//!
//! Spatial discretization machinery of a high-order DGSEM solver
//! for hyperbolic-parabolic conservation laws on hexahedral meshes:
//! tensor-product basis transforms, mortar coupling of
//! non-conforming interfaces and BR2 gradient lifting with
//! overlapped inter-process communication.
//!
//! # Dependencies
//! - cargo >= v1.49
//!
//! The distributed-memory backend is optional and requires an mpi
//! installation plus libclang; enable it with the `mpi` feature.
//!
//! # Details
//!
//! The crate covers four layers, leaf first:
//! - [`bases`]: quadrature node sets, barycentric interpolation and
//!   the spectral operators of one reference direction, see
//!   [`bases::DgBasis`]
//! - [`interpolation`]: dimension-by-dimension basis change of
//!   nodal fields, see [`interpolation::change_basis_3d`]
//! - [`mortar`]: operator tables and fan-out/fan-in propagation
//!   across 1-to-2 and 1-to-4 split faces, see
//!   [`mortar::MortarTables`]
//! - [`lifting`]: the BR2 gradient reconstruction consuming all of
//!   the above, see [`lifting::Lifting`]
//!
//! Mesh input, boundary state evaluation and the time integration
//! loop are external collaborators; [`mesh::Mesh`] defines the
//! arrays they must fill and ships structured builders for tests
//! and benchmarks.
//!
//! # Example
//! Lift a primitive field on a conforming box mesh
//! ```
//! use dgsem::bases::{DgBasis, NodeType};
//! use dgsem::exchange::Exchange;
//! use dgsem::lifting::{prolong_to_face, Lifting, LiftingParams, VolumeMode};
//! use dgsem::mesh::Mesh;
//! use dgsem::mortar::MortarTables;
//! use ndarray::{Array4, Array5};
//!
//! let n = 3;
//! let mesh = Mesh::cartesian(3, n, [2, 2, 1], [1.0, 1.0, 1.0], 1);
//! let basis = DgBasis::<f64>::new(n, NodeType::Gauss);
//! let tables = MortarTables::new(&basis, false);
//! let params = LiftingParams {
//!     eta_br2: 2.0,
//!     eta_br2_wall: 6.0,
//!     volume_mode: VolumeMode::non_conservative(),
//!     fv_enabled: false,
//! };
//! let u = Array5::<f64>::from_elem((1, n + 1, n + 1, n + 1, mesh.n_elems), 1.0);
//! let mut u_master = Array4::<f64>::zeros((1, n + 1, n + 1, mesh.n_sides()));
//! let mut u_slave = u_master.clone();
//! prolong_to_face(&mesh, &basis, &u, &mut u_master, &mut u_slave, false);
//! let mut lifting = Lifting::new(params, &mesh, 1);
//! let mut exchange = Exchange::serial();
//! lifting.lift(&mesh, &basis, &tables, &u, &u_master, &u_slave, None, &mut exchange);
//! ```
//!
//! ## Documentation
//!
//! Download and run:
//!
//! `cargo doc --open`
#![warn(missing_docs)]
#![allow(clippy::unnecessary_cast)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#[macro_use]
extern crate enum_dispatch;
pub mod bases;
pub mod exchange;
pub mod interpolation;
pub mod lifting;
pub mod mesh;
pub mod mortar;
pub mod types;

pub use bases::{DgBasis, NodeType};
pub use lifting::{Lifting, LiftingParams, VolumeMode};
pub use mesh::Mesh;
pub use mortar::MortarTables;
pub use types::FloatNum;
