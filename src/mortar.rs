//! # Non-conforming (mortar) interfaces
//! Reconciliation of a big face with its 2 or 4 small neighbor
//! faces: fixed interpolation/projection operator pairs built once
//! from the basis engine, and the per-side fan-out/fan-in
//! propagation that applies them with orientation flips.
pub mod operators;
pub mod propagate;
pub use operators::{MortarBasis, MortarTables};
pub use propagate::{flux_mortar, u_mortar, u_mortar_lifting, MortarFilter};
