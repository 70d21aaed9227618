//! # BR2 gradient lifting
//! Reconstruction of primitive-variable gradients for viscous flux
//! evaluation. A lifting pass combines the metric-weighted volume
//! derivative of the state with penalized surface corrections built
//! from the inter-element jumps, reconciles non-conforming faces
//! through the mortar propagator and overlaps inter-process
//! communication with local work.
//!
//! The pass is stateless between calls; the [`Lifting`] context
//! owns the gradient and flux buffers and fully recomputes them
//! from the current state every call.
pub mod fill_flux;
pub mod prolong;
pub mod surf;
pub mod volume;
pub use fill_flux::{fill_flux, fill_flux_bc};
pub use prolong::prolong_to_face;
pub use surf::surf_integral_lifting;
pub use volume::{
    apply_jacobian, fv_gradient, Conservative, NonConservative, VolumeIntegral, VolumeMode,
};

use crate::bases::DgBasis;
use crate::exchange::{Exchange, Transfer};
use crate::mesh::{ElemTag, Mesh, BC_TYPE_WALL_ADIABATIC, BC_TYPE_WALL_ISOTHERMAL};
use crate::mortar::{flux_mortar, u_mortar_lifting, MortarFilter, MortarTables};
use ndarray::{Array4, Array5};

/// Fixed configuration of the lifting operator
#[derive(Debug, Clone, Copy)]
pub struct LiftingParams {
    /// Penalty coefficient of interior and generic boundary sides
    pub eta_br2: f64,
    /// Elevated penalty coefficient of viscous wall sides
    pub eta_br2_wall: f64,
    /// Volume integral formulation
    pub volume_mode: VolumeMode,
    /// Whether finite-volume tagged elements are admitted
    pub fv_enabled: bool,
}

impl LiftingParams {
    /// Penalty coefficient of a side with the given boundary
    /// condition type
    pub fn penalty(&self, bc_type: Option<i32>) -> f64 {
        match bc_type {
            Some(BC_TYPE_WALL_ADIABATIC) | Some(BC_TYPE_WALL_ISOTHERMAL) => self.eta_br2_wall,
            _ => self.eta_br2,
        }
    }
}

/// Gradient lifting context: configuration plus the volume, trace
/// and flux buffers of one rank, allocated once and overwritten by
/// every pass
#[derive(Debug, Clone)]
pub struct Lifting {
    /// Configuration, fixed after construction
    pub params: LiftingParams,
    /// Volume gradient per Cartesian direction,
    /// shape `(var, i, j, k, elem)`
    pub grad: [Array5<f64>; 3],
    /// Master-side gradient traces, shape `(var, p, q, side)`
    pub grad_master: [Array4<f64>; 3],
    /// Slave-side gradient traces, shape `(var, p, q, side)`
    pub grad_slave: [Array4<f64>; 3],
    flux: Array4<f64>,
}

impl Lifting {
    /// Allocate the lifting buffers for `n_vars` primitive
    /// variables on the given mesh
    ///
    /// # Panics
    /// For non-positive penalty coefficients, and for meshes with
    /// finite-volume tagged elements while FV support is disabled
    pub fn new(params: LiftingParams, mesh: &Mesh, n_vars: usize) -> Self {
        assert!(
            params.eta_br2 > 0.0,
            "Lifting::new: penalty coefficient must be positive, got {}",
            params.eta_br2
        );
        assert!(
            params.eta_br2_wall > 0.0,
            "Lifting::new: wall penalty coefficient must be positive, got {}",
            params.eta_br2_wall
        );
        if !params.fv_enabled {
            assert!(
                mesh.tags.iter().all(|&t| t == ElemTag::Dg),
                "Lifting::new: mesh has FV-tagged elements but finite-volume support is disabled"
            );
        }
        let (np, nz, nq) = (mesh.np(), mesh.nz(), mesh.nq());
        let vol = || Array5::<f64>::zeros((n_vars, np, np, nz, mesh.n_elems));
        let face = || Array4::<f64>::zeros((n_vars, np, nq, mesh.n_sides()));
        Self {
            params,
            grad: [vol(), vol(), vol()],
            grad_master: [face(), face(), face()],
            grad_slave: [face(), face(), face()],
            flux: face(),
        }
    }

    /// One lifting pass: rebuild the volume gradients and their
    /// face traces from the primitive state `u` and its prolonged
    /// traces.
    ///
    /// Inter-process sides are fluxed first and handed to the
    /// exchange, local work proceeds while messages are in flight,
    /// and the pass blocks only at the exchange completion points.
    /// `bc_state` optionally prescribes an exterior state on the
    /// boundary sides; without it boundary fluxes vanish
    #[allow(clippy::too_many_arguments)]
    pub fn lift(
        &mut self,
        mesh: &Mesh,
        basis: &DgBasis<f64>,
        tables: &MortarTables,
        u: &Array5<f64>,
        u_master: &Array4<f64>,
        u_slave: &Array4<f64>,
        bc_state: Option<&Array4<f64>>,
        exchange: &mut Exchange,
    ) {
        exchange.post_flux_recv(mesh);

        // inter-process fluxes first so the messages travel while
        // the local sides are processed
        fill_flux(mesh, u_master, u_slave, &mut self.flux, true);
        exchange.send_flux(mesh, &self.flux);

        fill_flux(mesh, u_master, u_slave, &mut self.flux, false);
        fill_flux_bc(mesh, u_master, bc_state, &mut self.flux);
        flux_mortar(mesh, tables, &mut self.flux, MortarFilter::inner());

        for g in self.grad.iter_mut() {
            g.fill(0.0);
        }
        self.params.volume_mode.gradient(mesh, basis, u, &mut self.grad);
        if self.params.fv_enabled {
            fv_gradient(mesh, u, &mut self.grad);
        }
        apply_jacobian(mesh, &mut self.grad);

        for d in 0..mesh.dim {
            prolong_to_face(
                mesh,
                basis,
                &self.grad[d],
                &mut self.grad_master[d],
                &mut self.grad_slave[d],
                true,
            );
        }
        for d in 0..mesh.dim {
            prolong_to_face(
                mesh,
                basis,
                &self.grad[d],
                &mut self.grad_master[d],
                &mut self.grad_slave[d],
                false,
            );
        }

        exchange.finish_flux(mesh, &mut self.flux);
        flux_mortar(mesh, tables, &mut self.flux, MortarFilter::mpi());
        exchange.post_grad_recv(mesh);

        surf_integral_lifting(
            mesh,
            basis,
            &self.params,
            &self.flux,
            &mut self.grad,
            &mut self.grad_master,
            &mut self.grad_slave,
        );

        exchange.send_grad(mesh, &self.grad_master, &self.grad_slave);
        u_mortar_lifting(
            mesh,
            tables,
            &mut self.grad_master,
            &mut self.grad_slave,
            MortarFilter::inner(),
        );
        exchange.finish_grad(mesh, &mut self.grad_master, &mut self.grad_slave);
        u_mortar_lifting(
            mesh,
            tables,
            &mut self.grad_master,
            &mut self.grad_slave,
            MortarFilter::mpi(),
        );
    }
}
