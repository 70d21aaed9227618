//! # Inter-process boundary exchange
//! Transfer of side fluxes and gradient traces across mesh
//! partition boundaries. The lifting pass talks to a [`Transfer`]
//! backend through paired post/send/finish calls so that local work
//! can proceed while messages are in flight; the serial backend
//! turns every call into a no-op, the MPI backend (behind the `mpi`
//! feature) moves packed side buffers between neighbor ranks.
#[cfg(feature = "mpi")]
pub mod mpi;

use crate::mesh::Mesh;
use ndarray::{s, Array4};
use std::ops::Range;

/// Communication hooks of one lifting pass. A backend may defer
/// the actual transfer to the finish calls; the split into post,
/// send and finish only fixes the points where data must be valid
#[enum_dispatch]
pub trait Transfer {
    /// Announce that flux data for the remote sides will be needed
    fn post_flux_recv(&mut self, mesh: &Mesh);
    /// Hand the locally computed inter-process fluxes to the backend
    fn send_flux(&mut self, mesh: &Mesh, flux: &Array4<f64>);
    /// Block until the remote fluxes have arrived in `flux`
    fn finish_flux(&mut self, mesh: &Mesh, flux: &mut Array4<f64>);
    /// Announce that gradient traces for the remote sides will be
    /// needed
    fn post_grad_recv(&mut self, mesh: &Mesh);
    /// Hand the locally prolonged gradient traces to the backend
    fn send_grad(&mut self, mesh: &Mesh, grad_master: &[Array4<f64>; 3], grad_slave: &[Array4<f64>; 3]);
    /// Block until the remote gradient traces have arrived
    fn finish_grad(
        &mut self,
        mesh: &Mesh,
        grad_master: &mut [Array4<f64>; 3],
        grad_slave: &mut [Array4<f64>; 3],
    );
}

/// Single-process backend; every hook is a no-op because all side
/// ranges of a serial mesh are local
#[derive(Debug, Clone, Copy)]
pub struct SerialExchange;

impl Transfer for SerialExchange {
    fn post_flux_recv(&mut self, _mesh: &Mesh) {}
    fn send_flux(&mut self, _mesh: &Mesh, _flux: &Array4<f64>) {}
    fn finish_flux(&mut self, _mesh: &Mesh, _flux: &mut Array4<f64>) {}
    fn post_grad_recv(&mut self, _mesh: &Mesh) {}
    fn send_grad(
        &mut self,
        _mesh: &Mesh,
        _grad_master: &[Array4<f64>; 3],
        _grad_slave: &[Array4<f64>; 3],
    ) {
    }
    fn finish_grad(
        &mut self,
        _mesh: &Mesh,
        _grad_master: &mut [Array4<f64>; 3],
        _grad_slave: &mut [Array4<f64>; 3],
    ) {
    }
}

/// Exchange backend selection
pub enum Exchange {
    /// Single process, no communication
    Serial(SerialExchange),
    /// Distributed memory backend
    #[cfg(feature = "mpi")]
    Mpi(mpi::MpiExchange),
}

impl Exchange {
    /// The no-op backend
    pub fn serial() -> Self {
        Exchange::Serial(SerialExchange)
    }
}

impl Transfer for Exchange {
    fn post_flux_recv(&mut self, mesh: &Mesh) {
        match self {
            Exchange::Serial(e) => e.post_flux_recv(mesh),
            #[cfg(feature = "mpi")]
            Exchange::Mpi(e) => e.post_flux_recv(mesh),
        }
    }

    fn send_flux(&mut self, mesh: &Mesh, flux: &Array4<f64>) {
        match self {
            Exchange::Serial(e) => e.send_flux(mesh, flux),
            #[cfg(feature = "mpi")]
            Exchange::Mpi(e) => e.send_flux(mesh, flux),
        }
    }

    fn finish_flux(&mut self, mesh: &Mesh, flux: &mut Array4<f64>) {
        match self {
            Exchange::Serial(e) => e.finish_flux(mesh, flux),
            #[cfg(feature = "mpi")]
            Exchange::Mpi(e) => e.finish_flux(mesh, flux),
        }
    }

    fn post_grad_recv(&mut self, mesh: &Mesh) {
        match self {
            Exchange::Serial(e) => e.post_grad_recv(mesh),
            #[cfg(feature = "mpi")]
            Exchange::Mpi(e) => e.post_grad_recv(mesh),
        }
    }

    fn send_grad(
        &mut self,
        mesh: &Mesh,
        grad_master: &[Array4<f64>; 3],
        grad_slave: &[Array4<f64>; 3],
    ) {
        match self {
            Exchange::Serial(e) => e.send_grad(mesh, grad_master, grad_slave),
            #[cfg(feature = "mpi")]
            Exchange::Mpi(e) => e.send_grad(mesh, grad_master, grad_slave),
        }
    }

    fn finish_grad(
        &mut self,
        mesh: &Mesh,
        grad_master: &mut [Array4<f64>; 3],
        grad_slave: &mut [Array4<f64>; 3],
    ) {
        match self {
            Exchange::Serial(e) => e.finish_grad(mesh, grad_master, grad_slave),
            #[cfg(feature = "mpi")]
            Exchange::Mpi(e) => e.finish_grad(mesh, grad_master, grad_slave),
        }
    }
}

/// Copy a contiguous side range of a face field into a flat buffer,
/// in logical iteration order
pub fn pack_sides(field: &Array4<f64>, range: Range<usize>) -> Vec<f64> {
    field
        .slice(s![.., .., .., range])
        .iter()
        .copied()
        .collect()
}

/// Inverse of [`pack_sides`]
///
/// # Panics
/// If the buffer length does not match the range
pub fn unpack_sides(field: &mut Array4<f64>, range: Range<usize>, buf: &[f64]) {
    let mut view = field.slice_mut(s![.., .., .., range]);
    assert_eq!(
        view.len(),
        buf.len(),
        "unpack_sides: buffer length does not match the side range"
    );
    for (dst, src) in view.iter_mut().zip(buf.iter()) {
        *dst = *src;
    }
}
