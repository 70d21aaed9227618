//! # MPI exchange backend
//! Neighbor-wise transfer of packed side buffers. The post and send
//! hooks only pack; the actual non-blocking sends and receives of a
//! phase are issued together in the finish call and waited on
//! before it returns, so a finish call is the only blocking point.
use super::{pack_sides, unpack_sides, Transfer};
use crate::mesh::Mesh;
use mpi::request::scope;
use mpi::topology::SystemCommunicator;
use mpi::traits::*;
use ndarray::Array4;
use std::ops::Range;

/// One partition neighbor: its rank and the local side index ranges
/// shared with it. `mine` holds the sides whose flux this rank
/// computes, `your` the sides whose flux arrives from the neighbor
#[derive(Debug, Clone)]
pub struct Neighbor {
    /// Neighbor rank
    pub rank: i32,
    /// Shared sides owned by this rank, inside `ranges.mpi_mine`
    pub mine: Range<usize>,
    /// Shared sides owned by the neighbor, inside `ranges.mpi_your`
    pub your: Range<usize>,
}

/// Distributed-memory exchange over a communicator
pub struct MpiExchange {
    comm: SystemCommunicator,
    neighbors: Vec<Neighbor>,
    flux_send: Vec<Vec<f64>>,
    flux_recv: Vec<Vec<f64>>,
    grad_send: Vec<Vec<f64>>,
    grad_recv: Vec<Vec<f64>>,
}

impl MpiExchange {
    /// Backend for the given communicator and neighbor list
    pub fn new(comm: SystemCommunicator, neighbors: Vec<Neighbor>) -> Self {
        let n = neighbors.len();
        Self {
            comm,
            neighbors,
            flux_send: vec![Vec::new(); n],
            flux_recv: vec![Vec::new(); n],
            grad_send: vec![Vec::new(); n],
            grad_recv: vec![Vec::new(); n],
        }
    }

    /// Issue all sends and receives of one phase and wait for them
    fn exchange(&mut self, send: &[Vec<f64>], recv: &mut [Vec<f64>]) {
        let comm = &self.comm;
        let neighbors = &self.neighbors;
        scope(|sc| {
            let mut requests = Vec::with_capacity(2 * neighbors.len());
            for (nb, buf) in neighbors.iter().zip(recv.iter_mut()) {
                requests.push(
                    comm.process_at_rank(nb.rank)
                        .immediate_receive_into(sc, &mut buf[..]),
                );
            }
            for (nb, buf) in neighbors.iter().zip(send.iter()) {
                requests.push(comm.process_at_rank(nb.rank).immediate_send(sc, &buf[..]));
            }
            for request in requests {
                let _ = request.wait();
            }
        });
    }
}

/// Values per side of a face field
fn side_block(field: &Array4<f64>) -> usize {
    let (nvar, np, nq, _) = field.dim();
    nvar * np * nq
}

impl Transfer for MpiExchange {
    fn post_flux_recv(&mut self, _mesh: &Mesh) {
        // transfer is deferred to finish_flux
    }

    fn send_flux(&mut self, _mesh: &Mesh, flux: &Array4<f64>) {
        for (nb, buf) in self.neighbors.iter().zip(self.flux_send.iter_mut()) {
            *buf = pack_sides(flux, nb.mine.clone());
        }
    }

    fn finish_flux(&mut self, _mesh: &Mesh, flux: &mut Array4<f64>) {
        let block = side_block(flux);
        for (nb, buf) in self.neighbors.iter().zip(self.flux_recv.iter_mut()) {
            buf.resize(block * nb.your.len(), 0.0);
        }
        let send = std::mem::take(&mut self.flux_send);
        let mut recv = std::mem::take(&mut self.flux_recv);
        self.exchange(&send, &mut recv);
        for (nb, buf) in self.neighbors.iter().zip(recv.iter()) {
            unpack_sides(flux, nb.your.clone(), buf);
        }
        self.flux_send = send;
        self.flux_recv = recv;
    }

    fn post_grad_recv(&mut self, _mesh: &Mesh) {
        // transfer is deferred to finish_grad
    }

    fn send_grad(
        &mut self,
        mesh: &Mesh,
        grad_master: &[Array4<f64>; 3],
        grad_slave: &[Array4<f64>; 3],
    ) {
        // the local element owns the master slot of `mine` sides and
        // the slave slot of `your` sides
        for (nb, buf) in self.neighbors.iter().zip(self.grad_send.iter_mut()) {
            buf.clear();
            for d in 0..mesh.dim {
                buf.extend(pack_sides(&grad_master[d], nb.mine.clone()));
                buf.extend(pack_sides(&grad_slave[d], nb.your.clone()));
            }
        }
    }

    fn finish_grad(
        &mut self,
        mesh: &Mesh,
        grad_master: &mut [Array4<f64>; 3],
        grad_slave: &mut [Array4<f64>; 3],
    ) {
        let block = side_block(&grad_master[0]);
        for (nb, buf) in self.neighbors.iter().zip(self.grad_recv.iter_mut()) {
            buf.resize(mesh.dim * block * (nb.mine.len() + nb.your.len()), 0.0);
        }
        let send = std::mem::take(&mut self.grad_send);
        let mut recv = std::mem::take(&mut self.grad_recv);
        self.exchange(&send, &mut recv);
        // the neighbor's `mine` is this rank's `your`: its master
        // data fills the vacant slots here, and vice versa
        for (nb, buf) in self.neighbors.iter().zip(recv.iter()) {
            let mut offset = 0;
            for d in 0..mesh.dim {
                let n_your = block * nb.your.len();
                unpack_sides(&mut grad_master[d], nb.your.clone(), &buf[offset..offset + n_your]);
                offset += n_your;
                let n_mine = block * nb.mine.len();
                unpack_sides(&mut grad_slave[d], nb.mine.clone(), &buf[offset..offset + n_mine]);
                offset += n_mine;
            }
        }
        self.grad_send = send;
        self.grad_recv = recv;
    }
}
