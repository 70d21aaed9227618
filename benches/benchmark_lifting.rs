//! Benchmarks for a full BR2 lifting pass on a conforming box mesh.
//!
//! Run with: `cargo bench --bench benchmark_lifting`
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dgsem::bases::{DgBasis, NodeType};
use dgsem::exchange::Exchange;
use dgsem::lifting::{prolong_to_face, Lifting, LiftingParams, VolumeMode};
use dgsem::mesh::Mesh;
use dgsem::mortar::MortarTables;
use ndarray::{Array4, Array5};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;

const N_VARS: usize = 5;

fn setup(n: usize, nd: usize) -> (Mesh, DgBasis<f64>, MortarTables, Array5<f64>, Array4<f64>, Array4<f64>) {
    let mesh = Mesh::cartesian(3, n, [nd, nd, nd], [1.0, 1.0, 1.0], 1);
    let basis = DgBasis::<f64>::new(n, NodeType::Gauss);
    let tables = MortarTables::new(&basis, false);
    let np = mesh.np();
    let u = Array5::random((N_VARS, np, np, np, mesh.n_elems), Uniform::new(-1.0, 1.0));
    let mut u_master = Array4::<f64>::zeros((N_VARS, np, np, mesh.n_sides()));
    let mut u_slave = u_master.clone();
    prolong_to_face(&mesh, &basis, &u, &mut u_master, &mut u_slave, false);
    (mesh, basis, tables, u, u_master, u_slave)
}

fn bench_lifting_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("lifting_pass");
    group.sample_size(20);
    for (n, nd) in [(3, 4), (5, 3)] {
        let (mesh, basis, tables, u, u_master, u_slave) = setup(n, nd);
        let params = LiftingParams {
            eta_br2: 2.0,
            eta_br2_wall: 6.0,
            volume_mode: VolumeMode::non_conservative(),
            fv_enabled: false,
        };
        let mut lifting = Lifting::new(params, &mesh, N_VARS);
        let mut exchange = Exchange::serial();
        let name = format!("n{}_elems{}", n, nd * nd * nd);
        group.bench_function(name.as_str(), |b| {
            b.iter(|| {
                lifting.lift(
                    black_box(&mesh),
                    &basis,
                    &tables,
                    black_box(&u),
                    &u_master,
                    &u_slave,
                    None,
                    &mut exchange,
                );
            })
        });
    }
    group.finish();
}

fn bench_volume_modes(c: &mut Criterion) {
    let mut group = c.benchmark_group("lifting_volume_mode");
    group.sample_size(20);
    let (mesh, basis, tables, u, u_master, u_slave) = setup(4, 3);
    for (label, mode) in [
        ("non_conservative", VolumeMode::non_conservative()),
        ("conservative", VolumeMode::conservative()),
    ] {
        let params = LiftingParams {
            eta_br2: 2.0,
            eta_br2_wall: 6.0,
            volume_mode: mode,
            fv_enabled: false,
        };
        let mut lifting = Lifting::new(params, &mesh, N_VARS);
        let mut exchange = Exchange::serial();
        group.bench_function(label, |b| {
            b.iter(|| {
                lifting.lift(
                    black_box(&mesh),
                    &basis,
                    &tables,
                    black_box(&u),
                    &u_master,
                    &u_slave,
                    None,
                    &mut exchange,
                );
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_lifting_pass, bench_volume_modes);
criterion_main!(benches);
