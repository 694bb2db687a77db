// src/bin/kernel_cube.rs
//
// Developer diagnostic: demagnetising-kernel sanity checker.
//
// Computes the kernel for an Nx x Ny x Nz open-boundary grid and prints the
// self-term demag factors (Nxx, Nyy, Nzz). For a single cubic cell these
// approach 1/3 each; for thin films Nzz approaches 1.
//
// This tool:
//   - prints results to stdout only
//   - does NOT touch the kernel cache
//   - is intended for interactive inspection during kernel development
//
// Usage examples:
//   cargo run --release --bin kernel_cube
//   cargo run --release --bin kernel_cube -- 1 1 1 1e-9 1e-9 1e-9
//   cargo run --release --bin kernel_cube -- 64 64 1 5e-9 5e-9 1e-9

use demagkern::geometry::{GridGeometry, X, Y, Z};
use demagkern::kernel::compute_demag_kernel;
use demagkern::progress::LogProgress;

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    // Defaults: a modest thin-film-ish grid
    let (nx, ny, nz, dx, dy, dz) = if args.len() == 7 {
        (
            args[1].parse::<usize>().expect("nx"),
            args[2].parse::<usize>().expect("ny"),
            args[3].parse::<usize>().expect("nz"),
            args[4].parse::<f64>().expect("dx"),
            args[5].parse::<f64>().expect("dy"),
            args[6].parse::<f64>().expect("dz"),
        )
    } else {
        (16usize, 16usize, 1usize, 5e-9, 5e-9, 5e-9)
    };

    let geom = GridGeometry::new([nx, ny, nz], [dx, dy, dz], [0, 0, 0]);
    let progress = LogProgress::new();

    let kernel = match compute_demag_kernel(&geom, 6.0, &progress) {
        Ok(k) => k,
        Err(e) => {
            eprintln!("kernel_cube: {}", e);
            std::process::exit(1);
        }
    };

    // The wrapped self term sits at the origin of the padded grid; its
    // diagonal entries are minus the single-cell demag factors.
    let nxx = -(kernel.get(X, X).expect("XX").at(0, 0, 0) as f64);
    let nyy = -(kernel.get(Y, Y).expect("YY").at(0, 0, 0) as f64);
    let nzz = -(kernel.get(Z, Z).expect("ZZ").at(0, 0, 0) as f64);

    let padded = kernel.size;
    println!(
        "Grid: {}x{}x{} (padded {}x{}x{}), dx={:.3e}, dy={:.3e}, dz={:.3e}",
        nx, ny, nz, padded[0], padded[1], padded[2], dx, dy, dz
    );
    println!(
        "Self-term demag factors: Nxx={:.6}, Nyy={:.6}, Nzz={:.6}",
        nxx, nyy, nzz
    );
    println!("Trace check: Nxx+Nyy+Nzz = {:.6}", nxx + nyy + nzz);
}
