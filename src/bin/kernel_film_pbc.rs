// src/bin/kernel_film_pbc.rs
//
// Developer diagnostic: effect of in-plane periodic images on the kernel.
//
// Builds the kernel for an Nx x Ny x 1 film twice, open and with pbc
// repeats along X and Y, and prints the self-term entries side by side.
// The periodic kernel folds every image contribution into the wrapped
// grid, so its self terms shift towards the infinite-film limit
// (Nzz -> 1, in-plane factors -> 0).
//
// Kernels go through the on-disk cache under out/kernel_cache, so a second
// run is instant; run provenance is written to out/kernel_config.json.
//
// Run:
//   cargo run --release --bin kernel_film_pbc
//   cargo run --release --bin kernel_film_pbc -- 32 32 2

use std::fs::create_dir_all;
use std::path::Path;

use demagkern::config::KernelRunConfig;
use demagkern::geometry::{GridGeometry, X, Y, Z};
use demagkern::kernel::demag_kernel;
use demagkern::progress::LogProgress;
use demagkern::tensor::KernelTensor;

const ACCURACY: f64 = 6.0;
const CACHE_DIR: &str = "out/kernel_cache";

fn self_terms(kernel: &KernelTensor) -> [f64; 3] {
    [
        kernel.get(X, X).expect("XX").at(0, 0, 0) as f64,
        kernel.get(Y, Y).expect("YY").at(0, 0, 0) as f64,
        kernel.get(Z, Z).expect("ZZ").at(0, 0, 0) as f64,
    ]
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let (nx, ny, repeats) = if args.len() == 4 {
        (
            args[1].parse::<usize>().expect("nx"),
            args[2].parse::<usize>().expect("ny"),
            args[3].parse::<usize>().expect("repeats"),
        )
    } else {
        (32usize, 32usize, 2usize)
    };
    let cellsize = [1e-9, 1e-9, 0.5e-9];

    let open = GridGeometry::new([nx, ny, 1], cellsize, [0, 0, 0]);
    let film = GridGeometry::new([nx, ny, 1], cellsize, [repeats, repeats, 0]);

    let progress = LogProgress::new();

    let k_open = match demag_kernel(&open, ACCURACY, CACHE_DIR, &progress) {
        Ok(k) => k,
        Err(e) => {
            eprintln!("kernel_film_pbc: {}", e);
            std::process::exit(1);
        }
    };
    let k_film = match demag_kernel(&film, ACCURACY, CACHE_DIR, &progress) {
        Ok(k) => k,
        Err(e) => {
            eprintln!("kernel_film_pbc: {}", e);
            std::process::exit(1);
        }
    };

    let [oxx, oyy, ozz] = self_terms(&k_open);
    let [fxx, fyy, fzz] = self_terms(&k_film);

    println!(
        "Film {}x{}x1, cell ({:.1e}, {:.1e}, {:.1e}) m, pbc repeats {}",
        nx, ny, cellsize[0], cellsize[1], cellsize[2], repeats
    );
    println!("            open            pbc");
    println!("  Nxx  {:>12.6}  {:>12.6}", oxx, fxx);
    println!("  Nyy  {:>12.6}  {:>12.6}", oyy, fyy);
    println!("  Nzz  {:>12.6}  {:>12.6}", ozz, fzz);

    let out_dir = Path::new("out");
    if let Err(e) = create_dir_all(out_dir) {
        eprintln!("kernel_film_pbc: cannot create {:?}: {}", out_dir, e);
        return;
    }
    let config = KernelRunConfig::new(&film, ACCURACY, CACHE_DIR, "kernel_film_pbc");
    if let Err(e) = config.write_to_dir(out_dir) {
        eprintln!("kernel_film_pbc: failed to write kernel_config.json: {}", e);
    }
}
