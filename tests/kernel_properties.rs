// tests/kernel_properties.rs
//
// Integration tests for the kernel pipeline:
// - the padding rules and the thin-film scenario
// - mirror-sign laws of the reconstructed tensor
// - structural absence of out-of-plane components in 2D
// - codec round trip on a computed kernel
// - cache transparency, corruption recovery and the no-cache mode
// - the cell-aspect configuration guard
//
// The brute-force integrator is observed through the `Progress::begin`
// hook: it fires exactly once per computation and never on a cache hit.

use demagkern::error::KernelError;
use demagkern::geometry::{GridGeometry, X, Y, Z};
use demagkern::kernel::{codec, compute_demag_kernel, demag_kernel};
use demagkern::progress::{Progress, SilentProgress};
use demagkern::tensor::TENSOR_PAIRS;

use std::sync::atomic::{AtomicUsize, Ordering};

/// Counts integration starts, so tests can tell whether the brute-force
/// path ran at all.
struct CountingProgress {
    begins: AtomicUsize,
}

impl CountingProgress {
    fn new() -> Self {
        Self {
            begins: AtomicUsize::new(0),
        }
    }

    fn begins(&self) -> usize {
        self.begins.load(Ordering::Relaxed)
    }
}

impl Progress for CountingProgress {
    fn begin(&self, _total: usize) {
        self.begins.fetch_add(1, Ordering::Relaxed);
    }
    fn update(&self, _done: usize) {}
}

/// Small 3D mesh with a mild cell anisotropy; cheap even at test speed.
fn small_3d() -> GridGeometry {
    GridGeometry::new([4, 4, 2], [2e-9, 2e-9, 1e-9], [0, 0, 0])
}

#[test]
fn thin_film_scenario_4x4x1() {
    let geom = GridGeometry::new([4, 4, 1], [1e-9, 1e-9, 1e-9], [0, 0, 0]);
    assert_eq!(geom.padded_size(), [8, 8, 1]);

    let kernel = compute_demag_kernel(&geom, 4.0, &SilentProgress).expect("valid geometry");
    assert_eq!(kernel.size, [8, 8, 1]);

    // out-of-plane couplings are structurally absent in 2D
    assert!(kernel.get(X, Z).is_none());
    assert!(kernel.get(Y, Z).is_none());
    assert!(kernel.get(Z, X).is_none());
    assert_eq!(kernel.component_count(), 4);

    // the self term of a cubic cell is a demag factor near -1/3
    let xx = kernel.get(X, X).expect("XX");
    let nxx = xx.at(0, 0, 0) as f64;
    assert!(
        (-0.45..=-0.25).contains(&nxx),
        "self-term Nxx={} not a plausible cubic demag factor",
        nxx
    );

    // and the self-term trace is -1 up to quadrature error
    let nyy = kernel.get(Y, Y).expect("YY").at(0, 0, 0) as f64;
    let nzz = kernel.get(Z, Z).expect("ZZ").at(0, 0, 0) as f64;
    let trace = nxx + nyy + nzz;
    assert!((trace + 1.0).abs() < 2e-2, "trace={}", trace);

    // the integration range stops at +/-(N-1)/2, so the Nyquist row and
    // column of the padded grid stay exactly zero
    for k in 0..8 {
        assert_eq!(xx.at(4, k, 0), 0.0, "Nyquist column, y={}", k);
        assert_eq!(xx.at(k, 4, 0), 0.0, "Nyquist row, x={}", k);
    }
}

#[test]
fn mirror_sign_laws_hold_on_a_computed_kernel() {
    // reflection signs for XX, XY, XZ, YY, YZ, ZZ per mirrored axis
    const SIGNS: [[f32; 6]; 3] = [
        [1.0, -1.0, -1.0, 1.0, 1.0, 1.0],
        [1.0, -1.0, 1.0, 1.0, -1.0, 1.0],
        [1.0, 1.0, -1.0, 1.0, -1.0, 1.0],
    ];

    let kernel = compute_demag_kernel(&small_3d(), 4.0, &SilentProgress).expect("valid geometry");
    let [nx, ny, nz] = kernel.size;
    assert_eq!([nx, ny, nz], [8, 8, 3]);

    for (c, &(i, j)) in TENSOR_PAIRS.iter().enumerate() {
        let f = kernel.get(i, j).expect("3D kernel stores all six");
        for z in 0..nz {
            for y in 0..ny {
                for x in nx / 2 + 1..nx {
                    assert_eq!(
                        f.at(x, y, z),
                        SIGNS[X][c] * f.at(nx - x, y, z),
                        "X mirror, pair ({},{}), at ({},{},{})",
                        i,
                        j,
                        x,
                        y,
                        z
                    );
                }
            }
        }
        for z in 0..nz {
            for y in ny / 2 + 1..ny {
                for x in 0..nx {
                    assert_eq!(
                        f.at(x, y, z),
                        SIGNS[Y][c] * f.at(x, ny - y, z),
                        "Y mirror, pair ({},{}), at ({},{},{})",
                        i,
                        j,
                        x,
                        y,
                        z
                    );
                }
            }
        }
        for z in nz / 2 + 1..nz {
            for y in 0..ny {
                for x in 0..nx {
                    assert_eq!(
                        f.at(x, y, z),
                        SIGNS[Z][c] * f.at(x, y, nz - z),
                        "Z mirror, pair ({},{}), at ({},{},{})",
                        i,
                        j,
                        x,
                        y,
                        z
                    );
                }
            }
        }
    }
}

#[test]
fn codec_round_trip_on_a_computed_kernel_is_bit_exact() {
    let kernel = compute_demag_kernel(&small_3d(), 4.0, &SilentProgress).expect("valid geometry");
    let bytes = codec::encode(&kernel).expect("encode");
    let back = codec::decode(&bytes, kernel.size).expect("decode");
    assert_eq!(kernel, back);
}

#[test]
fn periodic_images_fold_into_the_wrapped_kernel() {
    let cellsize = [1e-9, 1e-9, 1e-9];
    let open = GridGeometry::new([4, 4, 1], cellsize, [0, 0, 0]);
    let film = GridGeometry::new([4, 4, 1], cellsize, [2, 2, 0]);

    // periodic axes get no padding
    assert_eq!(film.padded_size(), [4, 4, 1]);

    let k_open = compute_demag_kernel(&open, 4.0, &SilentProgress).expect("valid geometry");
    let k_film = compute_demag_kernel(&film, 4.0, &SilentProgress).expect("valid geometry");

    let zz_open = k_open.get(Z, Z).expect("ZZ").at(0, 0, 0) as f64;
    let zz_film = k_film.get(Z, Z).expect("ZZ").at(0, 0, 0) as f64;

    // the image sum must actually contribute to the wrapped self term
    assert!(
        (zz_open - zz_film).abs() > 1e-5,
        "open={} film={}",
        zz_open,
        zz_film
    );
}

#[test]
fn cache_round_trip_skips_recomputation_and_is_bit_identical() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cache_dir = dir.path().to_str().expect("utf-8 path");
    let geom = GridGeometry::new([4, 4, 1], [1e-9, 1e-9, 1e-9], [0, 0, 0]);

    let first = CountingProgress::new();
    let k1 = demag_kernel(&geom, 4.0, cache_dir, &first).expect("compute and persist");
    assert_eq!(first.begins(), 1, "first call must integrate");

    let entries: Vec<_> = std::fs::read_dir(dir.path())
        .expect("read cache dir")
        .map(|e| e.expect("dir entry").path())
        .collect();
    assert_eq!(entries.len(), 1);
    assert_eq!(
        entries[0].extension().and_then(|e| e.to_str()),
        Some("cache")
    );

    let second = CountingProgress::new();
    let k2 = demag_kernel(&geom, 4.0, cache_dir, &second).expect("load from cache");
    assert_eq!(second.begins(), 0, "second call must not integrate");
    assert_eq!(k1, k2);
}

#[test]
fn corrupt_cache_entry_degrades_to_recomputation() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cache_dir = dir.path().to_str().expect("utf-8 path");
    let geom = GridGeometry::new([4, 4, 1], [1e-9, 1e-9, 1e-9], [0, 0, 0]);

    let seed = CountingProgress::new();
    let k1 = demag_kernel(&geom, 4.0, cache_dir, &seed).expect("seed the cache");

    // clobber the entry with bytes that are not even a valid frame
    let entry = std::fs::read_dir(dir.path())
        .expect("read cache dir")
        .map(|e| e.expect("dir entry").path())
        .find(|p| p.extension().and_then(|e| e.to_str()) == Some("cache"))
        .expect("cache entry written");
    std::fs::write(&entry, b"garbage").expect("corrupt entry");

    let recompute = CountingProgress::new();
    let k2 = demag_kernel(&geom, 4.0, cache_dir, &recompute).expect("recover by recomputing");
    assert_eq!(recompute.begins(), 1, "corrupt entry must trigger integration");
    assert_eq!(k1, k2);

    // the recomputation rewrote a good entry
    let reread = CountingProgress::new();
    let k3 = demag_kernel(&geom, 4.0, cache_dir, &reread).expect("load repaired entry");
    assert_eq!(reread.begins(), 0);
    assert_eq!(k1, k3);
}

#[test]
fn empty_cache_dir_disables_caching() {
    let geom = GridGeometry::new([2, 2, 1], [1e-9, 1e-9, 1e-9], [0, 0, 0]);

    for _ in 0..2 {
        let count = CountingProgress::new();
        demag_kernel(&geom, 4.0, "", &count).expect("compute without disk");
        assert_eq!(count.begins(), 1, "every call must integrate");
    }
}

#[test]
fn extreme_cell_aspect_is_rejected_before_any_integration() {
    let geom = GridGeometry::new([4, 4, 1], [1e-9, 1e-9, 200e-9], [0, 0, 0]);

    let count = CountingProgress::new();
    let err = demag_kernel(&geom, 4.0, "", &count).unwrap_err();
    assert!(matches!(err, KernelError::Config(_)), "got {:?}", err);
    assert_eq!(count.begins(), 0, "rejected geometry must not integrate");
}
