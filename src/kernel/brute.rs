// src/kernel/brute.rs
//
// Brute-force evaluation of the demagnetising tensor.
//
// Each tensor entry is the field at a destination cell due to a uniformly
// magnetised source cell, evaluated by the face-charge method: the source
// magnetisation along axis u is replaced by +/- magnetic surface charges on
// the two faces normal to u, the charges are discretised into point poles,
// and the resulting dipole field is averaged over the destination cell
// volume. Integration point counts adapt to the cell-to-cell distance via
// the accuracy parameter. This follows the approach of the MuMax3 design
// paper (Vansteenkiste et al., AIP Advances 4, 107133 (2014)).
//
// The three source axes are integrated by three parallel units. Unit s owns
// the upper-triangular slots (s, d>=s) outright, so the units share no
// mutable tensor state; a bounded channel carries each unit's finished
// buffers back to the orchestrator and doubles as the completion signal.
// Only the lower half of each padded axis is computed here; the mirrored
// half is reconstructed afterwards from parity.

use std::f64::consts::PI;
use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_channel::bounded;

use crate::geometry::{kernel_ranges, wrap, GridGeometry, X, Y, Z};
use crate::progress::Progress;
use crate::tensor::{pair_index, KernelTensor, ScalarField3D};

/// Integrate the six upper-triangular components over the padded grid.
///
/// The returned tensor is half-filled: wrapped coordinates beyond half the
/// padded extent on any axis are left zero for `symmetry::reconstruct`.
pub fn calc_demag_kernel(
    geom: &GridGeometry,
    accuracy: f64,
    progress: &dyn Progress,
) -> KernelTensor {
    assert!(
        accuracy > 0.0,
        "kernel accuracy must be positive, got {}",
        accuracy
    );

    let padded = geom.padded_size();
    let cellsize = geom.cellsize;
    let (lo, hi) = kernel_ranges(padded, geom.pbc);
    let l_min = geom.min_cellsize();
    let n_cells = padded[X] * padded[Y] * padded[Z];

    let total_rows = ((1 + hi[Y] - lo[Y]) * (1 + hi[Z] - lo[Z])) as usize;
    progress.begin(total_rows);
    let rows_done = AtomicUsize::new(0);

    // Disjoint slot ownership per unit: s=0 -> XX,XY,XZ; s=1 -> YY,YZ;
    // s=2 -> ZZ. Buffers move into the closures and come back through the
    // channel, so the tensor needs no locking.
    let units: [Vec<Vec<f32>>; 3] = [
        vec![vec![0.0; n_cells]; 3],
        vec![vec![0.0; n_cells]; 2],
        vec![vec![0.0; n_cells]; 1],
    ];

    let (done_tx, done_rx) = bounded::<(usize, Vec<Vec<f32>>)>(3);
    let mut finished: [Option<Vec<Vec<f32>>>; 3] = [None, None, None];

    rayon::scope(|sc| {
        for (s, mut comps) in units.into_iter().enumerate() {
            let done_tx = done_tx.clone();
            let rows_done = &rows_done;
            sc.spawn(move |_| {
                integrate_source_axis(
                    s,
                    &mut comps,
                    padded,
                    cellsize,
                    lo,
                    hi,
                    l_min,
                    accuracy,
                    if s == X {
                        Some((progress, rows_done))
                    } else {
                        None
                    },
                );
                // capacity 3, one send per unit: cannot block
                let _ = done_tx.send((s, comps));
            });
        }
        drop(done_tx);

        // The three receives are the only synchronisation point.
        for _ in 0..3 {
            let (s, comps) = done_rx
                .recv()
                .expect("integration unit terminated without a result");
            finished[s] = Some(comps);
        }
    });

    progress.finish();

    let mut kernel = KernelTensor::empty(padded);
    for (s, comps) in finished.into_iter().enumerate() {
        let comps = comps.expect("all three units joined");
        for (k, buf) in comps.into_iter().enumerate() {
            kernel.set_pair(pair_index(s, s + k), ScalarField3D::from_vec(padded, buf));
        }
    }
    kernel
}

/// One parallel unit: all destination offsets for source axis `s`.
/// `comps[d - s]` is the buffer for tensor slot (s, d).
fn integrate_source_axis(
    s: usize,
    comps: &mut [Vec<f32>],
    padded: [usize; 3],
    cellsize: [f64; 3],
    lo: [isize; 3],
    hi: [isize; 3],
    l_min: f64,
    accuracy: f64,
    progress: Option<(&dyn Progress, &AtomicUsize)>,
) {
    let u = s; // source axis
    let v = (s + 1) % 3; // transverse to the source faces
    let w = (s + 2) % 3;

    let mut r = [0.0f64; 3]; // destination cell centre
    let mut pole = [0.0f64; 3]; // point pole position on a source face

    for z in lo[Z]..=hi[Z] {
        let zw = wrap(z, padded[Z]);
        // mirror half, filled in afterwards from parity
        if zw > padded[Z] / 2 {
            continue;
        }
        r[Z] = z as f64 * cellsize[Z];

        for y in lo[Y]..=hi[Y] {
            let yw = wrap(y, padded[Y]);
            if yw > padded[Y] / 2 {
                continue;
            }
            r[Y] = y as f64 * cellsize[Y];

            // row count from the X unit only; display-only, never numerical
            if let Some((progress, rows_done)) = progress {
                progress.update(rows_done.fetch_add(1, Ordering::Relaxed) + 1);
            }

            for x in lo[X]..=hi[X] {
                let xw = wrap(x, padded[X]);
                if xw > padded[X] / 2 {
                    continue;
                }
                r[X] = x as f64 * cellsize[X];

                // Quadrature density from the closest surface-to-surface
                // distance; the self term falls back to the cell scale so
                // the division below never sees zero.
                let dx_min = delta(x) * cellsize[X];
                let dy_min = delta(y) * cellsize[Y];
                let dz_min = delta(z) * cellsize[Z];
                let mut d = (dx_min * dx_min + dy_min * dy_min + dz_min * dz_min).sqrt();
                if d == 0.0 {
                    d = l_min;
                }
                let max_size = d / accuracy;

                let nx = points(cellsize[X] / max_size);
                let ny = points(cellsize[Y] / max_size);
                let nz = points(cellsize[Z] / max_size);
                // Stagger the source-face grid against the destination
                // volume grid. Un-staggered grids alias badly near the self
                // term; do not remove the doubling.
                let nv = 2 * points(cellsize[v] / max_size);
                let nw = 2 * points(cellsize[w] / max_size);

                let scale = 1.0 / ((nv * nw * nx * ny * nz) as f64);
                let surface = cellsize[v] * cellsize[w];
                let charge = surface * scale; // per point pole, unit M_u
                let pu1 = 0.5 * cellsize[u]; // positive pole plane
                let pu2 = -pu1; // negative pole plane

                // Surface integral over the source faces, volume integral
                // over the destination cell, accumulated in f64.
                let mut b = [0.0f64; 3];
                for i in 0..nv {
                    pole[v] = -0.5 * cellsize[v]
                        + cellsize[v] / (2 * nv) as f64
                        + i as f64 * (cellsize[v] / nv as f64);

                    for j in 0..nw {
                        pole[w] = -0.5 * cellsize[w]
                            + cellsize[w] / (2 * nw) as f64
                            + j as f64 * (cellsize[w] / nw as f64);

                        for ax in 0..nx {
                            let rx = r[X] - 0.5 * cellsize[X]
                                + cellsize[X] / (2 * nx) as f64
                                + ax as f64 * (cellsize[X] / nx as f64);

                            for ay in 0..ny {
                                let ry = r[Y] - 0.5 * cellsize[Y]
                                    + cellsize[Y] / (2 * ny) as f64
                                    + ay as f64 * (cellsize[Y] / ny as f64);

                                for az in 0..nz {
                                    let rz = r[Z] - 0.5 * cellsize[Z]
                                        + cellsize[Z] / (2 * nz) as f64
                                        + az as f64 * (cellsize[Z] / nz as f64);

                                    // + pole
                                    pole[u] = pu1;
                                    let r1x = rx - pole[X];
                                    let r1y = ry - pole[Y];
                                    let r1z = rz - pole[Z];
                                    let r1 = (r1x * r1x + r1y * r1y + r1z * r1z).sqrt();
                                    let q1 = charge / (4.0 * PI * r1 * r1 * r1);
                                    let bx1 = r1x * q1;
                                    let by1 = r1y * q1;
                                    let bz1 = r1z * q1;

                                    // - pole
                                    pole[u] = pu2;
                                    let r2x = rx - pole[X];
                                    let r2y = ry - pole[Y];
                                    let r2z = rz - pole[Z];
                                    let r2 = (r2x * r2x + r2y * r2y + r2z * r2z).sqrt();
                                    let q2 = -charge / (4.0 * PI * r2 * r2 * r2);

                                    // addition ordered for accuracy
                                    b[X] += bx1 + r2x * q2;
                                    b[Y] += by1 + r2y * q2;
                                    b[Z] += bz1 + r2z * q2;
                                }
                            }
                        }
                    }
                }

                let idx = (zw * padded[Y] + yw) * padded[X] + xw;
                for dst in s..3 {
                    // += folds periodic images onto the same wrapped cell
                    comps[dst - s][idx] += b[dst] as f32;
                }
            }
        }
    }
}

/// Integration point count for one dimension: at least one point,
/// round-to-nearest otherwise.
#[inline]
fn points(x: f64) -> usize {
    (x.max(1.0) + 0.5) as usize
}

/// Closest distance between two cells along one axis, in units of the cell
/// size, given the integer centre offset. Touching cells (|d| <= 1) give 0.
#[inline]
fn delta(d: isize) -> f64 {
    let a = d.abs();
    if a > 0 {
        (a - 1) as f64
    } else {
        0.0
    }
}
