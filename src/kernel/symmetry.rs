// src/kernel/symmetry.rs
//
// Reconstruction of the mirror halves the integrator skipped.
//
// The interaction tensor is invariant under mirroring a coordinate axis up
// to a component-wise sign: a component flips sign when exactly one of its
// two indices matches the mirrored axis.
//
//   mirror | XX  XY  XZ  YY  YZ  ZZ
//   x->N-x |  +   -   -   +   +   +
//   y->N-y |  +   -   +   +   -   +
//   z->N-z |  +   +   -   +   -   +

use crate::geometry::{X, Y, Z};
use crate::tensor::{pair_index, KernelTensor};

/// Per-axis reflection signs for the upper-triangular components in
/// XX, XY, XZ, YY, YZ, ZZ order.
const MIRROR_SIGNS: [[f32; 6]; 3] = [
    [1.0, -1.0, -1.0, 1.0, 1.0, 1.0],
    [1.0, -1.0, 1.0, 1.0, -1.0, 1.0],
    [1.0, 1.0, -1.0, 1.0, -1.0, 1.0],
];

/// Fill the skipped halves in place.
///
/// Pass order is X, then Y, then Z: the Y pass reads rows the X pass has
/// already completed, and the Z pass reads planes completed by both, which
/// is what populates the corner and edge regions correctly. For a
/// thickness-1 mesh the out-of-plane components are dropped afterwards.
pub fn reconstruct(kernel: &mut KernelTensor) {
    let [nx, ny, nz] = kernel.size;
    let idx = |x: usize, y: usize, z: usize| (z * ny + y) * nx + x;

    for c in 0..6 {
        let sx = MIRROR_SIGNS[X][c];
        let sy = MIRROR_SIGNS[Y][c];
        let sz = MIRROR_SIGNS[Z][c];

        if let Some(f) = kernel.pair_mut(c) {
            let data = &mut f.data;

            for z in 0..nz {
                for y in 0..ny {
                    for x in nx / 2 + 1..nx {
                        data[idx(x, y, z)] = sx * data[idx(nx - x, y, z)];
                    }
                }
            }
            for z in 0..nz {
                for y in ny / 2 + 1..ny {
                    for x in 0..nx {
                        data[idx(x, y, z)] = sy * data[idx(x, ny - y, z)];
                    }
                }
            }
            for z in nz / 2 + 1..nz {
                for y in 0..ny {
                    for x in 0..nx {
                        data[idx(x, y, z)] = sz * data[idx(x, y, nz - z)];
                    }
                }
            }
        }
    }

    if kernel.is_2d() {
        // the out-of-plane couplings vanish for a single plane; absent, not
        // just zero, so the convolution engine skips the terms entirely
        kernel.drop_pair(pair_index(X, Z));
        kernel.drop_pair(pair_index(Y, Z));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor::{ScalarField3D, TENSOR_PAIRS};

    /// Deterministic non-symmetric fill for the kept (lower) region.
    fn seeded_tensor(size: [usize; 3]) -> KernelTensor {
        let mut kernel = KernelTensor::empty(size);
        for c in 0..6 {
            let mut f = ScalarField3D::new(size);
            for z in 0..=size[2] / 2 {
                for y in 0..=size[1] / 2 {
                    for x in 0..=size[0] / 2 {
                        let i = f.idx(x, y, z);
                        f.data[i] = (c * 1000 + x * 100 + y * 10 + z) as f32 + 1.0;
                    }
                }
            }
            kernel.set_pair(c, f);
        }
        kernel
    }

    #[test]
    fn mirror_laws_hold_on_every_axis() {
        let size = [8, 6, 4];
        let mut kernel = seeded_tensor(size);
        reconstruct(&mut kernel);

        for (c, &(i, j)) in TENSOR_PAIRS.iter().enumerate() {
            let f = kernel.get(i, j).expect("component present");
            for z in 0..size[2] {
                for y in 0..size[1] {
                    // X mirror
                    for x in size[0] / 2 + 1..size[0] {
                        assert_eq!(
                            f.at(x, y, z),
                            MIRROR_SIGNS[X][c] * f.at(size[0] - x, y, z),
                            "X mirror broken for pair {} at ({},{},{})",
                            c,
                            x,
                            y,
                            z
                        );
                    }
                }
            }
            for z in 0..size[2] {
                for y in size[1] / 2 + 1..size[1] {
                    for x in 0..size[0] {
                        assert_eq!(
                            f.at(x, y, z),
                            MIRROR_SIGNS[Y][c] * f.at(x, size[1] - y, z),
                            "Y mirror broken for pair {} at ({},{},{})",
                            c,
                            x,
                            y,
                            z
                        );
                    }
                }
            }
            for z in size[2] / 2 + 1..size[2] {
                for y in 0..size[1] {
                    for x in 0..size[0] {
                        assert_eq!(
                            f.at(x, y, z),
                            MIRROR_SIGNS[Z][c] * f.at(x, y, size[2] - z),
                            "Z mirror broken for pair {} at ({},{},{})",
                            c,
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
    fn two_d_reconstruction_drops_out_of_plane_components() {
        let mut kernel = seeded_tensor([4, 4, 1]);
        reconstruct(&mut kernel);

        assert!(kernel.get(X, Z).is_none());
        assert!(kernel.get(Y, Z).is_none());
        assert!(kernel.get(Z, X).is_none());
        assert_eq!(kernel.component_count(), 4);
    }
}
