// src/kernel/codec.rs
//
// On-disk encoding of the kernel tensor: the stored components in fixed
// XX, XY, XZ, YY, YZ, ZZ order (four components for thickness-1 meshes),
// each value as 4-byte little-endian f32 in z,y,x traversal, the whole
// payload zstd-compressed in one piece. The layout carries no header; the
// cache filename already pins the geometry, and the decoded byte count is
// checked against the padded size as the integrity backstop.

use crate::error::{KernelError, Result};
use crate::geometry::{X, Y, Z};
use crate::tensor::{pair_index, KernelTensor, ScalarField3D, TENSOR_PAIRS};

/// Component slots stored for a given padded size, in layout order.
fn stored_pairs(padded: [usize; 3]) -> Vec<usize> {
    let two_d = padded[Z] == 1;
    (0..TENSOR_PAIRS.len())
        .filter(|&c| !(two_d && (c == pair_index(X, Z) || c == pair_index(Y, Z))))
        .collect()
}

/// Serialise and compress a kernel tensor.
pub fn encode(kernel: &KernelTensor) -> Result<Vec<u8>> {
    let mut raw = Vec::with_capacity(kernel.component_count() * kernel.cells() * 4);
    for (_, field) in kernel.present() {
        // the flat buffer is already in z,y,x nested order
        for v in &field.data {
            raw.extend_from_slice(&v.to_le_bytes());
        }
    }
    let compressed = zstd::stream::encode_all(raw.as_slice(), 0)?;
    Ok(compressed)
}

/// Decompress and rebuild a kernel tensor for the given padded size.
///
/// Fails with `SizeMismatch` when the payload length does not match the
/// expected component count times the grid volume; a truncated or foreign
/// cache entry is reported rather than sliced into a malformed tensor.
pub fn decode(bytes: &[u8], padded: [usize; 3]) -> Result<KernelTensor> {
    let raw = zstd::stream::decode_all(bytes)?;

    let cells = padded[X] * padded[Y] * padded[Z];
    let pairs = stored_pairs(padded);
    let expected = pairs.len() * cells * 4;
    if raw.len() != expected {
        return Err(KernelError::SizeMismatch {
            expected,
            got: raw.len(),
        });
    }

    let mut kernel = KernelTensor::empty(padded);
    for (slot, c) in pairs.into_iter().enumerate() {
        let start = slot * cells * 4;
        let mut data = Vec::with_capacity(cells);
        for chunk in raw[start..start + cells * 4].chunks_exact(4) {
            data.push(f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
        }
        kernel.set_pair(c, ScalarField3D::from_vec(padded, data));
    }
    Ok(kernel)
}
