// src/kernel/mod.rs
//
// Demagnetising-kernel pipeline: geometry planning feeds the brute-force
// integrator, symmetry reconstruction completes the mirrored halves, and the
// cache wraps the result in compressed on-disk entries.
//
// The kernel is the dimensionless interaction tensor N: convolving N with the
// magnetisation M (A/m) yields H_demag (A/m); the field solver applies mu0
// downstream. It is computed once per mesh configuration and reused for the
// whole run.

pub mod brute;
pub mod cache;
pub mod codec;
pub mod symmetry;

use crate::error::Result;
use crate::geometry::GridGeometry;
use crate::progress::Progress;
use crate::tensor::KernelTensor;

/// Compute the kernel, consulting and maintaining the disk cache.
///
/// An empty `cache_dir` disables caching entirely. Cache trouble of any kind
/// degrades to a plain recomputation; the only error that reaches the caller
/// is a rejected geometry.
pub fn demag_kernel(
    geom: &GridGeometry,
    accuracy: f64,
    cache_dir: &str,
    progress: &dyn Progress,
) -> Result<KernelTensor> {
    cache::load_or_compute(geom, accuracy, cache_dir, progress)
}

/// Compute the kernel without touching the disk.
pub fn compute_demag_kernel(
    geom: &GridGeometry,
    accuracy: f64,
    progress: &dyn Progress,
) -> Result<KernelTensor> {
    geom.validate()?;
    let mut kernel = brute::calc_demag_kernel(geom, accuracy, progress);
    symmetry::reconstruct(&mut kernel);
    Ok(kernel)
}
