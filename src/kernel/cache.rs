// src/kernel/cache.rs
//
// Disk-backed kernel cache. The key is derived from everything that
// determines the tensor (grid size, pbc, cell size, accuracy), so an entry
// is never updated in place; it is written once and read back on every later
// run with the same mesh. The cache is strictly an optimisation: every
// failure on the read or write path degrades to recomputation with a
// warning, never to an error for the caller.

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::error::Result;
use crate::geometry::GridGeometry;
use crate::kernel::{codec, compute_demag_kernel};
use crate::progress::Progress;
use crate::tensor::KernelTensor;

/// Bumped whenever the encoded layout changes; entries written by an older
/// layout then simply miss and get recomputed.
const LAYOUT_VERSION: u32 = 1;

/// Look the kernel up under `cache_dir`, computing and persisting it on a
/// miss. An empty `cache_dir` disables caching entirely.
pub fn load_or_compute(
    geom: &GridGeometry,
    accuracy: f64,
    cache_dir: &str,
    progress: &dyn Progress,
) -> Result<KernelTensor> {
    geom.validate()?;

    if cache_dir.is_empty() {
        return compute_demag_kernel(geom, accuracy, progress);
    }

    let dir = Path::new(cache_dir);
    if let Err(e) = fs::create_dir_all(dir) {
        warn!(
            "cannot create kernel cache dir {:?}: {} (caching disabled)",
            dir, e
        );
        return compute_demag_kernel(geom, accuracy, progress);
    }

    let path = dir.join(cache_key(geom, accuracy));
    match try_load(&path, geom.padded_size()) {
        Ok(Some(kernel)) => {
            info!("cache hit -> loaded demag kernel from {:?}", path);
            return Ok(kernel);
        }
        Ok(None) => {
            info!("cache miss -> building demag kernel ...");
        }
        Err(e) => {
            warn!(
                "failed to load kernel cache {:?}: {} (recomputing)",
                path, e
            );
        }
    }

    let kernel = compute_demag_kernel(geom, accuracy, progress)?;

    if let Err(e) = store(&path, &kernel) {
        warn!("failed to write kernel cache {:?}: {}", path, e);
    } else {
        info!("cached demag kernel to {:?}", path);
    }
    Ok(kernel)
}

/// Deterministic filename for the mesh parameters. Cell sizes and accuracy
/// are rendered in scientific notation so the key does not depend on float
/// formatting quirks across runs.
fn cache_key(geom: &GridGeometry, accuracy: f64) -> String {
    format!(
        "demagkernel_v{}_{}x{}x{}_{}x{}x{}_{:e}_{:e}_{:e}_acc{:e}.cache",
        LAYOUT_VERSION,
        geom.size[0],
        geom.size[1],
        geom.size[2],
        geom.pbc[0],
        geom.pbc[1],
        geom.pbc[2],
        geom.cellsize[0],
        geom.cellsize[1],
        geom.cellsize[2],
        accuracy
    )
}

/// `Ok(None)` is a miss; any `Err` is a corrupt or unreadable entry that the
/// caller recovers from by recomputing.
fn try_load(path: &Path, padded: [usize; 3]) -> Result<Option<KernelTensor>> {
    if !path.exists() {
        return Ok(None);
    }
    let bytes = fs::read(path)?;
    let kernel = codec::decode(&bytes, padded)?;
    Ok(Some(kernel))
}

/// Write the entry next to its final name, then rename. The rename publishes
/// the entry atomically, so a concurrent reader sees either nothing or a
/// complete file; the codec length check remains the backstop for anything
/// else.
fn store(path: &Path, kernel: &KernelTensor) -> Result<()> {
    let bytes = codec::encode(kernel)?;
    let tmp: PathBuf = path.with_extension("partial");
    fs::write(&tmp, &bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_is_deterministic_and_scientific() {
        let geom = GridGeometry::new([4, 4, 1], [1e-9, 1e-9, 1e-9], [0, 0, 0]);
        assert_eq!(
            cache_key(&geom, 4.0),
            "demagkernel_v1_4x4x1_0x0x0_1e-9_1e-9_1e-9_acc4e0.cache"
        );
        // a different accuracy is a different entry
        assert_ne!(cache_key(&geom, 4.0), cache_key(&geom, 6.0));

        let pbc = GridGeometry::new([4, 4, 1], [1e-9, 1e-9, 1e-9], [2, 2, 0]);
        assert_ne!(cache_key(&geom, 4.0), cache_key(&pbc, 4.0));
    }
}
