use serde::Serialize;
use serde_json;
use std::fs::File;
use std::path::Path;

use crate::geometry::GridGeometry;

#[derive(Serialize)]
pub struct KernelRunConfig {
    pub geometry: GeometryConfig,
    pub numerics: NumericsConfig,
    pub cache: CacheConfig,
    pub run: RunInfo,
}

#[derive(Serialize)]
pub struct GeometryConfig {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
    pub pbc_x: usize,
    pub pbc_y: usize,
    pub pbc_z: usize,
}

#[derive(Serialize)]
pub struct NumericsConfig {
    /// Quadrature density knob: integration cell size <= distance / accuracy.
    pub accuracy: f64,
}

#[derive(Serialize)]
pub struct CacheConfig {
    /// Empty string disables kernel caching.
    pub dir: String,
}

#[derive(Serialize)]
pub struct RunInfo {
    pub binary: String,
    pub version: String,
}

impl KernelRunConfig {
    pub fn new(geom: &GridGeometry, accuracy: f64, cache_dir: &str, binary: &str) -> Self {
        Self {
            geometry: GeometryConfig {
                nx: geom.size[0],
                ny: geom.size[1],
                nz: geom.size[2],
                dx: geom.cellsize[0],
                dy: geom.cellsize[1],
                dz: geom.cellsize[2],
                pbc_x: geom.pbc[0],
                pbc_y: geom.pbc[1],
                pbc_z: geom.pbc[2],
            },
            numerics: NumericsConfig { accuracy },
            cache: CacheConfig {
                dir: cache_dir.to_string(),
            },
            run: RunInfo {
                binary: binary.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }

    pub fn write_to_dir(&self, out_dir: &Path) -> std::io::Result<()> {
        let path = out_dir.join("kernel_config.json");
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}
