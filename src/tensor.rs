// src/tensor.rs

use crate::geometry::Z;

/// One scalar component of the kernel over the padded grid.
///
/// Values are stored f32, matching the on-disk element size and what the
/// convolution engine uploads; the quadrature itself accumulates in f64.
/// Layout is z,y,x nested (x fastest), flat index `(z*ny + y)*nx + x`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarField3D {
    pub size: [usize; 3],
    pub data: Vec<f32>,
}

impl ScalarField3D {
    /// Zero-initialised field over the given padded size.
    pub fn new(size: [usize; 3]) -> Self {
        let n = size[0] * size[1] * size[2];
        Self {
            size,
            data: vec![0.0; n],
        }
    }

    /// Wrap an existing buffer. The length must match the size exactly.
    pub fn from_vec(size: [usize; 3], data: Vec<f32>) -> Self {
        assert_eq!(
            data.len(),
            size[0] * size[1] * size[2],
            "field buffer length does not match size {:?}",
            size
        );
        Self { size, data }
    }

    /// Flat index for grid coordinates (x, y, z).
    #[inline]
    pub fn idx(&self, x: usize, y: usize, z: usize) -> usize {
        debug_assert!(x < self.size[0] && y < self.size[1] && z < self.size[2]);
        (z * self.size[1] + y) * self.size[0] + x
    }

    #[inline]
    pub fn at(&self, x: usize, y: usize, z: usize) -> f32 {
        self.data[self.idx(x, y, z)]
    }
}

/// Upper-triangular component order used everywhere: XX, XY, XZ, YY, YZ, ZZ.
pub const TENSOR_PAIRS: [(usize, usize); 6] = [(0, 0), (0, 1), (0, 2), (1, 1), (1, 2), (2, 2)];

/// Slot in `TENSOR_PAIRS` for component (i, j); (j, i) maps onto (i, j).
#[inline]
pub fn pair_index(i: usize, j: usize) -> usize {
    match (i.min(j), i.max(j)) {
        (0, 0) => 0,
        (0, 1) => 1,
        (0, 2) => 2,
        (1, 1) => 3,
        (1, 2) => 4,
        (2, 2) => 5,
        _ => panic!("tensor component ({}, {}) out of range", i, j),
    }
}

/// The demag interaction tensor over the padded grid.
///
/// Only the upper triangle is stored; `get(j, i)` resolves to the same field
/// as `get(i, j)`, which is how consumers see a fully populated symmetric
/// 3x3 structure. For thickness-1 meshes the XZ and YZ slots are absent
/// (structurally, not merely zero): the out-of-plane coupling vanishes there
/// and the convolution engine skips those terms entirely.
#[derive(Debug, Clone, PartialEq)]
pub struct KernelTensor {
    pub size: [usize; 3],
    comps: [Option<ScalarField3D>; 6],
}

impl KernelTensor {
    /// Tensor with no components allocated yet.
    pub fn empty(size: [usize; 3]) -> Self {
        Self {
            size,
            comps: [None, None, None, None, None, None],
        }
    }

    /// Cells per component.
    pub fn cells(&self) -> usize {
        self.size[0] * self.size[1] * self.size[2]
    }

    /// True when the padded grid is a single Z plane.
    pub fn is_2d(&self) -> bool {
        self.size[Z] == 1
    }

    /// Number of stored components: 4 in 2D, 6 otherwise.
    pub fn component_count(&self) -> usize {
        self.comps.iter().filter(|c| c.is_some()).count()
    }

    /// Store a component by its `TENSOR_PAIRS` slot.
    pub fn set_pair(&mut self, c: usize, field: ScalarField3D) {
        assert_eq!(field.size, self.size, "component size mismatch");
        self.comps[c] = Some(field);
    }

    /// Remove a component (used to drop the out-of-plane terms in 2D).
    pub fn drop_pair(&mut self, c: usize) {
        self.comps[c] = None;
    }

    pub fn pair(&self, c: usize) -> Option<&ScalarField3D> {
        self.comps[c].as_ref()
    }

    pub fn pair_mut(&mut self, c: usize) -> Option<&mut ScalarField3D> {
        self.comps[c].as_mut()
    }

    /// Component (i, j) of the symmetric tensor; either index order works.
    pub fn get(&self, i: usize, j: usize) -> Option<&ScalarField3D> {
        self.pair(pair_index(i, j))
    }

    /// Present components in fixed `TENSOR_PAIRS` order.
    pub fn present(&self) -> impl Iterator<Item = (usize, &ScalarField3D)> {
        self.comps
            .iter()
            .enumerate()
            .filter_map(|(c, f)| f.as_ref().map(|f| (c, f)))
    }
}
