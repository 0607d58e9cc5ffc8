//! Rotated, scaled search ellipsoid.

use terrane_space::Point3;

use crate::params::NeighborhoodParams;

/// An anisotropic distance metric.
///
/// The rotation `M = Rz(azimuth) * Ry(dip) * Rx(rake)` maps the
/// ellipsoid's local axes to world space. A world offset `d` is expressed
/// in local coordinates as `u = Mᵀ d`, and its normalized squared
/// distance is `Σ (u_i / r_i)²`: exactly 1 on the ellipsoid surface.
#[derive(Clone, Debug, PartialEq)]
pub struct Ellipsoid {
    rotation: [[f64; 3]; 3],
    ranges: [f64; 3],
}

impl Ellipsoid {
    /// Build the metric from already-validated params.
    pub fn new(params: &NeighborhoodParams) -> Self {
        let [az, dip, rake] = params.angles.map(f64::to_radians);
        let rz = [
            [az.cos(), -az.sin(), 0.0],
            [az.sin(), az.cos(), 0.0],
            [0.0, 0.0, 1.0],
        ];
        let ry = [
            [dip.cos(), 0.0, dip.sin()],
            [0.0, 1.0, 0.0],
            [-dip.sin(), 0.0, dip.cos()],
        ];
        let rx = [
            [1.0, 0.0, 0.0],
            [0.0, rake.cos(), -rake.sin()],
            [0.0, rake.sin(), rake.cos()],
        ];
        Self {
            rotation: mat_mul(&mat_mul(&rz, &ry), &rx),
            ranges: params.ranges,
        }
    }

    /// Normalized squared distance from `from` to `to`.
    #[inline]
    pub fn normalized_sq(&self, from: &Point3, to: &Point3) -> f64 {
        let d = [to[0] - from[0], to[1] - from[1], to[2] - from[2]];
        let mut q = 0.0;
        for i in 0..3 {
            // Column i of M is local axis i in world space.
            let u = self.rotation[0][i] * d[0] + self.rotation[1][i] * d[1] + self.rotation[2][i] * d[2];
            let scaled = u / self.ranges[i];
            q += scaled * scaled;
        }
        q
    }

    /// Half-extents of the axis-aligned box enclosing the ellipsoid.
    pub fn half_extents(&self) -> [f64; 3] {
        let mut h = [0.0; 3];
        for (j, row) in self.rotation.iter().enumerate() {
            h[j] = (0..3)
                .map(|i| (row[i] * self.ranges[i]).powi(2))
                .sum::<f64>()
                .sqrt();
        }
        h
    }
}

fn mat_mul(a: &[[f64; 3]; 3], b: &[[f64; 3]; 3]) -> [[f64; 3]; 3] {
    let mut out = [[0.0; 3]; 3];
    for (r, row) in out.iter_mut().enumerate() {
        for (c, cell) in row.iter_mut().enumerate() {
            *cell = (0..3).map(|k| a[r][k] * b[k][c]).sum();
        }
    }
    out
}
