//! Clough-Tocher piecewise cubic interpolation of scattered 2D data.
//!
//! The input points are Delaunay-triangulated and every triangle is split
//! at its centroid into three cubic Bernstein-Bezier patches joined with
//! C1 continuity. Vertex gradients come from a global estimator that
//! minimises the approximate curvature of the surface along every edge
//! (Nielson 1983; Renka & Cline 1984), iterated Gauss-Seidel style.
//!
//! Queries outside the convex hull evaluate to NaN.

use crate::error::{SurfaceError, SurfaceResult};
use crate::triangulation::Triangulation;

/// Convergence tolerance of the gradient estimator.
pub const GRADIENT_TOLERANCE: f64 = 1e-6;

/// Upper bound on gradient estimator sweeps.
pub const GRADIENT_MAX_ITERATIONS: usize = 400;

/// Bezier ordinates of one triangle, indexed by the exponents of
/// `(b0, b1, b2, b_centroid)`.
#[derive(Debug, Clone, Copy)]
struct Patch {
    c3000: f64,
    c0300: f64,
    c0030: f64,
    c2100: f64,
    c1200: f64,
    c2010: f64,
    c1020: f64,
    c0210: f64,
    c0120: f64,
    c2001: f64,
    c0201: f64,
    c0021: f64,
    c1101: f64,
    c1011: f64,
    c0111: f64,
    c1002: f64,
    c0102: f64,
    c0012: f64,
    c0003: f64,
}

impl Patch {
    fn evaluate(&self, b: [f64; 3]) -> f64 {
        let minval = b[0].min(b[1]).min(b[2]);
        let b1 = b[0] - minval;
        let b2 = b[1] - minval;
        let b3 = b[2] - minval;
        let b4 = 3.0 * minval;

        // Pick the sub-triangle whose opposite vertex has the smallest weight.
        if b[0] == minval {
            b2 * b2 * b2 * self.c0300
                + 3.0 * b2 * b2 * b3 * self.c0210
                + 3.0 * b2 * b3 * b3 * self.c0120
                + b3 * b3 * b3 * self.c0030
                + 3.0 * b2 * b2 * b4 * self.c0201
                + 6.0 * b2 * b3 * b4 * self.c0111
                + 3.0 * b3 * b3 * b4 * self.c0021
                + 3.0 * b2 * b4 * b4 * self.c0102
                + 3.0 * b3 * b4 * b4 * self.c0012
                + b4 * b4 * b4 * self.c0003
        } else if b[1] == minval {
            b1 * b1 * b1 * self.c3000
                + 3.0 * b1 * b1 * b3 * self.c2010
                + 3.0 * b1 * b3 * b3 * self.c1020
                + b3 * b3 * b3 * self.c0030
                + 3.0 * b1 * b1 * b4 * self.c2001
                + 6.0 * b1 * b3 * b4 * self.c1011
                + 3.0 * b3 * b3 * b4 * self.c0021
                + 3.0 * b1 * b4 * b4 * self.c1002
                + 3.0 * b3 * b4 * b4 * self.c0012
                + b4 * b4 * b4 * self.c0003
        } else {
            b1 * b1 * b1 * self.c3000
                + 3.0 * b1 * b1 * b2 * self.c2100
                + 3.0 * b1 * b2 * b2 * self.c1200
                + b2 * b2 * b2 * self.c0300
                + 3.0 * b1 * b1 * b4 * self.c2001
                + 6.0 * b1 * b2 * b4 * self.c1101
                + 3.0 * b2 * b2 * b4 * self.c0201
                + 3.0 * b1 * b4 * b4 * self.c1002
                + 3.0 * b2 * b4 * b4 * self.c0102
                + b4 * b4 * b4 * self.c0003
        }
    }
}

/// A fitted Clough-Tocher interpolant.
#[derive(Debug, Clone)]
pub struct CloughTocher {
    triangulation: Triangulation,
    gradients: Vec<[f64; 2]>,
    patches: Vec<Patch>,
}

impl CloughTocher {
    /// Fit an interpolant through `points` (planar `[x, y]`) and `values`.
    ///
    /// Fails with `InsufficientData` when the points cannot be
    /// triangulated: fewer than three distinct points, or all collinear.
    pub fn fit(points: &[[f64; 2]], values: &[f64]) -> SurfaceResult<Self> {
        if points.len() != values.len() {
            return Err(SurfaceError::invalid_argument(
                "values",
                format!("expected {} values, got {}", points.len(), values.len()),
            ));
        }

        if points.iter().any(|p| !p[0].is_finite() || !p[1].is_finite()) {
            return Err(SurfaceError::invalid_argument(
                "points",
                "coordinates must be finite",
            ));
        }

        let triangulation = Triangulation::new(points).ok_or_else(|| {
            SurfaceError::insufficient_data(
                3,
                affine_span(points),
                "cubic interpolation (non-collinear points)",
            )
        })?;

        let gradients = estimate_gradients(&triangulation, values);
        let patches = (0..triangulation.len())
            .map(|tri| build_patch(&triangulation, values, &gradients, tri))
            .collect();

        tracing::debug!(
            points = points.len(),
            triangles = triangulation.len(),
            "Fitted Clough-Tocher interpolant"
        );

        Ok(Self {
            triangulation,
            gradients,
            patches,
        })
    }

    /// Estimated gradient `[d/dx, d/dy]` at every input point.
    pub fn gradients(&self) -> &[[f64; 2]] {
        &self.gradients
    }

    pub fn triangulation(&self) -> &Triangulation {
        &self.triangulation
    }

    /// Interpolated value at `(x, y)`, NaN outside the convex hull.
    pub fn evaluate(&self, x: f64, y: f64) -> f64 {
        self.evaluate_with_hint(x, y, None).0
    }

    /// Evaluate a batch of query points. Consecutive queries reuse the
    /// previous triangle as the walk start, which keeps raster-order
    /// sweeps close to linear time.
    pub fn evaluate_many(&self, queries: &[(f64, f64)]) -> Vec<f64> {
        let mut hint = None;
        queries
            .iter()
            .map(|&(x, y)| {
                let (value, tri) = self.evaluate_with_hint(x, y, hint);
                if tri.is_some() {
                    hint = tri;
                }
                value
            })
            .collect()
    }

    fn evaluate_with_hint(&self, x: f64, y: f64, hint: Option<usize>) -> (f64, Option<usize>) {
        match self.triangulation.find_triangle(x, y, hint) {
            Some((tri, b)) => (self.patches[tri].evaluate(b), Some(tri)),
            None => (f64::NAN, None),
        }
    }
}

/// Global gradient estimation.
///
/// For each vertex, solves the 2x2 system minimising the sum over incident
/// edges of the squared second derivative of the cubic edge interpolant,
/// holding neighbour gradients fixed. Sweeps until the largest relative
/// change drops below `GRADIENT_TOLERANCE`.
fn estimate_gradients(tri: &Triangulation, values: &[f64]) -> Vec<[f64; 2]> {
    let points = tri.points();
    let neighbors = tri.vertex_neighbors();
    let mut grad = vec![[0.0f64; 2]; points.len()];

    for iteration in 0..GRADIENT_MAX_ITERATIONS {
        let mut err = 0.0f64;

        for (i, adjacent) in neighbors.iter().enumerate() {
            if adjacent.is_empty() {
                continue;
            }

            let mut q = [0.0f64; 3]; // q00, q01, q11
            let mut s = [0.0f64; 2];

            for &j in adjacent {
                let ex = points[j][0] - points[i][0];
                let ey = points[j][1] - points[i][1];
                let l = (ex * ex + ey * ey).sqrt();
                let l3 = l * l * l;
                if l3 == 0.0 {
                    continue;
                }

                let f1 = values[i];
                let f2 = values[j];
                let df2 = -ex * grad[j][0] - ey * grad[j][1];

                q[0] += 4.0 * ex * ex / l3;
                q[1] += 4.0 * ex * ey / l3;
                q[2] += 4.0 * ey * ey / l3;
                let rhs = 6.0 * (f1 - f2) - 2.0 * df2;
                s[0] += rhs * ex / l3;
                s[1] += rhs * ey / l3;
            }

            let det = q[0] * q[2] - q[1] * q[1];
            if det == 0.0 || !det.is_finite() {
                continue;
            }
            let r0 = (q[2] * s[0] - q[1] * s[1]) / det;
            let r1 = (-q[1] * s[0] + q[0] * s[1]) / det;

            let change = (grad[i][0] + r0).abs().max((grad[i][1] + r1).abs());
            grad[i] = [-r0, -r1];

            let change = change / 1.0f64.max(r0.abs().max(r1.abs()));
            err = err.max(change);
        }

        if err < GRADIENT_TOLERANCE {
            tracing::debug!(iterations = iteration + 1, "Gradient estimation converged");
            return grad;
        }
    }

    tracing::warn!(
        max_iterations = GRADIENT_MAX_ITERATIONS,
        "Gradient estimation did not converge; using last iterate"
    );
    grad
}

/// Distinct points available once triangulation has failed: 0 for no
/// points, 1 when all coincide, otherwise 2 (they lie on a line).
fn affine_span(points: &[[f64; 2]]) -> usize {
    match points.split_first() {
        None => 0,
        Some((first, rest)) if rest.iter().all(|p| p == first) => 1,
        Some(_) => 2,
    }
}

fn dot(a: [f64; 2], b: [f64; 2]) -> f64 {
    a[0] * b[0] + a[1] * b[1]
}

fn sub(a: [f64; 2], b: [f64; 2]) -> [f64; 2] {
    [a[0] - b[0], a[1] - b[1]]
}

/// Bezier ordinates for one triangle from vertex values and gradients.
fn build_patch(tri: &Triangulation, values: &[f64], grad: &[[f64; 2]], t: usize) -> Patch {
    let [v0, v1, v2] = tri.vertices(t);
    let points = tri.points();
    let (x0, x1, x2) = (points[v0], points[v1], points[v2]);
    let (f1, f2, f3) = (values[v0], values[v1], values[v2]);
    let (g1, g2, g3) = (grad[v0], grad[v1], grad[v2]);

    let e12 = sub(x1, x0);
    let e23 = sub(x2, x1);
    let e31 = sub(x0, x2);

    // Directional derivatives along each edge, from both ends.
    let df12 = dot(g1, e12);
    let df21 = -dot(g2, e12);
    let df23 = dot(g2, e23);
    let df32 = -dot(g3, e23);
    let df31 = dot(g3, e31);
    let df13 = -dot(g1, e31);

    let c3000 = f1;
    let c2100 = (df12 + 3.0 * c3000) / 3.0;
    let c2010 = (df13 + 3.0 * c3000) / 3.0;
    let c0300 = f2;
    let c1200 = (df21 + 3.0 * c0300) / 3.0;
    let c0210 = (df23 + 3.0 * c0300) / 3.0;
    let c0030 = f3;
    let c1020 = (df31 + 3.0 * c0030) / 3.0;
    let c0120 = (df32 + 3.0 * c0030) / 3.0;

    let c2001 = (c2100 + c2010 + c3000) / 3.0;
    let c0201 = (c1200 + c0300 + c0210) / 3.0;
    let c0021 = (c1020 + c0120 + c0030) / 3.0;

    // Cross-boundary derivative condition on each edge, expressed through
    // the neighbour's centroid in this triangle's barycentric frame. Hull
    // edges use the centroid direction of the triangle itself.
    let mut g = [-0.5f64; 3];
    for (k, gk) in g.iter_mut().enumerate() {
        let Some(n) = tri.neighbor(t, k) else {
            continue;
        };
        let centroid = tri.centroid(n);
        let Some(c) = tri.barycentric(t, centroid[0], centroid[1]) else {
            continue;
        };
        *gk = match k {
            0 => (2.0 * c[2] + c[1] - 1.0) / (2.0 - 3.0 * c[2] - 3.0 * c[1]),
            1 => (2.0 * c[0] + c[2] - 1.0) / (2.0 - 3.0 * c[0] - 3.0 * c[2]),
            _ => (2.0 * c[1] + c[0] - 1.0) / (2.0 - 3.0 * c[1] - 3.0 * c[0]),
        };
    }

    let c0111 = (g[0] * (-c0300 + 3.0 * c0210 - 3.0 * c0120 + c0030)
        + (-c0300 + 2.0 * c0210 - c0120 + c0021 + c0201))
        / 2.0;
    let c1011 = (g[1] * (-c0030 + 3.0 * c1020 - 3.0 * c2010 + c3000)
        + (-c0030 + 2.0 * c1020 - c2010 + c2001 + c0021))
        / 2.0;
    let c1101 = (g[2] * (-c3000 + 3.0 * c2100 - 3.0 * c1200 + c0300)
        + (-c3000 + 2.0 * c2100 - c1200 + c2001 + c0201))
        / 2.0;

    let c1002 = (c1101 + c1011 + c2001) / 3.0;
    let c0102 = (c1101 + c0111 + c0201) / 3.0;
    let c0012 = (c1011 + c0111 + c0021) / 3.0;
    let c0003 = (c1002 + c0102 + c0012) / 3.0;

    Patch {
        c3000,
        c0300,
        c0030,
        c2100,
        c1200,
        c2010,
        c1020,
        c0210,
        c0120,
        c2001,
        c0201,
        c0021,
        c1101,
        c1011,
        c0111,
        c1002,
        c0102,
        c0012,
        c0003,
    }
}
