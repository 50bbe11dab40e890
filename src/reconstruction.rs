//! Piecewise-linear interface reconstruction: normal estimation, plane
//! intercepts and exact plane/slab volumes in the unit cube.
//!
//! Planes are written `m · x = alpha` in cell-local coordinates `x ∈ [0,1]³`;
//! material occupies the half-space `m · x <= alpha`.

const NORMAL_TINY: f64 = 1e-14;
const VOLUME_PR_FLOOR: f64 = 1e-50;

/// 3×3×3 neighbourhood of volume fractions around a cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stencil {
    values: [f64; 27],
}

impl Stencil {
    pub fn from_fn(f: impl Fn(i32, i32, i32) -> f64) -> Self {
        let mut values = [0.0; 27];
        for dk in -1..=1 {
            for dj in -1..=1 {
                for di in -1..=1 {
                    values[Self::slot(di, dj, dk)] = f(di, dj, dk);
                }
            }
        }
        Self { values }
    }

    pub fn get(&self, di: i32, dj: i32, dk: i32) -> f64 {
        self.values[Self::slot(di, dj, dk)]
    }

    fn slot(di: i32, dj: i32, dk: i32) -> usize {
        debug_assert!((-1..=1).contains(&di) && (-1..=1).contains(&dj) && (-1..=1).contains(&dk));
        ((dk + 1) * 9 + (dj + 1) * 3 + (di + 1)) as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
    pub normal: [f64; 3],
    pub alpha: f64,
}

/// Raw interface normal from a volume-fraction stencil. Any sign and magnitude.
pub trait NormalEstimator {
    fn normal(&self, stencil: &Stencil) -> [f64; 3];
}

/// Plane offset for a non-negative, L1-normalized normal truncating `fraction`
/// of the unit cube.
pub trait InterceptSolver {
    fn intercept(&self, normal: [f64; 3], fraction: f64) -> f64;
}

/// Material volume of the plane inside the slab `x0 ∈ [start, start + width]`
/// of the unit cube, where `x0` is the coordinate paired with `normal[0]`.
pub trait SlabVolume {
    fn slab_volume(&self, normal: [f64; 3], alpha: f64, start: f64, width: f64) -> f64;
}

pub trait InterfaceGeometry: NormalEstimator + InterceptSolver + SlabVolume + Sync {}

impl<T: NormalEstimator + InterceptSolver + SlabVolume + Sync> InterfaceGeometry for T {}

/// Youngs' estimate: minus the 1-2-1 weighted centred gradient of the stencil.
#[derive(Clone, Copy, Debug, Default)]
pub struct YoungsNormal;

impl NormalEstimator for YoungsNormal {
    fn normal(&self, stencil: &Stencil) -> [f64; 3] {
        const W: [f64; 3] = [1.0, 2.0, 1.0];
        let mut m = [0.0; 3];
        for a in -1..=1 {
            for b in -1..=1 {
                let w = W[(a + 1) as usize] * W[(b + 1) as usize];
                m[0] += w * (stencil.get(-1, a, b) - stencil.get(1, a, b));
                m[1] += w * (stencil.get(a, -1, b) - stencil.get(a, 1, b));
                m[2] += w * (stencil.get(a, b, -1) - stencil.get(a, b, 1));
            }
        }
        m.map(|c| c / 32.0)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct AnalyticIntercept;

impl InterceptSolver for AnalyticIntercept {
    fn intercept(&self, normal: [f64; 3], fraction: f64) -> f64 {
        plane_alpha(normal, fraction)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct AnalyticSlab;

impl SlabVolume for AnalyticSlab {
    fn slab_volume(&self, normal: [f64; 3], alpha: f64, start: f64, width: f64) -> f64 {
        slab_volume(normal, alpha, start, width)
    }
}

/// Bundles the three collaborators the flux kernel consumes.
#[derive(Clone, Copy, Debug, Default)]
pub struct Reconstruction<N, I, S> {
    pub normals: N,
    pub intercepts: I,
    pub slabs: S,
}

pub type Plic = Reconstruction<YoungsNormal, AnalyticIntercept, AnalyticSlab>;

impl<N: NormalEstimator, I, S> NormalEstimator for Reconstruction<N, I, S> {
    fn normal(&self, stencil: &Stencil) -> [f64; 3] {
        self.normals.normal(stencil)
    }
}

impl<N, I: InterceptSolver, S> InterceptSolver for Reconstruction<N, I, S> {
    fn intercept(&self, normal: [f64; 3], fraction: f64) -> f64 {
        self.intercepts.intercept(normal, fraction)
    }
}

impl<N, I, S: SlabVolume> SlabVolume for Reconstruction<N, I, S> {
    fn slab_volume(&self, normal: [f64; 3], alpha: f64, start: f64, width: f64) -> f64 {
        self.slabs.slab_volume(normal, alpha, start, width)
    }
}

/// A normal reflected into the positive octant and scaled to unit L1 norm,
/// remembering which components were reflected.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FoldedNormal {
    pub magnitude: [f64; 3],
    pub reflected: [bool; 3],
}

impl FoldedNormal {
    /// Maps a plane found for the folded normal back to the original octant.
    pub fn unfold(&self, alpha: f64) -> Plane {
        let mut normal = self.magnitude;
        let mut alpha = alpha;
        for d in 0..3 {
            if self.reflected[d] {
                normal[d] = -normal[d];
            }
            alpha += normal[d].min(0.0);
        }
        Plane { normal, alpha }
    }
}

/// A vanishing normal falls back to the x axis.
pub fn fold_normal(raw: [f64; 3]) -> FoldedNormal {
    let reflected = raw.map(|c| c < 0.0);
    let abs = raw.map(f64::abs);
    let sum = abs[0] + abs[1] + abs[2];
    if sum <= NORMAL_TINY {
        return FoldedNormal {
            magnitude: [1.0, 0.0, 0.0],
            reflected: [false; 3],
        };
    }
    FoldedNormal {
        magnitude: abs.map(|c| c / sum),
        reflected,
    }
}

/// Reconstructs the interface plane of a mixed cell with volume `fraction`.
pub fn reconstruct_plane<G>(geometry: &G, stencil: &Stencil, fraction: f64) -> Plane
where
    G: NormalEstimator + InterceptSolver + ?Sized,
{
    let folded = fold_normal(geometry.normal(stencil));
    let alpha = geometry.intercept(folded.magnitude, fraction);
    folded.unfold(alpha)
}

fn sort3(v: [f64; 3]) -> [f64; 3] {
    let mut s = v;
    if s[0] > s[1] {
        s.swap(0, 1);
    }
    if s[1] > s[2] {
        s.swap(1, 2);
    }
    if s[0] > s[1] {
        s.swap(0, 1);
    }
    s
}

/// Fraction of the unit cube with `normal · x <= alpha`, for any signs.
pub fn plane_volume(normal: [f64; 3], alpha: f64) -> f64 {
    let mut alpha = alpha;
    let mut m = normal;
    for c in &mut m {
        if *c < 0.0 {
            alpha -= *c;
            *c = -*c;
        }
    }
    let sum = m[0] + m[1] + m[2];
    if sum <= NORMAL_TINY {
        return if alpha >= 0.0 { 1.0 } else { 0.0 };
    }
    let al = alpha / sum;
    if al <= 0.0 {
        return 0.0;
    }
    if al >= 1.0 {
        return 1.0;
    }
    let [b1, b2, b3] = sort3(m.map(|c| c / sum));
    let al0 = al.min(1.0 - al);
    let b12 = b1 + b2;
    let bm = b12.min(b3);
    let pr = (6.0 * b1 * b2 * b3).max(VOLUME_PR_FLOOR);
    let tmp = if al0 < b1 {
        al0 * al0 * al0 / pr
    } else if al0 < b2 {
        0.5 * al0 * (al0 - b1) / (b2 * b3) + b1 * b1 * b1 / pr
    } else if al0 < bm {
        (al0 * al0 * (3.0 * b12 - al0) + b1 * b1 * (b1 - 3.0 * al0) + b2 * b2 * (b2 - 3.0 * al0))
            / pr
    } else if b12 <= b3 {
        (al0 - 0.5 * bm) / b3
    } else {
        (al0 * al0 * (3.0 - 2.0 * al0)
            + b1 * b1 * (b1 - 3.0 * al0)
            + b2 * b2 * (b2 - 3.0 * al0)
            + b3 * b3 * (b3 - 3.0 * al0))
            / pr
    };
    let volume = if al <= 0.5 { tmp } else { 1.0 - tmp };
    volume.clamp(0.0, 1.0)
}

/// Inverse of [`plane_volume`] for a non-negative normal with unit L1 norm.
pub fn plane_alpha(normal: [f64; 3], fraction: f64) -> f64 {
    let [m1, m2, m3] = sort3(normal);
    let m12 = m1 + m2;
    let pr = (6.0 * m1 * m2 * m3).max(VOLUME_PR_FLOOR);
    let v1 = m1 * m1 * m1 / pr;
    let v2 = v1 + 0.5 * (m2 - m1) / m3;
    let (mm, v3) = if m3 < m12 {
        let v3 = (m3 * m3 * (3.0 * m12 - m3) + m1 * m1 * (m1 - 3.0 * m3)
            + m2 * m2 * (m2 - 3.0 * m3))
            / pr;
        (m3, v3)
    } else {
        (m12, 0.5 * m12 / m3)
    };
    let ch = fraction.min(1.0 - fraction).max(0.0);
    let alpha = if ch < v1 {
        (pr * ch).cbrt()
    } else if ch < v2 {
        0.5 * (m1 + (m1 * m1 + 8.0 * m2 * m3 * (ch - v1)).sqrt())
    } else if ch < v3 {
        let p = 2.0 * m1 * m2;
        let q = 1.5 * m1 * m2 * (m12 - 2.0 * m3 * ch);
        cubic_branch(p, q) + m12
    } else if m12 <= m3 {
        m3 * ch + 0.5 * mm
    } else {
        let p = m1 * (m2 + m3) + m2 * m3 - 0.25;
        let q = 1.5 * m1 * m2 * m3 * (0.5 - ch);
        cubic_branch(p, q) + 0.5
    };
    if fraction > 0.5 {
        1.0 - alpha
    } else {
        alpha
    }
}

// Trigonometric root of the depressed cubic shared by the two upper branches.
fn cubic_branch(p: f64, q: f64) -> f64 {
    if p <= VOLUME_PR_FLOOR {
        return 0.0;
    }
    let p12 = p.sqrt();
    let theta = (q / (p * p12)).clamp(-1.0, 1.0).acos() / 3.0;
    let cs = theta.cos();
    p12 * ((3.0 * (1.0 - cs * cs)).sqrt() - cs)
}

/// Volume (not fraction) of material inside `x0 ∈ [start, start + width]`.
pub fn slab_volume(normal: [f64; 3], alpha: f64, start: f64, width: f64) -> f64 {
    if width <= 0.0 {
        return 0.0;
    }
    let scaled = [normal[0] * width, normal[1], normal[2]];
    width * plane_volume(scaled, alpha - normal[0] * start)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64, tol: f64) {
        assert!(
            (a - b).abs() <= tol,
            "expected {a} to be within {tol} of {b}"
        );
    }

    #[test]
    fn plane_volume_axis_aligned_is_linear() {
        assert_close(plane_volume([1.0, 0.0, 0.0], 0.3), 0.3, 1e-15);
        assert_close(plane_volume([0.0, 0.0, -1.0], -0.3), 0.7, 1e-15);
        assert_eq!(plane_volume([1.0, 0.0, 0.0], -0.1), 0.0);
        assert_eq!(plane_volume([1.0, 0.0, 0.0], 1.5), 1.0);
    }

    #[test]
    fn plane_volume_corner_tetrahedron() {
        let n = [1.0 / 3.0; 3];
        // Plane x + y + z = 0.3 cuts a tetrahedron of volume 0.3^3 / 6.
        let alpha = 0.1;
        assert_close(plane_volume(n, alpha), 0.3_f64.powi(3) / 6.0, 1e-14);
    }

    #[test]
    fn plane_volume_diagonal_half() {
        assert_close(plane_volume([0.0, 0.5, 0.5], 0.5), 0.5, 1e-14);
        assert_close(plane_volume([1.0 / 3.0; 3], 0.5), 0.5, 1e-14);
    }

    #[test]
    fn plane_alpha_inverts_volume() {
        let normals = [
            [1.0, 0.0, 0.0],
            [0.0, 0.5, 0.5],
            [0.2, 0.3, 0.5],
            [0.45, 0.1, 0.45],
            [1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0],
            [0.05, 0.05, 0.9],
            [0.3, 0.7, 0.0],
        ];
        for n in normals {
            for step in 1..100 {
                let c = step as f64 / 100.0;
                let alpha = plane_alpha(n, c);
                assert_close(plane_volume(n, alpha), c, 1e-12);
            }
        }
    }

    #[test]
    fn fold_and_unfold_preserve_the_plane() {
        let raw = [-0.4, 0.1, -0.5];
        let folded = fold_normal(raw);
        assert_eq!(folded.reflected, [true, false, true]);
        assert_close(folded.magnitude.iter().sum::<f64>(), 1.0, 1e-15);
        for step in 1..20 {
            let c = step as f64 / 20.0;
            let alpha = plane_alpha(folded.magnitude, c);
            let plane = folded.unfold(alpha);
            assert!(plane.normal[0] < 0.0 && plane.normal[2] < 0.0);
            assert_close(plane_volume(plane.normal, plane.alpha), c, 1e-12);
        }
    }

    #[test]
    fn fold_degenerate_normal_falls_back_to_x() {
        let folded = fold_normal([0.0, 0.0, 0.0]);
        assert_eq!(folded.magnitude, [1.0, 0.0, 0.0]);
        assert_eq!(folded.reflected, [false; 3]);
    }

    #[test]
    fn youngs_normal_points_away_from_material() {
        // Material fills the low-x side.
        let stencil = Stencil::from_fn(|di, _, _| if di < 0 { 1.0 } else if di == 0 { 0.5 } else { 0.0 });
        let m = YoungsNormal.normal(&stencil);
        assert!(m[0] > 0.0);
        assert_eq!(m[1], 0.0);
        assert_eq!(m[2], 0.0);
        let plane = reconstruct_plane(&Plic::default(), &stencil, 0.5);
        assert_close(plane.normal[0], 1.0, 1e-15);
        assert_close(plane.alpha, 0.5, 1e-15);
    }

    #[test]
    fn reconstructed_plane_keeps_fraction_for_mirrored_stencil() {
        let stencil = Stencil::from_fn(|_, dj, dk| if dj + dk > 0 { 1.0 } else { 0.0 });
        let plane = reconstruct_plane(&Plic::default(), &stencil, 0.3);
        assert!(plane.normal[1] < 0.0 && plane.normal[2] < 0.0);
        assert_close(plane_volume(plane.normal, plane.alpha), 0.3, 1e-12);
    }

    #[test]
    fn slab_volumes_partition_the_cube() {
        let n = [0.3, -0.2, 0.5];
        let alpha = 0.1;
        let whole = plane_volume(n, alpha);
        let parts = slab_volume(n, alpha, 0.0, 0.25)
            + slab_volume(n, alpha, 0.25, 0.5)
            + slab_volume(n, alpha, 0.75, 0.25);
        assert_close(parts, whole, 1e-14);
        assert_eq!(slab_volume(n, alpha, 0.5, 0.0), 0.0);
    }
}
