//! Directionally split Lagrangian flux kernel, boundary flux closure and the
//! volume-fraction update for one sweep direction.

use crate::field::{map_cells, Field3};
use crate::grid::{Axis, IndexBox};
use crate::reconstruction::{reconstruct_plane, InterfaceGeometry, Plane};

pub const VOF_EPS: f64 = f64::EPSILON;

/// Face CFL numbers `q = u · dt / dx` on the lower and upper face of a cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceCfl {
    pub left: f64,
    pub right: f64,
}

impl FaceCfl {
    pub fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }

    pub fn from_faces(lower: f64, upper: f64, dtdx: f64) -> Self {
        Self::new(lower * dtdx, upper * dtdx)
    }

    /// Length of the Lagrangian image of the cell, `1 - qL + qR`.
    pub fn stretch(self) -> f64 {
        1.0 - self.left + self.right
    }

    /// Width of the slab that stays inside the cell, `1 - max(qL,0) + min(qR,0)`.
    pub fn retained_width(self) -> f64 {
        1.0 - self.left.max(0.0) + self.right.min(0.0)
    }

    pub fn max_abs(self) -> f64 {
        self.left.abs().max(self.right.abs())
    }
}

/// Volumes leaving through the lower face, staying, and leaving through the
/// upper face of a cell during one sweep.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FluxTriple {
    pub left: f64,
    pub retained: f64,
    pub right: f64,
}

impl FluxTriple {
    pub fn total(&self) -> f64 {
        self.left + self.retained + self.right
    }

    fn full(cfl: FaceCfl) -> Self {
        Self {
            left: (-cfl.left).max(0.0),
            retained: cfl.retained_width(),
            right: cfl.right.max(0.0),
        }
    }
}

/// Re-expresses a cell plane in the frame stretched by the moving faces.
pub fn lagrangian_plane(plane: Plane, axis: Axis, cfl: FaceCfl) -> Plane {
    let d = axis.index();
    let mut normal = plane.normal;
    normal[d] /= cfl.stretch();
    Plane {
        normal,
        alpha: plane.alpha + normal[d] * cfl.left,
    }
}

/// Flux triple of a mixed cell whose interface plane is already known.
pub fn plane_fluxes<G>(geometry: &G, plane: Plane, axis: Axis, cfl: FaceCfl) -> FluxTriple
where
    G: InterfaceGeometry + ?Sized,
{
    if cfl.stretch() <= VOF_EPS {
        return FluxTriple::default();
    }
    let moved = lagrangian_plane(plane, axis, cfl);
    let normal = axis.permute(moved.normal);
    let alpha = moved.alpha;
    let mut out = FluxTriple::default();
    if cfl.left < 0.0 {
        out.left = geometry.slab_volume(normal, alpha, cfl.left, -cfl.left);
    }
    if cfl.right > 0.0 {
        out.right = geometry.slab_volume(normal, alpha, 1.0, cfl.right);
    }
    out.retained = geometry.slab_volume(normal, alpha, cfl.left.max(0.0), cfl.retained_width());
    out
}

/// Flux triple for cell `p` of `cc`.
pub fn cell_fluxes<G>(cc: &Field3, p: [i32; 3], axis: Axis, cfl: FaceCfl, geometry: &G) -> FluxTriple
where
    G: InterfaceGeometry + ?Sized,
{
    let fraction = cc.get(p);
    if fraction > 1.0 - VOF_EPS {
        FluxTriple::full(cfl)
    } else if fraction > 0.0 {
        let plane = reconstruct_plane(geometry, &cc.stencil(p), fraction);
        plane_fluxes(geometry, plane, axis, cfl)
    } else {
        FluxTriple::default()
    }
}

/// The three flux arrays of one sweep, over the same box as the volume fraction.
#[derive(Clone, Debug, PartialEq)]
pub struct Fluxes {
    pub left: Field3,
    pub retained: Field3,
    pub right: Field3,
}

impl Fluxes {
    pub fn new(bx: IndexBox) -> Self {
        Self {
            left: Field3::new(bx, 0.0),
            retained: Field3::new(bx, 0.0),
            right: Field3::new(bx, 0.0),
        }
    }

    pub fn index_box(&self) -> IndexBox {
        self.left.index_box()
    }

    pub fn get(&self, p: [i32; 3]) -> FluxTriple {
        FluxTriple {
            left: self.left.get(p),
            retained: self.retained.get(p),
            right: self.right.get(p),
        }
    }

    fn scatter(&mut self, triples: Vec<FluxTriple>) {
        let bx = self.index_box();
        assert_eq!(triples.len(), bx.size(), "flux triple count mismatch");
        let (left, (retained, right)): (Vec<f64>, (Vec<f64>, Vec<f64>)) = triples
            .into_iter()
            .map(|t| (t.left, (t.retained, t.right)))
            .unzip();
        self.left = Field3::from_data(bx, left);
        self.retained = Field3::from_data(bx, retained);
        self.right = Field3::from_data(bx, right);
    }
}

/// Evaluates the flux kernel on every cell of `out`'s box. `vel` holds the
/// face velocities normal to `axis`; a face outside it reads as at rest.
pub fn compute_fluxes<G>(
    out: &mut Fluxes,
    cc: &Field3,
    vel: &Field3,
    dtdx: f64,
    axis: Axis,
    geometry: &G,
) where
    G: InterfaceGeometry + ?Sized,
{
    let bx = out.index_box();
    assert_eq!(bx, cc.index_box(), "flux box must match volume fraction box");
    let triples = map_cells(bx, |p| {
        let cfl = FaceCfl::from_faces(
            vel.get_or(p, 0.0),
            vel.get_or(axis.shift(p, 1), 0.0),
            dtdx,
        );
        cell_fluxes(cc, p, axis, cfl, geometry)
    });
    out.scatter(triples);
}

/// Zeroes the fluxes that would carry material into the box through its two
/// faces normal to `axis`: `right` on the low layer and `left` on the high
/// layer. The transverse edge layers are left alone.
pub fn close_boundary_fluxes(fluxes: &mut Fluxes, bx: IndexBox, axis: Axis) {
    let d = axis.index();
    let (a, b) = axis.transverse();
    let (lo, hi) = (bx.lo(), bx.hi());
    for tb in lo[b.index()] + 1..=hi[b.index()] - 1 {
        for ta in lo[a.index()] + 1..=hi[a.index()] - 1 {
            let mut p = [0; 3];
            p[a.index()] = ta;
            p[b.index()] = tb;
            p[d] = lo[d];
            fluxes.right.set(p, 0.0);
            p[d] = hi[d];
            fluxes.left.set(p, 0.0);
        }
    }
}

/// `cc = right(p - e) + retained(p) + left(p + e)` over `region`. Neighbour
/// fluxes outside the flux box count as zero.
pub fn apply_fluxes(cc: &mut Field3, fluxes: &Fluxes, axis: Axis, region: IndexBox, clamp: bool) {
    assert!(
        fluxes.index_box().contains_box(&region),
        "update region outside flux box"
    );
    cc.update_in_box(region, |p, _| {
        let value = fluxes.right.get_or(axis.shift(p, -1), 0.0)
            + fluxes.retained.get(p)
            + fluxes.left.get_or(axis.shift(p, 1), 0.0);
        if clamp {
            value.clamp(0.0, 1.0)
        } else {
            value
        }
    });
}

/// Largest face CFL number of `vel` along `axis`.
pub fn max_face_cfl(vel: &Field3, dtdx: f64) -> f64 {
    vel.max_abs() * dtdx.abs()
}

/// One complete sweep: fluxes over `cc`'s box, closure on that box, update of
/// `region`.
#[allow(clippy::too_many_arguments)]
pub fn sweep<G>(
    cc: &mut Field3,
    vel: &Field3,
    dtdx: f64,
    axis: Axis,
    region: IndexBox,
    clamp: bool,
    geometry: &G,
    scratch: &mut Fluxes,
) where
    G: InterfaceGeometry + ?Sized,
{
    let bx = cc.index_box();
    if scratch.index_box() != bx {
        *scratch = Fluxes::new(bx);
    }
    compute_fluxes(scratch, cc, vel, dtdx, axis, geometry);
    close_boundary_fluxes(scratch, bx, axis);
    apply_fluxes(cc, scratch, axis, region, clamp);
}
