use crate::field::Field3;
use crate::grid::{Axis, Grid3, IndexBox};

/// Volume fraction of a sphere, estimated per cell from `samples³` sub-cell
/// points. Cells entirely inside or outside skip the sampling.
pub fn sphere_fraction(grid: &Grid3, bx: IndexBox, center: [f64; 3], radius: f64, samples: usize) -> Field3 {
    assert!(samples > 0, "samples must be > 0");
    let dx = grid.dx();
    let half_diag = 0.5 * (dx[0] * dx[0] + dx[1] * dx[1] + dx[2] * dx[2]).sqrt();
    Field3::from_fn(bx, |p| {
        let c = grid.cell_center(p);
        let dist = distance(c, center);
        if dist + half_diag <= radius {
            return 1.0;
        }
        if dist - half_diag >= radius {
            return 0.0;
        }
        let step = 1.0 / samples as f64;
        let mut inside = 0usize;
        for a in 0..samples {
            for b in 0..samples {
                for e in 0..samples {
                    let q = [
                        c[0] + dx[0] * ((a as f64 + 0.5) * step - 0.5),
                        c[1] + dx[1] * ((b as f64 + 0.5) * step - 0.5),
                        c[2] + dx[2] * ((e as f64 + 0.5) * step - 0.5),
                    ];
                    if distance(q, center) <= radius {
                        inside += 1;
                    }
                }
            }
        }
        inside as f64 / (samples * samples * samples) as f64
    })
}

/// Exact fraction of material below `position` along `axis`, with `position`
/// in cell-index units (cell `i` spans `[i, i + 1]`).
pub fn planar_fraction(bx: IndexBox, axis: Axis, position: f64) -> Field3 {
    Field3::from_fn(bx, |p| {
        let lo = p[axis.index()] as f64;
        (position - lo).clamp(0.0, 1.0)
    })
}

/// Material slab `[from, to]` along `axis`, in cell-index units.
pub fn slab_fraction(bx: IndexBox, axis: Axis, from: f64, to: f64) -> Field3 {
    Field3::from_fn(bx, |p| {
        let lo = p[axis.index()] as f64;
        let hi = lo + 1.0;
        (to.min(hi) - from.max(lo)).max(0.0)
    })
}

fn distance(a: [f64; 3], b: [f64; 3]) -> f64 {
    ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)).sqrt()
}
