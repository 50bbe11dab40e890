//! Analytic face velocities for benchmark flows.
//!
//! The deformation flow is the 3D time-reversed vortex test: two counter-rotating
//! lobes whose amplitude follows `cos(π t / T)`, so the interface returns to its
//! initial shape at `t = T`.

use crate::error::ConfigError;
use crate::grid::{Axis, Grid3};
use crate::mac::MacVelocity3;
use std::f64::consts::PI;

pub const DEFORMATION_PERIOD: f64 = 3.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProblemType {
    Deformation,
}

impl ProblemType {
    pub fn selector(self) -> i32 {
        match self {
            ProblemType::Deformation => 1,
        }
    }
}

impl TryFrom<i32> for ProblemType {
    type Error = ConfigError;

    fn try_from(selector: i32) -> Result<Self, Self::Error> {
        match selector {
            1 => Ok(ProblemType::Deformation),
            other => Err(ConfigError::UnsupportedProblem(other)),
        }
    }
}

fn envelope(time: f64) -> f64 {
    (PI * time / DEFORMATION_PERIOD).cos()
}

fn face_position(p: [i32; 3], axis: Axis, prob_lo: [f64; 3], dx: [f64; 3]) -> [f64; 3] {
    let mut pos = [0.0; 3];
    for d in 0..3 {
        let offset = if d == axis.index() { 0.0 } else { 0.5 };
        pos[d] = prob_lo[d] + dx[d] * (p[d] as f64 + offset);
    }
    pos
}

pub fn face_velocity_x(
    p: [i32; 3],
    prob_lo: [f64; 3],
    dx: [f64; 3],
    time: f64,
    problem: ProblemType,
) -> f64 {
    match problem {
        ProblemType::Deformation => {
            let [x, y, z] = face_position(p, Axis::X, prob_lo, dx);
            2.0 * (PI * x).sin().powi(2) * (2.0 * PI * y).sin() * (2.0 * PI * z).sin() * envelope(time)
        }
    }
}

pub fn face_velocity_y(
    p: [i32; 3],
    prob_lo: [f64; 3],
    dx: [f64; 3],
    time: f64,
    problem: ProblemType,
) -> f64 {
    match problem {
        ProblemType::Deformation => {
            let [x, y, z] = face_position(p, Axis::Y, prob_lo, dx);
            -(PI * y).sin().powi(2) * (2.0 * PI * z).sin() * (2.0 * PI * x).sin() * envelope(time)
        }
    }
}

pub fn face_velocity_z(
    p: [i32; 3],
    prob_lo: [f64; 3],
    dx: [f64; 3],
    time: f64,
    problem: ProblemType,
) -> f64 {
    match problem {
        ProblemType::Deformation => {
            let [x, y, z] = face_position(p, Axis::Z, prob_lo, dx);
            -(PI * z).sin().powi(2) * (2.0 * PI * x).sin() * (2.0 * PI * y).sin() * envelope(time)
        }
    }
}

/// Writes the prescribed flow at `time` into every face of `velocity`.
pub fn fill_face_velocity(velocity: &mut MacVelocity3, grid: &Grid3, time: f64, problem: ProblemType) {
    let (prob_lo, dx) = (grid.origin(), grid.dx());
    velocity
        .component_mut(Axis::X)
        .fill_with_index(|p| face_velocity_x(p, prob_lo, dx, time, problem));
    velocity
        .component_mut(Axis::Y)
        .fill_with_index(|p| face_velocity_y(p, prob_lo, dx, time, problem));
    velocity
        .component_mut(Axis::Z)
        .fill_with_index(|p| face_velocity_z(p, prob_lo, dx, time, problem));
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
    fn unknown_selector_is_rejected() {
        assert!(matches!(
            ProblemType::try_from(0),
            Err(ConfigError::UnsupportedProblem(0))
        ));
        assert!(ProblemType::try_from(7).is_err());
        assert_eq!(ProblemType::try_from(1).ok(), Some(ProblemType::Deformation));
        assert_eq!(ProblemType::Deformation.selector(), 1);
    }

    #[test]
    fn x_velocity_is_sampled_on_the_face() {
        let dx = [0.25; 3];
        // Face i = 2 sits at x = 0.5, cell centres j = k = 0 at 0.125.
        let u = face_velocity_x([2, 0, 0], [0.0; 3], dx, 0.0, ProblemType::Deformation);
        let expected = 2.0 * (2.0 * PI * 0.125).sin().powi(2);
        assert_close(u, expected, 1e-14);
        let u0 = face_velocity_x([0, 1, 1], [0.0; 3], dx, 0.0, ProblemType::Deformation);
        assert_close(u0, 0.0, 1e-14);
    }

    #[test]
    fn flow_vanishes_on_domain_walls() {
        let n = 8;
        let dx = [1.0 / n as f64; 3];
        for a in 0..n {
            for b in 0..n {
                let problem = ProblemType::Deformation;
                assert_close(face_velocity_x([0, a, b], [0.0; 3], dx, 0.2, problem), 0.0, 1e-14);
                assert_close(face_velocity_x([n, a, b], [0.0; 3], dx, 0.2, problem), 0.0, 1e-14);
                assert_close(face_velocity_y([a, 0, b], [0.0; 3], dx, 0.2, problem), 0.0, 1e-14);
                assert_close(face_velocity_z([a, b, n], [0.0; 3], dx, 0.2, problem), 0.0, 1e-14);
            }
        }
    }

    #[test]
    fn flow_reverses_after_half_period() {
        let dx = [0.1; 3];
        let p = [3, 4, 6];
        let problem = ProblemType::Deformation;
        let early = face_velocity_z(p, [0.0; 3], dx, 0.5, problem);
        let late = face_velocity_z(p, [0.0; 3], dx, DEFORMATION_PERIOD - 0.5, problem);
        assert_close(early, -late, 1e-14);
        assert_close(face_velocity_y(p, [0.0; 3], dx, 1.5, problem), 0.0, 1e-14);
    }

    #[test]
    fn filled_flow_is_discretely_divergence_free() {
        let grid = Grid3::with_length([8, 8, 8], [1.0; 3], [0.0; 3]);
        let mut velocity = MacVelocity3::new(grid.cell_box(), [0.0; 3]);
        fill_face_velocity(&mut velocity, &grid, 0.0, ProblemType::Deformation);
        let max_div = grid
            .cell_box()
            .cells()
            .map(|p| velocity.divergence(p).abs())
            .fold(0.0, f64::max);
        assert!(max_div < 1e-12, "max divergence {max_div}");
        assert!(velocity.max_abs() > 0.5);
    }
}
