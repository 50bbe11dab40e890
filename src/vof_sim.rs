use crate::advection::{max_face_cfl, sweep, Fluxes};
use crate::field::Field3;
use crate::grid::{Axis, Grid3, IndexBox};
use crate::mac::MacVelocity3;
use crate::reconstruction::InterfaceGeometry;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SweepOrder {
    Xyz,
    /// Cycles xyz, yzx, zxy over successive steps.
    Alternating,
}

impl SweepOrder {
    pub fn axes(self, step: usize) -> [Axis; 3] {
        match self {
            SweepOrder::Xyz => [Axis::X, Axis::Y, Axis::Z],
            SweepOrder::Alternating => {
                let first = step % 3;
                [0, 1, 2].map(|offset| Axis::ALL[(first + offset) % 3])
            }
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct VofParams {
    pub dt: f64,
    pub clamp_volume_fraction: bool,
    pub order: SweepOrder,
}

#[derive(Clone, Debug)]
pub struct VofState {
    pub grid: Grid3,
    pub fraction: Field3,
    pub velocity: MacVelocity3,
    pub time: f64,
    pub step: usize,
}

impl VofState {
    /// `fraction` and `velocity` must cover the grid's cells plus ghost layer.
    pub fn new(grid: Grid3, fraction: Field3, velocity: MacVelocity3) -> Self {
        assert_eq!(fraction.index_box(), grid.ghost_box(), "fraction box mismatch");
        assert_eq!(velocity.cells(), grid.ghost_box(), "velocity box mismatch");
        Self {
            grid,
            fraction,
            velocity,
            time: 0.0,
            step: 0,
        }
    }

    pub fn volume(&self) -> f64 {
        total_volume(&self.fraction, &self.grid)
    }

    pub fn fraction_range(&self) -> (f64, f64) {
        self.fraction.min_max_over(self.grid.cell_box())
    }
}

#[derive(Clone, Debug)]
pub struct VofWorkspace {
    fluxes: Fluxes,
}

impl VofWorkspace {
    pub fn new(grid: Grid3) -> Self {
        Self {
            fluxes: Fluxes::new(grid.ghost_box()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct StepReport {
    pub step: usize,
    pub time: f64,
    pub volume_before: f64,
    pub volume_after: f64,
    pub min_fraction: f64,
    pub max_fraction: f64,
    pub max_cfl: f64,
}

impl StepReport {
    pub fn volume_drift(&self) -> f64 {
        self.volume_after - self.volume_before
    }
}

/// Copies the nearest valid value into every ghost cell.
pub fn fill_ghost_cells(fraction: &mut Field3, valid: IndexBox) {
    let bx = fraction.index_box();
    let ghosts: Vec<([i32; 3], f64)> = bx
        .cells()
        .filter(|p| !valid.contains(*p))
        .map(|p| (p, fraction.get(valid.clamp(p))))
        .collect();
    for (p, value) in ghosts {
        fraction.set(p, value);
    }
}

pub fn total_volume(fraction: &Field3, grid: &Grid3) -> f64 {
    fraction.sum_over(grid.cell_box()) * grid.cell_volume()
}

/// L1 distance between two fraction fields over the valid cells, as a volume.
pub fn shape_error(a: &Field3, b: &Field3, grid: &Grid3) -> f64 {
    a.abs_diff_sum_over(b, grid.cell_box()) * grid.cell_volume()
}

/// End-of-run comparison against the initial fraction field.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct VolumeSummary {
    pub steps: usize,
    pub time: f64,
    pub initial_volume: f64,
    pub final_volume: f64,
    pub relative_drift: f64,
    pub shape_error: f64,
    pub min_fraction: f64,
    pub max_fraction: f64,
    pub max_cfl: f64,
}

impl VolumeSummary {
    pub fn new(initial: &Field3, state: &VofState, max_cfl: f64) -> Self {
        let initial_volume = total_volume(initial, &state.grid);
        let final_volume = state.volume();
        let relative_drift = if initial_volume > 0.0 {
            (final_volume - initial_volume) / initial_volume
        } else {
            0.0
        };
        let (min_fraction, max_fraction) = state.fraction_range();
        Self {
            steps: state.step,
            time: state.time,
            initial_volume,
            final_volume,
            relative_drift,
            shape_error: shape_error(&state.fraction, initial, &state.grid),
            min_fraction,
            max_fraction,
            max_cfl,
        }
    }
}

/// Advances the volume fraction by `params.dt` with three directional sweeps.
/// The velocity in `state` is used as is for all three sweeps.
pub fn split_step<G>(
    state: &mut VofState,
    params: VofParams,
    geometry: &G,
    workspace: &mut VofWorkspace,
) -> StepReport
where
    G: InterfaceGeometry + ?Sized,
{
    let grid = state.grid;
    let valid = grid.cell_box();
    let volume_before = state.volume();
    let mut max_cfl = 0.0_f64;
    for axis in params.order.axes(state.step) {
        fill_ghost_cells(&mut state.fraction, valid);
        let dtdx = grid.dtdx(axis, params.dt);
        let vel = state.velocity.component(axis);
        let cfl = max_face_cfl(vel, dtdx);
        if cfl >= 1.0 {
            warn!(?axis, cfl, "face CFL number reaches one; sweep is outside its stable range");
        }
        max_cfl = max_cfl.max(cfl);
        sweep(
            &mut state.fraction,
            vel,
            dtdx,
            axis,
            valid,
            params.clamp_volume_fraction,
            geometry,
            &mut workspace.fluxes,
        );
    }
    fill_ghost_cells(&mut state.fraction, valid);
    state.time += params.dt;
    state.step += 1;
    let (min_fraction, max_fraction) = state.fraction_range();
    let report = StepReport {
        step: state.step,
        time: state.time,
        volume_before,
        volume_after: state.volume(),
        min_fraction,
        max_fraction,
        max_cfl,
    };
    debug!(
        step = report.step,
        time = report.time,
        drift = report.volume_drift(),
        min = min_fraction,
        max = max_fraction,
        "split step"
    );
    report
}
