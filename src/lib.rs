mod advection;
mod config;
mod error;
mod field;
mod grid;
mod init;
mod mac;
mod reconstruction;
mod velocity;
mod vof_sim;

pub use advection::{
    apply_fluxes, cell_fluxes, close_boundary_fluxes, compute_fluxes, lagrangian_plane,
    max_face_cfl, plane_fluxes, sweep, FaceCfl, FluxTriple, Fluxes, VOF_EPS,
};
pub use config::SimConfig;
pub use error::ConfigError;
pub use field::{map_cells, Field3};
pub use grid::{Axis, Grid3, IndexBox, GHOST_LAYERS};
pub use init::{planar_fraction, slab_fraction, sphere_fraction};
pub use mac::MacVelocity3;
pub use reconstruction::{
    fold_normal, plane_alpha, plane_volume, reconstruct_plane, slab_volume, AnalyticIntercept,
    AnalyticSlab, FoldedNormal, InterceptSolver, InterfaceGeometry, NormalEstimator, Plane, Plic,
    Reconstruction, SlabVolume, Stencil, YoungsNormal,
};
pub use velocity::{
    face_velocity_x, face_velocity_y, face_velocity_z, fill_face_velocity, ProblemType,
    DEFORMATION_PERIOD,
};
pub use vof_sim::{
    fill_ghost_cells, shape_error, split_step, total_volume, StepReport, SweepOrder, VofParams,
    VofState, VofWorkspace, VolumeSummary,
};
