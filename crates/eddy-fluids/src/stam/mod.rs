//! Stable-fluids solver on a square collocated grid, after Stam's
//! "Real-Time Fluid Dynamics for Games", extended with static obstacle
//! and emitter masks.

mod buffer;
mod grid;
mod solve;

pub use grid::{FlowSplit, FluidGrid, FluidGridParams, ObstaclePolicy, StencilWeight};

/// Boundary treatment applied to a field by the solver kernels.
///
/// A velocity component is negated across the wall whose normal is
/// parallel to it and copied across the perpendicular walls; scalars are
/// copied everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Scalar,
    VelX,
    VelY,
}
