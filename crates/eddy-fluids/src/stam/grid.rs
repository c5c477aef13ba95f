use glam::Vec2;
use ndarray::azip;

use crate::Fluid;

use super::buffer::FieldPair;
use super::{solve, FieldKind};

/// What happens to field values inside solid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstaclePolicy {
    /// Solids are zeroed after the pipeline; relaxation only applies the
    /// zero-gradient neighbor substitution.
    HardClear,
    /// Solids additionally mirror adjacent fluid values with a sign flip
    /// during every relaxation sweep. Hard clearing still runs at the end
    /// of the step.
    Reflective,
}

/// Normalization weight for the implicit diffusion solve, `c = 1 + w * a`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StencilWeight {
    /// Exact weight for the 4-connected stencil.
    Four,
    /// Over-weighted normalization; trades a little extra damping for a
    /// larger stability margin.
    Six,
}

impl StencilWeight {
    #[inline]
    pub fn weight(self) -> f32 {
        match self {
            StencilWeight::Four => 4.0,
            StencilWeight::Six => 6.0,
        }
    }
}

/// Redirection of downward flow blocked by a solid cell below: part of
/// the blocked momentum leaks into the side cells instead of stopping
/// dead, so plumes wash around obstacles.
///
/// The constants are tuned for looks, not derived; the only guarantee is
/// that the redirected momentum never exceeds what was removed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowSplit {
    /// Fraction of the blocked downward velocity that survives.
    pub damping: f32,
    /// Fraction of half the blocked velocity pushed into each open side
    /// cell.
    pub spread: f32,
}

impl Default for FlowSplit {
    fn default() -> Self {
        Self {
            damping: 0.3,
            spread: 0.3,
        }
    }
}

/// Per-step tunables for [`FluidGrid`].
#[derive(Debug, Clone)]
pub struct FluidGridParams {
    /// Constant acceleration applied to cells carrying density.
    pub gravity: Vec2,
    /// Gauss-Seidel sweeps per linear solve.
    pub iterations: usize,
    pub stencil_weight: StencilWeight,
    pub obstacle_policy: ObstaclePolicy,
    /// `None` disables the redirection heuristic entirely.
    pub flow_split: Option<FlowSplit>,
    /// Density injected at every active source cell, per step.
    pub source_flow: f32,
    /// Velocity injected at every active source cell, per step.
    pub source_velocity: Vec2,
}

impl Default for FluidGridParams {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, 0.15),
            iterations: 20,
            stencil_weight: StencilWeight::Six,
            obstacle_policy: ObstaclePolicy::HardClear,
            flow_split: Some(FlowSplit::default()),
            source_flow: 150.0,
            source_velocity: Vec2::new(0.0, 1.5),
        }
    }
}

/// A 2-D incompressible fluid on a square collocated grid, carrying a
/// passive density field, with static solid obstacles and persistent
/// emitter cells.
///
/// Cells are indexed `i + j * n` with `i` horizontal and `j` growing
/// downward; the outer ring holds boundary values and is never edited
/// directly. Resolution and the `dt`/`diff`/`visc` constants are fixed
/// for the lifetime of the grid.
#[derive(Debug, Clone)]
pub struct FluidGrid {
    /// Side length of the grid, in cells.
    n: usize,
    /// Timestep advanced by each call to `step`.
    dt: f32,
    /// Density diffusion rate.
    diff: f32,
    /// Kinematic viscosity.
    visc: f32,

    /// Passive density carried by the flow.
    density: FieldPair,
    /// Velocity in the X direction.
    u: FieldPair,
    /// Velocity in the Y direction.
    v: FieldPair,
    /// Projection scratch: pressure guess.
    pressure: Vec<f32>,
    /// Projection scratch: velocity divergence.
    divergence: Vec<f32>,

    /// Solid grid cells.
    obstacles: Vec<bool>,
    /// Emitter grid cells.
    sources: Vec<bool>,
}

impl FluidGrid {
    pub fn new(size: usize, diffusion: f32, viscosity: f32, dt: f32) -> Self {
        assert!(size >= 3, "grid needs at least one interior cell");
        let cells = size * size;

        Self {
            n: size,
            dt,
            diff: diffusion,
            visc: viscosity,
            density: FieldPair::new(cells),
            u: FieldPair::new(cells),
            v: FieldPair::new(cells),
            pressure: vec![0.0; cells],
            divergence: vec![0.0; cells],
            obstacles: vec![false; cells],
            sources: vec![false; cells],
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.n
    }

    #[inline]
    fn idx(&self, i: usize, j: usize) -> usize {
        i + j * self.n
    }

    #[inline]
    fn in_interior(&self, x: usize, y: usize) -> bool {
        x >= 1 && x < self.n - 1 && y >= 1 && y < self.n - 1
    }

    /// Adds density at a cell. Out-of-range coordinates and solid cells
    /// are ignored.
    pub fn add_density(&mut self, x: usize, y: usize, amount: f32) {
        if x >= self.n || y >= self.n {
            return;
        }
        let idx = self.idx(x, y);
        if !self.obstacles[idx] {
            self.density.cur[idx] += amount;
        }
    }

    /// Adds velocity at a cell. Out-of-range coordinates and solid cells
    /// are ignored.
    pub fn add_velocity(&mut self, x: usize, y: usize, dx: f32, dy: f32) {
        if x >= self.n || y >= self.n {
            return;
        }
        let idx = self.idx(x, y);
        if !self.obstacles[idx] {
            self.u.cur[idx] += dx;
            self.v.cur[idx] += dy;
        }
    }

    /// Marks a cell solid (or clears it). Only interior cells can be
    /// edited; the boundary ring belongs to the wall treatment. Field
    /// values inside a fresh solid are cleared lazily by the next step.
    pub fn set_obstacle(&mut self, x: usize, y: usize, active: bool) {
        if !self.in_interior(x, y) {
            return;
        }
        let idx = self.idx(x, y);
        self.obstacles[idx] = active;
    }

    /// Marks a cell as a persistent emitter. Interior-only; activating a
    /// source evicts any obstacle at the same cell.
    pub fn set_source(&mut self, x: usize, y: usize, active: bool) {
        if !self.in_interior(x, y) {
            return;
        }
        let idx = self.idx(x, y);
        self.sources[idx] = active;
        if active {
            self.obstacles[idx] = false;
        }
    }

    /// Square obstacle brush of half-width `radius` centered on `(x, y)`,
    /// clipped to the interior.
    pub fn stamp_obstacle(&mut self, x: usize, y: usize, radius: usize, active: bool) {
        let r = radius as isize;
        for dy in -r..=r {
            for dx in -r..=r {
                let px = x as isize + dx;
                let py = y as isize + dy;
                if px >= 0 && py >= 0 {
                    self.set_obstacle(px as usize, py as usize, active);
                }
            }
        }
    }

    /// Zeroes density and velocity everywhere, both buffer slots.
    pub fn clear_fluid(&mut self) {
        self.density.fill(0.0);
        self.u.fill(0.0);
        self.v.fill(0.0);
    }

    pub fn clear_obstacles(&mut self) {
        self.obstacles.fill(false);
    }

    pub fn clear_sources(&mut self) {
        self.sources.fill(false);
    }

    /// Injection hook for the source mask: every active source cell not
    /// blocked by an obstacle receives `flow` density and `velocity`.
    ///
    /// `step` drives this from the params once per frame; hosts can call
    /// it again for extra emission.
    pub fn apply_sources(&mut self, flow: f32, velocity: Vec2) {
        azip!((
            d in &mut self.density.cur[..],
            vx in &mut self.u.cur[..],
            vy in &mut self.v.cur[..],
            &src in &self.sources[..],
            &solid in &self.obstacles[..])
        {
            if src && !solid {
                *d += flow;
                *vx += velocity.x;
                *vy += velocity.y;
            }
        });
    }

    /// Accelerates cells in proportion to the density they carry, so
    /// empty cells stay still.
    fn apply_forces(&mut self, gravity: Vec2) {
        if gravity == Vec2::ZERO {
            return;
        }

        azip!((
            vx in &mut self.u.cur[..],
            vy in &mut self.v.cur[..],
            &d in &self.density.cur[..],
            &solid in &self.obstacles[..])
        {
            if !solid && d > 0.001 {
                let scale = d.min(1.0);
                *vx += gravity.x * scale;
                *vy += gravity.y * scale;
            }
        });
    }

    /// Final obstacle pass: solids end the step with zero density and
    /// velocity in both buffer slots, and blocked downward flow is
    /// optionally redirected around the solid below it.
    fn enforce_obstacles(&mut self, params: &FluidGridParams) {
        let n = self.n;

        for j in 1..n - 1 {
            for i in 1..n - 1 {
                let idx = i + j * n;

                if self.obstacles[idx] {
                    self.density.cur[idx] = 0.0;
                    self.density.prev[idx] = 0.0;
                    self.u.cur[idx] = 0.0;
                    self.u.prev[idx] = 0.0;
                    self.v.cur[idx] = 0.0;
                    self.v.prev[idx] = 0.0;
                    continue;
                }

                let Some(split) = params.flow_split else {
                    continue;
                };

                if self.obstacles[idx + n] && self.v.cur[idx] > 0.0 {
                    let side = 0.5 * self.v.cur[idx] * split.spread;
                    self.v.cur[idx] *= split.damping;

                    if !self.obstacles[idx - 1] {
                        self.u.cur[idx - 1] += side;
                    }
                    if !self.obstacles[idx + 1] {
                        self.u.cur[idx + 1] -= side;
                    }
                }
            }
        }
    }

    /// Density field, current slot.
    #[inline]
    pub fn density(&self) -> &[f32] {
        &self.density.cur
    }

    /// X velocity, current slot.
    #[inline]
    pub fn vx(&self) -> &[f32] {
        &self.u.cur
    }

    /// Y velocity, current slot.
    #[inline]
    pub fn vy(&self) -> &[f32] {
        &self.v.cur
    }

    #[inline]
    pub fn obstacles(&self) -> &[bool] {
        &self.obstacles
    }

    #[inline]
    pub fn sources(&self) -> &[bool] {
        &self.sources
    }
}

impl Fluid for FluidGrid {
    type Params = FluidGridParams;

    fn step(&mut self, params: &FluidGridParams) {
        let n = self.n;
        let dt = self.dt;

        self.apply_sources(params.source_flow, params.source_velocity);
        self.apply_forces(params.gravity);

        // Velocity diffusion; the previous slots keep the pre-diffusion
        // field as the implicit solve's source term.
        self.u.swap();
        self.v.swap();
        solve::diffuse(
            n,
            FieldKind::VelX,
            &mut self.u.cur,
            &self.u.prev,
            self.visc,
            dt,
            params.stencil_weight,
            &self.obstacles,
            params.iterations,
            params.obstacle_policy,
        );
        solve::diffuse(
            n,
            FieldKind::VelY,
            &mut self.v.cur,
            &self.v.prev,
            self.visc,
            dt,
            params.stencil_weight,
            &self.obstacles,
            params.iterations,
            params.obstacle_policy,
        );

        solve::project(
            n,
            &mut self.u.cur,
            &mut self.v.cur,
            &mut self.pressure,
            &mut self.divergence,
            &self.obstacles,
            params.iterations,
            params.obstacle_policy,
        );

        // Self-advection must trace through the projected field, so the
        // projected values move to the previous slots before being
        // overwritten.
        self.u.swap();
        self.v.swap();
        solve::advect(
            n,
            FieldKind::VelX,
            &mut self.u.cur,
            &self.u.prev,
            &self.u.prev,
            &self.v.prev,
            dt,
            &self.obstacles,
        );
        solve::advect(
            n,
            FieldKind::VelY,
            &mut self.v.cur,
            &self.v.prev,
            &self.u.prev,
            &self.v.prev,
            dt,
            &self.obstacles,
        );

        // Interpolation reintroduces a little divergence; project again
        // so density is carried by a near-incompressible field.
        solve::project(
            n,
            &mut self.u.cur,
            &mut self.v.cur,
            &mut self.pressure,
            &mut self.divergence,
            &self.obstacles,
            params.iterations,
            params.obstacle_policy,
        );

        self.density.swap();
        solve::diffuse(
            n,
            FieldKind::Scalar,
            &mut self.density.cur,
            &self.density.prev,
            self.diff,
            dt,
            params.stencil_weight,
            &self.obstacles,
            params.iterations,
            params.obstacle_policy,
        );
        self.density.swap();
        solve::advect(
            n,
            FieldKind::Scalar,
            &mut self.density.cur,
            &self.density.prev,
            &self.u.cur,
            &self.v.cur,
            dt,
            &self.obstacles,
        );

        self.enforce_obstacles(params);
    }

    fn size(&self) -> usize {
        self.n
    }
}
