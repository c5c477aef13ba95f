//! Numerical kernels shared by the pipeline stages: boundary
//! application, Gauss-Seidel relaxation, projection and semi-Lagrangian
//! advection.
//!
//! All kernels take the grid side `n` and flat `n * n` buffers indexed
//! `i + j * n`, and only ever update interior cells; the boundary ring is
//! rewritten by [`set_bnd`] at the end of every pass.

use super::grid::{ObstaclePolicy, StencilWeight};
use super::FieldKind;

/// Fills the edge rows/columns from their one-cell-inward neighbor,
/// negating the velocity component normal to the wall, then patches the
/// corners from their two adjacent edge cells.
pub(crate) fn set_bnd(n: usize, kind: FieldKind, x: &mut [f32]) {
    for i in 1..n - 1 {
        x[i] = if kind == FieldKind::VelY { -x[i + n] } else { x[i + n] };
        x[i + (n - 1) * n] = if kind == FieldKind::VelY {
            -x[i + (n - 2) * n]
        } else {
            x[i + (n - 2) * n]
        };
    }
    for j in 1..n - 1 {
        x[j * n] = if kind == FieldKind::VelX { -x[1 + j * n] } else { x[1 + j * n] };
        x[(n - 1) + j * n] = if kind == FieldKind::VelX {
            -x[(n - 2) + j * n]
        } else {
            x[(n - 2) + j * n]
        };
    }

    // Corners blend their two edge neighbors with a 0.33 coefficient
    // rather than an exact average.
    x[0] = 0.33 * (x[1] + x[n]);
    x[(n - 1) * n] = 0.33 * (x[1 + (n - 1) * n] + x[(n - 2) * n]);
    x[n - 1] = 0.33 * (x[n - 2] + x[2 * n - 1]);
    x[n * n - 1] = 0.33 * (x[(n - 2) * n + n - 1] + x[(n - 1) * n + n - 2]);
}

/// Solves `x = (x0 + a * sum(neighbors)) / c` by Gauss-Seidel sweeps,
/// reusing already-updated neighbor values within a sweep.
///
/// Solid cells are never updated; a solid neighbor of a fluid cell
/// contributes the fluid cell's own value instead, so nothing diffuses
/// into or out of obstacles.
#[allow(clippy::too_many_arguments)]
pub(crate) fn lin_solve(
    n: usize,
    kind: FieldKind,
    x: &mut [f32],
    x0: &[f32],
    a: f32,
    c: f32,
    obstacles: &[bool],
    iterations: usize,
    policy: ObstaclePolicy,
) {
    let c_recip = c.recip();

    for _ in 0..iterations {
        for j in 1..n - 1 {
            for i in 1..n - 1 {
                let idx = i + j * n;
                if obstacles[idx] {
                    continue;
                }

                let left = if obstacles[idx - 1] { x[idx] } else { x[idx - 1] };
                let right = if obstacles[idx + 1] { x[idx] } else { x[idx + 1] };
                let up = if obstacles[idx - n] { x[idx] } else { x[idx - n] };
                let down = if obstacles[idx + n] { x[idx] } else { x[idx + n] };

                x[idx] = (x0[idx] + a * (left + right + up + down)) * c_recip;
            }
        }

        if policy == ObstaclePolicy::Reflective {
            reflect_solids(n, kind, x, obstacles);
        }

        set_bnd(n, kind, x);
    }
}

/// Immersed-boundary treatment for the reflective obstacle policy: a
/// solid cell takes the sign-flipped half-sum of its fluid neighbors
/// along the component axis, so the interpolated velocity at the solid
/// face is close to zero.
fn reflect_solids(n: usize, kind: FieldKind, x: &mut [f32], obstacles: &[bool]) {
    for j in 1..n - 1 {
        for i in 1..n - 1 {
            let idx = i + j * n;
            if !obstacles[idx] {
                continue;
            }

            x[idx] = match kind {
                FieldKind::Scalar => 0.0,
                FieldKind::VelX => {
                    let left = if obstacles[idx - 1] { 0.0 } else { x[idx - 1] };
                    let right = if obstacles[idx + 1] { 0.0 } else { x[idx + 1] };
                    -0.5 * (left + right)
                }
                FieldKind::VelY => {
                    let up = if obstacles[idx - n] { 0.0 } else { x[idx - n] };
                    let down = if obstacles[idx + n] { 0.0 } else { x[idx + n] };
                    -0.5 * (up + down)
                }
            };
        }
    }
}

/// Implicit diffusion of `x0` into `x` at the given rate.
#[allow(clippy::too_many_arguments)]
pub(crate) fn diffuse(
    n: usize,
    kind: FieldKind,
    x: &mut [f32],
    x0: &[f32],
    rate: f32,
    dt: f32,
    stencil: StencilWeight,
    obstacles: &[bool],
    iterations: usize,
    policy: ObstaclePolicy,
) {
    let a = dt * rate * ((n - 2) as f32) * ((n - 2) as f32);
    lin_solve(
        n,
        kind,
        x,
        x0,
        a,
        1.0 + stencil.weight() * a,
        obstacles,
        iterations,
        policy,
    );
}

/// Removes divergence from `(vx, vy)` by solving a pressure Poisson
/// equation and subtracting its gradient.
///
/// Differences next to a solid cell substitute the center value for the
/// solid's, which zeroes the velocity gradient across the solid face.
#[allow(clippy::too_many_arguments)]
pub(crate) fn project(
    n: usize,
    vx: &mut [f32],
    vy: &mut [f32],
    pressure: &mut [f32],
    divergence: &mut [f32],
    obstacles: &[bool],
    iterations: usize,
    policy: ObstaclePolicy,
) {
    for j in 1..n - 1 {
        for i in 1..n - 1 {
            let idx = i + j * n;

            if obstacles[idx] {
                divergence[idx] = 0.0;
                pressure[idx] = 0.0;
                continue;
            }

            let vx_right = if obstacles[idx + 1] { vx[idx] } else { vx[idx + 1] };
            let vx_left = if obstacles[idx - 1] { vx[idx] } else { vx[idx - 1] };
            let vy_down = if obstacles[idx + n] { vy[idx] } else { vy[idx + n] };
            let vy_up = if obstacles[idx - n] { vy[idx] } else { vy[idx - n] };

            divergence[idx] = -0.5 * (vx_right - vx_left + vy_down - vy_up) / n as f32;
            pressure[idx] = 0.0;
        }
    }
    set_bnd(n, FieldKind::Scalar, divergence);
    set_bnd(n, FieldKind::Scalar, pressure);

    lin_solve(
        n,
        FieldKind::Scalar,
        pressure,
        divergence,
        1.0,
        4.0,
        obstacles,
        iterations,
        policy,
    );

    for j in 1..n - 1 {
        for i in 1..n - 1 {
            let idx = i + j * n;
            if obstacles[idx] {
                continue;
            }

            let p_right = if obstacles[idx + 1] { pressure[idx] } else { pressure[idx + 1] };
            let p_left = if obstacles[idx - 1] { pressure[idx] } else { pressure[idx - 1] };
            let p_down = if obstacles[idx + n] { pressure[idx] } else { pressure[idx + n] };
            let p_up = if obstacles[idx - n] { pressure[idx] } else { pressure[idx - n] };

            vx[idx] -= 0.5 * (p_right - p_left) * n as f32;
            vy[idx] -= 0.5 * (p_down - p_up) * n as f32;
        }
    }
    set_bnd(n, FieldKind::VelX, vx);
    set_bnd(n, FieldKind::VelY, vy);
}

/// Semi-Lagrangian transport: every fluid interior cell traces one
/// timestep backward along `(vx, vy)` and bilinearly samples `d0` at the
/// departure point.
#[allow(clippy::too_many_arguments)]
pub(crate) fn advect(
    n: usize,
    kind: FieldKind,
    d: &mut [f32],
    d0: &[f32],
    vx: &[f32],
    vy: &[f32],
    dt: f32,
    obstacles: &[bool],
) {
    let dt0 = dt * (n - 2) as f32;
    let max = (n - 2) as f32 + 0.5;

    for j in 1..n - 1 {
        for i in 1..n - 1 {
            let idx = i + j * n;

            if obstacles[idx] {
                d[idx] = 0.0;
                continue;
            }

            // Departure point, clamped to the sampleable interior.
            let x = (i as f32 - dt0 * vx[idx]).clamp(0.5, max);
            let y = (j as f32 - dt0 * vy[idx]).clamp(0.5, max);

            let i0 = x.floor() as usize;
            let i1 = i0 + 1;
            let j0 = y.floor() as usize;
            let j1 = j0 + 1;

            let s1 = x - i0 as f32;
            let s0 = 1.0 - s1;
            let t1 = y - j0 as f32;
            let t0 = 1.0 - t1;

            d[idx] = s0 * (t0 * d0[i0 + j0 * n] + t1 * d0[i0 + j1 * n])
                + s1 * (t0 * d0[i1 + j0 * n] + t1 * d0[i1 + j1 * n]);
        }
    }
    set_bnd(n, kind, d);
}

#[cfg(test)]
mod tests {
    use super::*;

    const N: usize = 6;

    fn uniform(v: f32) -> Vec<f32> {
        vec![v; N * N]
    }

    #[test]
    fn set_bnd_negates_normal_component_only() {
        let mut x = uniform(1.0);
        set_bnd(N, FieldKind::VelX, &mut x);

        for j in 1..N - 1 {
            assert_eq!(x[j * N], -1.0);
            assert_eq!(x[(N - 1) + j * N], -1.0);
        }
        for i in 1..N - 1 {
            assert_eq!(x[i], 1.0);
            assert_eq!(x[i + (N - 1) * N], 1.0);
        }
    }

    #[test]
    fn set_bnd_scalar_copies_everywhere() {
        let mut x = uniform(2.0);
        set_bnd(N, FieldKind::Scalar, &mut x);

        for j in 1..N - 1 {
            assert_eq!(x[j * N], 2.0);
            assert_eq!(x[(N - 1) + j * N], 2.0);
        }
        for i in 1..N - 1 {
            assert_eq!(x[i], 2.0);
            assert_eq!(x[i + (N - 1) * N], 2.0);
        }
    }

    #[test]
    fn set_bnd_corner_blend() {
        let mut x = uniform(0.0);
        x[1] = 3.0;
        x[N] = 1.0;
        set_bnd(N, FieldKind::Scalar, &mut x);

        // x[1] and x[N] are rewritten from their inward neighbors (both
        // zero) before the corner blend runs.
        assert_eq!(x[0], 0.0);

        let mut x = uniform(1.0);
        set_bnd(N, FieldKind::Scalar, &mut x);
        assert!((x[0] - 0.66).abs() < 1e-6);
    }

    #[test]
    fn lin_solve_leaves_solid_cells_untouched() {
        let mut obstacles = vec![false; N * N];
        let solid = 2 + 2 * N;
        obstacles[solid] = true;

        let x0 = uniform(1.0);
        let mut x = uniform(0.0);
        x[solid] = 7.0;

        lin_solve(
            N,
            FieldKind::Scalar,
            &mut x,
            &x0,
            1.0,
            5.0,
            &obstacles,
            10,
            ObstaclePolicy::HardClear,
        );

        assert_eq!(x[solid], 7.0);
        for (idx, &v) in x.iter().enumerate() {
            if idx != solid {
                assert!(v.is_finite());
            }
        }
    }

    #[test]
    fn lin_solve_preserves_uniform_state_next_to_solids() {
        let mut obstacles = vec![false; N * N];
        obstacles[3 + 3 * N] = true;

        // With c = 1 + 4a, a uniform field is a fixed point only if solid
        // neighbors contribute the cell's own value.
        let x0 = uniform(1.0);
        let mut x = uniform(1.0);
        x[3 + 3 * N] = 0.0;

        lin_solve(
            N,
            FieldKind::Scalar,
            &mut x,
            &x0,
            0.25,
            2.0,
            &obstacles,
            20,
            ObstaclePolicy::HardClear,
        );

        for j in 1..N - 1 {
            for i in 1..N - 1 {
                let idx = i + j * N;
                if !obstacles[idx] {
                    assert!((x[idx] - 1.0).abs() < 1e-4, "cell ({i},{j}) drifted to {}", x[idx]);
                }
            }
        }
    }

    #[test]
    fn reflective_policy_flips_sign_into_solids() {
        let mut obstacles = vec![false; N * N];
        let solid = 3 + 3 * N;
        obstacles[solid] = true;

        // a = 0, c = 1 pins every fluid cell at its x0 value, so the
        // sweep leaves known neighbors for the reflection pass.
        let mut x0 = uniform(0.0);
        x0[solid - 1] = 2.0;
        x0[solid + 1] = 4.0;
        let mut x = uniform(0.0);

        lin_solve(
            N,
            FieldKind::VelX,
            &mut x,
            &x0,
            0.0,
            1.0,
            &obstacles,
            1,
            ObstaclePolicy::Reflective,
        );

        assert_eq!(x[solid], -3.0);

        let mut x = uniform(1.0);
        lin_solve(
            N,
            FieldKind::Scalar,
            &mut x,
            &uniform(1.0),
            0.0,
            1.0,
            &obstacles,
            1,
            ObstaclePolicy::Reflective,
        );
        assert_eq!(x[solid], 0.0);
    }

    #[test]
    fn advect_zero_velocity_is_identity_in_the_interior() {
        let mut d0 = uniform(0.0);
        d0[2 + 2 * N] = 5.0;

        let v = uniform(0.0);
        let obstacles = vec![false; N * N];
        let mut d = uniform(0.0);

        advect(N, FieldKind::Scalar, &mut d, &d0, &v, &v, 0.1, &obstacles);

        assert_eq!(d[2 + 2 * N], 5.0);
        let total: f32 = d.iter().sum();
        assert!((total - 5.0).abs() < 1e-6);
    }
}
