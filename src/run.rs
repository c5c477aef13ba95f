use eddy_fluids::scene::Scene;
use eddy_fluids::stam::{FluidGrid, FluidGridParams};
use eddy_io::encode::{EncodingError, FluidDataEncoder};
use glam::Vec2;
use indicatif::{ProgressBar, ProgressIterator, ProgressStyle};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::Args;

pub fn run(mut encoder: FluidDataEncoder, args: &Args) -> Result<(), EncodingError> {
    let n = args.resolution;

    let grid = FluidGrid::new(n, args.diffusion, args.viscosity, args.dt);
    let params = FluidGridParams {
        gravity: Vec2::new(0.0, args.gravity),
        source_velocity: Vec2::new(0.0, args.inflow),
        ..FluidGridParams::default()
    };
    let mut scene = Scene::new(grid, params);

    // A row of emitters near the top edge keeps the scene fed.
    for x in n / 4..3 * n / 4 {
        scene.fluid.set_source(x, 2, true);
    }

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    scatter_obstacles(&mut scene.fluid, &mut rng, args.obstacles);

    encoder.encode_metadata(&scene)?;

    let bar_template = "Running Simulation {spinner:.green} [{elapsed}] [{bar:50.white/white}] {pos}/{len} ({eta})";
    let style = ProgressStyle::with_template(bar_template).unwrap()
        .progress_chars("=> ").tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
    let progress = ProgressBar::new(args.frames).with_style(style);

    for frame in (0..args.frames).progress_with(progress) {
        // A dense burst dropped into the upper middle partway through.
        if frame == args.frames / 3 {
            let c = n / 2;
            scene.fluid.add_density(c, n / 6, 400.0);
            scene.fluid.add_velocity(c, n / 6, 0.0, 4.0);
        }

        scene.step();
        encoder.encode_frame(&scene)?;
    }

    Ok(())
}

/// Drops random obstacle clusters over the lower half of the grid, keeping
/// a two-cell margin from every edge. Grids smaller than 5 cells per side
/// have no room inside the margins and are left clear.
fn scatter_obstacles(grid: &mut FluidGrid, rng: &mut StdRng, count: usize) {
    let n = grid.size();
    if n < 5 {
        return;
    }

    for _ in 0..count {
        let x = rng.gen_range(2..n - 2);
        let y = rng.gen_range(n / 3..n - 2);
        grid.stamp_obstacle(x, y, 1, true);
    }
}
