//! Encode/decode round-trip through the on-disk frame format.

use std::{env, fs};

use eddy_fluids::scene::Scene;
use eddy_fluids::stam::{FluidGrid, FluidGridParams};
use eddy_io::decode::FluidDataDecoder;
use eddy_io::encode::FluidDataEncoder;

#[test]
fn single_frame_roundtrip() {
    let dir = env::temp_dir().join(format!("eddy-io-roundtrip-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);

    let n = 8;
    let mut grid = FluidGrid::new(n, 0.0, 0.0, 0.1);
    grid.add_density(3, 4, 25.0);
    grid.add_velocity(3, 4, 1.0, -2.0);
    grid.set_obstacle(5, 5, true);
    grid.set_source(2, 2, true);

    let scene = Scene::new(grid, FluidGridParams::default());

    let mut encoder = FluidDataEncoder::new(dir.clone(), 1, 30).unwrap();
    encoder.encode_metadata(&scene).unwrap();
    encoder.encode_frame(&scene).unwrap();

    let mut decoder = FluidDataDecoder::new(dir.clone());
    let meta = decoder.decode_metadata().unwrap();
    assert_eq!(meta.size, n as u32);
    assert_eq!(meta.num_frames, 1);
    assert_eq!(meta.fps, 30);

    let frame = decoder.decode_frame().unwrap().unwrap();
    let idx = 3 + 4 * n;
    assert_eq!(frame.density.get::<1>(idx), [25.0]);
    assert_eq!(frame.velocity.get::<2>(idx), [1.0, -2.0]);
    assert_eq!(frame.obstacles[5 + 5 * n], 1);
    assert_eq!(frame.sources[2 + 2 * n], 1);

    assert!(decoder.decode_frame().unwrap().is_none());

    let _ = fs::remove_dir_all(dir);
}
