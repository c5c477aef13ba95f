pub mod scene;
pub mod stam;

/// A grid-based fluid stepped once per frame.
pub trait Fluid {
    type Params;

    fn step(&mut self, params: &Self::Params);

    /// Side length of the simulation grid, in cells.
    fn size(&self) -> usize;
}
