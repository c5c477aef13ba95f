use std::io::Write;

use encode::{EncodingError, FluidFrameEncoder};
use glam::Vec2;

use eddy_fluids::stam::FluidGrid;

pub mod as_bytes;
pub mod decode;
pub mod encode;

/// Serializes a fluid's per-frame state through a [`FluidFrameEncoder`].
pub trait EncodeFluid {
    fn encode_state<W: Write>(&self, encoder: &mut FluidFrameEncoder<W>) -> Result<(), EncodingError>;
}

impl EncodeFluid for FluidGrid {
    fn encode_state<W: Write>(&self, encoder: &mut FluidFrameEncoder<W>) -> Result<(), EncodingError> {
        let cells = self.size() * self.size();

        encoder.encode_section(cells, self.density().iter().copied())?;
        encoder.encode_section(
            cells,
            self.vx().iter().zip(self.vy()).map(|(&x, &y)| Vec2::new(x, y)),
        )?;
        encoder.encode_section(cells, self.obstacles().iter().map(|&s| s as u8))?;
        encoder.encode_section(cells, self.sources().iter().map(|&s| s as u8))?;

        Ok(())
    }
}
