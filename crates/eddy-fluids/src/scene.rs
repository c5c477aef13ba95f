use super::Fluid;

/// A fluid paired with the parameter set used to step it.
///
/// The hosting layer holds one scene per simulation it runs and turns
/// knobs through [`Scene::params_mut`] between steps.
pub struct Scene<F: Fluid> {
    /// The fluid for this scene.
    pub fluid: F,
    /// The parameters for this scene's fluid.
    params: F::Params,
}

impl<F: Fluid> Scene<F> {
    #[inline(always)]
    pub fn new(fluid: F, params: F::Params) -> Self {
        Self { fluid, params }
    }

    #[inline(always)]
    pub fn size(&self) -> usize {
        self.fluid.size()
    }

    #[inline(always)]
    pub fn params(&self) -> &F::Params {
        &self.params
    }

    #[inline(always)]
    pub fn params_mut(&mut self) -> &mut F::Params {
        &mut self.params
    }

    pub fn step(&mut self) {
        self.fluid.step(&self.params);
    }
}
