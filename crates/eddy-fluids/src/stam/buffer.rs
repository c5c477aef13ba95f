/// Double buffer for a field that alternates between "current" and
/// "previous" roles across pipeline stages.
///
/// Stages read the departure/source values from `prev` and write results
/// into `cur`; [`FieldPair::swap`] flips the roles at the stage
/// boundaries so no stage ever reads the buffer it is writing.
#[derive(Debug, Clone)]
pub(crate) struct FieldPair {
    pub cur: Vec<f32>,
    pub prev: Vec<f32>,
}

impl FieldPair {
    pub fn new(len: usize) -> Self {
        Self {
            cur: vec![0.0; len],
            prev: vec![0.0; len],
        }
    }

    /// Current values become the previous ones; the old previous slot is
    /// scratch for the next stage to overwrite.
    #[inline]
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.cur, &mut self.prev);
    }

    pub fn fill(&mut self, value: f32) {
        self.cur.fill(value);
        self.prev.fill(value);
    }
}

#[cfg(test)]
mod tests {
    use super::FieldPair;

    #[test]
    fn swap_flips_roles_without_reallocating() {
        let mut pair = FieldPair::new(4);
        pair.cur[0] = 1.0;
        let cur_ptr = pair.cur.as_ptr();

        pair.swap();

        assert_eq!(pair.prev[0], 1.0);
        assert_eq!(pair.cur[0], 0.0);
        assert_eq!(pair.prev.as_ptr(), cur_ptr);
    }
}
