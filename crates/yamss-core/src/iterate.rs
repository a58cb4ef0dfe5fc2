use nalgebra::{ComplexField, DVector};

/// A single time-level snapshot of the generalized (modal) state: the
/// displacement, velocity, acceleration and force vectors at one instant,
/// plus the step index and time step that produced it.
///
/// Mirrors `original_source/src/yamss/iterate.hpp`'s `iterate<T>`.
#[derive(Debug, Clone)]
pub struct Iterate<T: ComplexField> {
    pub step: u64,
    pub time: T,
    pub time_step: T,
    pub displacement: DVector<T>,
    pub velocity: DVector<T>,
    pub acceleration: DVector<T>,
    pub force: DVector<T>,
}

impl<T: ComplexField + Copy> Iterate<T> {
    /// A zeroed iterate with `num_modes` generalized coordinates.
    pub fn zeroed(num_modes: usize) -> Self {
        Iterate {
            step: 0,
            time: T::zero(),
            time_step: T::zero(),
            displacement: DVector::zeros(num_modes),
            velocity: DVector::zeros(num_modes),
            acceleration: DVector::zeros(num_modes),
            force: DVector::zeros(num_modes),
        }
    }

    pub fn num_modes(&self) -> usize {
        self.displacement.len()
    }
}
