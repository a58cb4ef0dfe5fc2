use std::collections::VecDeque;

use nalgebra::{ComplexField, DMatrix, DVector};

use crate::error::{CoreError, Result};
use crate::iterate::Iterate;

/// Owns the modal mass/damping/stiffness matrices and a ring of the last
/// `stencil_size` [`Iterate`]s, newest at index 0.
///
/// Grounded on `original_source/src/yamss/eom.hpp`: `compute_acceleration`
/// solves `M a = f - C v - K u`, and `advance(dt)` shifts the ring by
/// copying `iterates[n-1]` into `iterates[n]` from the back forward before
/// installing a fresh iterate at index 0.
pub struct Eom<T: ComplexField> {
    mass: DMatrix<T>,
    damping: DMatrix<T>,
    stiffness: DMatrix<T>,
    iterates: VecDeque<Iterate<T>>,
    stencil_size: usize,
}

impl<T: ComplexField + Copy> Eom<T> {
    pub fn new(
        mass: DMatrix<T>,
        damping: DMatrix<T>,
        stiffness: DMatrix<T>,
        stencil_size: usize,
    ) -> Result<Self> {
        let n = mass.nrows();
        if mass.ncols() != n {
            return Err(CoreError::DimensionError {
                expected: n,
                found: mass.ncols(),
            });
        }
        if damping.nrows() != n || damping.ncols() != n {
            return Err(CoreError::DimensionError {
                expected: n,
                found: damping.nrows().max(damping.ncols()),
            });
        }
        if stiffness.nrows() != n || stiffness.ncols() != n {
            return Err(CoreError::DimensionError {
                expected: n,
                found: stiffness.nrows().max(stiffness.ncols()),
            });
        }
        let stencil_size = stencil_size.max(1);
        let mut iterates = VecDeque::with_capacity(stencil_size);
        for _ in 0..stencil_size {
            iterates.push_back(Iterate::zeroed(n));
        }
        Ok(Eom {
            mass,
            damping,
            stiffness,
            iterates,
            stencil_size,
        })
    }

    pub fn num_modes(&self) -> usize {
        self.mass.nrows()
    }

    pub fn stencil_size(&self) -> usize {
        self.stencil_size
    }

    pub fn mass(&self) -> &DMatrix<T> {
        &self.mass
    }

    pub fn damping(&self) -> &DMatrix<T> {
        &self.damping
    }

    pub fn stiffness(&self) -> &DMatrix<T> {
        &self.stiffness
    }

    fn iterate(&self, n: usize) -> &Iterate<T> {
        &self.iterates[n]
    }

    pub fn time(&self, n: usize) -> T {
        self.iterate(n).time
    }

    pub fn time_step(&self, n: usize) -> T {
        self.iterate(n).time_step
    }

    pub fn step(&self, n: usize) -> u64 {
        self.iterate(n).step
    }

    pub fn displacement(&self, n: usize) -> &DVector<T> {
        &self.iterate(n).displacement
    }

    pub fn velocity(&self, n: usize) -> &DVector<T> {
        &self.iterate(n).velocity
    }

    pub fn acceleration(&self, n: usize) -> &DVector<T> {
        &self.iterate(n).acceleration
    }

    pub fn force(&self, n: usize) -> &DVector<T> {
        &self.iterate(n).force
    }

    pub fn set_displacement(&mut self, value: DVector<T>) {
        self.iterates[0].displacement = value;
    }

    pub fn set_velocity(&mut self, value: DVector<T>) {
        self.iterates[0].velocity = value;
    }

    pub fn set_acceleration(&mut self, value: DVector<T>) {
        self.iterates[0].acceleration = value;
    }

    pub fn set_force(&mut self, value: DVector<T>) {
        self.iterates[0].force = value;
    }

    /// Shifts the ring forward by one time step of size `dt`, duplicating
    /// the current (soon-to-be-previous) state into the new head before the
    /// caller overwrites it with freshly integrated values.
    pub fn advance(&mut self, dt: T) {
        let mut next = self.iterates[0].clone();
        next.step += 1;
        next.time = next.time + dt;
        next.time_step = dt;
        self.iterates.push_front(next);
        if self.iterates.len() > self.stencil_size {
            self.iterates.pop_back();
        }
    }

    /// Solves `M a0 = f0 - C v0 - K u0` for the current iterate's
    /// acceleration, in place.
    pub fn compute_acceleration(&mut self) -> Result<()> {
        let u = self.iterates[0].displacement.clone();
        let v = self.iterates[0].velocity.clone();
        let f = self.iterates[0].force.clone();
        let rhs = f - &self.damping * v - &self.stiffness * u;
        let a = self
            .mass
            .clone()
            .lu()
            .solve(&rhs)
            .ok_or(CoreError::SingularSystem)?;
        self.iterates[0].acceleration = a;
        Ok(())
    }
}
