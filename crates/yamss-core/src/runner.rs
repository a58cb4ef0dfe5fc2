use nalgebra::ComplexField;

use crate::eom::Eom;
use crate::error::Result;
use crate::integrator::Integrator;
use crate::observer::Observer;
use crate::structure::Structure;

/// Owns one simulation's [`Eom`], [`Structure`], [`Integrator`], and
/// [`Observer`] collaborators, and drives them through a run.
///
/// Grounded on `original_source/src/yamss/runner.hpp`. Unlike that snapshot
/// (whose `step()` both applies loads itself *and* calls into an integrator
/// that applies loads again), this `step` defers load application entirely
/// to the integrator -- matching what `integrator/newmark_beta.hpp` and
/// `generalized_alpha.hpp` actually do internally. See DESIGN.md.
pub struct Runner<T: ComplexField<RealField = f64> + Copy + Send + Sync> {
    eom: Eom<T>,
    structure: Structure<T>,
    integrator: Box<dyn Integrator<T>>,
    time_step: T,
    final_time: T,
    observers: Vec<Box<dyn Observer<T>>>,
}

impl<T: ComplexField<RealField = f64> + Copy + Send + Sync> Runner<T> {
    pub fn new(eom: Eom<T>, structure: Structure<T>, integrator: Box<dyn Integrator<T>>) -> Self {
        Runner {
            eom,
            structure,
            integrator,
            time_step: T::from_real(0.01),
            final_time: T::from_real(1.0),
            observers: Vec::new(),
        }
    }

    pub fn eom(&self) -> &Eom<T> {
        &self.eom
    }

    pub fn structure(&self) -> &Structure<T> {
        &self.structure
    }

    pub fn time_step(&self) -> T {
        self.time_step
    }

    pub fn final_time(&self) -> T {
        self.final_time
    }

    pub fn set_time_step(&mut self, time_step: T) {
        self.time_step = time_step;
    }

    pub fn set_final_time(&mut self, final_time: T) {
        self.final_time = final_time;
    }

    pub fn add_observer(&mut self, observer: Box<dyn Observer<T>>) {
        self.observers.push(observer);
    }

    /// Declared output files of every attached observer.
    pub fn files(&self) -> Vec<String> {
        self.observers.iter().flat_map(|o| o.files()).collect()
    }

    pub fn initialize(&mut self) -> Result<()> {
        self.structure.apply_loads(self.eom.time(0))?;
        self.eom
            .set_force(self.structure.generalized_force(self.eom.num_modes()));
        self.eom.compute_acceleration()?;
        for observer in &mut self.observers {
            observer.initialize(&self.eom, &self.structure)?;
        }
        Ok(())
    }

    pub fn step(&mut self) -> Result<()> {
        self.eom.advance(self.time_step);
        self.integrator.step(&mut self.eom, &mut self.structure)?;
        for observer in &mut self.observers {
            observer.update(&self.eom, &self.structure)?;
        }
        Ok(())
    }

    /// Runs `count` steps in sequence -- the co-sim-facing bulk-advance
    /// operation named in spec.md's Runner component.
    pub fn step_n(&mut self, count: usize) -> Result<()> {
        for _ in 0..count {
            self.step()?;
        }
        Ok(())
    }

    pub fn finalize(&mut self) -> Result<()> {
        for observer in &mut self.observers {
            observer.finalize(&self.eom, &self.structure)?;
        }
        Ok(())
    }

    pub fn run(&mut self) -> Result<()> {
        while self.eom.time(0).real() < self.final_time.real() {
            self.step()?;
        }
        Ok(())
    }
}
