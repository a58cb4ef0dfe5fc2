use nalgebra::ComplexField;

use crate::eom::Eom;
use crate::error::{CoreError, Result};
use crate::structure::Structure;

/// Advances the state owned by an [`Eom`] by one time step, given the
/// geometry/loads owned by a [`Structure`]. Each implementation applies
/// loads at whatever time level its scheme requires, computes the
/// generalized force, and solves for the new displacement/velocity/
/// acceleration.
pub trait Integrator<T: ComplexField<RealField = f64> + Copy + Send + Sync>: Send + Sync {
    fn step(&self, eom: &mut Eom<T>, structure: &mut Structure<T>) -> Result<()>;

    /// Number of prior iterates this scheme reads (`Eom`'s stencil size
    /// must be at least this).
    fn stencil_size(&self) -> usize;
}

fn lit<T: ComplexField<RealField = f64>>(x: f64) -> T {
    T::from_real(x)
}

/// Reproduces `original_source/src/yamss/integrator/newmark_beta.hpp`
/// exactly: the average-acceleration method by default (`beta = 0.25`,
/// `gamma = 0.5`), loads evaluated at the *current* time.
pub struct NewmarkBeta<T> {
    pub beta: T,
    pub gamma: T,
}

impl<T: ComplexField<RealField = f64> + Copy + Send + Sync> Default for NewmarkBeta<T> {
    fn default() -> Self {
        NewmarkBeta {
            beta: lit(0.25),
            gamma: lit(0.5),
        }
    }
}

impl<T: ComplexField<RealField = f64> + Copy + Send + Sync> Integrator<T> for NewmarkBeta<T> {
    fn step(&self, eom: &mut Eom<T>, structure: &mut Structure<T>) -> Result<()> {
        let t = eom.time(0);
        let dt = eom.time_step(0);
        let m = eom.mass().clone();
        let c = eom.damping().clone();
        let k = eom.stiffness().clone();
        let u = eom.displacement(1).clone();
        let du = eom.velocity(1).clone();
        let ddu = eom.acceleration(1).clone();

        let beta = self.beta;
        let gamma = self.gamma;
        let one: T = lit(1.0);
        let two: T = lit(2.0);
        let half: T = lit(0.5);

        let a0 = one / (beta * dt * dt);
        let a1 = gamma / (beta * dt);
        let a2 = one / (beta * dt);
        let a3 = one / (two * beta) - one;
        let a4 = gamma / beta - one;
        let a5 = half * dt * (gamma / beta - two);
        let a6 = dt * (one - gamma);
        let a7 = dt * gamma;

        structure.apply_loads(t)?;
        eom.set_force(structure.generalized_force(eom.num_modes()));
        let f = eom.force(0).clone();

        let v = &u * a0 + &du * a2 + &ddu * a3;
        let w = &u * a1 + &du * a4 + &ddu * a5;

        let k_eff = k + &m * a0 + &c * a1;
        let f_eff = f + &m * v + &c * w;

        let u_new = k_eff.lu().solve(&f_eff).ok_or(CoreError::SingularSystem)?;
        let ddu_new = (&u_new - &u) * a0 - &du * a2 - &ddu * a3;
        let du_new = du + ddu * a6 + &ddu_new * a7;

        eom.set_displacement(u_new);
        eom.set_velocity(du_new);
        eom.set_acceleration(ddu_new);
        Ok(())
    }

    fn stencil_size(&self) -> usize {
        2
    }
}

/// Reproduces `original_source/src/yamss/generalized_alpha.hpp` exactly,
/// including its defaults (`alpha_m = 2/7`, `alpha_f = 3/7`, `beta = 1/49`,
/// `gamma = 9/14`) and its detail that loads are evaluated at
/// `t - alpha_f * dt`, not at the new time level.
pub struct GeneralizedAlpha<T> {
    pub alpha_m: T,
    pub alpha_f: T,
    pub beta: T,
    pub gamma: T,
}

impl<T: ComplexField<RealField = f64> + Copy + Send + Sync> Default for GeneralizedAlpha<T> {
    fn default() -> Self {
        GeneralizedAlpha {
            alpha_m: lit(2.0 / 7.0),
            alpha_f: lit(3.0 / 7.0),
            beta: lit(1.0 / 49.0),
            gamma: lit(9.0 / 14.0),
        }
    }
}

impl<T: ComplexField<RealField = f64> + Copy + Send + Sync> Integrator<T> for GeneralizedAlpha<T> {
    fn step(&self, eom: &mut Eom<T>, structure: &mut Structure<T>) -> Result<()> {
        let t = eom.time(0);
        let dt = eom.time_step(0);
        let m = eom.mass().clone();
        let c = eom.damping().clone();
        let k = eom.stiffness().clone();
        let u = eom.displacement(1).clone();
        let du = eom.velocity(1).clone();
        let ddu = eom.acceleration(1).clone();

        let one: T = lit(1.0);
        let two: T = lit(2.0);
        let half: T = lit(0.5);
        let alpha_m = self.alpha_m;
        let alpha_f = self.alpha_f;
        let beta = self.beta;
        let gamma = self.gamma;

        let k0 = one / (one - alpha_f);
        let k1 = k0 * alpha_m;
        let k2 = k0 * alpha_f;
        let k3 = k0 * (one - alpha_m);
        let a0 = dt * (one - gamma);
        let a1 = dt - a0;
        let b0 = one / (beta * dt * dt);
        let b1 = dt * b0;
        let b2 = one / (two * beta) - one;
        let c0 = k3 * b0;
        let c1 = gamma * b1;
        let c2 = k3 * b1;
        let c3 = k3 * b2 - k1;
        let c4 = gamma / beta - one - k2;
        let c5 = half * dt * (gamma / beta - two);
        let c6 = -k2;
        let c7 = k0;

        structure.apply_loads(t - alpha_f * dt)?;
        eom.set_force(structure.generalized_force(eom.num_modes()));
        let generalized_force = eom.force(0).clone();
        let f = generalized_force * c7;

        let p = &u * c0 + &du * c2 + &ddu * c3;
        let q = &u * c1 + &du * c4 + &ddu * c5;
        let r = &u * c6;

        let k_eff = k + &m * c0 + &c * c1;
        let f_eff = f + &m * p + &c * q + k * r;

        let u_new = k_eff.lu().solve(&f_eff).ok_or(CoreError::SingularSystem)?;
        let ddu_new = (&u_new - &u) * b0 - &du * b1 - &ddu * b2;
        let du_new = du + ddu * a0 + &ddu_new * a1;

        eom.set_displacement(u_new);
        eom.set_velocity(du_new);
        eom.set_acceleration(ddu_new);
        Ok(())
    }

    fn stencil_size(&self) -> usize {
        2
    }
}

/// Reproduces `original_source/src/yamss/integrator/steady_state.hpp`:
/// `K u = f`, velocity and acceleration held at zero.
pub struct SteadyState;

impl<T: ComplexField<RealField = f64> + Copy + Send + Sync> Integrator<T> for SteadyState {
    fn step(&self, eom: &mut Eom<T>, structure: &mut Structure<T>) -> Result<()> {
        let t = eom.time(0);
        let k = eom.stiffness().clone();

        structure.apply_loads(t)?;
        eom.set_force(structure.generalized_force(eom.num_modes()));
        let f = eom.force(0).clone();

        let u_new = k.lu().solve(&f).ok_or(CoreError::SingularSystem)?;
        let zero = nalgebra::DVector::zeros(eom.num_modes());

        eom.set_displacement(u_new);
        eom.set_velocity(zero.clone());
        eom.set_acceleration(zero);
        Ok(())
    }

    fn stencil_size(&self) -> usize {
        1
    }
}
