//! Core modal structural dynamics solver: generalized (modal) equations of
//! motion, time integration (Newmark-β, generalized-α, steady-state), the
//! geometric/loading model, and the co-simulation job registry.

pub mod element;
pub mod eom;
pub mod error;
pub mod integrator;
pub mod iterate;
pub mod job_registry;
pub mod load;
pub mod node;
pub mod observer;
pub mod runner;
pub mod structure;

pub use element::{Element, Shape};
pub use eom::Eom;
pub use error::{CoreError, Result};
pub use integrator::{GeneralizedAlpha, Integrator, NewmarkBeta, SteadyState};
pub use iterate::Iterate;
pub use job_registry::{JobEntry, JobRegistry};
pub use load::{InterfaceEvaluator, Load, NodeEvaluator};
pub use node::Node;
pub use observer::Observer;
pub use runner::Runner;
pub use structure::Structure;
