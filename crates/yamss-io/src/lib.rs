//! Concrete [`yamss_core::Observer`] implementations: output formats the
//! core deliberately does not know about.

pub mod modes;
pub mod ply;
pub mod ptree;
pub mod summary;
pub mod tecplot;
mod util;

pub use modes::ModesObserver;
pub use ply::PlyObserver;
pub use ptree::PropertyTreeObserver;
pub use summary::SummaryObserver;
pub use tecplot::TecplotObserver;
