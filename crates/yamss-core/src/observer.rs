use nalgebra::ComplexField;

use crate::eom::Eom;
use crate::error::Result;
use crate::structure::Structure;

/// A run-observation collaborator notified at the start, after every step,
/// and at the end of a run. Observers never mutate the [`Eom`]/[`Structure`]
/// they're given -- they only read state to produce output.
///
/// The trait contract is named directly in spec.md; concrete serialization
/// formats (Tecplot/PLY/property-tree/summary) live in `yamss-io`, grounded
/// on `original_source/src/yamss/inspector/*.hpp`.
pub trait Observer<T: ComplexField> {
    fn initialize(&mut self, eom: &Eom<T>, structure: &Structure<T>) -> Result<()>;
    fn update(&mut self, eom: &Eom<T>, structure: &Structure<T>) -> Result<()>;
    fn finalize(&mut self, eom: &Eom<T>, structure: &Structure<T>) -> Result<()>;

    /// Output file paths this observer declares it will write, known up
    /// front (before `initialize` is ever called).
    fn files(&self) -> Vec<String>;
}
