use nalgebra::{ComplexField, DMatrix, DVector};

/// A structural node: its undeformed 6-DoF position, the externally applied
/// 6-DoF force accumulated this step, and its mode-shape matrix (one row
/// per generalized coordinate, six columns for translation/rotation DoFs).
///
/// Grounded on `original_source/src/yamss/node.hpp`. `get_generalized_force`
/// reproduces `modes * active.asDiagonal() * force` exactly; `displaced_position`
/// supplements the distillation with the mode-superposition readback used by
/// `original_source/src/yamss/inspector/motion.hpp`.
#[derive(Debug, Clone)]
pub struct Node<T: ComplexField> {
    pub key: u64,
    pub position: DVector<T>,
    pub force: DVector<T>,
    pub modes: DMatrix<T>,
}

impl<T: ComplexField + Copy> Node<T> {
    pub fn new(key: u64, position: DVector<T>, modes: DMatrix<T>) -> Self {
        debug_assert_eq!(position.len(), 6);
        debug_assert_eq!(modes.ncols(), 6);
        Node {
            key,
            position,
            force: DVector::zeros(6),
            modes,
        }
    }

    pub fn num_modes(&self) -> usize {
        self.modes.nrows()
    }

    pub fn clear_force(&mut self) {
        self.force = DVector::zeros(6);
    }

    /// `modes (M x 6) * diag(active) (6 x 6) * force (6 x 1)`, i.e. the
    /// contribution of this node's applied force to the generalized
    /// (modal) force vector.
    pub fn generalized_force(&self, active: &DVector<T>) -> DVector<T> {
        let masked = self.force.component_mul(active);
        &self.modes * masked
    }

    /// Physical 6-DoF displacement of this node under modal displacement
    /// vector `q`: `position + modesᵀ q`.
    pub fn displaced_position(&self, q: &DVector<T>) -> DVector<T> {
        &self.position + self.modes.transpose() * q
    }
}
