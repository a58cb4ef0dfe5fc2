use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use nalgebra::{ComplexField, DVector};

use crate::element::Element;
use crate::error::{CoreError, Result};
use crate::node::Node;

/// Evaluates the 6-DoF force a [`Load`] contributes to one node at a given
/// time. Implemented both by ordinary analytic loads and by the co-sim
/// bridge ([`InterfaceEvaluator`]).
///
/// Grounded on `original_source/src/yamss/evaluator/interface.hpp`'s
/// `operator()(time, node)` contract.
pub trait NodeEvaluator<T: ComplexField>: Send + Sync {
    fn evaluate(&self, time: T, node: &Node<T>) -> DVector<T>;

    /// Downcast hook for the co-sim bridge: every evaluator except
    /// [`InterfaceEvaluator`] answers `None`. Lets `Structure::
    /// with_interface_evaluator` reach the one variant that accepts
    /// externally injected forces without a second owner of the evaluator
    /// (see DESIGN.md's resolution of the "cyclic patterns to redesign"
    /// note).
    fn as_interface(&self) -> Option<&InterfaceEvaluator<T>> {
        None
    }
}

/// A load references a set of elements and/or explicit node keys; the node
/// set it actually applies to is the union of every referenced element's
/// vertices plus the explicit node keys. This is the resolution of the
/// "how do loads reference nodes" Open Question.
pub struct Load<T: ComplexField> {
    pub key: u64,
    pub element_keys: HashSet<u64>,
    pub explicit_node_keys: HashSet<u64>,
    pub evaluator: Arc<dyn NodeEvaluator<T>>,
}

impl<T: ComplexField + Copy> Load<T> {
    pub fn new(
        key: u64,
        element_keys: HashSet<u64>,
        explicit_node_keys: HashSet<u64>,
        evaluator: Arc<dyn NodeEvaluator<T>>,
    ) -> Self {
        Load {
            key,
            element_keys,
            explicit_node_keys,
            evaluator,
        }
    }

    /// Resolves the effective node-key set this load applies to: the union
    /// of its referenced elements' vertices and its explicit node keys.
    pub fn resolve_nodes(&self, elements: &HashMap<u64, Element>) -> Result<HashSet<u64>> {
        let mut nodes = self.explicit_node_keys.clone();
        for element_key in &self.element_keys {
            let element = elements
                .get(element_key)
                .ok_or(CoreError::UnknownKey(*element_key))?;
            nodes.extend(element.vertices.iter().copied());
        }
        Ok(nodes)
    }

    /// Like `resolve_nodes`, but sorted ascending by key -- the deterministic
    /// node ordering the DoF-major/node-minor wire layout (§6.3) indexes
    /// into.
    pub fn resolve_nodes_ordered(&self, elements: &HashMap<u64, Element>) -> Result<Vec<u64>> {
        let mut nodes: Vec<u64> = self.resolve_nodes(elements)?.into_iter().collect();
        nodes.sort_unstable();
        Ok(nodes)
    }
}

/// The co-simulation bridge: an externally-driven [`NodeEvaluator`] that
/// returns whatever force was last injected for a node, or zero if none was
/// ever set.
///
/// Grounded verbatim on `original_source/src/yamss/evaluator/interface.hpp`.
#[derive(Default)]
pub struct InterfaceEvaluator<T: ComplexField> {
    loads: Mutex<HashMap<u64, DVector<T>>>,
}

impl<T: ComplexField + Copy> InterfaceEvaluator<T> {
    pub fn new() -> Self {
        InterfaceEvaluator {
            loads: Mutex::new(HashMap::new()),
        }
    }

    /// Sets (or replaces) the force injected for `node_key`.
    pub fn insert(&self, node_key: u64, force: DVector<T>) {
        self.loads.lock().unwrap().insert(node_key, force);
    }

    /// Active DoF indices (0..6), in increasing order -- the `d` axis of
    /// the §6.3 wire layout, restricted to the DoFs the mask actually
    /// selects.
    fn active_dof_indices(active_dofs: &DVector<T>) -> Vec<usize> {
        (0..6).filter(|&d| active_dofs[d] != T::zero()).collect()
    }

    /// Demultiplexes a flat array laid out DoF-major, node-minor (§6.3)
    /// across `node_keys`' force accumulators: `flat[offset[d] + n]` where
    /// `offset[d]` is `d`'s position among the active DoFs times
    /// `node_keys.len()`. Entries for DoFs outside `active_dofs` are left
    /// untouched.
    pub fn set_loading(&self, node_keys: &[u64], active_dofs: &DVector<T>, flat: &[T]) -> Result<()> {
        let dofs = Self::active_dof_indices(active_dofs);
        let n = node_keys.len();
        let expected = dofs.len() * n;
        if flat.len() != expected {
            return Err(CoreError::DimensionError {
                expected,
                found: flat.len(),
            });
        }
        let mut loads = self.loads.lock().unwrap();
        for (p, &dof) in dofs.iter().enumerate() {
            for (n_idx, &node_key) in node_keys.iter().enumerate() {
                let mut force = loads
                    .get(&node_key)
                    .cloned()
                    .unwrap_or_else(|| DVector::zeros(6));
                force[dof] = flat[p * n + n_idx];
                loads.insert(node_key, force);
            }
        }
        Ok(())
    }

    /// Inverse of `set_loading`: reads the currently injected forces back
    /// out in the same DoF-major, node-minor layout (§6.3), zero for any
    /// node with nothing injected yet.
    pub fn read_loading(&self, node_keys: &[u64], active_dofs: &DVector<T>) -> Vec<T> {
        let dofs = Self::active_dof_indices(active_dofs);
        let n = node_keys.len();
        let loads = self.loads.lock().unwrap();
        let mut flat = vec![T::zero(); dofs.len() * n];
        for (p, &dof) in dofs.iter().enumerate() {
            for (n_idx, &node_key) in node_keys.iter().enumerate() {
                let force = loads.get(&node_key);
                flat[p * n + n_idx] = force.map_or_else(T::zero, |f| f[dof]);
            }
        }
        flat
    }
}

impl<T: ComplexField + Copy> NodeEvaluator<T> for InterfaceEvaluator<T> {
    fn evaluate(&self, _time: T, node: &Node<T>) -> DVector<T> {
        self.loads
            .lock()
            .unwrap()
            .get(&node.key)
            .cloned()
            .unwrap_or_else(|| DVector::zeros(6))
    }

    fn as_interface(&self) -> Option<&InterfaceEvaluator<T>> {
        Some(self)
    }
}
