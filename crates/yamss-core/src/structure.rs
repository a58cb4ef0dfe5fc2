use std::collections::HashMap;

use nalgebra::{ComplexField, DVector};

use crate::element::Element;
use crate::error::{CoreError, Result};
use crate::load::{InterfaceEvaluator, Load};
use crate::node::Node;

/// The geometric/loading model: node and element registries, the loads
/// applied to them, and the 6-entry active-DoF mask used when projecting
/// nodal forces into generalized coordinates.
///
/// Grounded on `original_source/src/yamss/structure.hpp`: `add_node`/`add_load`
/// reject duplicate keys, `get_node`/`get_load` reject unknown keys,
/// `apply_loads` clears every node's force before re-applying each load, and
/// `get_generalized_force` sums each node's contribution.
pub struct Structure<T: ComplexField> {
    nodes: HashMap<u64, Node<T>>,
    elements: HashMap<u64, Element>,
    loads: HashMap<u64, Load<T>>,
    active_dofs: DVector<T>,
}

impl<T: ComplexField + Copy> Structure<T> {
    pub fn new() -> Self {
        Structure {
            nodes: HashMap::new(),
            elements: HashMap::new(),
            loads: HashMap::new(),
            active_dofs: DVector::from_element(6, T::one()),
        }
    }

    pub fn active_dofs(&self) -> &DVector<T> {
        &self.active_dofs
    }

    pub fn set_active_dofs(&mut self, mask: DVector<T>) -> Result<()> {
        if mask.len() != 6 {
            return Err(CoreError::DimensionError {
                expected: 6,
                found: mask.len(),
            });
        }
        self.active_dofs = mask;
        Ok(())
    }

    pub fn add_node(&mut self, node: Node<T>) -> Result<()> {
        if self.nodes.contains_key(&node.key) {
            return Err(CoreError::DuplicateKey(node.key));
        }
        self.nodes.insert(node.key, node);
        Ok(())
    }

    pub fn get_node(&self, key: u64) -> Result<&Node<T>> {
        self.nodes.get(&key).ok_or(CoreError::UnknownKey(key))
    }

    pub fn get_node_mut(&mut self, key: u64) -> Result<&mut Node<T>> {
        self.nodes.get_mut(&key).ok_or(CoreError::UnknownKey(key))
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node<T>> {
        self.nodes.values()
    }

    pub fn add_element(&mut self, element: Element) -> Result<()> {
        if self.elements.contains_key(&element.key) {
            return Err(CoreError::DuplicateKey(element.key));
        }
        self.elements.insert(element.key, element);
        Ok(())
    }

    pub fn get_element(&self, key: u64) -> Result<&Element> {
        self.elements.get(&key).ok_or(CoreError::UnknownKey(key))
    }

    pub fn add_load(&mut self, load: Load<T>) -> Result<()> {
        if self.loads.contains_key(&load.key) {
            return Err(CoreError::DuplicateKey(load.key));
        }
        self.loads.insert(load.key, load);
        Ok(())
    }

    pub fn get_load(&self, key: u64) -> Result<&Load<T>> {
        self.loads.get(&key).ok_or(CoreError::UnknownKey(key))
    }

    /// Typed accessor onto a load's evaluator when it is the co-sim
    /// [`InterfaceEvaluator`] variant, so callers injecting externally
    /// computed forces never need to downcast `Arc<dyn NodeEvaluator<T>>`
    /// themselves. Errors if `load_key` is unknown or its evaluator is not
    /// an interface evaluator.
    pub fn with_interface_evaluator<R>(
        &self,
        load_key: u64,
        f: impl FnOnce(&InterfaceEvaluator<T>) -> R,
    ) -> Result<R> {
        let load = self.get_load(load_key)?;
        let interface = load.evaluator.as_interface().ok_or_else(|| {
            CoreError::ConfigError(format!("load {load_key} has no interface evaluator"))
        })?;
        Ok(f(interface))
    }

    /// Node keys a load resolves to, in the deterministic ascending order
    /// the §6.3 wire layout indexes into.
    pub fn load_node_keys(&self, load_key: u64) -> Result<Vec<u64>> {
        let load = self.get_load(load_key)?;
        load.resolve_nodes_ordered(&self.elements)
    }

    /// Clears every node's accumulated force, then re-applies every load at
    /// `time`.
    pub fn apply_loads(&mut self, time: T) -> Result<()> {
        for node in self.nodes.values_mut() {
            node.clear_force();
        }
        for load in self.loads.values() {
            let node_keys = load.resolve_nodes(&self.elements)?;
            for node_key in node_keys {
                let node = self
                    .nodes
                    .get(&node_key)
                    .ok_or(CoreError::UnknownKey(node_key))?;
                let contribution = load.evaluator.evaluate(time, node);
                let node = self.nodes.get_mut(&node_key).unwrap();
                node.force += contribution;
            }
        }
        Ok(())
    }

    /// Sum of every node's generalized-force contribution, masked by the
    /// active-DoF vector. Node contributions are independent, so for
    /// structures with many nodes the per-node projection runs across the
    /// teacher's `rayon` thread pool.
    pub fn generalized_force(&self, num_modes: usize) -> DVector<T>
    where
        T: Send + Sync,
    {
        use rayon::prelude::*;
        self.nodes
            .values()
            .collect::<Vec<_>>()
            .into_par_iter()
            .map(|node| node.generalized_force(&self.active_dofs))
            .reduce(|| DVector::zeros(num_modes), |a, b| a + b)
    }
}

impl<T: ComplexField + Copy> Default for Structure<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Shape;
    use nalgebra::DMatrix;
    use std::collections::HashSet;
    use std::sync::Arc;

    struct UnitForce;
    impl crate::load::NodeEvaluator<f64> for UnitForce {
        fn evaluate(&self, _time: f64, _node: &Node<f64>) -> DVector<f64> {
            DVector::from_vec(vec![1.0, 0.0, 0.0, 0.0, 0.0, 0.0])
        }
    }

    fn node_with_one_mode(key: u64) -> Node<f64> {
        let modes = DMatrix::from_row_slice(1, 6, &[1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        Node::new(key, DVector::zeros(6), modes)
    }

    #[test]
    fn duplicate_node_keys_are_rejected() {
        let mut s = Structure::new();
        s.add_node(node_with_one_mode(1)).unwrap();
        assert!(matches!(
            s.add_node(node_with_one_mode(1)),
            Err(CoreError::DuplicateKey(1))
        ));
    }

    #[test]
    fn unknown_node_lookup_fails() {
        let s: Structure<f64> = Structure::new();
        assert!(matches!(s.get_node(7), Err(CoreError::UnknownKey(7))));
    }

    #[test]
    fn apply_loads_then_generalized_force_sums_contributions() {
        let mut s = Structure::new();
        s.add_node(node_with_one_mode(1)).unwrap();
        s.add_node(node_with_one_mode(2)).unwrap();
        s.add_element(Element::new(1, Shape::Point, vec![1]).unwrap())
            .unwrap();
        s.add_load(Load::new(
            1,
            HashSet::from([1]),
            HashSet::from([2]),
            Arc::new(UnitForce),
        ))
        .unwrap();

        s.apply_loads(0.0).unwrap();
        let g = s.generalized_force(1);
        assert_eq!(g[0], 2.0);
    }

    #[test]
    fn dof_mask_zeroes_out_masked_components() {
        let mut s = Structure::new();
        s.add_node(node_with_one_mode(1)).unwrap();
        s.add_element(Element::new(1, Shape::Point, vec![1]).unwrap())
            .unwrap();
        s.add_load(Load::new(
            1,
            HashSet::from([1]),
            HashSet::new(),
            Arc::new(UnitForce),
        ))
        .unwrap();
        let mut mask = DVector::from_element(6, 1.0);
        mask[0] = 0.0;
        s.set_active_dofs(mask).unwrap();

        s.apply_loads(0.0).unwrap();
        let g = s.generalized_force(1);
        assert_eq!(g[0], 0.0);
    }

    #[test]
    fn co_sim_injection_flows_into_generalized_force() {
        use crate::load::InterfaceEvaluator;

        let mut s = Structure::new();
        for key in [1u64, 2, 3] {
            s.add_node(node_with_one_mode(key)).unwrap();
        }
        let mut mask = DVector::from_element(6, 0.0);
        mask[0] = 1.0; // a single active DoF, per S4
        s.set_active_dofs(mask).unwrap();

        s.add_load(Load::new(
            1,
            HashSet::new(),
            HashSet::from([1, 2, 3]),
            Arc::new(InterfaceEvaluator::<f64>::new()),
        ))
        .unwrap();

        let node_keys = s.load_node_keys(1).unwrap();
        let active = s.active_dofs().clone();
        s.with_interface_evaluator(1, |ie| ie.set_loading(&node_keys, &active, &[1.0, 2.0, 3.0]))
            .unwrap()
            .unwrap();

        s.apply_loads(0.0).unwrap();
        let g = s.generalized_force(1);
        assert_eq!(g[0], 6.0);

        s.with_interface_evaluator(1, |ie| ie.set_loading(&node_keys, &active, &[0.0, 0.0, 0.0]))
            .unwrap()
            .unwrap();
        s.apply_loads(0.0).unwrap();
        let g2 = s.generalized_force(1);
        assert_eq!(g2[0], 0.0);
    }

    #[test]
    fn with_interface_evaluator_rejects_non_interface_loads() {
        let mut s = Structure::new();
        s.add_node(node_with_one_mode(1)).unwrap();
        s.add_element(Element::new(1, Shape::Point, vec![1]).unwrap())
            .unwrap();
        s.add_load(Load::new(1, HashSet::from([1]), HashSet::new(), Arc::new(UnitForce)))
            .unwrap();

        assert!(s.with_interface_evaluator(1, |_| ()).is_err());
    }
}
