use nalgebra::DVector;
use yamss_core::{InterfaceEvaluator, Node, NodeEvaluator};

use crate::schema::EvaluatorConfig;

pub struct ConstantEvaluator {
    force: DVector<f64>,
}

impl NodeEvaluator<f64> for ConstantEvaluator {
    fn evaluate(&self, _time: f64, _node: &Node<f64>) -> DVector<f64> {
        self.force.clone()
    }
}

pub struct SinusoidalEvaluator {
    amplitude: DVector<f64>,
    frequency: f64,
    phase: f64,
}

impl NodeEvaluator<f64> for SinusoidalEvaluator {
    fn evaluate(&self, time: f64, _node: &Node<f64>) -> DVector<f64> {
        let scale = (2.0 * std::f64::consts::PI * self.frequency * time + self.phase).sin();
        &self.amplitude * scale
    }
}

pub struct StepEvaluator {
    force: DVector<f64>,
    onset: f64,
}

impl NodeEvaluator<f64> for StepEvaluator {
    fn evaluate(&self, time: f64, _node: &Node<f64>) -> DVector<f64> {
        if time >= self.onset {
            self.force.clone()
        } else {
            DVector::zeros(6)
        }
    }
}

pub fn build_evaluator(config: &EvaluatorConfig) -> Box<dyn NodeEvaluator<f64>> {
    match config {
        EvaluatorConfig::Constant { force } => Box::new(ConstantEvaluator {
            force: DVector::from_row_slice(force),
        }),
        EvaluatorConfig::Sinusoidal {
            amplitude,
            frequency,
            phase,
        } => Box::new(SinusoidalEvaluator {
            amplitude: DVector::from_row_slice(amplitude),
            frequency: *frequency,
            phase: *phase,
        }),
        EvaluatorConfig::Step { force, onset } => Box::new(StepEvaluator {
            force: DVector::from_row_slice(force),
            onset: *onset,
        }),
        EvaluatorConfig::Interface => Box::new(InterfaceEvaluator::<f64>::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DMatrix;

    fn dummy_node() -> Node<f64> {
        Node::new(1, DVector::zeros(6), DMatrix::zeros(1, 6))
    }

    #[test]
    fn step_evaluator_is_zero_before_onset() {
        let evaluator = StepEvaluator {
            force: DVector::from_element(6, 5.0),
            onset: 1.0,
        };
        let node = dummy_node();
        assert_eq!(evaluator.evaluate(0.5, &node), DVector::zeros(6));
        assert_eq!(evaluator.evaluate(1.0, &node), DVector::from_element(6, 5.0));
    }

    #[test]
    fn interface_kind_builds_an_interface_evaluator() {
        let evaluator = build_evaluator(&EvaluatorConfig::Interface);
        assert!(evaluator.as_interface().is_some());
    }

    #[test]
    fn sinusoidal_evaluator_starts_at_phase_offset() {
        let evaluator = SinusoidalEvaluator {
            amplitude: DVector::from_element(6, 1.0),
            frequency: 1.0,
            phase: std::f64::consts::FRAC_PI_2,
        };
        let node = dummy_node();
        let at_zero = evaluator.evaluate(0.0, &node);
        assert!((at_zero[0] - 1.0).abs() < 1e-12);
    }
}
