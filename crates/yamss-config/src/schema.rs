use nalgebra::DMatrix;
use serde::Deserialize;

use crate::error::{ConfigError, Result};

/// The typed configuration tree a runner is built from (spec.md §6.1). This
/// is the factory surface the core's "XML reader is out of scope" boundary
/// names: the actual markup format is not parsed here, only a structured
/// document already in this shape.
#[derive(Debug, Deserialize)]
pub struct RunnerConfig {
    pub solution: SolutionConfig,
    pub structure: StructureConfig,
    pub eom: EomConfig,
    #[serde(default)]
    pub loads: Vec<LoadConfig>,
    #[serde(default)]
    pub outputs: OutputsConfig,
}

#[derive(Debug, Deserialize)]
pub struct SolutionConfig {
    pub method: MethodConfig,
    pub time_step: f64,
    pub final_time: f64,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MethodConfig {
    NewmarkBeta {
        beta: Option<f64>,
        gamma: Option<f64>,
    },
    GeneralizedAlpha {
        alpha_m: Option<f64>,
        alpha_f: Option<f64>,
        beta: Option<f64>,
        gamma: Option<f64>,
    },
    SteadyState,
}

#[derive(Debug, Deserialize)]
pub struct EomConfig {
    pub mass: MatrixConfig,
    pub damping: MatrixConfig,
    pub stiffness: MatrixConfig,
    #[serde(default)]
    pub initial_conditions: Option<InitialConditionsConfig>,
}

/// Starting modal displacement/velocity (spec.md §6.1's
/// `eom.initial_conditions`); either entry defaults to all-zero when absent.
#[derive(Debug, Deserialize)]
pub struct InitialConditionsConfig {
    pub displacement: Option<Vec<f64>>,
    pub velocity: Option<Vec<f64>>,
}

/// A modal matrix, given either as a full dense grid or as a diagonal's
/// entries (the common case for modal mass/damping matrices).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum MatrixConfig {
    Dense(Vec<Vec<f64>>),
    Diagonal { diag: Vec<f64> },
}

impl MatrixConfig {
    pub fn to_dmatrix(&self) -> Result<DMatrix<f64>> {
        match self {
            MatrixConfig::Diagonal { diag } => Ok(DMatrix::from_diagonal(
                &nalgebra::DVector::from_vec(diag.clone()),
            )),
            MatrixConfig::Dense(rows) => {
                let n = rows.len();
                if n == 0 {
                    return Err(ConfigError::Invalid("empty matrix".to_string()));
                }
                let ncols = rows[0].len();
                if rows.iter().any(|r| r.len() != ncols) {
                    return Err(ConfigError::Invalid(
                        "matrix rows have inconsistent length".to_string(),
                    ));
                }
                let mut m = DMatrix::zeros(n, ncols);
                for (i, row) in rows.iter().enumerate() {
                    for (j, value) in row.iter().enumerate() {
                        m[(i, j)] = *value;
                    }
                }
                Ok(m)
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StructureConfig {
    pub nodes: Vec<NodeConfig>,
    #[serde(default)]
    pub elements: Vec<ElementConfig>,
    #[serde(default)]
    pub active_dofs: Option<[f64; 6]>,
}

#[derive(Debug, Deserialize)]
pub struct NodeConfig {
    pub key: u64,
    pub position: [f64; 6],
    /// One row per generalized coordinate, six columns.
    pub modes: Vec<Vec<f64>>,
}

#[derive(Debug, Deserialize)]
pub struct ElementConfig {
    pub key: u64,
    pub shape: ShapeConfig,
    pub vertices: Vec<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeConfig {
    Point,
    Line,
    Triangle,
    Quad,
}

impl From<&ShapeConfig> for yamss_core::Shape {
    fn from(value: &ShapeConfig) -> Self {
        match value {
            ShapeConfig::Point => yamss_core::Shape::Point,
            ShapeConfig::Line => yamss_core::Shape::Line,
            ShapeConfig::Triangle => yamss_core::Shape::Triangle,
            ShapeConfig::Quad => yamss_core::Shape::Quad,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoadConfig {
    pub key: u64,
    #[serde(default)]
    pub elements: Vec<u64>,
    #[serde(default)]
    pub nodes: Vec<u64>,
    pub evaluator: EvaluatorConfig,
}

/// Built-in evaluator kinds. The original `yamss` lets a load's force be an
/// arbitrary scripted expression; that scripting layer is explicitly out of
/// scope, so the config surface instead ships a closed set of common
/// analytic evaluators, plus `interface` -- the co-sim bridge a job's caller
/// drives through `setLoading` (spec.md §4.6, §6.3) rather than any of its
/// own parameters.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EvaluatorConfig {
    Constant {
        force: [f64; 6],
    },
    Sinusoidal {
        amplitude: [f64; 6],
        frequency: f64,
        #[serde(default)]
        phase: f64,
    },
    Step {
        force: [f64; 6],
        onset: f64,
    },
    Interface,
}

/// `outputs.output[*]` (spec.md §6.1): the observers a run attaches, each
/// writing under the run's output directory.
#[derive(Debug, Deserialize, Default)]
pub struct OutputsConfig {
    #[serde(default)]
    pub output: Vec<OutputConfig>,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(rename = "type")]
    pub kind: OutputKind,
    #[serde(default)]
    pub parameters: OutputParameters,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    Modes,
    Motion,
    Point,
    Ptree,
    Summary,
}

#[derive(Debug, Deserialize, Default)]
pub struct OutputParameters {
    /// File name relative to the run's output directory; defaults to a
    /// per-kind name when absent.
    pub path: Option<String>,
    /// Step stride for observers that support one (currently `motion`).
    pub stride: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagonal_matrix_expands_to_dense() {
        let m = MatrixConfig::Diagonal {
            diag: vec![1.0, 2.0, 3.0],
        }
        .to_dmatrix()
        .unwrap();
        assert_eq!(m[(0, 0)], 1.0);
        assert_eq!(m[(1, 1)], 2.0);
        assert_eq!(m[(0, 1)], 0.0);
    }

    #[test]
    fn ragged_dense_matrix_is_rejected() {
        let m = MatrixConfig::Dense(vec![vec![1.0, 2.0], vec![1.0]]);
        assert!(m.to_dmatrix().is_err());
    }

    #[test]
    fn parses_a_minimal_runner_document() {
        let json = r#"{
            "solution": {"method": {"type": "steady_state"}, "time_step": 0.1, "final_time": 1.0},
            "structure": {
                "nodes": [{"key": 1, "position": [0,0,0,0,0,0], "modes": [[1,0,0,0,0,0]]}],
                "elements": [{"key": 1, "shape": "point", "vertices": [1]}]
            },
            "eom": {
                "mass": {"diag": [1.0]},
                "damping": {"diag": [0.0]},
                "stiffness": {"diag": [4.0]}
            },
            "loads": [{"key": 1, "elements": [1], "evaluator": {"kind": "constant", "force": [1,0,0,0,0,0]}}]
        }"#;
        let config: RunnerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.structure.nodes.len(), 1);
        assert_eq!(config.loads.len(), 1);
    }

    #[test]
    fn parses_an_interface_load_initial_conditions_and_outputs() {
        let json = r#"{
            "solution": {"method": {"type": "steady_state"}, "time_step": 0.1, "final_time": 1.0},
            "structure": {
                "nodes": [{"key": 1, "position": [0,0,0,0,0,0], "modes": [[1,0,0,0,0,0]]}],
                "elements": [{"key": 1, "shape": "point", "vertices": [1]}]
            },
            "eom": {
                "mass": {"diag": [1.0]},
                "damping": {"diag": [0.0]},
                "stiffness": {"diag": [4.0]},
                "initial_conditions": {"displacement": [1.0], "velocity": null}
            },
            "loads": [{"key": 1, "elements": [1], "evaluator": {"kind": "interface"}}],
            "outputs": {"output": [{"type": "summary"}, {"type": "modes", "parameters": {"path": "history.dat"}}]}
        }"#;
        let config: RunnerConfig = serde_json::from_str(json).unwrap();
        assert!(matches!(config.loads[0].evaluator, EvaluatorConfig::Interface));
        let initial = config.eom.initial_conditions.unwrap();
        assert_eq!(initial.displacement, Some(vec![1.0]));
        assert_eq!(config.outputs.output.len(), 2);
        assert!(matches!(config.outputs.output[0].kind, OutputKind::Summary));
        assert_eq!(config.outputs.output[1].parameters.path.as_deref(), Some("history.dat"));
    }
}
