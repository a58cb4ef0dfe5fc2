use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use nalgebra::DVector;
use yamss_core::{Element, Eom, GeneralizedAlpha, Integrator, Load, NewmarkBeta, Node, Observer, Runner, SteadyState, Structure};
use yamss_io::{ModesObserver, PlyObserver, PropertyTreeObserver, SummaryObserver, TecplotObserver};

use crate::error::{ConfigError, Result};
use crate::evaluators::build_evaluator;
use crate::schema::{MethodConfig, OutputConfig, OutputKind, RunnerConfig};

/// Builds a ready-to-run [`Runner`] from a parsed [`RunnerConfig`] -- the
/// factory surface named in spec.md §6.1. This is the only contract between
/// the (out-of-scope) document reader and the solver core, matching the
/// split the teacher draws between its deck-parsing crates and
/// `ccx-solver::analysis::AnalysisPipeline::run`'s "take an already-parsed
/// deck, return a built model" shape. `output_dir` is where `config.outputs`
/// entries land; observer file names default per-kind when a config entry
/// doesn't give its own `parameters.path`.
pub fn build_runner(config: &RunnerConfig, output_dir: &Path) -> Result<Runner<f64>> {
    let num_modes = config.structure.nodes.first().map_or(0, |n| n.modes.len());

    let mut structure = Structure::new();
    if let Some(mask) = config.structure.active_dofs {
        structure.set_active_dofs(DVector::from_row_slice(&mask))?;
    }

    for node_cfg in &config.structure.nodes {
        if node_cfg.modes.len() != num_modes {
            return Err(ConfigError::Invalid(format!(
                "node {} has {} mode rows, expected {}",
                node_cfg.key,
                node_cfg.modes.len(),
                num_modes
            )));
        }
        let mut modes = nalgebra::DMatrix::zeros(num_modes, 6);
        for (i, row) in node_cfg.modes.iter().enumerate() {
            if row.len() != 6 {
                return Err(ConfigError::Invalid(format!(
                    "node {} mode row {} has {} entries, expected 6",
                    node_cfg.key,
                    i,
                    row.len()
                )));
            }
            for (j, value) in row.iter().enumerate() {
                modes[(i, j)] = *value;
            }
        }
        let node = Node::new(node_cfg.key, DVector::from_row_slice(&node_cfg.position), modes);
        structure.add_node(node)?;
    }

    for element_cfg in &config.structure.elements {
        let shape = (&element_cfg.shape).into();
        let element = Element::new(element_cfg.key, shape, element_cfg.vertices.clone())?;
        structure.add_element(element)?;
    }

    for load_cfg in &config.loads {
        let evaluator: Arc<dyn yamss_core::NodeEvaluator<f64>> =
            Arc::from(build_evaluator(&load_cfg.evaluator));
        let load = Load::new(
            load_cfg.key,
            HashSet::from_iter(load_cfg.elements.iter().copied()),
            HashSet::from_iter(load_cfg.nodes.iter().copied()),
            evaluator,
        );
        structure.add_load(load)?;
    }

    let mass = config.eom.mass.to_dmatrix()?;
    let damping = config.eom.damping.to_dmatrix()?;
    let stiffness = config.eom.stiffness.to_dmatrix()?;
    if mass.nrows() != num_modes {
        return Err(ConfigError::Invalid(format!(
            "eom matrices are {}x{} but structure has {} modes",
            mass.nrows(),
            mass.ncols(),
            num_modes
        )));
    }

    let integrator: Box<dyn Integrator<f64>> = match &config.solution.method {
        MethodConfig::NewmarkBeta { beta, gamma } => {
            let mut scheme = NewmarkBeta::default();
            if let Some(beta) = beta {
                scheme.beta = *beta;
            }
            if let Some(gamma) = gamma {
                scheme.gamma = *gamma;
            }
            Box::new(scheme)
        }
        MethodConfig::GeneralizedAlpha {
            alpha_m,
            alpha_f,
            beta,
            gamma,
        } => {
            let mut scheme = GeneralizedAlpha::default();
            if let Some(v) = alpha_m {
                scheme.alpha_m = *v;
            }
            if let Some(v) = alpha_f {
                scheme.alpha_f = *v;
            }
            if let Some(v) = beta {
                scheme.beta = *v;
            }
            if let Some(v) = gamma {
                scheme.gamma = *v;
            }
            Box::new(scheme)
        }
        MethodConfig::SteadyState => Box::new(SteadyState),
    };

    let mut eom = Eom::new(mass, damping, stiffness, integrator.stencil_size().max(1))?;

    if let Some(initial) = &config.eom.initial_conditions {
        if let Some(displacement) = &initial.displacement {
            if displacement.len() != num_modes {
                return Err(ConfigError::Invalid(format!(
                    "initial displacement has {} entries, expected {}",
                    displacement.len(),
                    num_modes
                )));
            }
            eom.set_displacement(DVector::from_row_slice(displacement));
        }
        if let Some(velocity) = &initial.velocity {
            if velocity.len() != num_modes {
                return Err(ConfigError::Invalid(format!(
                    "initial velocity has {} entries, expected {}",
                    velocity.len(),
                    num_modes
                )));
            }
            eom.set_velocity(DVector::from_row_slice(velocity));
        }
    }

    let mut runner = Runner::new(eom, structure, integrator);
    runner.set_time_step(config.solution.time_step);
    runner.set_final_time(config.solution.final_time);

    for output in &config.outputs.output {
        runner.add_observer(build_observer(output, output_dir));
    }

    Ok(runner)
}

/// Builds the concrete [`yamss_io`] observer an `outputs.output[*]` entry
/// names, defaulting its file name per kind when `parameters.path` is absent.
fn build_observer(output: &OutputConfig, output_dir: &Path) -> Box<dyn Observer<f64>> {
    let default_name = match output.kind {
        OutputKind::Modes => "modes.dat",
        OutputKind::Motion => "motion.dat",
        OutputKind::Point => "point.ply",
        OutputKind::Ptree => "ptree.jsonl",
        OutputKind::Summary => "summary.txt",
    };
    let path = output_dir.join(output.parameters.path.as_deref().unwrap_or(default_name));

    match output.kind {
        OutputKind::Modes => Box::new(ModesObserver::new(path)),
        OutputKind::Motion => Box::new(TecplotObserver::new(path, output.parameters.stride.unwrap_or(1))),
        OutputKind::Point => Box::new(PlyObserver::new(path)),
        OutputKind::Ptree => Box::new(PropertyTreeObserver::new(path)),
        OutputKind::Summary => Box::new(SummaryObserver::new(path)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn minimal_config() -> RunnerConfig {
        let json = r#"{
            "solution": {"method": {"type": "newmark_beta", "beta": null, "gamma": null}, "time_step": 0.05, "final_time": 0.2},
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
        serde_json::from_str(json).unwrap()
    }

    fn unique_temp_dir(name: &str) -> std::path::PathBuf {
        let pid = std::process::id();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("{name}_{pid}_{nanos}"))
    }

    #[test]
    fn build_runner_from_minimal_config_runs() {
        let config = minimal_config();
        let dir = unique_temp_dir("factory_minimal");
        let mut runner = build_runner(&config, &dir).unwrap();
        runner.initialize().unwrap();
        runner.run().unwrap();
        assert!(runner.eom().time(0) >= 0.2);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn mismatched_mode_count_is_rejected() {
        let mut config = minimal_config();
        config.structure.nodes[0].modes.push(vec![0.0; 6]);
        let dir = unique_temp_dir("factory_mismatch");
        assert!(build_runner(&config, &dir).is_err());
    }

    #[test]
    fn initial_conditions_seed_the_first_iterate() {
        let mut config = minimal_config();
        config.eom.initial_conditions = Some(crate::schema::InitialConditionsConfig {
            displacement: Some(vec![1.0]),
            velocity: Some(vec![0.0]),
        });
        let dir = unique_temp_dir("factory_initial_conditions");
        let runner = build_runner(&config, &dir).unwrap();
        assert_eq!(runner.eom().displacement(0)[0], 1.0);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn mismatched_initial_displacement_length_is_rejected() {
        let mut config = minimal_config();
        config.eom.initial_conditions = Some(crate::schema::InitialConditionsConfig {
            displacement: Some(vec![1.0, 2.0]),
            velocity: None,
        });
        let dir = unique_temp_dir("factory_bad_initial");
        assert!(build_runner(&config, &dir).is_err());
    }

    #[test]
    fn outputs_config_attaches_and_writes_observer_files() {
        let mut config = minimal_config();
        config.outputs.output.push(OutputConfig {
            kind: OutputKind::Summary,
            parameters: Default::default(),
        });
        let dir = unique_temp_dir("factory_outputs");
        let mut runner = build_runner(&config, &dir).unwrap();
        runner.initialize().unwrap();
        runner.run().unwrap();
        runner.finalize().unwrap();
        assert!(dir.join("summary.txt").exists());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
