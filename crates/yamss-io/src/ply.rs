use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use yamss_core::{CoreError, Eom, Observer, Structure};

use crate::util::{ensure_parent_dir, io_err};

/// Writes the final displaced node positions as an ASCII PLY point cloud.
///
/// Not present in `original_source` -- supplements the spec's explicit
/// mention of PLY output, grounded structurally on `ccx-io::vtk_writer`'s
/// "write the final mesh state to a visualization format" shape.
pub struct PlyObserver {
    path: PathBuf,
}

impl PlyObserver {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        PlyObserver { path: path.into() }
    }
}

impl Observer<f64> for PlyObserver {
    fn initialize(&mut self, _eom: &Eom<f64>, _structure: &Structure<f64>) -> Result<(), CoreError> {
        Ok(())
    }

    fn update(&mut self, _eom: &Eom<f64>, _structure: &Structure<f64>) -> Result<(), CoreError> {
        Ok(())
    }

    fn finalize(&mut self, eom: &Eom<f64>, structure: &Structure<f64>) -> Result<(), CoreError> {
        ensure_parent_dir(&self.path)?;
        let file = File::create(&self.path).map_err(io_err)?;
        let mut w = BufWriter::new(file);
        let q = eom.displacement(0);
        let positions: Vec<_> = structure.nodes().map(|n| n.displaced_position(q)).collect();

        writeln!(w, "ply").map_err(io_err)?;
        writeln!(w, "format ascii 1.0").map_err(io_err)?;
        writeln!(w, "element vertex {}", positions.len()).map_err(io_err)?;
        writeln!(w, "property float x").map_err(io_err)?;
        writeln!(w, "property float y").map_err(io_err)?;
        writeln!(w, "property float z").map_err(io_err)?;
        writeln!(w, "end_header").map_err(io_err)?;
        for p in &positions {
            writeln!(w, "{} {} {}", p[0], p[1], p[2]).map_err(io_err)?;
        }
        w.flush().map_err(io_err)
    }

    fn files(&self) -> Vec<String> {
        vec![self.path.display().to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{DMatrix, DVector};
    use std::time::{SystemTime, UNIX_EPOCH};
    use yamss_core::Node;

    fn unique_temp_path(name: &str) -> PathBuf {
        let pid = std::process::id();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("{name}_{pid}_{nanos}.ply"))
    }

    #[test]
    fn writes_one_vertex_line_per_node() {
        let eom = Eom::new(
            DMatrix::from_element(1, 1, 1.0),
            DMatrix::from_element(1, 1, 0.0),
            DMatrix::from_element(1, 1, 4.0),
            1,
        )
        .unwrap();
        let mut structure = Structure::new();
        let modes = DMatrix::from_row_slice(1, 6, &[1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        structure
            .add_node(Node::new(1, DVector::zeros(6), modes))
            .unwrap();

        let path = unique_temp_path("ply_observer");
        let mut observer = PlyObserver::new(&path);
        observer.finalize(&eom, &structure).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("ply\n"));
        assert!(contents.contains("element vertex 1"));
        let _ = std::fs::remove_file(&path);
    }
}
