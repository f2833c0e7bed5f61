use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use tracing::info;

use crate::{
    datatypes::{Facet, Partition},
    error::DraughtError,
    solver::DraughtSample,
};

pub const HISTORY_OUTPUT: &str = "draught.csv";
pub const FACETS_OUTPUT: &str = "facets.csv";

fn create(path: &Path) -> Result<BufWriter<File>, DraughtError> {
    match File::create(path) {
        Ok(f) => Ok(BufWriter::new(f)),
        Err(err) => Err(DraughtError::Output(format!(
            "Failed to create {}: {err}",
            path.display()
        ))),
    }
}

fn write_error(path: &Path) -> impl Fn(std::io::Error) -> DraughtError + '_ {
    move |err| DraughtError::Output(format!("Failed to write {}: {err}", path.display()))
}

/// Writes the draught history, one row per bisection step
///
/// # Arguments
/// * `history` - The samples of a solve, starting position first
/// * `path` - The output csv file
pub fn write_history(history: &[DraughtSample], path: &Path) -> Result<(), DraughtError> {
    let mut file = create(path)?;
    let on_err = write_error(path);

    writeln!(file, "iteration,draught,bottom_ref,lo,hi,buoyant_force_z").map_err(&on_err)?;
    for sample in history {
        writeln!(
            file,
            "{},{},{},{},{},{}",
            sample.iteration,
            sample.draught,
            sample.bottom_ref,
            sample.lo,
            sample.hi,
            sample.buoyant_force_z
        )
        .map_err(&on_err)?;
    }
    file.flush().map_err(&on_err)?;

    Ok(())
}

fn write_facet(file: &mut impl Write, state: &str, facet: &Facet) -> std::io::Result<()> {
    let [a, b, c] = &facet.vertices;
    let n = &facet.normal;
    writeln!(
        file,
        "{state},{},{},{},{},{},{},{},{},{},{},{},{}",
        a.x, a.y, a.z, b.x, b.y, b.z, c.x, c.y, c.z, n.x, n.y, n.z
    )
}

/// Writes the emerged and submerged facets of a partition
///
/// # Arguments
/// * `partition` - The partition to export
/// * `path` - The output csv file
pub fn write_partition(partition: &Partition, path: &Path) -> Result<(), DraughtError> {
    let mut file = create(path)?;
    let on_err = write_error(path);

    writeln!(file, "state,x0,y0,z0,x1,y1,z1,x2,y2,z2,nx,ny,nz").map_err(&on_err)?;
    for facet in &partition.emerged {
        write_facet(&mut file, "emerged", facet).map_err(&on_err)?;
    }
    for facet in &partition.submerged {
        write_facet(&mut file, "submerged", facet).map_err(&on_err)?;
    }
    file.flush().map_err(&on_err)?;

    Ok(())
}

/// Writes simulation results to two csv files in a directory
///
/// # Arguments
/// * `history` - The draught history of the solve
/// * `partition` - The partition at the final position
/// * `output_dir` - The directory receiving the files
///
/// # Returns
/// The paths of the history and facets files, in that order
pub fn csv_output(
    history: &[DraughtSample],
    partition: &Partition,
    output_dir: &Path,
) -> Result<(PathBuf, PathBuf), DraughtError> {
    if let Err(err) = std::fs::create_dir_all(output_dir) {
        return Err(DraughtError::Output(format!(
            "Failed to create output directory {}: {err}",
            output_dir.display()
        )));
    }

    let history_output = output_dir.join(HISTORY_OUTPUT);
    let facets_output = output_dir.join(FACETS_OUTPUT);

    write_history(history, &history_output)?;
    write_partition(partition, &facets_output)?;

    info!(
        "wrote output to {} and {}",
        history_output.display(),
        facets_output.display()
    );

    Ok((history_output, facets_output))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicBool;

    use super::*;
    use crate::{
        clipper::clip, fixtures::unit_cube, mesh::Mesh, params::SimulationParameters,
        solver::EquilibriumSearch,
    };

    #[test]
    fn writes_history_and_partition() {
        let mut mesh = Mesh::new(unit_cube()).unwrap();
        let params = SimulationParameters {
            object_mass: 500.0,
            dichotomy_tolerance: 0.1,
            ..SimulationParameters::default()
        };
        let solution = EquilibriumSearch::new(&mut mesh, &params)
            .unwrap()
            .run(&AtomicBool::new(false), |_| {})
            .unwrap();
        let partition = clip(&mesh);

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("results");
        let (history_path, facets_path) = csv_output(&solution.history, &partition, &out).unwrap();

        let history = std::fs::read_to_string(history_path).unwrap();
        let lines: Vec<&str> = history.lines().collect();
        assert_eq!(lines[0], "iteration,draught,bottom_ref,lo,hi,buoyant_force_z");
        assert_eq!(lines.len(), solution.history.len() + 1);
        assert!(lines[1].starts_with("0,1,-1,-1,0,"));

        let facets = std::fs::read_to_string(facets_path).unwrap();
        let rows: Vec<&str> = facets.lines().skip(1).collect();
        assert_eq!(rows.len(), partition.emerged.len() + partition.submerged.len());
        assert_eq!(
            rows.iter().filter(|r| r.starts_with("submerged,")).count(),
            partition.submerged.len()
        );
        assert!(rows.iter().all(|r| r.split(',').count() == 13));
    }

    #[test]
    fn unwritable_path_is_an_output_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "").unwrap();

        let err = csv_output(&[], &Partition::default(), &blocker.join("sub")).unwrap_err();
        assert!(matches!(err, DraughtError::Output(_)));
    }
}
