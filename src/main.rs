use std::{path::PathBuf, process::ExitCode, sync::atomic::AtomicBool};

use clap::Parser;
use tracing::{error, info, Level};

use draught::{
    clipper, post_processor, DraughtError, EquilibriumSearch, Fluid, Mesh, SimulationParameters,
};

/// Finds the draught at which a rigid mesh floats in a fluid
#[derive(Parser, Debug)]
#[command(name = "draught", version)]
struct Cli {
    /// Mesh of the floating object, as an STL file
    mesh: PathBuf,

    /// Json parameters file
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Object mass, in kg
    #[arg(long)]
    mass: Option<f64>,

    /// Fluid preset
    #[arg(long, value_enum, conflicts_with = "fluid_density")]
    fluid: Option<Fluid>,

    /// Fluid density, in kg/m^3
    #[arg(long)]
    fluid_density: Option<f64>,

    /// Bracket width at which the dichotomy stops, in m
    #[arg(long)]
    tolerance: Option<f64>,

    /// Scales the initial search depth relative to the mesh height
    #[arg(long)]
    depth_coefficient: Option<f64>,

    /// Directory receiving draught.csv and facets.csv
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Log every dichotomy step
    #[arg(short, long)]
    verbose: bool,
}

/// Merges defaults, the parameters file and command line flags, in that
/// order of precedence
fn resolve_parameters(cli: &Cli) -> Result<SimulationParameters, DraughtError> {
    let mut params = match &cli.input {
        Some(path) => SimulationParameters::load(path)?,
        None => SimulationParameters::default(),
    };

    if let Some(mass) = cli.mass {
        params.object_mass = mass;
    }
    if let Some(fluid) = cli.fluid {
        params.fluid_density = fluid.density();
    }
    if let Some(density) = cli.fluid_density {
        params.fluid_density = density;
    }
    if let Some(tolerance) = cli.tolerance {
        params.dichotomy_tolerance = tolerance;
    }
    if let Some(k) = cli.depth_coefficient {
        params.depth_coefficient = k;
    }

    params.validate()?;
    Ok(params)
}

fn run(cli: &Cli) -> Result<(), DraughtError> {
    let params = resolve_parameters(cli)?;
    info!(
        "mass {} kg, fluid density {} kg/m3, tolerance {}",
        params.object_mass, params.fluid_density, params.dichotomy_tolerance
    );

    let mut mesh = Mesh::from_stl(&cli.mesh)?;

    let cancel = AtomicBool::new(false);
    let solution = EquilibriumSearch::new(&mut mesh, &params)?.run(&cancel, |_| {})?;

    // report as many decimals as the tolerance resolves
    let decimals = (-params.dichotomy_tolerance.log10()).ceil().max(0.0) as usize;
    info!(
        "equilibrium draught: {:.*} m after {} iterations",
        decimals, solution.draught, solution.iterations
    );
    info!(
        "buoyant force {:.3} N against weight {:.3} N",
        solution.buoyant_force.z, solution.weight
    );

    let partition = clipper::clip(&mesh);
    post_processor::csv_output(&solution.history, &partition, &cli.output_dir)?;

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_target(false)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_flags_override_defaults() {
        let cli = Cli::parse_from([
            "draught",
            "hull.stl",
            "--mass",
            "500",
            "--fluid",
            "saltwater",
            "--tolerance",
            "0.01",
        ]);
        let params = resolve_parameters(&cli).unwrap();

        assert_eq!(params.object_mass, 500.0);
        assert_eq!(params.fluid_density, 1025.0);
        assert_eq!(params.dichotomy_tolerance, 0.01);
        assert_eq!(params.depth_coefficient, 1.0);
    }

    #[test]
    fn cli_flags_override_parameters_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("params.json");
        std::fs::write(
            &input,
            r#"{"metadata": {"object_mass": 120, "fluid_density": 1010}}"#,
        )
        .unwrap();

        let cli = Cli::parse_from([
            "draught",
            "hull.stl",
            "--input",
            input.to_str().unwrap(),
            "--fluid-density",
            "1200",
        ]);
        let params = resolve_parameters(&cli).unwrap();

        assert_eq!(params.object_mass, 120.0);
        assert_eq!(params.fluid_density, 1200.0);
    }

    #[test]
    fn preset_and_density_conflict() {
        let res = Cli::try_parse_from([
            "draught",
            "hull.stl",
            "--fluid",
            "freshwater",
            "--fluid-density",
            "990",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn invalid_flag_values_are_rejected() {
        let cli = Cli::parse_from(["draught", "hull.stl", "--tolerance", "0"]);
        assert!(matches!(
            resolve_parameters(&cli),
            Err(DraughtError::Input(_))
        ));
    }
}
