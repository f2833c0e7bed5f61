use std::path::Path;

use json::JsonValue;
use tracing::{debug, info};

use crate::error::DraughtError;

pub const DEFAULT_OBJECT_MASS: f64 = 1000.0;
pub const FRESHWATER_DENSITY: f64 = 1000.0;
pub const SALTWATER_DENSITY: f64 = 1025.0;
pub const DEFAULT_DICHOTOMY_TOLERANCE: f64 = 1e-3;
pub const DEFAULT_DEPTH_COEFFICIENT: f64 = 1.0;

/// Fluid presets selectable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Fluid {
    Freshwater,
    Saltwater,
}

impl Fluid {
    pub fn density(self) -> f64 {
        match self {
            Fluid::Freshwater => FRESHWATER_DENSITY,
            Fluid::Saltwater => SALTWATER_DENSITY,
        }
    }
}

/// Parameters of one equilibrium solve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationParameters {
    /// Object mass, in kg
    pub object_mass: f64,
    /// Fluid density, in kg/m^3
    pub fluid_density: f64,
    /// Bracket width at which the bisection stops, in m
    pub dichotomy_tolerance: f64,
    /// Scales the initial bracket `[-k * height, 0]`
    pub depth_coefficient: f64,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        SimulationParameters {
            object_mass: DEFAULT_OBJECT_MASS,
            fluid_density: FRESHWATER_DENSITY,
            dichotomy_tolerance: DEFAULT_DICHOTOMY_TOLERANCE,
            depth_coefficient: DEFAULT_DEPTH_COEFFICIENT,
        }
    }
}

/// Reads an optional numeric field from the metadata section
///
/// # Arguments
/// * `metadata` - The metadata section of the parameters file
/// * `key` - The field name
/// * `fallback` - The value used when the field is absent
///
/// # Returns
/// The parsed value, or the fallback
fn read_field(metadata: &JsonValue, key: &str, fallback: f64) -> Result<f64, DraughtError> {
    if !metadata.has_key(key) {
        return Ok(fallback);
    }

    match metadata[key].as_f64() {
        Some(v) => Ok(v),
        None => Err(DraughtError::Input(format!(
            "Bad value for {key} in parameters file"
        ))),
    }
}

impl SimulationParameters {
    /// Parses simulation parameters from the contents of a json parameters
    /// file. Missing fields keep their default value.
    pub fn from_json(contents: &str) -> Result<SimulationParameters, DraughtError> {
        let input_json = match json::parse(contents) {
            Ok(j) => j,
            Err(err) => {
                return Err(DraughtError::Input(format!(
                    "Error in parameters json: {err}"
                )))
            }
        };

        if !input_json.has_key("metadata") {
            return Err(DraughtError::Input(
                "Parameters json missing metadata field".to_owned(),
            ));
        }
        let metadata = &input_json["metadata"];
        if !metadata.is_object() {
            return Err(DraughtError::Input(
                "Parameters json metadata field must be an object".to_owned(),
            ));
        }

        let defaults = SimulationParameters::default();

        let params = SimulationParameters {
            object_mass: read_field(metadata, "object_mass", defaults.object_mass)?,
            fluid_density: read_field(metadata, "fluid_density", defaults.fluid_density)?,
            dichotomy_tolerance: read_field(
                metadata,
                "dichotomy_tolerance",
                defaults.dichotomy_tolerance,
            )?,
            depth_coefficient: read_field(
                metadata,
                "depth_coefficient",
                defaults.depth_coefficient,
            )?,
        };

        params.validate()?;
        Ok(params)
    }

    /// Loads simulation parameters from a json file
    pub fn load(input_file: &Path) -> Result<SimulationParameters, DraughtError> {
        let contents = match std::fs::read_to_string(input_file) {
            Ok(c) => c,
            Err(err) => {
                return Err(DraughtError::Input(format!(
                    "Unable to open parameters file {}: {err}",
                    input_file.display()
                )))
            }
        };

        let params = SimulationParameters::from_json(&contents)?;
        info!("loaded parameters from {}", input_file.display());
        debug!("{:?}", params);

        Ok(params)
    }

    /// Rejects values the solver cannot work with
    pub fn validate(&self) -> Result<(), DraughtError> {
        if !self.object_mass.is_finite() || self.object_mass < 0.0 {
            return Err(DraughtError::Input(format!(
                "Object mass must be a non-negative number, got {}",
                self.object_mass
            )));
        }
        if !self.fluid_density.is_finite() || self.fluid_density <= 0.0 {
            return Err(DraughtError::Input(format!(
                "Fluid density must be positive, got {}",
                self.fluid_density
            )));
        }
        if !self.dichotomy_tolerance.is_finite() || self.dichotomy_tolerance <= 0.0 {
            return Err(DraughtError::Input(format!(
                "Dichotomy tolerance must be positive, got {}",
                self.dichotomy_tolerance
            )));
        }
        if !self.depth_coefficient.is_finite() || self.depth_coefficient <= 0.0 {
            return Err(DraughtError::Input(format!(
                "Depth coefficient must be positive, got {}",
                self.depth_coefficient
            )));
        }

        Ok(())
    }
}
