use std::sync::atomic::{AtomicBool, Ordering};

use indicatif::ProgressBar;
use nalgebra::Vector3;
use tracing::{debug, info, warn};

use crate::{
    buoyancy::archimedes_force,
    clipper::clip,
    datatypes::Partition,
    error::DraughtError,
    mesh::Mesh,
    params::SimulationParameters,
};

/// Bisection bracket on the altitude of the lowest vertex of the mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchState {
    pub lo: f64,
    pub hi: f64,
    pub iteration: u32,
    pub tolerance: f64,
}

impl SearchState {
    /// Initial bracket `[-k * height, 0]`, or `[-1, 0]` for a flat mesh
    ///
    /// # Arguments
    /// * `height` - The height of the mesh
    /// * `depth_coefficient` - The depth coefficient `k`
    /// * `tolerance` - The bracket width at which the search stops
    pub fn new(height: f64, depth_coefficient: f64, tolerance: f64) -> SearchState {
        let lo = if height != 0.0 {
            -depth_coefficient * height
        } else {
            -1.0
        };

        SearchState {
            lo,
            hi: 0.0,
            iteration: 0,
            tolerance,
        }
    }

    pub fn width(&self) -> f64 {
        self.hi - self.lo
    }

    pub fn is_converged(&self) -> bool {
        self.width() <= self.tolerance
    }

    /// Number of halvings left before the bracket fits the tolerance
    pub fn expected_iterations(&self) -> u64 {
        if self.is_converged() {
            return 0;
        }
        (self.width() / self.tolerance).log2().ceil() as u64
    }
}

/// State of the mesh after one bisection step
#[derive(Debug, Clone)]
pub struct Frame {
    pub iteration: u32,
    pub draught: f64,
    pub bottom_ref: f64,
    /// Bracket once the step is committed
    pub bracket: (f64, f64),
    pub buoyant_force: Vector3<f64>,
    pub partition: Partition,
}

/// One row of the draught history
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DraughtSample {
    pub iteration: u32,
    pub draught: f64,
    pub bottom_ref: f64,
    pub lo: f64,
    pub hi: f64,
    pub buoyant_force_z: f64,
}

impl From<&Frame> for DraughtSample {
    fn from(frame: &Frame) -> Self {
        DraughtSample {
            iteration: frame.iteration,
            draught: frame.draught,
            bottom_ref: frame.bottom_ref,
            lo: frame.bracket.0,
            hi: frame.bracket.1,
            buoyant_force_z: frame.buoyant_force.z,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Solution {
    pub draught: f64,
    pub bracket: (f64, f64),
    pub iterations: u32,
    pub buoyant_force: Vector3<f64>,
    pub weight: f64,
    pub cancelled: bool,
    /// Starts with the position before the first step
    pub history: Vec<DraughtSample>,
}

/// Bisection over the vertical position of a mesh until its weight and the
/// Archimedes force balance.
///
/// Assumes the buoyant force grows as the mesh is lowered. This holds for
/// hulls without re-entrant submerged cavities; for other meshes the search
/// still terminates but may settle on a position that is not an equilibrium.
pub struct EquilibriumSearch<'a> {
    mesh: &'a mut Mesh,
    fluid_density: f64,
    state: SearchState,
}

impl<'a> EquilibriumSearch<'a> {
    /// Applies the object mass to the mesh and builds the initial bracket
    pub fn new(
        mesh: &'a mut Mesh,
        params: &SimulationParameters,
    ) -> Result<EquilibriumSearch<'a>, DraughtError> {
        params.validate()?;

        mesh.set_mass(params.object_mass);
        if mesh.height() == 0.0 {
            warn!("mesh has no height, falling back to a [-1, 0] bracket");
        }
        let state = SearchState::new(
            mesh.height(),
            params.depth_coefficient,
            params.dichotomy_tolerance,
        );

        Ok(EquilibriumSearch {
            mesh,
            fluid_density: params.fluid_density,
            state,
        })
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn mesh(&self) -> &Mesh {
        &*self.mesh
    }

    /// Clips the mesh at its current position and integrates the pressure
    fn evaluate(&self) -> Result<(Partition, Vector3<f64>), DraughtError> {
        let partition = clip(&*self.mesh);
        let force = archimedes_force(&partition.submerged, self.fluid_density);

        if !force.z.is_finite() {
            return Err(DraughtError::Geometry(format!(
                "Non-finite buoyant force at bottom altitude {}",
                self.mesh.bottom_ref()
            )));
        }

        Ok((partition, force))
    }

    /// Frame for the current position, without touching the bracket
    pub fn initial_frame(&self) -> Result<Frame, DraughtError> {
        let (partition, buoyant_force) = self.evaluate()?;

        Ok(Frame {
            iteration: self.state.iteration,
            draught: self.mesh.draught(),
            bottom_ref: self.mesh.bottom_ref(),
            bracket: (self.state.lo, self.state.hi),
            buoyant_force,
            partition,
        })
    }

    /// Moves the lowest vertex to the middle of the bracket and keeps the
    /// half where the equilibrium lies. The bracket is left untouched when
    /// the step fails.
    pub fn step(&mut self) -> Result<Frame, DraughtError> {
        let SearchState { lo, hi, .. } = self.state;
        let mid = (lo + hi) / 2.0;

        if !(mid > lo && mid < hi) {
            return Err(DraughtError::Solver(format!(
                "Bracket [{lo}, {hi}] cannot be split further, tolerance {} is too small",
                self.state.tolerance
            )));
        }

        let delta = mid - self.mesh.bottom_ref();
        self.mesh.translate_z(delta);
        let (partition, buoyant_force) = self.evaluate()?;

        // too heavy for this position: the equilibrium lies deeper
        if self.mesh.weight() > buoyant_force.z {
            self.state.hi = mid;
        } else {
            self.state.lo = mid;
        }
        self.state.iteration += 1;

        let frame = Frame {
            iteration: self.state.iteration,
            draught: self.mesh.draught(),
            bottom_ref: self.mesh.bottom_ref(),
            bracket: (self.state.lo, self.state.hi),
            buoyant_force,
            partition,
        };

        debug!(
            "iteration {}: draught {:.6} m, buoyant force {:.3} N, weight {:.3} N",
            frame.iteration,
            frame.draught,
            buoyant_force.z,
            self.mesh.weight()
        );

        Ok(frame)
    }

    /// Runs the bisection until the bracket fits the tolerance
    ///
    /// # Arguments
    /// * `cancel` - Checked before every step; once raised the search stops
    ///     with the last committed bracket
    /// * `on_frame` - Receives the starting frame, then one frame per step
    ///
    /// # Returns
    /// The converged (or interrupted) solution
    pub fn run<F>(&mut self, cancel: &AtomicBool, mut on_frame: F) -> Result<Solution, DraughtError>
    where
        F: FnMut(&Frame),
    {
        info!(
            "launching the dichotomy over [{:.6}, {:.6}]",
            self.state.lo, self.state.hi
        );

        let initial = self.initial_frame()?;
        let mut history: Vec<DraughtSample> = Vec::new();
        history.push(DraughtSample::from(&initial));
        let mut buoyant_force = initial.buoyant_force;
        on_frame(&initial);

        let bar = ProgressBar::new(self.state.expected_iterations());
        let mut cancelled = false;

        while !self.state.is_converged() {
            if cancel.load(Ordering::Relaxed) {
                cancelled = true;
                break;
            }

            let frame = self.step()?;
            bar.inc(1);

            history.push(DraughtSample::from(&frame));
            buoyant_force = frame.buoyant_force;
            on_frame(&frame);
        }
        bar.finish_and_clear();

        if cancelled {
            warn!(
                "dichotomy cancelled after {} iterations",
                self.state.iteration
            );
        } else {
            info!(
                "dichotomy converged in {} iterations, draught {:.6} m",
                self.state.iteration,
                self.mesh.draught()
            );
        }

        Ok(Solution {
            draught: self.mesh.draught(),
            bracket: (self.state.lo, self.state.hi),
            iterations: self.state.iteration,
            buoyant_force,
            weight: self.mesh.weight(),
            cancelled,
            history,
        })
    }
}
