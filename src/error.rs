use thiserror::Error;

#[derive(Debug, Error)]
pub enum DraughtError {
    #[error("Input error: {0}")]
    Input(String),
    #[error("Geometry error: {0}")]
    Geometry(String),
    #[error("Solver error: {0}")]
    Solver(String),
    #[error("Output error: {0}")]
    Output(String),
}
