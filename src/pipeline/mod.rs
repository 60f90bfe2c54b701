use std::fmt;

pub mod outcome;
pub mod runner;

#[derive(Debug)]
pub struct PipelineError;

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Pipeline error")
    }
}

impl std::error::Error for PipelineError {}

pub type PipelineResult<T> = error_stack::Result<T, PipelineError>;
