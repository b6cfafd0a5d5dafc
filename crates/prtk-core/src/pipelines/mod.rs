pub mod material;
pub mod run_log;

pub use material::{GroupFailure, MaterialPipeline, RunSummary};
pub use run_log::{RUN_LOG_FILE_NAME, RunLog};

use crate::domain::{ProjectDescription, TableResult};

pub trait PipelineExecutor {
    fn execute(&self, description: &ProjectDescription) -> TableResult<RunSummary>;
}
