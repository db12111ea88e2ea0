//! Command dispatch: turns parsed [`crate::cli::Cli`] flags into a
//! [`dvh_pipeline::PipelineConfig`] and drives the pipeline.

mod run;

use dvh_util::errors::DvhError;

use crate::cli::Cli;

pub async fn dispatch(cli: Cli) -> Result<(), DvhError> {
    run::exec(cli).await
}
