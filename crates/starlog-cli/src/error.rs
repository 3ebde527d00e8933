use snafu::Snafu;
use starlog_core::pipeline::PipelineError;
use starlog_core::storage::StorageError;

pub type CliResult<T> = std::result::Result<T, CliError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CliError {
    #[snafu(display("Invalid --input-data '{location}'"))]
    InvalidInput {
        location: String,
        source: StorageError,
    },

    #[snafu(display("Invalid --output-data '{location}'"))]
    InvalidOutput {
        location: String,
        source: StorageError,
    },

    #[snafu(display(
        "Pipeline run failed. \
         Check that the input root contains song_data/ and log_data/ and the \
         output root is writable."
    ))]
    RunPipeline {
        #[snafu(source(from(PipelineError, Box::new)))]
        source: Box<PipelineError>,
    },
}
