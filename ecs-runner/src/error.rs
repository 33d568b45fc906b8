use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Orchestrator API error: {0}")]
    Api(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Response missing required field: {0}")]
    MissingField(&'static str),

    #[error("Task launch failed: {0}")]
    TaskLaunch(String),

    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),
}
