//! # ECS Runner
//!
//! Single-use container tasks on an ECS Fargate cluster. Each task gets its own
//! task definition which is registered right before launch and deregistered
//! after the task has stopped. Output is read back from the CloudWatch log
//! stream the awslogs driver writes for the task.
//!
//! The [`OrchestratorClient`] trait is the seam callers program against;
//! [`EcsClient`] is the AWS-backed implementation.
//!
//! ```rust,no_run
//! use ecs_runner::{ClusterConfig, EcsClient, OrchestratorClient, TaskSpec};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = EcsClient::new(ClusterConfig::from_env()?).await?;
//!
//!     let spec = TaskSpec::new("python:3.9-alpine", vec!["python3".into(), "-V".into()]);
//!     let definition = client.register_task(&spec).await?;
//!     let task = client.run_task(&definition).await?;
//!     println!("Started {}", task);
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod types;

pub use client::{EcsClient, OrchestratorClient};
pub use config::ClusterConfig;
pub use error::Error;
pub use types::*;

/// Result type for orchestration operations
pub type Result<T> = std::result::Result<T, Error>;
