use serde::{Deserialize, Serialize};

use crate::error::Error;

const DEFAULT_CLUSTER: &str = "code-compiler-cluster";
const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_LOG_GROUP: &str = "/aws/ecs/code-compiler";

/// Fixed placement and sizing for every ephemeral task launched on the cluster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Cluster that runs the tasks
    pub cluster: String,

    /// AWS region of the cluster and the log group
    pub region: String,

    /// Subnets for the awsvpc network interface
    pub subnets: Vec<String>,

    /// Security groups attached to the task ENI
    pub security_groups: Vec<String>,

    /// Role used by the agent to pull images and ship logs
    pub execution_role_arn: Option<String>,

    /// CloudWatch log group the awslogs driver writes to
    pub log_group: String,

    /// awslogs stream prefix
    pub log_stream_prefix: String,

    /// Name of the single container in every task definition
    pub container_name: String,

    /// Task-level CPU units (Fargate string form)
    pub cpu: String,

    /// Task-level memory in MiB (Fargate string form)
    pub memory: String,

    pub assign_public_ip: bool,

    /// Overrides the service endpoint, used against local mocks
    #[serde(default)]
    pub endpoint_url: Option<String>,
}

impl ClusterConfig {
    pub fn new(cluster: String, subnets: Vec<String>, security_groups: Vec<String>) -> Self {
        Self {
            cluster,
            region: DEFAULT_REGION.to_string(),
            subnets,
            security_groups,
            execution_role_arn: None,
            log_group: DEFAULT_LOG_GROUP.to_string(),
            log_stream_prefix: "execution".to_string(),
            container_name: "code-executor".to_string(),
            cpu: "256".to_string(),
            memory: "512".to_string(),
            assign_public_ip: true,
            endpoint_url: None,
        }
    }

    /// Build the configuration from the deployment environment.
    ///
    /// `SUBNET_ID` and `SECURITY_GROUP_ID` are required; everything else has a default.
    pub fn from_env() -> Result<Self, Error> {
        let required = |name: &str| {
            std::env::var(name)
                .ok()
                .filter(|v| !v.is_empty())
                .ok_or_else(|| Error::MissingEnvVar(name.to_string()))
        };

        let cluster =
            std::env::var("ECS_CLUSTER_NAME").unwrap_or_else(|_| DEFAULT_CLUSTER.to_string());
        let subnet = required("SUBNET_ID")?;
        let security_group = required("SECURITY_GROUP_ID")?;

        let mut config = Self::new(cluster, vec![subnet], vec![security_group]);
        if let Ok(region) = std::env::var("AWS_REGION") {
            config.region = region;
        }
        if let Ok(role) = std::env::var("EXECUTION_ROLE_ARN") {
            config.execution_role_arn = Some(role);
        }
        if let Ok(group) = std::env::var("LOG_GROUP") {
            config.log_group = group;
        }
        Ok(config)
    }

    pub fn with_region(mut self, region: String) -> Self {
        self.region = region;
        self
    }

    pub fn with_execution_role(mut self, role_arn: String) -> Self {
        self.execution_role_arn = Some(role_arn);
        self
    }

    pub fn with_log_group(mut self, log_group: String) -> Self {
        self.log_group = log_group;
        self
    }

    pub fn with_endpoint_url(mut self, endpoint_url: String) -> Self {
        self.endpoint_url = Some(endpoint_url);
        self
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.cluster.is_empty() {
            return Err(Error::Configuration("cluster name is empty".into()));
        }
        if self.subnets.is_empty() {
            return Err(Error::Configuration("at least one subnet is required".into()));
        }
        if self.security_groups.is_empty() {
            return Err(Error::Configuration(
                "at least one security group is required".into(),
            ));
        }
        Ok(())
    }

    /// Log stream written by the awslogs driver for the given task.
    pub fn log_stream_for(&self, task_arn: &str) -> String {
        let task_id = task_arn.rsplit('/').next().unwrap_or(task_arn);
        format!(
            "{}/{}/{}",
            self.log_stream_prefix, self.container_name, task_id
        )
    }
}
