use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_cloudwatchlogs as cloudwatch_logs;
use aws_sdk_ecs::{
    config::{Credentials, Region},
    error::DisplayErrorContext,
    types::{
        AssignPublicIp, AwsVpcConfiguration, Compatibility, ContainerDefinition, KeyValuePair,
        LaunchType, LogConfiguration, LogDriver, NetworkConfiguration, NetworkMode,
    },
};
use tracing::debug;

use crate::{
    config::ClusterConfig,
    error::Error,
    types::{LogEvent, TaskSnapshot, TaskSpec, TaskStatus},
};

/// Upper bound on log pages read for one task.
const MAX_LOG_PAGES: usize = 100;

/// Operations the remote strategy needs from a container platform.
///
/// One client is created per process and shared by every execution; all
/// per-execution state lives in the ARNs passed back and forth.
#[async_trait]
pub trait OrchestratorClient: Send + Sync {
    /// Register a task definition and return its ARN.
    async fn register_task(&self, spec: &TaskSpec) -> Result<String, Error>;

    /// Launch one instance of a registered definition and return the task ARN.
    async fn run_task(&self, definition_arn: &str) -> Result<String, Error>;

    async fn describe_task(&self, task_arn: &str) -> Result<TaskSnapshot, Error>;

    async fn stop_task(&self, task_arn: &str, reason: &str) -> Result<(), Error>;

    async fn deregister_task(&self, definition_arn: &str) -> Result<(), Error>;

    /// Log events written by the task, oldest first.
    async fn fetch_logs(&self, task_arn: &str) -> Result<Vec<LogEvent>, Error>;
}

/// [`OrchestratorClient`] backed by ECS Fargate and CloudWatch Logs.
#[derive(Clone)]
pub struct EcsClient {
    ecs: aws_sdk_ecs::Client,
    logs: cloudwatch_logs::Client,
    config: ClusterConfig,
}

impl EcsClient {
    /// Create a client using the default AWS credential chain.
    pub async fn new(config: ClusterConfig) -> Result<Self, Error> {
        config.validate()?;

        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(config.region.clone()));
        if let Some(endpoint_url) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint_url);
        }
        let shared = loader.load().await;

        Ok(Self {
            ecs: aws_sdk_ecs::Client::new(&shared),
            logs: cloudwatch_logs::Client::new(&shared),
            config,
        })
    }

    /// Create a client with fixed credentials, bypassing the credential chain.
    pub fn with_static_credentials(
        config: ClusterConfig,
        access_key: &str,
        secret_key: &str,
    ) -> Result<Self, Error> {
        config.validate()?;

        let credentials = Credentials::new(access_key, secret_key, None, None, "ecs-runner");

        let mut ecs_config = aws_sdk_ecs::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials.clone());
        let mut logs_config = cloudwatch_logs::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(cloudwatch_logs::config::Region::new(config.region.clone()))
            .credentials_provider(credentials);
        if let Some(endpoint_url) = &config.endpoint_url {
            ecs_config = ecs_config.endpoint_url(endpoint_url);
            logs_config = logs_config.endpoint_url(endpoint_url);
        }

        Ok(Self {
            ecs: aws_sdk_ecs::Client::from_conf(ecs_config.build()),
            logs: cloudwatch_logs::Client::from_conf(logs_config.build()),
            config,
        })
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    fn container_definition(&self, spec: &TaskSpec) -> Result<ContainerDefinition, Error> {
        let log_configuration = LogConfiguration::builder()
            .log_driver(LogDriver::Awslogs)
            .options("awslogs-group", &self.config.log_group)
            .options("awslogs-region", &self.config.region)
            .options("awslogs-stream-prefix", &self.config.log_stream_prefix)
            .build()
            .map_err(|e| Error::Configuration(e.to_string()))?;

        let environment = spec
            .environment
            .iter()
            .map(|(name, value)| KeyValuePair::builder().name(name).value(value).build())
            .collect::<Vec<_>>();

        Ok(ContainerDefinition::builder()
            .name(&self.config.container_name)
            .image(&spec.image)
            .set_command(Some(spec.command.clone()))
            .essential(true)
            .log_configuration(log_configuration)
            .set_environment(Some(environment))
            .build())
    }
}

fn api_error<E: std::error::Error>(err: E) -> Error {
    Error::Api(DisplayErrorContext(err).to_string())
}

#[async_trait]
impl OrchestratorClient for EcsClient {
    async fn register_task(&self, spec: &TaskSpec) -> Result<String, Error> {
        let output = self
            .ecs
            .register_task_definition()
            .family(&spec.family)
            .network_mode(NetworkMode::Awsvpc)
            .requires_compatibilities(Compatibility::Fargate)
            .cpu(&self.config.cpu)
            .memory(&self.config.memory)
            .set_execution_role_arn(self.config.execution_role_arn.clone())
            .container_definitions(self.container_definition(spec)?)
            .send()
            .await
            .map_err(api_error)?;

        let arn = output
            .task_definition()
            .and_then(|definition| definition.task_definition_arn())
            .ok_or(Error::MissingField("taskDefinition.taskDefinitionArn"))?;
        debug!("Registered task definition {}", arn);
        Ok(arn.to_string())
    }

    async fn run_task(&self, definition_arn: &str) -> Result<String, Error> {
        let vpc = AwsVpcConfiguration::builder()
            .set_subnets(Some(self.config.subnets.clone()))
            .set_security_groups(Some(self.config.security_groups.clone()))
            .assign_public_ip(if self.config.assign_public_ip {
                AssignPublicIp::Enabled
            } else {
                AssignPublicIp::Disabled
            })
            .build()
            .map_err(|e| Error::Configuration(e.to_string()))?;

        let output = self
            .ecs
            .run_task()
            .cluster(&self.config.cluster)
            .task_definition(definition_arn)
            .launch_type(LaunchType::Fargate)
            .network_configuration(
                NetworkConfiguration::builder()
                    .awsvpc_configuration(vpc)
                    .build(),
            )
            .send()
            .await
            .map_err(api_error)?;

        if let Some(failure) = output.failures().first() {
            return Err(Error::TaskLaunch(
                failure
                    .reason()
                    .or(failure.detail())
                    .unwrap_or("unknown failure")
                    .to_string(),
            ));
        }

        let arn = output
            .tasks()
            .first()
            .and_then(|task| task.task_arn())
            .ok_or(Error::MissingField("tasks[0].taskArn"))?;
        debug!("Started task {}", arn);
        Ok(arn.to_string())
    }

    async fn describe_task(&self, task_arn: &str) -> Result<TaskSnapshot, Error> {
        let output = self
            .ecs
            .describe_tasks()
            .cluster(&self.config.cluster)
            .tasks(task_arn)
            .send()
            .await
            .map_err(api_error)?;

        let task = output
            .tasks()
            .first()
            .ok_or(Error::MissingField("tasks[0]"))?;

        Ok(TaskSnapshot {
            status: TaskStatus::parse(task.last_status().unwrap_or_default()),
            stop_code: task.stop_code().map(|code| code.as_str().to_string()),
            stopped_reason: task.stopped_reason().map(str::to_string),
            exit_code: task
                .containers()
                .first()
                .and_then(|container| container.exit_code()),
        })
    }

    async fn stop_task(&self, task_arn: &str, reason: &str) -> Result<(), Error> {
        self.ecs
            .stop_task()
            .cluster(&self.config.cluster)
            .task(task_arn)
            .reason(reason)
            .send()
            .await
            .map_err(api_error)?;
        debug!("Requested stop of task {}", task_arn);
        Ok(())
    }

    async fn deregister_task(&self, definition_arn: &str) -> Result<(), Error> {
        self.ecs
            .deregister_task_definition()
            .task_definition(definition_arn)
            .send()
            .await
            .map_err(api_error)?;
        debug!("Deregistered task definition {}", definition_arn);
        Ok(())
    }

    async fn fetch_logs(&self, task_arn: &str) -> Result<Vec<LogEvent>, Error> {
        let stream = self.config.log_stream_for(task_arn);
        let mut events = Vec::new();
        let mut token: Option<String> = None;

        for _ in 0..MAX_LOG_PAGES {
            let output = self
                .logs
                .get_log_events()
                .log_group_name(&self.config.log_group)
                .log_stream_name(&stream)
                .start_from_head(true)
                .set_next_token(token.clone())
                .send()
                .await
                .map_err(api_error)?;

            let page = output.events();
            events.extend(page.iter().map(|event| LogEvent {
                timestamp: event.timestamp(),
                message: event.message().unwrap_or_default().to_string(),
            }));

            // The forward token repeats once the end of the stream is reached.
            let next = output.next_forward_token().map(str::to_string);
            if page.is_empty() || next.is_none() || next == token {
                break;
            }
            token = next;
        }

        Ok(events)
    }
}
