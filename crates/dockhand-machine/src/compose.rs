use dockhand_core::DeployConfig;

use crate::env::MachineEnv;
use crate::error::ExecError;
use crate::executor::{CommandExecutor, CommandSpec, RealExecutor};
use crate::progress::{BuildProgress, ProgressSink};

/// Primary compose file; every invocation that names files starts with it.
pub const COMPOSE_FILE: &str = "docker-compose.yml";

const DOCKER_COMPOSE: &str = "docker-compose";

/// docker-compose operations client, parameterized over the executor
/// for testability.
///
/// Build and push run against the local engine with the inherited
/// environment; pull and up run with the machine environment as the
/// child's entire environment, so the compose CLI targets the remote
/// engine.
pub struct ComposeClient<E: CommandExecutor = RealExecutor> {
    executor: E,
    project: Option<String>,
    additional_files: Vec<String>,
}

impl ComposeClient<RealExecutor> {
    /// Client for the stack described by the given configuration.
    pub fn new(config: &DeployConfig) -> Self {
        Self::with_executor(RealExecutor, config)
    }
}

impl<E: CommandExecutor> ComposeClient<E> {
    pub fn with_executor(executor: E, config: &DeployConfig) -> Self {
        Self {
            executor,
            project: config.name.clone(),
            additional_files: config.additional_compose_files.clone(),
        }
    }

    /// Build all images locally: `docker-compose <proj> build`.
    ///
    /// The one stream-inspected stage: output lines feed `sink` through
    /// [`BuildProgress`] while the build runs.
    pub async fn build(&self, sink: &mut dyn ProgressSink) -> Result<(), ExecError> {
        let mut args = self.project_args();
        args.push("build".to_owned());
        let spec = CommandSpec::new(DOCKER_COMPOSE, args);

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let mut progress = BuildProgress::new(sink);
        let (status, ()) = tokio::join!(self.executor.run_streaming(spec, tx), async {
            while let Some(line) = rx.recv().await {
                progress.observe(&line);
            }
        });
        status
    }

    /// Push built images to their registries:
    /// `docker-compose -f docker-compose.yml <proj> push`.
    pub async fn push(&self) -> Result<(), ExecError> {
        let mut args = vec!["-f".to_owned(), COMPOSE_FILE.to_owned()];
        args.extend(self.project_args());
        args.push("push".to_owned());
        self.executor
            .run(CommandSpec::new(DOCKER_COMPOSE, args))
            .await?;
        Ok(())
    }

    /// Pull pushed images on the remote engine:
    /// `docker-compose -f docker-compose.yml <proj> pull`.
    pub async fn pull(&self, env: &MachineEnv) -> Result<(), ExecError> {
        let mut args = vec!["-f".to_owned(), COMPOSE_FILE.to_owned()];
        args.extend(self.project_args());
        args.push("pull".to_owned());
        self.executor
            .run(CommandSpec::new(DOCKER_COMPOSE, args).with_env(env.vars().clone()))
            .await?;
        Ok(())
    }

    /// Recreate the stack on the remote engine:
    /// `docker-compose <files> <proj> up -d --remove-orphans`.
    ///
    /// The only stage that consults the additional compose files.
    pub async fn up(&self, env: &MachineEnv) -> Result<(), ExecError> {
        let mut args = self.file_args();
        args.extend(self.project_args());
        args.extend(["up", "-d", "--remove-orphans"].map(String::from));
        self.executor
            .run(CommandSpec::new(DOCKER_COMPOSE, args).with_env(env.vars().clone()))
            .await?;
        Ok(())
    }

    /// `-p <name>` when a project name is configured.
    fn project_args(&self) -> Vec<String> {
        match &self.project {
            Some(name) => vec!["-p".to_owned(), name.clone()],
            None => Vec::new(),
        }
    }

    /// `-f` flags for up: the primary file, then every additional file,
    /// in configured order.
    fn file_args(&self) -> Vec<String> {
        let mut args = vec!["-f".to_owned(), COMPOSE_FILE.to_owned()];
        for file in &self.additional_files {
            args.push("-f".to_owned());
            args.push(file.clone());
        }
        args
    }
}
