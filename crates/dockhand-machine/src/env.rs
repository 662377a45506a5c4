use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{EnvError, ExecError};
use crate::executor::{CommandExecutor, CommandSpec, RealExecutor};

/// Injected when `docker-machine env` exports no PATH of its own.
pub const DEFAULT_PATH: &str = "/usr/local/bin:/usr/local/sbin:/usr/bin:/bin:/usr/sbin:/sbin";

const DOCKER_MACHINE: &str = "docker-machine";

/// `export NAME="VALUE"` assignments in shell-export output.
static EXPORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"export (\w+)="(.+?)""#).expect("could not compile pattern"));

/// Environment exported by `docker-machine env`, as NAME → value pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MachineEnv {
    vars: HashMap<String, String>,
}

impl MachineEnv {
    /// Scan shell-export output for `export NAME="VALUE"` assignments.
    ///
    /// Values are taken literally up to the next `"`; no shell
    /// unescaping is applied. Lines that do not match are skipped.
    pub fn parse(output: &str) -> Self {
        let vars = EXPORT
            .captures_iter(output)
            .map(|caps| (caps[1].to_owned(), caps[2].to_owned()))
            .collect();
        Self { vars }
    }

    /// Inject [`DEFAULT_PATH`] when the machine exported no PATH.
    /// An exported PATH is left untouched.
    pub fn with_default_path(mut self) -> Self {
        self.vars
            .entry("PATH".to_owned())
            .or_insert_with(|| DEFAULT_PATH.to_owned());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The full map, in the shape [`CommandSpec::with_env`] takes.
    pub fn vars(&self) -> &HashMap<String, String> {
        &self.vars
    }
}

/// docker-machine operations client, parameterized over the executor
/// for testability.
pub struct MachineClient<E: CommandExecutor = RealExecutor> {
    executor: E,
}

impl MachineClient<RealExecutor> {
    pub fn new() -> Self {
        Self {
            executor: RealExecutor,
        }
    }
}

impl Default for MachineClient<RealExecutor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: CommandExecutor> MachineClient<E> {
    pub fn with_executor(executor: E) -> Self {
        Self { executor }
    }

    /// Resolve the connection environment of a machine:
    /// `docker-machine env --shell bash <machine>`.
    ///
    /// One query per run; a failing tool is fatal to the caller. The
    /// returned map always carries a PATH entry.
    pub async fn env(&self, machine: &str) -> Result<MachineEnv, EnvError> {
        let spec = CommandSpec::new(DOCKER_MACHINE, ["env", "--shell", "bash", machine]);
        let output = self.executor.run(spec).await.map_err(|e| match e {
            ExecError::CommandFailed { stderr, .. } => EnvError::Unavailable {
                machine: machine.to_owned(),
                stderr,
            },
            other => EnvError::Exec(other),
        })?;

        let env = MachineEnv::parse(&output.stdout).with_default_path();
        tracing::debug!(machine, vars = env.len(), "resolved machine environment");
        Ok(env)
    }
}
