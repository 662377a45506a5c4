//! Process drivers for dockhand.
//!
//! Everything that talks to an external CLI lives here: the
//! [`CommandExecutor`] seam over tokio::process, the `docker-machine`
//! environment resolver ([`MachineClient`]), the `docker-compose`
//! invocation client ([`ComposeClient`]), and the build progress parser
//! ([`BuildProgress`]).

pub mod compose;
pub mod env;
pub mod error;
pub mod executor;
pub mod progress;

pub use compose::{COMPOSE_FILE, ComposeClient};
pub use env::{DEFAULT_PATH, MachineClient, MachineEnv};
pub use error::{EnvError, ExecError};
pub use executor::{
    CommandExecutor, CommandOutput, CommandSpec, DEFAULT_MAX_OUTPUT, OutputLine, RealExecutor,
    StreamSource,
};
pub use progress::{BuildProgress, ProgressSink};
