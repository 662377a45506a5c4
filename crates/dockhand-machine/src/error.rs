#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("{program} not found — is it installed and on PATH?")]
    NotFound {
        program: String,
        source: std::io::Error,
    },

    #[error("{program} {args:?} exited with code {code:?}\n{stderr}")]
    CommandFailed {
        program: String,
        args: Vec<String>,
        code: Option<i32>,
        stderr: String,
    },

    #[error("output of {program} exceeded the {limit} byte capture limit")]
    OutputTooLarge { program: String, limit: usize },

    #[error("{program} output was not valid UTF-8")]
    InvalidUtf8 {
        program: String,
        source: std::string::FromUtf8Error,
    },

    #[error("failed reading output of {program}")]
    OutputRead {
        program: String,
        source: std::io::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum EnvError {
    #[error("could not read the environment of machine '{machine}'\n{stderr}")]
    Unavailable { machine: String, stderr: String },

    #[error(transparent)]
    Exec(#[from] ExecError),
}
