use thiserror::Error;

#[derive(Error, Debug)]
pub enum SecretError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Secret too large: {actual} bytes exceeds the {limit} byte limit")]
    TooLarge { limit: usize, actual: usize },
}

#[derive(Error, Debug)]
pub enum GitError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("`git {command}` exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },
}
