use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("{0} already running")]
    AlreadyRunning(&'static str),
}
