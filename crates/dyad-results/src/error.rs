use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResultsError {
    #[error("results file error: {0}")]
    Io(#[from] std::io::Error),
}
