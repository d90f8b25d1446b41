use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoopEvoError {
	#[error("verify error: {0}")]
	VerifyError(String),
	#[error("system error: {0}")]
	SystemError(String),
}

pub type Result<T> = std::result::Result<T, LoopEvoError>;
