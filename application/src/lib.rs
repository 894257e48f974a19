pub mod dto;
pub mod error;
pub mod usecase;

pub use dto::*;
pub use error::ApplicationError;
pub use usecase::{AnalyzeCallUseCase, AnalyzeCallUseCaseImpl};
