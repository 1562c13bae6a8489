pub mod error;
pub mod http;
pub mod metadata;
pub mod model;

pub use error::{KagentError, error_code_to_message};
pub use model::*;
