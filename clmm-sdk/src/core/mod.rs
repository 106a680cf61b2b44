pub mod error;

pub use error::{SdkError, SdkResult};
