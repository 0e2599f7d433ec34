mod chat_completion;
mod chat_completion_stream;
mod error;
mod models;

pub use chat_completion::*;
pub use chat_completion_stream::*;
pub use error::*;
pub use models::*;
