mod chat_stream;
mod model_catalog;

pub use chat_stream::*;
pub use model_catalog::*;
