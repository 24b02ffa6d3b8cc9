pub mod limited_model;
pub mod llm_client;

pub use limited_model::LimitedModel;
pub use llm_client::{LanguageModel, OpenAiClient};
