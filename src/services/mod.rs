pub mod error_policy;
pub mod gemini_transport;
pub mod generation_client;
pub mod openai_transport;
pub mod progress;
pub mod prompt_builder;
pub mod response_parser;
pub mod task_store;

pub use error_policy::ErrorPresentation;
pub use gemini_transport::GeminiTransport;
pub use generation_client::{GenerationClient, GenerationTransport, TransportError};
pub use openai_transport::OpenAiTransport;
pub use progress::CategoryStats;
pub use prompt_builder::{GenerationRequest, PromptBuilder};
pub use task_store::TaskStore;
