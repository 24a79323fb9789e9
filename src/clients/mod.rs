pub mod llm_client;
pub mod pubmed_client;

pub use llm_client::{build_language_model, LanguageModel, OpenAiLanguageModel};
pub use pubmed_client::{LiteratureDatabase, PubMedClient};
