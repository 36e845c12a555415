pub mod gateway;
pub mod llm;
