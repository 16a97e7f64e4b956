// Library interface for newsdigest modules
// This allows tests and the binaries to import modules

pub mod digest;
pub mod filter;
pub mod ingestion;
pub mod llm;
pub mod notify;
pub mod pipeline;
