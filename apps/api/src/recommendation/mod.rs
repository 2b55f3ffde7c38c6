// Job recommendation: profile → prompt → inference → parse → validate →
// resolve → fallback. All inference goes through llm_client.

pub mod assembler;
pub mod fallback;
pub mod handlers;
pub mod pipeline;
pub mod profile;
pub mod prompt_builder;
pub mod prompts;
pub mod response_parser;
pub mod validator;
