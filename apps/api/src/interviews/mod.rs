// Mock interviews and PYQ question sets: prompt, Gemini generation, validation, storage.
// All LLM calls go through llm_client.

pub mod handlers;
pub mod prompts;
pub mod service;
pub mod store;
