// Resume enhancement: prompt composition, the Gemini call, and the render hand-off.
// All model calls go through llm_client; all compilation goes through latex::compiler.

pub mod enhancer;
pub mod handlers;
pub mod prompts;
