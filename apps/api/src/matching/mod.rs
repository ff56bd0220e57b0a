// Resume matching: ranks a batch of resumes against one job description.
// Flow: extract → oracle (one Claude call per resume) → interpret, with fallback
// scoring at each failure point, then a stable sort and top-K cut.
// All LLM calls go through llm_client; no direct Anthropic calls here.

pub mod extract;
pub mod fallback;
pub mod handlers;
pub mod interpret;
pub mod models;
pub mod oracle;
pub mod pipeline;
pub mod prompts;
pub mod runs;
