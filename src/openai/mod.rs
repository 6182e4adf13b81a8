// OpenAI API client — moderation and chat completions over HTTP.
//
// One shared reqwest client per run. The moderation classifier and the
// aggressiveness completion backend both wrap it.

pub mod client;
pub mod types;
