//! Route paths.

/// Chat relay endpoint.
pub const POST_CHAT: &str = "/chat";

/// Serverless-function path the chat endpoint was first published under.
pub const POST_FUNCTIONS_CHAT: &str = "/.netlify/functions/chat";
