//! # relay_core
//!
//! Core logic for the chat relay: the hosted-assistant abstraction and its
//! OpenAI client, the reply sanitizer, and the per-request relay procedure.

pub mod assistant;
pub mod relay;
pub mod sanitize;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}
