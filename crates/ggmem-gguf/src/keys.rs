//! GGUF metadata key names.
//!
//! Architecture-specific fields live under `<architecture>.<field>`;
//! the suffixes below are joined with the architecture by [`arch_key`].

/// Key naming the model architecture.
pub const ARCHITECTURE: &str = "general.architecture";

/// Tokenizer vocabulary; its length stands in for a missing vocab size.
pub const TOKENIZER_TOKENS: &str = "tokenizer.ggml.tokens";

pub const BLOCK_COUNT: &str = "block_count";
pub const EMBEDDING_LENGTH: &str = "embedding_length";
pub const HEAD_COUNT: &str = "attention.head_count";
/// Scalar kv head count, or a per-layer array for hybrid models.
pub const HEAD_COUNT_KV: &str = "attention.head_count_kv";
pub const VOCAB_SIZE: &str = "vocab_size";
pub const KEY_LENGTH: &str = "attention.key_length";
pub const VALUE_LENGTH: &str = "attention.value_length";
pub const SLIDING_WINDOW: &str = "attention.sliding_window";
pub const SLIDING_WINDOW_PATTERN: &str = "attention.sliding_window_pattern";

/// Full key for an architecture-specific field (e.g. `llama.block_count`).
#[must_use]
pub fn arch_key(architecture: &str, field: &str) -> String {
    format!("{architecture}.{field}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arch_key() {
        assert_eq!(arch_key("llama", BLOCK_COUNT), "llama.block_count");
        assert_eq!(
            arch_key("gemma3n", SLIDING_WINDOW_PATTERN),
            "gemma3n.attention.sliding_window_pattern"
        );
    }
}
