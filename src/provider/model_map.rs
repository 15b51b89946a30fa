use crate::provider::ProviderError;

const ANTHROPIC_MODELS: [(&str, &str); 3] = [
    ("sonnet", "claude-sonnet-4-5"),
    ("opus", "claude-opus-4-6"),
    ("haiku", "claude-haiku-4-5"),
];

/// Accepts a short alias or an already-resolved Anthropic model id.
pub fn resolve_anthropic_model(model: &str) -> Result<String, ProviderError> {
    let model = model.trim();
    ANTHROPIC_MODELS
        .iter()
        .find(|(alias, resolved)| *alias == model || *resolved == model)
        .map(|(_, resolved)| resolved.to_string())
        .ok_or_else(|| ProviderError::UnsupportedAnthropicModel(model.to_string()))
}
