//! LLM credential providers and their default model choices.

use crate::env::Env;

/// Static description of a credential provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderSpec {
    /// Provider id, also the prefix of its model ids (`anthropic/...`).
    pub name: &'static str,
    /// Environment variable carrying the credential. Several specs may share
    /// one variable; only the first of them counts as available.
    pub credential_env_var: &'static str,
    /// Key under `auth.profiles`.
    pub profile_key: &'static str,
    pub primary_model: &'static str,
    pub fallback_models: &'static [&'static str],
}

/// All known providers, in priority order. The first available provider
/// supplies the primary model when the document has no usable one.
pub const PROVIDERS: &[ProviderSpec] = &[
    ProviderSpec {
        name: "anthropic",
        credential_env_var: "ANTHROPIC_API_KEY",
        profile_key: "anthropic:default",
        primary_model: "anthropic/claude-sonnet-4-5",
        fallback_models: &["anthropic/claude-haiku-4-5"],
    },
    ProviderSpec {
        name: "openai",
        credential_env_var: "OPENAI_API_KEY",
        profile_key: "openai:default",
        primary_model: "openai/gpt-5.2",
        fallback_models: &["openai/gpt-5-mini"],
    },
    ProviderSpec {
        name: "google",
        credential_env_var: "GEMINI_API_KEY",
        profile_key: "google:default",
        primary_model: "google/gemini-3-pro-preview",
        fallback_models: &["google/gemini-3-flash-preview"],
    },
    ProviderSpec {
        name: "openrouter",
        credential_env_var: "OPENROUTER_API_KEY",
        profile_key: "openrouter:default",
        primary_model: "openrouter/anthropic/claude-sonnet-4.5",
        fallback_models: &[],
    },
    ProviderSpec {
        name: "xai",
        credential_env_var: "XAI_API_KEY",
        profile_key: "xai:default",
        primary_model: "xai/grok-4",
        fallback_models: &["xai/grok-4-fast"],
    },
    ProviderSpec {
        name: "moonshot",
        credential_env_var: "MOONSHOT_API_KEY",
        profile_key: "moonshot:default",
        primary_model: "moonshot/kimi-k2.5",
        fallback_models: &[],
    },
    ProviderSpec {
        name: "kimi-coding",
        credential_env_var: "MOONSHOT_API_KEY",
        profile_key: "kimi-coding:default",
        primary_model: "kimi-coding/k2p5",
        fallback_models: &[],
    },
];

/// Providers whose credential is present, in priority order.
///
/// A credential variable is consumed by the first spec that names it, so an
/// alias sharing the variable never shows up as a second available provider.
/// A provider name also appears at most once.
pub fn available_providers<'a>(specs: &'a [ProviderSpec], env: &Env) -> Vec<&'a ProviderSpec> {
    let mut consumed: Vec<&str> = Vec::new();
    let mut available: Vec<&ProviderSpec> = Vec::new();

    for spec in specs {
        if !env.is_set(spec.credential_env_var) || consumed.contains(&spec.credential_env_var) {
            continue;
        }
        consumed.push(spec.credential_env_var);
        if available.iter().any(|existing| existing.name == spec.name) {
            continue;
        }
        available.push(spec);
    }

    available
}

/// Extracts the provider from a model id: everything before the first `/`.
/// An id without a `/` is its own provider name.
pub fn provider_from_model(model: &str) -> &str {
    match model.split_once('/') {
        Some((provider, _)) => provider,
        None => model,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(available: &[&ProviderSpec]) -> Vec<&'static str> {
        available.iter().map(|spec| spec.name).collect()
    }

    #[test]
    fn available_preserves_priority_order() {
        let env = Env::from_pairs([
            ("GEMINI_API_KEY", "g"),
            ("ANTHROPIC_API_KEY", "a"),
            ("XAI_API_KEY", "x"),
        ]);

        assert_eq!(
            names(&available_providers(PROVIDERS, &env)),
            vec!["anthropic", "google", "xai"]
        );
    }

    #[test]
    fn empty_credentials_are_not_available() {
        let env = Env::from_pairs([("ANTHROPIC_API_KEY", ""), ("OPENAI_API_KEY", "  ")]);

        assert!(available_providers(PROVIDERS, &env).is_empty());
    }

    #[test]
    fn shared_credential_counts_once() {
        let env = Env::from_pairs([("MOONSHOT_API_KEY", "sk-moon")]);

        assert_eq!(names(&available_providers(PROVIDERS, &env)), vec!["moonshot"]);
    }

    #[test]
    fn duplicate_provider_names_count_once() {
        let specs = [
            ProviderSpec {
                name: "google",
                credential_env_var: "GEMINI_API_KEY",
                profile_key: "google:default",
                primary_model: "google/gemini-3-pro-preview",
                fallback_models: &[],
            },
            ProviderSpec {
                name: "google",
                credential_env_var: "GOOGLE_API_KEY",
                profile_key: "google:default",
                primary_model: "google/gemini-3-pro-preview",
                fallback_models: &[],
            },
        ];
        let env = Env::from_pairs([("GEMINI_API_KEY", "a"), ("GOOGLE_API_KEY", "b")]);

        assert_eq!(names(&available_providers(&specs, &env)), vec!["google"]);
    }

    #[test]
    fn provider_prefix_is_text_before_first_slash() {
        assert_eq!(provider_from_model("anthropic/claude-sonnet-4-5"), "anthropic");
        assert_eq!(
            provider_from_model("openrouter/anthropic/claude-sonnet-4.5"),
            "openrouter"
        );
        assert_eq!(provider_from_model("gpt-5.2"), "gpt-5.2");
        assert_eq!(provider_from_model(""), "");
    }

    #[test]
    fn every_default_model_belongs_to_its_provider() {
        for spec in PROVIDERS {
            assert_eq!(provider_from_model(spec.primary_model), spec.name);
            for fallback in spec.fallback_models {
                assert_eq!(provider_from_model(fallback), spec.name);
            }
        }
    }
}
