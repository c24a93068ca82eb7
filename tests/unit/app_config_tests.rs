/*!
 * Tests for application configuration functionality
 */

use tldw::app_config::{Config, ProviderConfig, SummaryProvider};

/// Test default configuration values
#[test]
fn test_defaultConfig_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.languages, vec!["en", "es"]);
    assert_eq!(config.summarize.provider, SummaryProvider::OpenAI);
    assert_eq!(config.summarize.common.temperature, 0.3);
    assert_eq!(config.summarize.common.max_response_tokens, 1500);
    assert_eq!(config.batch.max_concurrent, 3);
    assert_eq!(config.batch.timeout_per_video_secs, 300);
    assert!(!config.batch.retry_failed);
    assert_eq!(config.cache.transcript_ttl_secs, 3600);
    assert_eq!(config.chunking.max_tokens, 2000);
    assert_eq!(config.chunking.max_chars, 8000);

    // Both providers are registered out of the box
    let openai = config
        .summarize
        .get_provider_config(&SummaryProvider::OpenAI)
        .expect("OpenAI provider config should exist");
    assert_eq!(openai.model, "gpt-4o-mini");
    assert_eq!(openai.endpoint, "https://api.openai.com");

    let anthropic = config
        .summarize
        .get_provider_config(&SummaryProvider::Anthropic)
        .expect("Anthropic provider config should exist");
    assert_eq!(anthropic.model, "claude-3-haiku");
}

/// A default config with an API key set passes validation
fn valid_config() -> Config {
    let mut config = Config::default();
    if let Some(provider) = config
        .summarize
        .available_providers
        .iter_mut()
        .find(|p| p.provider_type == "openai")
    {
        provider.api_key = "sk-1234567890".to_string();
    }
    config
}

#[test]
fn test_validate_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = valid_config();
    assert!(config.validate().is_ok());

    // Missing API key for the active provider
    config.summarize.available_providers[0].api_key = String::new();
    assert!(config.validate().is_err());
    config.summarize.available_providers[0].api_key = "sk-1234567890".to_string();

    // Empty language list
    config.languages = Vec::new();
    assert!(config.validate().is_err());

    // Invalid language code
    config.languages = vec!["xx-not-a-language".to_string()];
    assert!(config.validate().is_err());
    config.languages = vec!["en".to_string()];

    // Temperature out of range
    config.summarize.common.temperature = 2.5;
    assert!(config.validate().is_err());
    config.summarize.common.temperature = 0.3;

    // Zero concurrency
    config.batch.max_concurrent = 0;
    assert!(config.validate().is_err());
    config.batch.max_concurrent = 3;

    assert!(config.validate().is_ok());
}

#[test]
fn test_configFile_roundTrip_shouldPreserveValues() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conf.json");

    let mut config = valid_config();
    config.summarize.provider = SummaryProvider::Anthropic;
    config.batch.max_concurrent = 5;
    config.languages = vec!["fr".to_string(), "en".to_string()];

    config.to_file(&path).unwrap();
    let loaded = Config::from_file(&path).unwrap();

    assert_eq!(loaded.summarize.provider, SummaryProvider::Anthropic);
    assert_eq!(loaded.batch.max_concurrent, 5);
    assert_eq!(loaded.languages, vec!["fr", "en"]);
}

#[test]
fn test_fromFile_withMissingFile_shouldFail() {
    let dir = tempfile::tempdir().unwrap();
    assert!(Config::from_file(dir.path().join("nope.json")).is_err());
}

#[test]
fn test_fromFile_withPartialJson_shouldFillDefaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conf.json");
    std::fs::write(&path, r#"{"languages": ["de"]}"#).unwrap();

    let config = Config::from_file(&path).unwrap();
    assert_eq!(config.languages, vec!["de"]);
    assert_eq!(config.summarize.provider, SummaryProvider::OpenAI);
    assert_eq!(config.batch.timeout_per_video_secs, 300);
}

#[test]
fn test_getModel_withEmptyProviderModel_shouldFallBackToDefault() {
    let mut config = Config::default();
    config.summarize.available_providers = vec![ProviderConfig {
        model: String::new(),
        ..ProviderConfig::new(SummaryProvider::OpenAI)
    }];

    assert_eq!(config.summarize.get_model(), "gpt-4o-mini");

    config.summarize.provider = SummaryProvider::Anthropic;
    // No anthropic entry at all; the provider-type default applies
    assert_eq!(config.summarize.get_model(), "claude-3-haiku");
}

#[test]
fn test_getEndpoint_withCustomEndpoint_shouldUseIt() {
    let mut config = Config::default();
    if let Some(provider) = config
        .summarize
        .available_providers
        .iter_mut()
        .find(|p| p.provider_type == "openai")
    {
        provider.endpoint = "https://proxy.internal:8443".to_string();
    }

    assert_eq!(config.summarize.get_endpoint(), "https://proxy.internal:8443");
}

#[test]
fn test_summaryProvider_fromStr_shouldParseKnownProviders() {
    assert_eq!(
        "openai".parse::<SummaryProvider>().unwrap(),
        SummaryProvider::OpenAI
    );
    assert_eq!(
        "Anthropic".parse::<SummaryProvider>().unwrap(),
        SummaryProvider::Anthropic
    );
    assert!("ollama".parse::<SummaryProvider>().is_err());
}

#[test]
fn test_summaryProvider_display_shouldBeLowercase() {
    assert_eq!(SummaryProvider::OpenAI.to_string(), "openai");
    assert_eq!(SummaryProvider::Anthropic.to_string(), "anthropic");
    assert_eq!(SummaryProvider::Anthropic.display_name(), "Anthropic");
}
