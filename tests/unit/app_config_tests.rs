/*!
 * Tests for application configuration functionality
 */

use proofreader::app_config::{CompletionProviderKind, Config, LogLevel};
use proofreader::editorial::TreeStrategy;

use crate::common;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.completion.provider, CompletionProviderKind::Ollama);
    assert_eq!(config.completion.get_model(), "llama3.1");
    assert_eq!(config.completion.get_endpoint(), "http://localhost:11434");
    assert_eq!(config.completion.common.stage_delay_ms, 1000);
    assert_eq!(config.completion.common.retry_count, 3);
    assert_eq!(config.review.corpus_size, 15);
    assert_eq!(config.review.tree_strategy, TreeStrategy::Splice);
    assert!((config.review.deletion_warning_threshold - 0.2).abs() < f64::EPSILON);
    assert!(config.audit.enabled);
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(!config.store.is_configured());
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    // Hosted providers need a key
    config.completion.provider = CompletionProviderKind::OpenAI;
    assert!(config.validate().is_err());
    config.completion.active_provider_config_mut().api_key = "sk-test".to_string();
    assert!(config.validate().is_ok());

    config.review.deletion_warning_threshold = 1.5;
    assert!(config.validate().is_err());
    config.review.deletion_warning_threshold = 0.2;

    config.store.url = "not a url".to_string();
    assert!(config.validate().is_err());
    config.store.url = "https://blog.example.com".to_string();

    config.store.admin_api_key = "missing-separator".to_string();
    assert!(config.validate().is_err());
    config.store.admin_api_key = common::ADMIN_KEY.to_string();
    assert!(config.validate().is_ok());
    assert!(config.store.is_configured());
}

/// Test that a partial JSON file is completed with defaults
#[test]
fn test_load_withPartialFile_shouldFillDefaults() -> anyhow::Result<()> {
    let dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        dir.path(),
        "conf.json",
        r#"{
            "store": { "url": "https://blog.example.com", "admin_api_key": "id:00ff" },
            "completion": {
                "provider": "anthropic",
                "available_providers": [
                    { "type": "anthropic", "model": "claude-test", "api_key": "k" }
                ]
            },
            "review": { "tree_strategy": "rewrite" },
            "log_level": "debug"
        }"#,
    )?;

    let config = Config::load_or_create(&path)?;

    assert_eq!(config.completion.provider, CompletionProviderKind::Anthropic);
    assert_eq!(config.completion.get_model(), "claude-test");
    assert_eq!(config.completion.get_timeout_secs(), 120);
    assert_eq!(config.review.tree_strategy, TreeStrategy::Rewrite);
    assert_eq!(config.review.corpus_size, 15);
    assert_eq!(config.log_level, LogLevel::Debug);
    assert!(config.validate().is_ok());
    Ok(())
}

/// Test that a missing file is created with the defaults
#[test]
fn test_load_withMissingFile_shouldWriteDefaultConfig() -> anyhow::Result<()> {
    let dir = common::create_temp_dir()?;
    let path = dir.path().join("conf.json");

    let config = Config::load_or_create(&path)?;

    assert!(path.exists());
    let reloaded = Config::load_or_create(&path)?;
    assert_eq!(reloaded.completion.get_model(), config.completion.get_model());
    assert_eq!(reloaded.review.corpus_size, config.review.corpus_size);
    Ok(())
}

/// Test provider kind parsing
#[test]
fn test_providerKind_fromStr_shouldBeCaseInsensitive() {
    assert_eq!("OpenAI".parse::<CompletionProviderKind>().unwrap(), CompletionProviderKind::OpenAI);
    assert_eq!("lmstudio".parse::<CompletionProviderKind>().unwrap(), CompletionProviderKind::LMStudio);
    assert!("gemini".parse::<CompletionProviderKind>().is_err());
    assert!(!CompletionProviderKind::LMStudio.requires_api_key());
}

/// Test the explicit audit database path
#[test]
fn test_auditDatabasePath_withExplicitPath_shouldUseIt() {
    let mut config = Config::default();
    config.audit.database_path = Some("/tmp/proofreader-audit.db".into());

    assert_eq!(
        config.audit_database_path(),
        Some(std::path::PathBuf::from("/tmp/proofreader-audit.db"))
    );
}
