//! CLI Doctor Command
//!
//! Reports which Docket environment keys are set and whether the effective
//! configuration would pass validation.

use std::collections::HashMap;

use anyhow::{Context, Result};
use docket_config::env::{
    ENV_CHAT_ENDPOINT, ENV_CHAT_KEY, ENV_CHAT_MODEL, ENV_CLASSIFIER_ID, ENV_DI_ENDPOINT, ENV_DI_KEY,
};
use docket_config::{validate, DocketConfig, ENV_KEYS};
use docket_core::ClassifierStrategy;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Need {
    Required,
    Optional,
}

/// Which env keys a strategy cannot run without.
fn requirement(key: &str, strategy: ClassifierStrategy) -> Need {
    let required = match strategy {
        ClassifierStrategy::Model => {
            matches!(key, ENV_DI_ENDPOINT | ENV_DI_KEY | ENV_CLASSIFIER_ID)
        }
        ClassifierStrategy::Llm => matches!(
            key,
            ENV_DI_ENDPOINT | ENV_DI_KEY | ENV_CHAT_ENDPOINT | ENV_CHAT_KEY | ENV_CHAT_MODEL
        ),
    };
    if required {
        Need::Required
    } else {
        Need::Optional
    }
}

/// Executes the full doctor diagnosis. Returns whether every check passed.
pub fn run(config: &DocketConfig, env: &HashMap<String, String>) -> Result<bool> {
    println!("\n🔍 Running Docket Doctor...\n");

    let strategy = config
        .classifier
        .as_ref()
        .and_then(|c| c.strategy)
        .unwrap_or_default();
    let effective = serde_json::to_value(config).context("Failed to inspect configuration")?;
    let env_ok = check_env_vars(env, &effective, strategy);
    let config_ok = check_config(config);

    println!();
    let healthy = env_ok && config_ok;
    if healthy {
        println!("✅ All checks passed! Docket is ready to classify.");
    } else {
        println!("❌ Some checks failed! Please fix the errors above.");
    }
    Ok(healthy)
}

/// Whether the merged configuration carries a non-empty value at a dotted path.
fn config_supplies(effective: &Value, path: &str) -> bool {
    match effective.pointer(&format!("/{}", path.replace('.', "/"))) {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    }
}

fn check_env_vars(
    env: &HashMap<String, String>,
    effective: &Value,
    strategy: ClassifierStrategy,
) -> bool {
    println!("Checking Environment Variables ({strategy:?} strategy):");

    let mut all_good = true;
    for (var, path) in ENV_KEYS {
        let set = env.get(*var).is_some_and(|v| !v.trim().is_empty());
        match (set, requirement(var, strategy)) {
            (true, _) => println!("  🟢 {var} is set ({path})"),
            (false, _) if config_supplies(effective, path) => {
                println!("  ⚪ {var} is not set; {path} comes from the config file")
            }
            (false, Need::Optional) => println!("  🟡 {var} is not set (optional)"),
            (false, Need::Required) => {
                println!("  🔴 {var} is missing ({path})");
                all_good = false;
            }
        }
    }

    all_good
}

fn check_config(config: &DocketConfig) -> bool {
    println!("\nValidating effective configuration:");
    let report = validate(config);
    for warning in &report.warnings {
        println!("  🟡 {}: {}", warning.path, warning.message);
    }
    for error in &report.errors {
        println!("  🔴 {}: {}", error.path, error.message);
    }
    if report.is_valid() {
        println!("  🟢 configuration is valid");
    }
    report.is_valid()
}

#[cfg(test)]
mod tests {
    use super::*;
    use docket_config::env::ENV_CONCURRENCY;
    use docket_config::schema::{ClassifierConfig, DocumentIntelligenceConfig};
    use serde_json::json;

    #[test]
    fn classifier_id_only_required_for_model_strategy() {
        assert_eq!(requirement(ENV_CLASSIFIER_ID, ClassifierStrategy::Model), Need::Required);
        assert_eq!(requirement(ENV_CLASSIFIER_ID, ClassifierStrategy::Llm), Need::Optional);
        assert_eq!(requirement(ENV_CHAT_KEY, ClassifierStrategy::Llm), Need::Required);
        assert_eq!(requirement(ENV_CONCURRENCY, ClassifierStrategy::Model), Need::Optional);
    }

    #[test]
    fn missing_required_env_fails_check() {
        let env = HashMap::from([(ENV_DI_ENDPOINT.to_string(), "https://di.example.com".to_string())]);
        assert!(!check_env_vars(&env, &json!({}), ClassifierStrategy::Model));

        let env: HashMap<String, String> = [ENV_DI_ENDPOINT, ENV_DI_KEY, ENV_CLASSIFIER_ID]
            .iter()
            .map(|k| (k.to_string(), "x".to_string()))
            .collect();
        assert!(check_env_vars(&env, &json!({}), ClassifierStrategy::Model));
    }

    #[test]
    fn values_from_config_file_satisfy_required_keys() {
        let config = DocketConfig {
            document_intelligence: Some(DocumentIntelligenceConfig {
                endpoint: Some("https://di.example.com".to_string()),
                api_key: Some("file-key".to_string()),
                ..Default::default()
            }),
            classifier: Some(ClassifierConfig {
                classifier_id: Some("judgement-v2".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let effective = serde_json::to_value(&config).unwrap();

        assert!(check_env_vars(&HashMap::new(), &effective, ClassifierStrategy::Model));
        assert!(!check_env_vars(&HashMap::new(), &effective, ClassifierStrategy::Llm));
    }

    #[test]
    fn blank_config_values_do_not_count() {
        let effective = json!({ "documentIntelligence": { "endpoint": "  ", "apiKey": null } });
        assert!(!config_supplies(&effective, "documentIntelligence.endpoint"));
        assert!(!config_supplies(&effective, "documentIntelligence.apiKey"));
        assert!(!config_supplies(&effective, "classifier.classifierId"));
    }
}
