pub mod labels;
pub mod llm;
pub mod model;
pub mod prompt;
pub mod providers;

use std::sync::Arc;

use docket_config::Settings;
use docket_core::{ClassifierService, ClassifierStrategy, DocketError, DocumentClassifier};

pub use labels::{apply_policy, normalize_label};
pub use llm::LlmClassifier;
pub use model::ModelClassifier;
pub use prompt::PromptBuilder;
pub use providers::build_provider;

/// Wire the configured strategy. `service` backs the model strategy; the llm
/// strategy builds its chat provider from `settings.chat`.
pub fn build_classifier(
    settings: &Settings,
    service: Arc<dyn ClassifierService>,
) -> Result<Arc<dyn DocumentClassifier>, DocketError> {
    let classifier = &settings.classifier;
    match classifier.strategy {
        ClassifierStrategy::Model => {
            let id = classifier.classifier_id.clone().ok_or_else(|| {
                DocketError::config("classifier.classifierId", "required for the model strategy")
            })?;
            Ok(Arc::new(
                ModelClassifier::new(service, id).with_ingestion(classifier.ingestion),
            ))
        }
        ClassifierStrategy::Llm => {
            let chat = settings.chat.as_ref().ok_or_else(|| {
                DocketError::config("chat", "chat settings are required for the llm strategy")
            })?;
            Ok(Arc::new(
                LlmClassifier::new(build_provider(chat), chat.model.clone())
                    .with_max_tokens(chat.max_tokens)
                    .with_label_policy(classifier.labels),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use docket_config::{ChatSettings, ClassifierSettings, DocumentIntelligenceSettings, LoggingSettings};
    use docket_core::{ClassifiedDocument, ExtractionProfile, IngestionMode, LabelPolicy};
    use std::time::Duration;

    struct NoopService;

    #[async_trait]
    impl ClassifierService for NoopService {
        fn name(&self) -> &str {
            "noop"
        }

        async fn classify(&self, _: &str, _: &[u8], _: &str) -> Result<Vec<ClassifiedDocument>> {
            Ok(Vec::new())
        }
    }

    fn settings(strategy: ClassifierStrategy, classifier_id: Option<&str>, chat: bool) -> Settings {
        Settings {
            document_intelligence: DocumentIntelligenceSettings {
                endpoint: "https://di.example.com".into(),
                api_key: "key".into(),
                api_version: "2024-11-30".into(),
                read_model: "prebuilt-read".into(),
                poll_interval: Duration::from_millis(10),
                max_poll_attempts: 3,
            },
            classifier: ClassifierSettings {
                strategy,
                classifier_id: classifier_id.map(str::to_string),
                ingestion: IngestionMode::RawBytes,
                labels: LabelPolicy::Verbatim,
            },
            chat: chat.then(|| ChatSettings {
                endpoint: "https://aoai.example.com".into(),
                api_key: "secret".into(),
                model: "gpt-4o".into(),
                api_version: Some("2024-06-01".into()),
                max_tokens: None,
            }),
            extraction: ExtractionProfile::Office,
            concurrency: 1,
            logging: LoggingSettings {
                level: "info".into(),
                dir: None,
                json: false,
            },
        }
    }

    #[test]
    fn builds_each_strategy() {
        let model = build_classifier(&settings(ClassifierStrategy::Model, Some("cls"), false), Arc::new(NoopService)).unwrap();
        assert_eq!(model.name(), "model");

        let llm = build_classifier(&settings(ClassifierStrategy::Llm, None, true), Arc::new(NoopService)).unwrap();
        assert_eq!(llm.name(), "llm");
    }

    #[test]
    fn missing_requirements_are_config_errors() {
        let err = build_classifier(&settings(ClassifierStrategy::Model, None, false), Arc::new(NoopService))
            .err()
            .unwrap();
        assert!(matches!(err, DocketError::Config { ref path, .. } if path == "classifier.classifierId"));

        let err = build_classifier(&settings(ClassifierStrategy::Llm, None, false), Arc::new(NoopService))
            .err()
            .unwrap();
        assert!(matches!(err, DocketError::Config { .. }));
    }
}
