//! Clean-then-classify pipeline.
//!
//! Raw text goes to the cleaning service, the cleaned text goes to the
//! classification service, and the verdict is mapped to a
//! [`PresentationOutcome`] plus one asset from the matching pool. The second
//! call is never made if the first fails, and errors propagate unchanged.

use cybulde_core::{AppConfig, AssetPool, CleanedText, PresentationOutcome, Verdict};
use cybulde_service::{
    ClassificationClient, ServiceError, TextCleaner, TextCleaningClient, VerdictPredictor,
    http_client,
};
use tracing::{info, warn};

use crate::chooser::{AssetChooser, RandomChooser};

/// Asset references for both verdicts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetPools {
    pub harmless: Vec<String>,
    pub cyberbullying: Vec<String>,
}

impl AssetPools {
    pub fn new(harmless: Vec<String>, cyberbullying: Vec<String>) -> Self {
        Self {
            harmless,
            cyberbullying,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.pool(AssetPool::Harmless).to_vec(),
            config.pool(AssetPool::Cyberbullying).to_vec(),
        )
    }

    pub fn get(&self, pool: AssetPool) -> &[String] {
        match pool {
            AssetPool::Harmless => &self.harmless,
            AssetPool::Cyberbullying => &self.cyberbullying,
        }
    }
}

/// Result of classifying one text.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub text: String,
    pub cleaned: CleanedText,
    pub verdict: Verdict,
    pub outcome: PresentationOutcome,
    /// `None` only when the resolved pool is empty.
    pub asset: Option<String>,
}

/// One entry of a batch run: the input and its own outcome.
#[derive(Debug)]
pub struct BatchItem {
    pub text: String,
    pub result: Result<Prediction, ServiceError>,
}

impl BatchItem {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Composes a [`TextCleaner`] and a [`VerdictPredictor`].
pub struct PredictionOrchestrator<C, P, A = RandomChooser> {
    cleaner: C,
    predictor: P,
    chooser: A,
    pools: AssetPools,
}

impl PredictionOrchestrator<TextCleaningClient, ClassificationClient, RandomChooser> {
    /// Build the production pipeline: both service clients on one connection
    /// pool with the configured timeout, random asset choice.
    pub fn from_config(config: &AppConfig) -> Result<Self, ServiceError> {
        let http = http_client(config.request_timeout())?;
        Ok(Self::new(
            TextCleaningClient::new(http.clone(), &config.data_processing_service_url),
            ClassificationClient::new(http, &config.model_prediction_service_url),
            AssetPools::from_config(config),
            RandomChooser,
        ))
    }
}

impl<C, P, A> PredictionOrchestrator<C, P, A>
where
    C: TextCleaner,
    P: VerdictPredictor,
    A: AssetChooser,
{
    pub fn new(cleaner: C, predictor: P, pools: AssetPools, chooser: A) -> Self {
        Self {
            cleaner,
            predictor,
            chooser,
            pools,
        }
    }

    /// Run both stages and return the verdict.
    pub async fn verdict(&self, text: &str) -> Result<(CleanedText, Verdict), ServiceError> {
        let cleaned = self.cleaner.clean(text).await?;
        let verdict = self.predictor.predict(&cleaned).await?;
        Ok((cleaned, verdict))
    }

    /// Classify one text and resolve its presentation.
    pub async fn classify(&self, text: &str) -> Result<Prediction, ServiceError> {
        let (cleaned, verdict) = self.verdict(text).await?;
        let (outcome, asset) = self.present(verdict);
        Ok(Prediction {
            text: text.to_string(),
            cleaned,
            verdict,
            outcome,
            asset,
        })
    }

    /// Presentation outcome for a verdict and one asset from its pool.
    pub fn present(&self, verdict: Verdict) -> (PresentationOutcome, Option<String>) {
        let outcome = PresentationOutcome::for_verdict(verdict);
        let asset = self
            .chooser
            .choose(self.pools.get(outcome.pool))
            .map(str::to_string);
        if asset.is_none() {
            warn!(pool = outcome.pool.config_key(), "asset pool is empty");
        }
        (outcome, asset)
    }

    /// Classify each text independently, one after another, in input order.
    ///
    /// A failed item does not stop the batch.
    pub async fn classify_batch<I>(&self, texts: I) -> Vec<BatchItem>
    where
        I: IntoIterator<Item = String>,
    {
        let mut items = Vec::new();
        for text in texts {
            let result = self.classify(&text).await;
            if let Err(e) = &result {
                warn!(error = %e, kind = ?e.kind(), "classification failed");
            }
            items.push(BatchItem { text, result });
        }

        let succeeded = items.iter().filter(|item| item.is_ok()).count();
        info!(
            total = items.len(),
            succeeded,
            failed = items.len() - succeeded,
            "batch classified"
        );
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Lower-cases its input, or fails for texts listed in `fail_on`.
    #[derive(Default)]
    struct StubCleaner {
        calls: AtomicUsize,
        fail_on: Vec<&'static str>,
    }

    #[async_trait]
    impl TextCleaner for StubCleaner {
        async fn clean(&self, text: &str) -> Result<CleanedText, ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_on.iter().any(|f| *f == text) {
                return Err(ServiceError::Status {
                    status: 500,
                    body: "cleaner down".into(),
                });
            }
            Ok(CleanedText::new(text.to_lowercase()))
        }
    }

    /// Flags any cleaned text containing "loser"; records what it was given.
    #[derive(Default)]
    struct StubPredictor {
        seen: Mutex<Vec<String>>,
    }

    impl StubPredictor {
        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl VerdictPredictor for StubPredictor {
        async fn predict(&self, cleaned: &CleanedText) -> Result<Verdict, ServiceError> {
            self.seen.lock().unwrap().push(cleaned.as_str().to_string());
            if cleaned.as_str().contains("loser") {
                Ok(Verdict::Cyberbullying)
            } else {
                Ok(Verdict::Harmless)
            }
        }
    }

    fn pools() -> AssetPools {
        AssetPools::new(
            vec!["happy-1.gif".into(), "happy-2.gif".into()],
            vec!["sad-1.gif".into(), "sad-2.gif".into()],
        )
    }

    fn first(_: usize) -> usize {
        0
    }

    fn orchestrator(
        cleaner: StubCleaner,
    ) -> PredictionOrchestrator<StubCleaner, StubPredictor, fn(usize) -> usize> {
        PredictionOrchestrator::new(
            cleaner,
            StubPredictor::default(),
            pools(),
            first as fn(usize) -> usize,
        )
    }

    #[tokio::test]
    async fn harmless_text() {
        let orch = orchestrator(StubCleaner::default());
        let prediction = orch.classify("Hello").await.unwrap();

        assert_eq!(prediction.text, "Hello");
        assert_eq!(prediction.cleaned.as_str(), "hello");
        assert_eq!(prediction.verdict, Verdict::Harmless);
        assert_eq!(prediction.outcome.label, "harmless");
        assert_eq!(prediction.outcome.color, "#5ed938");
        assert_eq!(prediction.asset.as_deref(), Some("happy-1.gif"));
    }

    #[tokio::test]
    async fn flagged_text_uses_cyberbullying_pool() {
        let orch = orchestrator(StubCleaner::default());
        let prediction = orch.classify("You LOSER").await.unwrap();

        assert_eq!(prediction.verdict, Verdict::Cyberbullying);
        assert_eq!(prediction.outcome.label, "cyberbullying");
        assert_eq!(prediction.outcome.color, "#ed0c0c");
        assert_eq!(prediction.outcome.pool, AssetPool::Cyberbullying);
        assert_eq!(prediction.asset.as_deref(), Some("sad-1.gif"));
    }

    #[tokio::test]
    async fn predictor_receives_cleaned_text() {
        let orch = orchestrator(StubCleaner::default());
        orch.classify("MiXeD Case").await.unwrap();
        assert_eq!(*orch.predictor.seen.lock().unwrap(), vec!["mixed case".to_string()]);
    }

    #[tokio::test]
    async fn cleaning_failure_skips_classification() {
        let orch = orchestrator(StubCleaner {
            fail_on: vec!["boom"],
            ..Default::default()
        });

        let err = orch.classify("boom").await.unwrap_err();
        assert!(err.is_transport());
        assert_eq!(orch.cleaner.calls.load(Ordering::SeqCst), 1);
        assert_eq!(orch.predictor.calls(), 0);
    }

    #[tokio::test]
    async fn batch_keeps_order_and_isolates_failures() {
        let orch = orchestrator(StubCleaner {
            fail_on: vec!["second"],
            ..Default::default()
        });

        let texts = vec!["first".to_string(), "second".to_string(), "you loser".to_string()];
        let items = orch.classify_batch(texts).await;

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].text, "first");
        assert_eq!(items[0].result.as_ref().unwrap().verdict, Verdict::Harmless);
        assert!(items[1].result.as_ref().unwrap_err().is_transport());
        assert_eq!(
            items[2].result.as_ref().unwrap().verdict,
            Verdict::Cyberbullying
        );
        assert_eq!(orch.predictor.calls(), 2);
    }

    #[tokio::test]
    async fn empty_batch() {
        let orch = orchestrator(StubCleaner::default());
        assert!(orch.classify_batch(Vec::new()).await.is_empty());
    }

    #[test]
    fn present_is_deterministic_with_fixed_chooser() {
        let orch = PredictionOrchestrator::new(
            StubCleaner::default(),
            StubPredictor::default(),
            pools(),
            |len: usize| len - 1,
        );
        for _ in 0..3 {
            let (outcome, asset) = orch.present(Verdict::Harmless);
            assert_eq!(outcome, Verdict::Harmless.outcome());
            assert_eq!(asset.as_deref(), Some("happy-2.gif"));
        }
    }

    #[test]
    fn empty_pool_gives_no_asset() {
        let orch = PredictionOrchestrator::new(
            StubCleaner::default(),
            StubPredictor::default(),
            AssetPools::new(vec!["happy.gif".into()], Vec::new()),
            RandomChooser,
        );
        let (outcome, asset) = orch.present(Verdict::Cyberbullying);
        assert_eq!(outcome.label, "cyberbullying");
        assert!(asset.is_none());
    }

    #[test]
    fn pools_from_config() {
        let config = AppConfig::from_yaml(
            r#"
data_processing_service_url: http://localhost:8001/clean
model_prediction_service_url: http://localhost:8002/predict
dataset_path: data/test.parquet
harmless_gifs: [h.gif]
cyberbullying_gifs: [c1.gif, c2.gif]
"#,
        )
        .unwrap();
        let pools = AssetPools::from_config(&config);
        assert_eq!(pools.get(AssetPool::Harmless), ["h.gif".to_string()]);
        assert_eq!(pools.get(AssetPool::Cyberbullying).len(), 2);
    }

    // ── End to end over HTTP ──

    mod http {
        use super::*;
        use serde_json::json;
        use std::time::Duration;
        use wiremock::matchers::{method, path, query_param};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        type HttpOrchestrator =
            PredictionOrchestrator<TextCleaningClient, ClassificationClient, fn(usize) -> usize>;

        fn http_orchestrator(server: &MockServer) -> HttpOrchestrator {
            let http = http_client(Duration::from_secs(5)).unwrap();
            PredictionOrchestrator::new(
                TextCleaningClient::new(http.clone(), format!("{}/clean", server.uri())),
                ClassificationClient::new(http, format!("{}/predict", server.uri())),
                pools(),
                first as fn(usize) -> usize,
            )
        }

        async fn mount_cleaner(server: &MockServer, template: ResponseTemplate) {
            Mock::given(method("GET"))
                .and(path("/clean"))
                .respond_with(template)
                .mount(server)
                .await;
        }

        async fn mount_predictor(server: &MockServer, verdict: serde_json::Value, calls: u64) {
            Mock::given(method("GET"))
                .and(path("/predict"))
                .and(query_param("text", "hello"))
                .respond_with(
                    ResponseTemplate::new(200).set_body_json(json!({"is_cyberbullying": verdict})),
                )
                .expect(calls)
                .mount(server)
                .await;
        }

        fn cleaned_hello() -> ResponseTemplate {
            ResponseTemplate::new(200).set_body_json(json!({"cleaned_text": "hello"}))
        }

        #[tokio::test]
        async fn harmless_round_trip() {
            let server = MockServer::start().await;
            mount_cleaner(&server, cleaned_hello()).await;
            mount_predictor(&server, json!(0), 1).await;

            let prediction = http_orchestrator(&server).classify("Hello!").await.unwrap();
            assert_eq!(prediction.outcome.label, "harmless");
            assert_eq!(prediction.outcome.color, "#5ed938");
            assert_eq!(prediction.asset.as_deref(), Some("happy-1.gif"));
        }

        #[tokio::test]
        async fn flagged_round_trip() {
            let server = MockServer::start().await;
            mount_cleaner(&server, cleaned_hello()).await;
            mount_predictor(&server, json!(1), 1).await;

            let prediction = http_orchestrator(&server).classify("HELLO").await.unwrap();
            assert_eq!(prediction.outcome.label, "cyberbullying");
            assert_eq!(prediction.outcome.color, "#ed0c0c");
        }

        #[tokio::test]
        async fn cleaner_500_never_reaches_predictor() {
            let server = MockServer::start().await;
            mount_cleaner(&server, ResponseTemplate::new(500)).await;
            mount_predictor(&server, json!(0), 0).await;

            let err = http_orchestrator(&server).classify("hi").await.unwrap_err();
            assert!(matches!(err, ServiceError::Status { status: 500, .. }));
            assert!(err.is_transport());
        }

        #[tokio::test]
        async fn out_of_range_verdict_is_protocol_error() {
            let server = MockServer::start().await;
            mount_cleaner(&server, cleaned_hello()).await;
            mount_predictor(&server, json!(2), 1).await;

            let err = http_orchestrator(&server).classify("hi").await.unwrap_err();
            assert!(err.is_protocol());
        }

        #[tokio::test]
        async fn from_config_uses_configured_urls_and_pools() {
            let server = MockServer::start().await;
            mount_cleaner(&server, cleaned_hello()).await;
            mount_predictor(&server, json!(1), 1).await;

            let config = AppConfig::from_yaml(&format!(
                r#"
data_processing_service_url: {uri}/clean
model_prediction_service_url: {uri}/predict
dataset_path: data/test.parquet
request_timeout_secs: 5
harmless_gifs: [h.gif]
cyberbullying_gifs: [c.gif]
"#,
                uri = server.uri()
            ))
            .unwrap();

            let prediction = PredictionOrchestrator::from_config(&config)
                .unwrap()
                .classify("HELLO")
                .await
                .unwrap();
            assert_eq!(prediction.verdict, Verdict::Cyberbullying);
            assert_eq!(prediction.asset.as_deref(), Some("c.gif"));
        }
    }
}
