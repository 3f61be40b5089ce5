//! Batch generation over the scenario catalog.
//!
//! A batch walks the catalog strictly in order, one request at a time. Each
//! scenario gets exactly one pass through the [`RetryPolicy`]; successes are
//! handed to the caller immediately, failures are logged and skipped. The run
//! ends once the success target is met or the catalog runs out, whichever
//! comes first. Falling short of the target is reported, never raised.

use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, BoxStream, StreamExt};
use tracing::{debug, info, instrument, warn};

use crate::{
    client::GenerationClient,
    error::Result,
    models::{
        BatchEvent, BatchProgress, BatchReport, GenerationRequest, ProductImage, ScenarioFailure,
    },
    prompt::normalize_slogan,
    retry::RetryPolicy,
    scenarios::ScenarioCatalog,
    slogan,
};

/// Tunables for a batch run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchConfig {
    /// Stop after this many images (default: 10)
    pub target_success_count: usize,
    /// Per-scenario retry policy (default: 3 attempts, 1000ms linear backoff)
    pub retry: RetryPolicy,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            target_success_count: 10,
            retry: RetryPolicy::default(),
        }
    }
}

/// Drives image generation across a [`ScenarioCatalog`].
#[derive(Clone)]
pub struct BatchOrchestrator {
    client: Arc<dyn GenerationClient>,
    catalog: ScenarioCatalog,
    config: BatchConfig,
}

impl BatchOrchestrator {
    pub fn new(client: impl GenerationClient + 'static) -> Self {
        Self::from_arc(Arc::new(client))
    }

    pub fn from_arc(client: Arc<dyn GenerationClient>) -> Self {
        Self {
            client,
            catalog: ScenarioCatalog::default(),
            config: BatchConfig::default(),
        }
    }

    /// Replace the default scenario catalog.
    pub fn with_catalog(mut self, catalog: ScenarioCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Set how many successful images end the batch.
    pub fn with_target(mut self, target: usize) -> Self {
        self.config.target_success_count = target;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.config.retry = retry;
        self
    }

    /// Apply a complete batch configuration.
    pub fn with_config(mut self, config: BatchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn catalog(&self) -> &ScenarioCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Generate a slogan for the product using the same client.
    pub async fn generate_slogan(&self, image: &ProductImage) -> Result<String> {
        slogan::generate_slogan(self.client.as_ref(), image).await
    }

    /// Run a batch, calling `on_progress` for every generated image.
    ///
    /// Only an invalid `image` is an error. Per-scenario failures are
    /// absorbed and listed in the returned report.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use gemini_ad_mockups::prelude::*;
    /// # async fn example() -> Result<()> {
    /// let client = MockupClientBuilder::from_env()?.build()?;
    /// let orchestrator = BatchOrchestrator::new(client);
    /// let image = ProductImage::from_path("product.png").await?;
    ///
    /// let mut gallery = Vec::new();
    /// let report = orchestrator
    ///     .run_batch(&image, Some("Fresh Every Morning"), |progress| {
    ///         gallery.push(progress.data_uri.clone());
    ///     })
    ///     .await?;
    ///
    /// if report.is_under_target() {
    ///     println!("Only {} of {} ads were generated", report.succeeded, report.target);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip_all, fields(target = self.config.target_success_count, scenarios = self.catalog.len()))]
    pub async fn run_batch<F>(
        &self,
        image: &ProductImage,
        slogan: Option<&str>,
        mut on_progress: F,
    ) -> Result<BatchReport>
    where
        F: FnMut(&BatchProgress),
    {
        image.validate()?;

        let mut run = BatchRun::new(self, image, slogan);
        while let Some(event) = run.next_event().await {
            match event {
                BatchEvent::Generated(progress) => on_progress(&progress),
                BatchEvent::Skipped(_) => {}
                BatchEvent::Finished(report) => return Ok(report),
            }
        }
        Ok(run.report)
    }

    /// Lazy form of [`run_batch`](Self::run_batch).
    ///
    /// Requests are only issued while the stream is polled. The stream ends
    /// after a single [`BatchEvent::Finished`]; dropping it early stops the
    /// batch between requests.
    pub fn stream_batch<'a>(
        &'a self,
        image: &'a ProductImage,
        slogan: Option<&'a str>,
    ) -> Result<BoxStream<'a, BatchEvent>> {
        image.validate()?;

        let run = BatchRun::new(self, image, slogan);
        Ok(stream::unfold(run, |mut run| async move {
            run.next_event().await.map(|event| (event, run))
        })
        .boxed())
    }
}

/// Cursor and counters for one batch invocation.
struct BatchRun<'a> {
    orchestrator: &'a BatchOrchestrator,
    image: &'a ProductImage,
    slogan: Option<&'a str>,
    cursor: usize,
    report: BatchReport,
    finished: bool,
}

impl<'a> BatchRun<'a> {
    fn new(
        orchestrator: &'a BatchOrchestrator,
        image: &'a ProductImage,
        slogan: Option<&'a str>,
    ) -> Self {
        let report = BatchReport::new(orchestrator.config.target_success_count);
        info!(
            run_id = %report.run_id,
            with_slogan = normalize_slogan(slogan).is_some(),
            "Starting ad batch"
        );
        Self {
            orchestrator,
            image,
            slogan,
            cursor: 0,
            report,
            finished: false,
        }
    }

    async fn next_event(&mut self) -> Option<BatchEvent> {
        if self.finished {
            return None;
        }

        let orchestrator = self.orchestrator;
        let target = orchestrator.config.target_success_count;
        let entry = match orchestrator.catalog.get(self.cursor) {
            Some(entry) if self.report.succeeded < target => entry,
            _ => return Some(BatchEvent::Finished(self.finish())),
        };
        self.cursor += 1;

        let request = GenerationRequest::for_scenario(self.image, entry, self.slogan);
        let retry = &orchestrator.config.retry;
        let client = &orchestrator.client;
        let image = request.image;
        let prompt = request.prompt.as_str();

        debug!(
            scenario = entry.index + 1,
            total = orchestrator.catalog.len(),
            "Generating scenario"
        );
        match retry
            .run(move || client.generate_image(image, prompt))
            .await
        {
            Ok(generated) => {
                let progress = BatchProgress {
                    data_uri: generated.data_uri(),
                    scenario_text: entry.prompt_template.clone(),
                    success_index: self.report.succeeded,
                    scenario_index: entry.index,
                    target,
                };
                self.report.record_success();
                info!(
                    scenario = entry.index,
                    success = progress.position(),
                    target,
                    "Generated ad"
                );
                Some(BatchEvent::Generated(progress))
            }
            Err(err) => {
                warn!(
                    scenario = entry.index,
                    "Failed to generate ad for scenario \"{}\" after {} attempts. Trying next scenario. {}",
                    prompt,
                    retry.max_attempts(),
                    err
                );
                let failure = ScenarioFailure {
                    scenario_index: entry.index,
                    scenario_text: entry.prompt_template.clone(),
                    attempts: retry.max_attempts(),
                    error: err.to_string(),
                    failed_at: Utc::now(),
                };
                self.report.record_failure(failure.clone());
                Some(BatchEvent::Skipped(failure))
            }
        }
    }

    fn finish(&mut self) -> BatchReport {
        self.finished = true;
        self.report.finished_at = Some(Utc::now());

        if self.report.is_under_target() {
            warn!(
                run_id = %self.report.run_id,
                skipped = self.report.failures.len(),
                "Could not generate the target of {} ads. Generated {}.",
                self.report.target,
                self.report.succeeded
            );
        } else {
            info!(
                run_id = %self.report.run_id,
                attempted = self.report.attempted,
                "Ad batch complete"
            );
        }
        self.report.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{MockReply, MockupClientBuilder};
    use crate::models::GeneratedImage;

    fn orchestrator_with(reply: MockReply) -> BatchOrchestrator {
        let client = MockupClientBuilder::new("mock-key")
            .with_mock(move |_| Ok(reply.clone()))
            .build()
            .unwrap();
        BatchOrchestrator::new(client)
    }

    #[tokio::test]
    async fn test_invalid_image_is_rejected_before_any_request() {
        let orchestrator = orchestrator_with(MockReply::Empty);
        let image = ProductImage::new(Vec::new(), "image/png");

        let err = orchestrator
            .run_batch(&image, None, |_| panic!("no progress expected"))
            .await
            .unwrap_err();
        assert!(err.is_input());
        assert!(orchestrator.stream_batch(&image, None).is_err());
    }

    #[tokio::test]
    async fn test_zero_target_attempts_nothing() {
        let orchestrator = orchestrator_with(MockReply::Image(GeneratedImage::new(
            vec![1u8],
            "image/png",
        )))
        .with_target(0);
        let image = ProductImage::new(vec![1u8], "image/png");

        let report = orchestrator.run_batch(&image, None, |_| {}).await.unwrap();
        assert_eq!(report.attempted, 0);
        assert!(!report.is_under_target());
        assert!(report.finished_at.is_some());
    }

    #[test]
    fn test_default_config() {
        let config = BatchConfig::default();
        assert_eq!(config.target_success_count, 10);
        assert_eq!(config.retry, RetryPolicy::default());
    }
}
