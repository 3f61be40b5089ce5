//! Example: Offline batch run against a mocked provider.
//!
//! Every third scenario comes back as text only, which exercises the retry
//! and skip path without network calls or billing. Retry delays are shortened
//! so the run finishes quickly.

use std::time::Duration;

use futures::StreamExt;
use gemini_ad_mockups::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    // No API key needed because the mock handler short-circuits the request.
    let client = MockupClientBuilder::new("mock-key")
        .with_mock(|req: MockRequest| match req.kind {
            RequestKind::Text => Ok(MockReply::Text("\"Built for Every Adventure\"".to_string())),
            RequestKind::Image if req.prompt.len() % 3 == 0 => Ok(MockReply::Text(
                "I can describe this ad but not draw it.".to_string(),
            )),
            RequestKind::Image => Ok(MockReply::Image(GeneratedImage::new(
                req.prompt.into_bytes(),
                "image/png",
            ))),
        })
        .build()?;

    let orchestrator = BatchOrchestrator::new(client)
        .with_retry_policy(RetryPolicy::default().with_base_delay(Duration::from_millis(10)));

    let image = ProductImage::from_data_uri("data:image/png;base64,iVBORw0KGgo=")?;
    let slogan = orchestrator.generate_slogan(&image).await?;
    println!("Slogan: {slogan}");

    let mut events = orchestrator.stream_batch(&image, Some(&slogan))?;
    while let Some(event) = events.next().await {
        match event {
            BatchEvent::Generated(progress) => println!(
                "[{}/{}] scenario #{}: {}",
                progress.position(),
                progress.target,
                progress.scenario_index + 1,
                progress.scenario_text
            ),
            BatchEvent::Skipped(failure) => println!(
                "skipped scenario #{} after {} attempts: {}",
                failure.scenario_index + 1,
                failure.attempts,
                failure.error
            ),
            BatchEvent::Finished(report) => println!(
                "done: {} generated, {} attempted, under target: {}",
                report.succeeded,
                report.attempted,
                report.is_under_target()
            ),
        }
    }

    Ok(())
}
