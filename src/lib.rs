//! Batch generation of advertisement mockups on top of `gemini-rust`.
//!
//! Give the crate a product image and, optionally, a slogan. It walks a fixed
//! catalog of advertising scenarios, asks Gemini to place the product into
//! each one, and hands every finished mockup back as soon as it arrives.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use gemini_ad_mockups::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//!     let client = MockupClientBuilder::new("your-api-key").build()?;
//!     let orchestrator = BatchOrchestrator::new(client);
//!
//!     let image = ProductImage::from_path("product.png").await?;
//!     let slogan = orchestrator.generate_slogan(&image).await?;
//!
//!     let report = orchestrator
//!         .run_batch(&image, Some(&slogan), |progress| {
//!             println!(
//!                 "[{}/{}] {}",
//!                 progress.position(),
//!                 progress.target,
//!                 progress.scenario_text
//!             );
//!         })
//!         .await?;
//!
//!     println!("{} ads generated, {} scenarios skipped", report.succeeded, report.failures.len());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod prompt;
pub mod retry;
pub mod scenarios;
pub mod slogan;

pub use client::{
    GeminiMockupClient, GenerationClient, MockHandler, MockReply, MockRequest,
    MockupClientBuilder, RequestKind,
};
pub use error::{MockupError, Result, ResultExt};
pub use models::{
    BatchEvent, BatchProgress, BatchReport, GeneratedImage, GenerationRequest, ProductImage,
    ScenarioFailure,
};
pub use orchestrator::{BatchConfig, BatchOrchestrator};
pub use retry::RetryPolicy;
pub use scenarios::{ScenarioCatalog, ScenarioEntry, AD_SCENARIOS};
pub use slogan::generate_slogan;

/// Prelude module for convenient imports.
///
/// ```rust
/// use gemini_ad_mockups::prelude::*;
/// ```
pub mod prelude {
    pub use crate::client::{
        GeminiMockupClient, GenerationClient, MockReply, MockRequest, MockupClientBuilder,
        RequestKind,
    };
    pub use crate::error::{MockupError, Result, ResultExt};
    pub use crate::models::{
        BatchEvent, BatchProgress, BatchReport, GeneratedImage, ProductImage, ScenarioFailure,
    };
    pub use crate::orchestrator::{BatchConfig, BatchOrchestrator};
    pub use crate::retry::RetryPolicy;
    pub use crate::scenarios::{ScenarioCatalog, ScenarioEntry};

    // Re-export commonly used external types
    pub use gemini_rust::Model;
}
