//! Example: Generate ad mockups for a product image with the live Gemini API.
//!
//! Usage: `cargo run --example generate_ads -- <product.png> [slogan|--ai-slogan] [out_dir]`
//!
//! Requires `GEMINI_API_KEY` (or `API_KEY`). Each mockup is written to the
//! output directory as soon as it arrives, followed by a `report.json`.

use std::path::PathBuf;

use gemini_ad_mockups::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,gemini_ad_mockups=debug"));
    fmt().with_env_filter(filter).init();

    let mut args = std::env::args().skip(1);
    let image_path = args
        .next()
        .ok_or("Usage: generate_ads <product.png> [slogan|--ai-slogan] [out_dir]")?;
    let slogan_arg = args.next();
    let out_dir = PathBuf::from(args.next().unwrap_or_else(|| "ad_mockups".to_string()));

    let client = MockupClientBuilder::from_env()?.build()?;
    let orchestrator = BatchOrchestrator::new(client);
    let image = ProductImage::from_path(&image_path).await?;

    let slogan = match slogan_arg.as_deref() {
        Some("--ai-slogan") => {
            let generated = orchestrator.generate_slogan(&image).await?;
            println!("Slogan: {generated}");
            Some(generated)
        }
        other => other.map(str::to_string),
    };

    tokio::fs::create_dir_all(&out_dir).await?;

    let mut gallery = Vec::new();
    let report = orchestrator
        .run_batch(&image, slogan.as_deref(), |progress| {
            println!(
                "[{}/{}] {}",
                progress.position(),
                progress.target,
                progress.scenario_text
            );
            gallery.push(progress.clone());
        })
        .await?;

    for progress in &gallery {
        let image = progress.image()?;
        let path = out_dir.join(format!(
            "ad-mockup-{}.{}",
            progress.position(),
            image.extension()
        ));
        tokio::fs::write(&path, &image.bytes).await?;
        println!("Saved {}", path.display());
    }

    let report_path = out_dir.join("report.json");
    tokio::fs::write(&report_path, serde_json::to_string_pretty(&report)?).await?;

    if report.is_under_target() {
        println!(
            "Generated {} of {} ads ({} scenarios skipped). Report: {}",
            report.succeeded,
            report.target,
            report.failures.len(),
            report_path.display()
        );
    } else {
        println!("Generated {} ads. Report: {}", report.succeeded, report_path.display());
    }

    Ok(())
}
