use tracing::{info, instrument};

use crate::{
    client::GenerationClient,
    error::{MockupError, Result},
    models::ProductImage,
    prompt::{clean_slogan, SLOGAN_PROMPT},
};

/// Ask the model for a short marketing slogan describing the product image.
///
/// Unlike batch generation, failures here are returned to the caller as-is.
#[instrument(skip_all, fields(mime_type = %image.mime_type))]
pub async fn generate_slogan<C>(client: &C, image: &ProductImage) -> Result<String>
where
    C: GenerationClient + ?Sized,
{
    image.validate()?;

    let raw = client.generate_text(image, SLOGAN_PROMPT).await?;
    let slogan = clean_slogan(&raw);
    if slogan.is_empty() {
        return Err(MockupError::NoTextInResponse);
    }

    info!(slogan = %slogan, "Generated slogan");
    Ok(slogan)
}
