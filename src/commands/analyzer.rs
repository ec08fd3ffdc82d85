//! Command for running a skin analysis on a photo.
//!
//! 1. Reads and prepares the photo (resize, JPEG, base64)
//! 2. Calls the configured vision provider
//! 3. Records the normalized result as the user's latest analysis

use std::path::Path;

use tracing::{error, info};

use super::history::AnalysisView;
use super::AppContext;
use crate::analyzer::{analyze_image, prepare_image};
use crate::error::Result;
use crate::history::StoredAnalysis;

/// Analyze a facial photo and store the result.
///
/// Nothing is stored when the provider call or response parsing fails; the
/// caller retries by invoking the command again.
pub async fn analyze_photo(ctx: &AppContext, photo_path: &Path) -> Result<AnalysisView> {
    info!("Starting skin analysis for {:?}", photo_path);

    let bytes = tokio::fs::read(photo_path).await.map_err(|e| {
        error!("Failed to read photo {:?}: {}", photo_path, e);
        e
    })?;
    let image = prepare_image(&bytes)?;

    let provider = ctx.config.provider_config();
    let result = analyze_image(&image, &provider).await.map_err(|e| {
        error!("Analysis failed (retryable: {}): {}", e.is_retryable(), e);
        e
    })?;

    let photo_uri = photo_path
        .canonicalize()
        .unwrap_or_else(|_| photo_path.to_path_buf())
        .display()
        .to_string();
    let analysis = StoredAnalysis::new(photo_uri, result);
    ctx.history.record_completed(ctx.user_id(), &analysis)?;

    info!(
        "Stored analysis {} (overall {})",
        analysis.id, analysis.result.scores.overall
    );
    Ok(AnalysisView::from_stored(analysis))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::create_test_context;
    use crate::error::{AnalysisError, ClearSkinError};
    use crate::history::AnalysisRepository;
    use image::{DynamicImage, ImageFormat};

    #[tokio::test]
    async fn test_missing_photo_is_io_error() {
        let (ctx, dir) = create_test_context();
        let err = analyze_photo(&ctx, &dir.path().join("nope.jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClearSkinError::Io(_)));
    }

    #[tokio::test]
    async fn test_missing_api_key_stores_nothing() {
        let (ctx, dir) = create_test_context();
        let photo = dir.path().join("face.png");
        DynamicImage::new_rgb8(320, 320)
            .save_with_format(&photo, ImageFormat::Png)
            .unwrap();

        let err = analyze_photo(&ctx, &photo).await.unwrap_err();
        assert!(matches!(
            err,
            ClearSkinError::Analysis(AnalysisError::MissingApiKey(_))
        ));
        assert!(ctx.history.history(ctx.user_id()).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_tiny_photo_rejected_before_provider() {
        let (ctx, dir) = create_test_context();
        let photo = dir.path().join("thumb.png");
        DynamicImage::new_rgb8(50, 50)
            .save_with_format(&photo, ImageFormat::Png)
            .unwrap();

        let err = analyze_photo(&ctx, &photo).await.unwrap_err();
        assert!(matches!(err, ClearSkinError::Analysis(AnalysisError::Image(_))));
    }
}
