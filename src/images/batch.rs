//! Parallel upload of everything the admin form collected for one listing.

use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinSet;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{ImageService, UploadFile, UploadResult};
use crate::models::ImageKind;

/// Files of one admin form submission.
#[derive(Debug, Clone, Default)]
pub struct BatchUpload {
    pub card: Option<UploadFile>,
    pub capa: Option<UploadFile>,
    /// Gallery name and its files, in upload order.
    pub galleries: Vec<(String, Vec<UploadFile>)>,
}

impl BatchUpload {
    pub fn is_empty(&self) -> bool {
        self.card.is_none()
            && self.capa.is_none()
            && self.galleries.iter().all(|(_, files)| files.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct BatchTaskOutcome {
    /// `card`, `capa` or `galeria`
    pub tipo: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nome_galeria: Option<String>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub results: Vec<UploadResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct BatchUploadSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Share of tasks that settled, 0 to 100.
    pub progress_percent: u8,
    /// Some tasks succeeded and some failed.
    pub partial: bool,
    pub outcomes: Vec<BatchTaskOutcome>,
}

impl BatchUploadSummary {
    fn from_outcomes(total: usize, outcomes: Vec<BatchTaskOutcome>) -> Self {
        let succeeded = outcomes.iter().filter(|o| o.success).count();
        let failed = outcomes.len() - succeeded;
        let progress_percent = if total == 0 {
            100
        } else {
            ((outcomes.len() as f64 / total as f64) * 100.0).round() as u8
        };

        Self {
            total,
            succeeded,
            failed,
            progress_percent,
            partial: succeeded > 0 && failed > 0,
            outcomes,
        }
    }
}

impl ImageService {
    /// Runs the card, capa and every gallery upload concurrently and waits
    /// for all of them. Nothing is rolled back when some fail.
    pub async fn upload_all(self: &Arc<Self>, property_id: Uuid, batch: BatchUpload) -> BatchUploadSummary {
        let mut tasks = JoinSet::new();
        let mut total = 0;

        for (kind, file) in [(ImageKind::Card, batch.card), (ImageKind::Capa, batch.capa)] {
            let Some(file) = file else { continue };
            let service = Arc::clone(self);
            total += 1;
            let position = total;
            tasks.spawn(async move {
                let result = service.upload_main_image(property_id, kind, file).await;
                (
                    position,
                    BatchTaskOutcome {
                        tipo: kind.as_str().to_string(),
                        nome_galeria: None,
                        success: result.success,
                        url: result.url,
                        results: Vec::new(),
                        error: result.error,
                    },
                )
            });
        }

        for (gallery, files) in batch.galleries {
            if files.is_empty() {
                continue;
            }
            let service = Arc::clone(self);
            total += 1;
            let position = total;
            tasks.spawn(async move {
                let result = service
                    .upload_gallery_images(property_id, &gallery, files)
                    .await;
                (
                    position,
                    BatchTaskOutcome {
                        tipo: ImageKind::Galeria.as_str().to_string(),
                        nome_galeria: Some(gallery),
                        success: result.success,
                        url: None,
                        results: result.results,
                        error: result.error,
                    },
                )
            });
        }

        let mut settled = Vec::with_capacity(total);
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => settled.push(outcome),
                Err(err) => {
                    tracing::error!(property_id = %property_id, error = %err, "Upload task did not complete");
                    settled.push((
                        usize::MAX,
                        BatchTaskOutcome {
                            tipo: "erro".to_string(),
                            nome_galeria: None,
                            success: false,
                            url: None,
                            results: Vec::new(),
                            error: Some(err.to_string()),
                        },
                    ));
                }
            }
        }
        settled.sort_by_key(|(position, _)| *position);

        let summary = BatchUploadSummary::from_outcomes(
            total,
            settled.into_iter().map(|(_, outcome)| outcome).collect(),
        );
        tracing::info!(
            property_id = %property_id,
            total = summary.total,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Batch upload finished"
        );
        summary
    }
}
