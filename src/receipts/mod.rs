//! Receipt extractor collaborator: turns a receipt image into a prefilled
//! expense. Implemented outside this crate; failures surface as
//! `Error::Upstream` and degrade only this feature.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// Fields recovered from a scanned receipt
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptScan {
    pub amount: Decimal,
    pub date: NaiveDateTime,
    pub name: String,
    pub merchant_name: String,
    /// One of the candidate categories the caller supplied
    pub category: String,
}

/// Trait implemented by the external document extractor.
#[async_trait]
pub trait ReceiptExtractorTrait: Send + Sync {
    /// Extracts expense fields from an image. Returns `None` when the image
    /// is not a receipt.
    async fn extract(
        &self,
        image: &[u8],
        mime_type: &str,
        candidate_categories: &[String],
    ) -> Result<Option<ReceiptScan>>;
}
