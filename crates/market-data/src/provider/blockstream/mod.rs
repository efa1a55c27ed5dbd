//! Blockstream Esplora chain height source.
//!
//! Endpoint: `/api/blocks/tip/height` -> plain-text integer.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;

use crate::errors::PriceError;
use crate::models::BlockHeight;
use crate::provider::http::{build_client, get_text, parse_height};
use crate::provider::BlockHeightProvider;

const BASE_URL: &str = "https://blockstream.info";
const PROVIDER_ID: &str = "BLOCKSTREAM";

pub struct BlockstreamProvider {
    client: Client,
    base_url: String,
}

impl BlockstreamProvider {
    pub fn new() -> Result<Self, PriceError> {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, PriceError> {
        Ok(Self {
            client: build_client(PROVIDER_ID)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl BlockHeightProvider for BlockstreamProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn fetch_height(&self) -> Result<BlockHeight, PriceError> {
        let url = format!("{}/api/blocks/tip/height", self.base_url);
        let body = get_text(&self.client, PROVIDER_ID, &url, &[]).await?;
        Ok(BlockHeight {
            height: parse_height(PROVIDER_ID, &body)?,
            source: PROVIDER_ID.to_string(),
            observed_at: Utc::now(),
        })
    }
}
