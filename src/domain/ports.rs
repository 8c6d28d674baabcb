use crate::domain::model::RosterDocument;
use crate::domain::request::ExtractionRequest;
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// The hosted extraction capability. One call, one answer, no retries.
#[async_trait]
pub trait RosterExtractor: Send + Sync {
    async fn extract(&self, request: &ExtractionRequest) -> Result<RosterDocument>;
}

/// Destination for the "copy to clipboard" action.
pub trait ClipboardSink {
    fn copy_text(&mut self, text: &str) -> Result<()>;
}
