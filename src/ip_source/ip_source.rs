use async_trait::async_trait;

use crate::ClientError;

#[async_trait]
pub trait IPSource {
    /// The public IPv4 address, whitespace trimmed.
    async fn get_ipv4(&self) -> Result<String, ClientError>;
}
