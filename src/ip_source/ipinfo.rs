use async_trait::async_trait;
use reqwest::Client;

use crate::config::IpinfoConfig;
use crate::ClientError;

use super::ip_source::IPSource;

/// Asks ipinfo (or anything speaking its `/ip?token=` API) for our address.
pub(crate) struct IPSourceIpinfo {
    client: Client,
    base_url: String,
    token: String,
}

impl IPSourceIpinfo {
    pub(crate) fn new(client: Client, conf: &IpinfoConfig) -> Self {
        IPSourceIpinfo {
            client,
            base_url: conf.url.clone(),
            token: conf.key.clone(),
        }
    }
}

async fn get_ip(client: &Client, api_url: &str, token: &str) -> Result<String, ClientError> {
    let response = client
        .get(api_url)
        .query(&[("token", token)])
        .send()
        .await
        .map_err(ClientError::IpServiceUnreachable)?;
    let text = response
        .text()
        .await
        .map_err(ClientError::IpServiceBadResponse)?;
    Ok(text)
}

#[async_trait]
impl IPSource for IPSourceIpinfo {
    async fn get_ipv4(&self) -> Result<String, ClientError> {
        let url = format!("{}/ip", self.base_url);
        Ok(get_ip(&self.client, &url, &self.token)
            .await?
            // ipinfo puts a newline at the end
            .trim()
            .to_string())
    }
}
