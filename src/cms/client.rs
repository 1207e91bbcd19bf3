//! HTTP client for the CMS query API

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

use super::{queries, CmsError, ContentRepository};
use crate::config::CmsConfig;
use crate::content::{Post, PostListItem};

/// Query variables, sent as `$name=<json>` parameters
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    values: BTreeMap<String, serde_json::Value>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<serde_json::Value>) -> Self {
        self.values.insert(name.to_string(), value.into());
        self
    }

    fn encode(&self) -> String {
        self.values
            .iter()
            .map(|(name, value)| {
                format!(
                    "&%24{}={}",
                    utf8_percent_encode(name, NON_ALPHANUMERIC),
                    utf8_percent_encode(&value.to_string(), NON_ALPHANUMERIC)
                )
            })
            .collect()
    }
}

/// Response envelope of the query endpoint
#[derive(Debug, Deserialize)]
struct QueryResponse<T> {
    result: T,
}

/// Live CMS client
#[derive(Debug, Clone)]
pub struct SanityClient {
    http: reqwest::Client,
    endpoint: String,
    token: Option<String>,
    list_limit: usize,
}

impl SanityClient {
    /// Build a client from configuration
    pub fn new(cms: &CmsConfig, list_limit: usize) -> Result<Self, CmsError> {
        if cms.project_id.is_empty() {
            return Err(CmsError::Config("project_id is empty".to_string()));
        }
        if cms.dataset.is_empty() {
            return Err(CmsError::Config("dataset is empty".to_string()));
        }

        let host = if cms.use_cdn { "apicdn" } else { "api" };
        let endpoint = format!(
            "https://{}.{}.sanity.io/v{}/data/query/{}",
            cms.project_id,
            host,
            cms.api_version.trim_start_matches('v'),
            cms.dataset
        );

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cms.timeout_secs))
            .user_agent(concat!("synthetic-site/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            endpoint,
            token: cms.token.clone(),
            list_limit,
        })
    }

    /// Full request URL for a query
    pub fn query_url(&self, query: &str, params: &QueryParams) -> String {
        format!(
            "{}?query={}{}",
            self.endpoint,
            utf8_percent_encode(query, NON_ALPHANUMERIC),
            params.encode()
        )
    }

    /// Run a query and decode its `result`
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        query: &str,
        params: &QueryParams,
    ) -> Result<T, CmsError> {
        let url = self.query_url(query, params);
        tracing::debug!("CMS query: {}", url);

        let mut request = self.http.get(&url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(CmsError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: QueryResponse<T> = serde_json::from_str(&body)?;
        Ok(envelope.result)
    }
}

#[async_trait]
impl ContentRepository for SanityClient {
    async fn list_posts(&self) -> Result<Vec<PostListItem>, CmsError> {
        let query = queries::posts_query(self.list_limit);
        let posts: Option<Vec<PostListItem>> = self.fetch(&query, &QueryParams::new()).await?;
        Ok(posts.unwrap_or_default())
    }

    async fn post_by_slug(&self, slug: &str) -> Result<Option<Post>, CmsError> {
        if slug.is_empty() {
            return Ok(None);
        }
        let params = QueryParams::new().with("slug", slug);
        self.fetch(queries::POST_QUERY, &params).await
    }

    async fn post_slugs(&self) -> Result<Vec<String>, CmsError> {
        let slugs: Option<Vec<Option<String>>> = self
            .fetch(queries::POST_SLUGS_QUERY, &QueryParams::new())
            .await?;
        Ok(slugs
            .unwrap_or_default()
            .into_iter()
            .flatten()
            .filter(|slug| !slug.is_empty())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CmsConfig {
        CmsConfig {
            project_id: "abc123".to_string(),
            ..CmsConfig::default()
        }
    }

    #[test]
    fn test_requires_project_id() {
        let err = SanityClient::new(&CmsConfig::default(), 20).unwrap_err();
        assert!(matches!(err, CmsError::Config(_)));
    }

    #[test]
    fn test_cdn_endpoint() {
        let client = SanityClient::new(&config(), 20).unwrap();
        let url = client.query_url("*", &QueryParams::new());
        assert_eq!(
            url,
            "https://abc123.apicdn.sanity.io/v2024-01-01/data/query/production?query=%2A"
        );
    }

    #[test]
    fn test_api_endpoint_and_params() {
        let cms = CmsConfig {
            use_cdn: false,
            api_version: "v2021-10-21".to_string(),
            ..config()
        };
        let client = SanityClient::new(&cms, 20).unwrap();
        let url = client.query_url("q", &QueryParams::new().with("slug", "hello world"));
        assert!(url
            .starts_with("https://abc123.api.sanity.io/v2021-10-21/data/query/production?query=q"));
        assert!(url.ends_with("&%24slug=%22hello%20world%22"));
    }

    #[test]
    fn test_decode_envelope() {
        let body = r#"{"ms": 3, "query": "...", "result": [{"_id": "p1", "title": "T"}]}"#;
        let envelope: QueryResponse<Vec<PostListItem>> = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.result.len(), 1);
        assert_eq!(envelope.result[0].id, "p1");
    }

    #[tokio::test]
    async fn test_empty_slug_skips_request() {
        let client = SanityClient::new(&config(), 20).unwrap();
        assert_eq!(client.post_by_slug("").await.unwrap(), None);
    }
}
