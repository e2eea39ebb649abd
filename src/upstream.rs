use crate::errors::UpstreamError;
use crate::models::DateRange;
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPayloads {
    pub timeline: String,
    pub sources: String,
    pub sentiment: String,
}

/// Anything that can produce the three dashboard payloads for a date range.
pub trait PayloadSource {
    fn fetch(
        &self,
        range: &DateRange,
    ) -> impl Future<Output = Result<RawPayloads, UpstreamError>> + Send;
}

pub struct UpstreamClient {
    client: Client,
    base_url: String,
}

impl UpstreamClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| UpstreamError::Client(err.to_string()))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    async fn get_text(
        &self,
        endpoint: &'static str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<String, UpstreamError> {
        let url = format!("{}{path}", self.base_url);
        debug!(endpoint, %url, "fetching upstream payload");

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|source| UpstreamError::Transport { endpoint, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status { endpoint, status });
        }

        response
            .text()
            .await
            .map_err(|source| UpstreamError::Transport { endpoint, source })
    }
}

pub fn timeline_query(range: &DateRange) -> Vec<(&'static str, String)> {
    vec![
        ("type", "chart".to_string()),
        ("query", format!("dates all;{}", range.from_to_param())),
    ]
}

pub fn sources_query(range: &DateRange) -> Vec<(&'static str, String)> {
    vec![
        ("type", "chart".to_string()),
        ("query", format!("sites all;{}", range.from_to_param())),
    ]
}

pub fn sentiment_query(range: &DateRange) -> Vec<(&'static str, String)> {
    vec![(
        "query",
        format!(
            "keywords=\" \";minMatch=1;limit=10000;dateFrom={};dateTo={}",
            range.from.format("%Y-%m-%d"),
            range.to.format("%Y-%m-%d")
        ),
    )]
}

impl PayloadSource for UpstreamClient {
    async fn fetch(&self, range: &DateRange) -> Result<RawPayloads, UpstreamError> {
        let timeline_query = timeline_query(range);
        let sources_query = sources_query(range);
        let sentiment_query = sentiment_query(range);

        let (timeline, sources, sentiment) = tokio::try_join!(
            self.get_text("timeline", "/api/fetch-data", &timeline_query),
            self.get_text("sources", "/api/fetch-data", &sources_query),
            self.get_text("sentiment", "/api/sentiment", &sentiment_query),
        )?;

        Ok(RawPayloads {
            timeline,
            sources,
            sentiment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn june_first_week() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 7).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn chart_queries_carry_the_from_to_range() {
        let range = june_first_week();
        assert_eq!(
            timeline_query(&range)[1].1,
            "dates all;fromTo=2025-06-01T00:00Z_2025-06-07T00:00Z"
        );
        assert_eq!(
            sources_query(&range)[1].1,
            "sites all;fromTo=2025-06-01T00:00Z_2025-06-07T00:00Z"
        );
    }

    #[test]
    fn sentiment_query_uses_plain_dates() {
        let query = sentiment_query(&june_first_week());
        assert_eq!(
            query[0].1,
            "keywords=\" \";minMatch=1;limit=10000;dateFrom=2025-06-01;dateTo=2025-06-07"
        );
    }

    #[test]
    fn base_url_loses_trailing_slash() {
        let client = UpstreamClient::new("http://localhost:5000/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url, "http://localhost:5000");
    }
}
