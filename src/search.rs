use std::time::Duration;

use log::debug;
use url::Url;

use crate::{
    SEARCH_TIMEOUT_SECS_DEFAULT, SEARCH_URL_DEFAULT, SEARCH_USER_AGENT,
    error::{StartvalError, StartvalResult},
    utils,
};

pub const SNIPPETS_LIMIT: usize = 3;

pub trait SnippetSource {
    /// A few text fragments about the company, no relevance guaranteed.
    fn fetch_snippets(
        &self,
        company_name: &str,
    ) -> impl std::future::Future<Output = StartvalResult<Vec<String>>> + Send;
}

/// Scrapes the result page of a public search engine.
pub struct WebSearch {
    search_url: String,
    timeout: Duration,
}

impl Default for WebSearch {
    fn default() -> Self {
        Self::new(SEARCH_URL_DEFAULT)
    }
}

impl WebSearch {
    pub fn new(search_url: &str) -> Self {
        Self {
            search_url: search_url.to_string(),
            timeout: Duration::from_secs(SEARCH_TIMEOUT_SECS_DEFAULT),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn query_url(&self, company_name: &str) -> StartvalResult<Url> {
        let query = format!("{} startup funding", company_name.trim());
        Ok(Url::parse_with_params(&self.search_url, &[("q", query)])?)
    }
}

impl SnippetSource for WebSearch {
    async fn fetch_snippets(&self, company_name: &str) -> StartvalResult<Vec<String>> {
        let request_url = self.query_url(company_name)?;
        debug!("[Search] GET {request_url}");

        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(SEARCH_USER_AGENT)
            .build()?;

        let response = client.get(request_url).send().await?;
        if response.status() != reqwest::StatusCode::OK {
            return Err(StartvalError::HttpStatusError(
                response.status().to_string(),
            ));
        }

        let html = response.text().await?;
        Ok(utils::html::extract_span_texts(&html, SNIPPETS_LIMIT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_url() {
        let search = WebSearch::default();
        let url = search.query_url(" Acme & Sons ").unwrap();

        assert_eq!(
            url.as_str(),
            "https://www.google.com/search?q=Acme+%26+Sons+startup+funding"
        );
    }
}
