use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::{
    config::Config,
    errors::{AppError, AppResult},
    models::domain::Article,
};

/// Query-in, articles-out literature backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LiteratureSearch: Send + Sync {
    async fn search(&self, query: &str, max_results: usize) -> AppResult<Vec<Article>>;
}

static ARTICLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<PubmedArticle(?:\s[^>]*)?>(.*?)</PubmedArticle>")
        .expect("ARTICLE_RE is a valid regex pattern")
});
static PMID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<PMID(?:\s[^>]*)?>\s*(\d+)\s*</PMID>").expect("PMID_RE is a valid regex pattern")
});
static TITLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<ArticleTitle(?:\s[^>]*)?>(.*?)</ArticleTitle>")
        .expect("TITLE_RE is a valid regex pattern")
});
static ABSTRACT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<AbstractText(?:\s[^>]*)?>(.*?)</AbstractText>")
        .expect("ABSTRACT_RE is a valid regex pattern")
});
static KEYWORD_LIST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<KeywordList(?:\s[^>]*)?>").expect("KEYWORD_LIST_RE is a valid regex pattern")
});
static KEYWORD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<Keyword(?:\s[^>]*)?>(.*?)</Keyword>")
        .expect("KEYWORD_RE is a valid regex pattern")
});
static TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]+>").expect("TAG_RE is a valid regex pattern"));
static NUMERIC_ENTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&#(x[0-9a-fA-F]+|\d+);").expect("NUMERIC_ENTITY_RE is a valid regex pattern")
});

#[derive(Debug, Deserialize)]
struct ESearchResponse {
    esearchresult: ESearchResult,
}

#[derive(Debug, Deserialize)]
struct ESearchResult {
    #[serde(default)]
    idlist: Vec<String>,
    #[serde(rename = "ERROR")]
    error: Option<String>,
}

/// NCBI E-utilities client: `esearch` for ids, then `efetch` for the article XML.
pub struct PubmedClient {
    client: reqwest::Client,
    base_url: String,
    tool: String,
    email: String,
    api_key: Option<SecretString>,
}

impl PubmedClient {
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.pubmed_base_url.trim_end_matches('/').to_string(),
            tool: config.pubmed_tool.clone(),
            email: config.pubmed_email.clone(),
            api_key: config.ncbi_api_key.clone(),
        })
    }

    fn common_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("db", "pubmed".to_string()),
            ("tool", self.tool.clone()),
            ("email", self.email.clone()),
        ];
        if let Some(key) = &self.api_key {
            params.push(("api_key", key.expose_secret().to_string()));
        }
        params
    }

    async fn search_ids(&self, query: &str, max_results: usize) -> AppResult<Vec<String>> {
        let mut params = self.common_params();
        params.push(("term", query.to_string()));
        params.push(("retmax", max_results.to_string()));
        params.push(("retmode", "json".to_string()));

        let response = self
            .client
            .get(format!("{}/esearch.fcgi", self.base_url))
            .query(&params)
            .send()
            .await
            .map_err(|e| AppError::Search(format!("esearch request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Search(format!(
                "esearch returned {}: {}",
                status, body
            )));
        }

        let parsed: ESearchResponse = response
            .json()
            .await
            .map_err(|e| AppError::Search(format!("invalid esearch response: {}", e)))?;

        if let Some(error) = parsed.esearchresult.error {
            return Err(AppError::Search(format!("esearch error: {}", error)));
        }

        Ok(parsed.esearchresult.idlist)
    }

    async fn fetch_articles(&self, ids: &[String]) -> AppResult<Vec<Article>> {
        let mut params = self.common_params();
        params.push(("id", ids.join(",")));
        params.push(("retmode", "xml".to_string()));

        let response = self
            .client
            .get(format!("{}/efetch.fcgi", self.base_url))
            .query(&params)
            .send()
            .await
            .map_err(|e| AppError::Search(format!("efetch request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::Search(format!("unreadable efetch response: {}", e)))?;
        if !status.is_success() {
            return Err(AppError::Search(format!(
                "efetch returned {}: {}",
                status, body
            )));
        }

        Ok(parse_pubmed_articles(&body))
    }
}

#[async_trait]
impl LiteratureSearch for PubmedClient {
    async fn search(&self, query: &str, max_results: usize) -> AppResult<Vec<Article>> {
        let ids = self.search_ids(query, max_results).await?;
        if ids.is_empty() {
            log::debug!("No PubMed results for query '{}'", query);
            return Ok(Vec::new());
        }

        log::debug!("PubMed query '{}' matched ids {:?}", query, ids);
        self.fetch_articles(&ids).await
    }
}

/// Extracts one `Article` per `<PubmedArticle>` element of an efetch XML payload.
pub fn parse_pubmed_articles(xml: &str) -> Vec<Article> {
    ARTICLE_RE
        .captures_iter(xml)
        .map(|caps| {
            let body = &caps[1];

            let sections: Vec<String> = ABSTRACT_RE
                .captures_iter(body)
                .map(|c| clean_text(&c[1]))
                .collect();
            let keywords = KEYWORD_LIST_RE.is_match(body).then(|| {
                KEYWORD_RE
                    .captures_iter(body)
                    .map(|c| clean_text(&c[1]))
                    .filter(|k| !k.is_empty())
                    .collect::<Vec<String>>()
            });

            Article {
                pmid: PMID_RE.captures(body).map(|c| c[1].to_string()),
                title: TITLE_RE.captures(body).map(|c| clean_text(&c[1])),
                abstract_text: (!sections.is_empty()).then(|| sections.join("\n")),
                keywords,
            }
        })
        .collect()
}

fn clean_text(raw: &str) -> String {
    let stripped = TAG_RE.replace_all(raw, "");
    decode_entities(stripped.trim())
}

fn decode_entities(text: &str) -> String {
    let numeric = NUMERIC_ENTITY_RE.replace_all(text, |caps: &regex::Captures| {
        let code = &caps[1];
        let value = match code.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => code.parse().ok(),
        };
        value
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_string())
    });

    numeric
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const EFETCH_XML: &str = r#"<?xml version="1.0" ?>
<PubmedArticleSet>
  <PubmedArticle>
    <MedlineCitation Status="MEDLINE" Owner="NLM">
      <PMID Version="1">33301246</PMID>
      <Article PubModel="Print">
        <ArticleTitle>Remdesivir for the Treatment of <i>Covid-19</i> &amp; Beyond</ArticleTitle>
        <Abstract>
          <AbstractText Label="BACKGROUND">Hospitalized adults &lt;65 years.</AbstractText>
          <AbstractText Label="RESULTS">Recovery was faster&#8212;11 days.</AbstractText>
        </Abstract>
      </Article>
      <KeywordList Owner="NOTNLM">
        <Keyword MajorTopicYN="N">covid</Keyword>
        <Keyword MajorTopicYN="N">antiviral</Keyword>
      </KeywordList>
    </MedlineCitation>
  </PubmedArticle>
  <PubmedArticle>
    <MedlineCitation>
      <PMID Version="1">1</PMID>
      <Article>
        <ArticleTitle>No abstract here</ArticleTitle>
      </Article>
    </MedlineCitation>
  </PubmedArticle>
</PubmedArticleSet>"#;

    #[test]
    fn test_parse_pubmed_articles_extracts_fields() {
        let articles = parse_pubmed_articles(EFETCH_XML);
        assert_eq!(articles.len(), 2);

        let first = &articles[0];
        assert_eq!(first.pmid.as_deref(), Some("33301246"));
        assert_eq!(
            first.title.as_deref(),
            Some("Remdesivir for the Treatment of Covid-19 & Beyond")
        );
        assert_eq!(
            first.abstract_text.as_deref(),
            Some("Hospitalized adults <65 years.\nRecovery was faster\u{2014}11 days.")
        );
        assert_eq!(
            first.keywords,
            Some(vec!["covid".to_string(), "antiviral".to_string()])
        );
    }

    #[test]
    fn test_parse_pubmed_articles_missing_sections_are_none() {
        let articles = parse_pubmed_articles(EFETCH_XML);
        let second = &articles[1];

        assert_eq!(second.title.as_deref(), Some("No abstract here"));
        assert!(second.abstract_text.is_none());
        assert!(second.keywords.is_none());
    }

    #[test]
    fn test_parse_pubmed_articles_empty_set() {
        assert!(parse_pubmed_articles("<PubmedArticleSet></PubmedArticleSet>").is_empty());
    }

    fn client_for(server: &MockServer) -> PubmedClient {
        let mut config = Config::test_config();
        config.pubmed_base_url = server.uri();
        PubmedClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_search_fetches_articles_for_matched_ids() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/esearch.fcgi"))
            .and(query_param("term", "COVID-19 treatments"))
            .and(query_param("retmax", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "esearchresult": { "count": "1", "idlist": ["33301246"] }
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/efetch.fcgi"))
            .and(query_param("id", "33301246"))
            .respond_with(ResponseTemplate::new(200).set_body_string(EFETCH_XML))
            .expect(1)
            .mount(&server)
            .await;

        let articles = client_for(&server)
            .search("COVID-19 treatments", 1)
            .await
            .unwrap();
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].pmid.as_deref(), Some("33301246"));
    }

    #[tokio::test]
    async fn test_search_without_ids_skips_efetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/esearch.fcgi"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "esearchresult": { "count": "0", "idlist": [] }
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/efetch.fcgi"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let articles = client_for(&server).search("", 1).await.unwrap();
        assert!(articles.is_empty());
    }

    #[tokio::test]
    async fn test_search_surfaces_backend_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/esearch.fcgi"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let err = client_for(&server).search("sepsis", 1).await.unwrap_err();
        assert!(matches!(err, AppError::Search(_)));
        assert!(err.to_string().contains("429"));
    }
}
