use serde::{Deserialize, Serialize};

/// A search hit as returned by a literature backend.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Article {
    pub pmid: Option<String>,
    pub title: Option<String>,
    pub abstract_text: Option<String>,
    pub keywords: Option<Vec<String>>,
}

/// Normalized literature abstract. Lives only for the pipeline run that fetched it.
///
/// `content` and `title` are carried through untouched when the backend omits them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Record {
    pub content: Option<String>,
    pub title: Option<String>,
    pub keywords: Option<Vec<String>>,
}

impl Record {
    pub fn new(content: &str, title: &str, keywords: &[&str]) -> Self {
        Record {
            content: Some(content.to_string()),
            title: Some(title.to_string()),
            keywords: Some(keywords.iter().map(|k| k.to_string()).collect()),
        }
    }
}

impl From<Article> for Record {
    fn from(article: Article) -> Self {
        Record {
            content: article.abstract_text,
            title: article.title,
            keywords: article.keywords,
        }
    }
}
