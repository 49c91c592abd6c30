use serde::{Deserialize, Serialize};

use super::Record;

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct FormattedRecord {
    pub content: Option<String>,
    pub title: Option<String>,
    pub keywords: Vec<String>,
}

impl From<Record> for FormattedRecord {
    fn from(record: Record) -> Self {
        FormattedRecord {
            content: record.content,
            title: record.title,
            keywords: record.keywords.unwrap_or_default(),
        }
    }
}

/// Everything the quiz prompt template can reference.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct TemplateVariables {
    pub topic: String,
    pub records: Vec<FormattedRecord>,
}

impl TemplateVariables {
    pub fn new(topic: &str, records: Vec<Record>) -> Self {
        TemplateVariables {
            topic: topic.to_string(),
            records: records.into_iter().map(FormattedRecord::from).collect(),
        }
    }
}
