use crate::models::domain::{Article, GenerationParams, Record};

#[cfg(test)]
pub mod fixtures {
    use super::*;

    /// Search hit matching the single-record COVID-19 scenario
    pub fn covid_article() -> Article {
        Article {
            pmid: Some("33301246".to_string()),
            title: Some("T1".to_string()),
            abstract_text: Some("...abstract...".to_string()),
            keywords: Some(vec!["covid".to_string()]),
        }
    }

    pub fn covid_record() -> Record {
        Record::from(covid_article())
    }

    /// Records with distinct titles, in a known order
    pub fn test_records() -> Vec<Record> {
        vec![
            Record::new("Beta blockers reduce mortality.", "Heart failure therapy", &["cardiology"]),
            Record::new("Early antibiotics improve outcomes.", "Sepsis bundles", &["sepsis", "icu"]),
            Record::new("Inhaled corticosteroids remain first line.", "Asthma control", &[]),
        ]
    }

    pub fn test_generation_params() -> GenerationParams {
        GenerationParams {
            max_new_tokens: 500,
            temperature: 0.6,
            do_sample: true,
        }
    }
}

#[cfg(test)]
pub mod test_helpers {
    use actix_web::http::StatusCode;

    /// Asserts that a status code represents an error (4xx or 5xx)
    pub fn assert_error_status(status: StatusCode) {
        assert!(
            status.is_client_error() || status.is_server_error(),
            "Expected error status, got: {}",
            status
        );
    }

    /// Asserts that a status code represents success (2xx)
    pub fn assert_success_status(status: StatusCode) {
        assert!(
            status.is_success(),
            "Expected success status, got: {}",
            status
        );
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;

    #[test]
    fn test_fixtures_covid_record() {
        let record = covid_record();
        assert_eq!(record.title.as_deref(), Some("T1"));
        assert_eq!(record.keywords, Some(vec!["covid".to_string()]));
    }

    #[test]
    fn test_fixtures_test_records() {
        let records = test_records();
        assert_eq!(records.len(), 3);
        assert_eq!(records[2].keywords, Some(Vec::new()));
    }
}
