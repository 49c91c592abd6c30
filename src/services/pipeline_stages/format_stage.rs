use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    errors::AppResult,
    models::domain::{Record, TemplateVariables},
    services::stage::{Port, Stage},
};

#[derive(Debug, Deserialize)]
pub struct FormatInput {
    pub records: Vec<Record>,
    pub topic: String,
}

#[derive(Debug, Serialize)]
pub struct FormatOutput {
    pub variables: TemplateVariables,
}

pub struct FormatStage;

#[async_trait]
impl Stage for FormatStage {
    type Input = FormatInput;
    type Output = FormatOutput;

    const INPUTS: &'static [Port] = &[Port::required("records"), Port::required("topic")];
    const OUTPUTS: &'static [&'static str] = &["variables"];

    async fn run(&self, input: Self::Input) -> AppResult<Self::Output> {
        Ok(FormatOutput {
            variables: TemplateVariables::new(&input.topic, input.records),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures::{covid_record, test_records};

    #[tokio::test]
    async fn test_format_is_order_preserving() {
        let records = test_records();
        let output = FormatStage
            .run(FormatInput {
                records: records.clone(),
                topic: "Cardiology".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(output.variables.topic, "Cardiology");
        assert_eq!(output.variables.records.len(), records.len());
        for (formatted, record) in output.variables.records.iter().zip(&records) {
            assert_eq!(formatted.title, record.title);
            assert_eq!(formatted.content, record.content);
        }
    }

    #[tokio::test]
    async fn test_absent_keywords_become_empty() {
        let mut record = covid_record();
        record.keywords = None;

        let output = FormatStage
            .run(FormatInput {
                records: vec![record],
                topic: "COVID-19 treatments".to_string(),
            })
            .await
            .unwrap();

        assert!(output.variables.records[0].keywords.is_empty());
    }

    #[tokio::test]
    async fn test_empty_records_still_format() {
        let output = FormatStage
            .run(FormatInput {
                records: Vec::new(),
                topic: "Gout".to_string(),
            })
            .await
            .unwrap();

        assert!(output.variables.records.is_empty());
    }
}
