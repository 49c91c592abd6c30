use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct GenerateQuizResponseDto {
    pub topic: String,
    /// Markdown quiz text exactly as returned by the generation backend.
    pub quiz: String,
    pub generated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExampleTopicsResponseDto {
    pub examples: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponseDto {
    pub status: &'static str,
    pub version: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_omitted_when_absent() {
        let dto = GenerateQuizResponseDto {
            topic: "Diabetes".to_string(),
            quiz: "**Multiple-choice (MCQ):**".to_string(),
            generated_at: Utc::now(),
            request_id: None,
        };

        let json = serde_json::to_value(&dto).unwrap();
        assert!(json.get("request_id").is_none());
        assert_eq!(json["topic"], "Diabetes");
    }
}
