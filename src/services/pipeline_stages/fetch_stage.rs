use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    clients::LiteratureSearch,
    errors::AppResult,
    models::domain::Record,
    services::stage::{Port, Stage},
};

#[derive(Debug, Deserialize)]
pub struct FetchInput {
    /// Batch of query groups; each group is multi-line text with one query per line.
    pub queries: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct FetchOutput {
    pub records: Vec<Record>,
}

/// Turns topic text into literature records.
///
/// Retrieval is best effort: the first failing query ends the batch and the records gathered
/// before it are returned. Later queries are not attempted.
pub struct FetchStage {
    search: Arc<dyn LiteratureSearch>,
    max_results: usize,
}

impl FetchStage {
    pub fn new(search: Arc<dyn LiteratureSearch>, max_results: usize) -> Self {
        Self {
            search,
            max_results,
        }
    }
}

/// Splits every group on line breaks. Blank lines are kept as (empty) queries.
pub fn split_queries(groups: &[String]) -> Vec<String> {
    groups
        .iter()
        .flat_map(|group| group.trim().split('\n').map(|line| line.trim().to_string()))
        .collect()
}

#[async_trait]
impl Stage for FetchStage {
    type Input = FetchInput;
    type Output = FetchOutput;

    const INPUTS: &'static [Port] = &[Port::required("queries")];
    const OUTPUTS: &'static [&'static str] = &["records"];

    async fn run(&self, input: Self::Input) -> AppResult<Self::Output> {
        let queries = split_queries(&input.queries);
        let mut records = Vec::new();

        for query in &queries {
            match self.search.search(query, self.max_results).await {
                Ok(articles) => records.extend(articles.into_iter().map(Record::from)),
                Err(e) => {
                    log::warn!("{}", e);
                    log::warn!(
                        "Couldn't fetch articles for queries {:?}; continuing with {} record(s)",
                        input.queries,
                        records.len()
                    );
                    break;
                }
            }
        }

        log::debug!(
            "Fetched {} record(s) for {} quer(ies)",
            records.len(),
            queries.len()
        );
        Ok(FetchOutput { records })
    }
}
