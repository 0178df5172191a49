// src/models/batch.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Falha de um item do lote. `id` é `None` quando a entrada não trouxe id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BatchFailure {
    pub id: Option<i32>,
    pub error: String,
}

/// Resultado de um `PUT` em lote: cada item é tentado de forma independente.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutcome<T> {
    pub updated: usize,
    pub failed: usize,
    pub results: Vec<T>,
    pub failures: Vec<BatchFailure>,
}

impl<T> Default for BatchOutcome<T> {
    fn default() -> Self {
        Self {
            updated: 0,
            failed: 0,
            results: Vec::new(),
            failures: Vec::new(),
        }
    }
}

impl<T> BatchOutcome<T> {
    pub fn record<E: std::fmt::Display>(&mut self, id: Option<i32>, result: Result<T, E>) {
        match result {
            Ok(row) => {
                self.updated += 1;
                self.results.push(row);
            }
            Err(e) => {
                self.failed += 1;
                self.failures.push(BatchFailure {
                    id,
                    error: e.to_string(),
                });
            }
        }
    }

    pub fn failed_ids(&self) -> Vec<i32> {
        self.failures.iter().filter_map(|f| f.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_missing_id_does_not_abort_the_rest() {
        let mut outcome = BatchOutcome::default();
        outcome.record(Some(1), Ok::<_, String>("r1"));
        outcome.record(Some(99), Err("Route not found"));
        outcome.record(Some(3), Ok::<_, &str>("r3"));

        assert_eq!(outcome.updated, 2);
        assert_eq!(outcome.failed, 1);
        assert_eq!(outcome.failed_ids(), vec![99]);
        assert_eq!(outcome.results, vec!["r1", "r3"]);
    }

    #[test]
    fn serializes_counts_and_failures() {
        let mut outcome: BatchOutcome<i32> = BatchOutcome::default();
        outcome.record(None, Err::<i32, _>("Missing id"));
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["updated"], 0);
        assert_eq!(value["failed"], 1);
        assert_eq!(value["failures"][0]["id"], serde_json::Value::Null);
    }
}
