use std::collections::BTreeMap;

use catalog::source::{QueryPlan, SeriesBatch, SeriesRows, SourceError};
use futures::future;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutorError {
    ExtremumConflict { key: String, field: &'static str },
    MixedRowKinds { key: String },
    Source { key: String, error: SourceError },
}

impl std::fmt::Display for ExecutorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutorError::ExtremumConflict { key, field } => write!(
                f,
                "field {field} already defined for '{key}': it can only be defined by one API response"
            ),
            ExecutorError::MixedRowKinds { key } => {
                write!(f, "responses for '{key}' carry mismatched row kinds")
            }
            ExecutorError::Source { key, error } => write!(f, "query '{key}' failed: {error}"),
        }
    }
}

impl std::error::Error for ExecutorError {}

/// Run a map of named query plans and collate results by name.
///
/// Distinct names resolve concurrently. A `Sequence` plan's parts are
/// awaited strictly in order so rows concatenate before any later part may
/// claim the extrema side channel; an empty sequence yields no entry.
pub async fn execute(
    plans: BTreeMap<String, QueryPlan<'_>>,
) -> Result<BTreeMap<String, SeriesBatch>, ExecutorError> {
    let tasks = plans
        .into_iter()
        .map(|(key, plan)| resolve_entry(key, plan));
    let settled = future::join_all(tasks).await;

    let mut out = BTreeMap::new();
    for entry in settled {
        if let Some((key, batch)) = entry? {
            out.insert(key, batch);
        }
    }
    Ok(out)
}

async fn resolve_entry(
    key: String,
    plan: QueryPlan<'_>,
) -> Result<Option<(String, SeriesBatch)>, ExecutorError> {
    match plan {
        QueryPlan::Single(fut) => {
            let batch = fut.await.map_err(|error| ExecutorError::Source {
                key: key.clone(),
                error,
            })?;
            Ok(Some((key, batch)))
        }
        QueryPlan::Sequence(parts) => {
            let mut acc: Option<SeriesBatch> = None;
            for fut in parts {
                let part = fut.await.map_err(|error| ExecutorError::Source {
                    key: key.clone(),
                    error,
                })?;
                match acc.as_mut() {
                    None => acc = Some(part),
                    Some(current) => append_batch(current, part, &key)?,
                }
            }
            Ok(acc.map(|batch| (key, batch)))
        }
    }
}

fn append_batch(acc: &mut SeriesBatch, part: SeriesBatch, key: &str) -> Result<(), ExecutorError> {
    match (&mut acc.rows, part.rows) {
        (SeriesRows::Values(dst), SeriesRows::Values(src)) => dst.extend(src),
        (SeriesRows::Trends(dst), SeriesRows::Trends(src)) => dst.extend(src),
        _ => {
            return Err(ExecutorError::MixedRowKinds {
                key: key.to_string(),
            });
        }
    }

    if let Some(min) = part.min_all_time {
        if acc.min_all_time.is_some() {
            return Err(ExecutorError::ExtremumConflict {
                key: key.to_string(),
                field: "min_all_time",
            });
        }
        acc.min_all_time = Some(min);
    }
    if let Some(max) = part.max_all_time {
        if acc.max_all_time.is_some() {
            return Err(ExecutorError::ExtremumConflict {
                key: key.to_string(),
                field: "max_all_time",
            });
        }
        acc.max_all_time = Some(max);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{ExecutorError, execute};
    use catalog::source::{QueryPlan, SeriesBatch, SourceError, SourceFuture};
    use foundation::observation::Observation;
    use futures::FutureExt;
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn ready_values(rows: Vec<Observation>) -> SourceFuture<'static> {
        async move { Ok(SeriesBatch::values(rows)) }.boxed_local()
    }

    fn ready_batch(batch: SeriesBatch) -> SourceFuture<'static> {
        async move { Ok(batch) }.boxed_local()
    }

    #[test]
    fn collates_named_singles_by_key() {
        let mut plans = BTreeMap::new();
        plans.insert(
            "74".to_string(),
            QueryPlan::Single(ready_values(vec![Observation::new("36", 5.0)])),
        );
        plans.insert(
            "policy_status_counts".to_string(),
            QueryPlan::Single(ready_values(vec![Observation::new("New York", 12.0)])),
        );

        let results = block_on(execute(plans)).expect("execute");
        assert_eq!(results.len(), 2);
        assert_eq!(
            results["74"].observations().map(|rows| rows.len()),
            Some(1)
        );
    }

    #[test]
    fn sequence_parts_concatenate_in_order() {
        let mut plans = BTreeMap::new();
        plans.insert(
            "74".to_string(),
            QueryPlan::Sequence(vec![
                ready_values(vec![Observation::new("a", 1.0)]),
                ready_values(vec![Observation::new("b", 2.0)]),
                ready_values(vec![Observation::new("c", 3.0)]),
            ]),
        );

        let results = block_on(execute(plans)).expect("execute");
        let rows = results["74"].observations().expect("value rows");
        let order: Vec<_> = rows
            .iter()
            .map(|o| o.link.as_ref().expect("linked").as_str())
            .collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn one_extrema_claim_lands_on_the_result() {
        let claimed = SeriesBatch::values(vec![Observation::new("a", 1.0)])
            .with_extrema(Observation::unlinked(0.0), Observation::unlinked(400.0));

        let mut plans = BTreeMap::new();
        plans.insert(
            "74".to_string(),
            QueryPlan::Sequence(vec![
                ready_batch(claimed),
                ready_values(vec![Observation::new("b", 2.0)]),
            ]),
        );

        let results = block_on(execute(plans)).expect("execute");
        let batch = &results["74"];
        assert_eq!(batch.max_all_time, Some(Observation::unlinked(400.0)));
        assert_eq!(batch.rows.len(), 2);
    }

    #[test]
    fn second_extrema_claim_fails_fast() {
        let first = SeriesBatch::values(Vec::new())
            .with_extrema(Observation::unlinked(0.0), Observation::unlinked(400.0));
        let second = SeriesBatch::values(Vec::new())
            .with_extrema(Observation::unlinked(1.0), Observation::unlinked(500.0));

        let mut plans = BTreeMap::new();
        plans.insert(
            "74".to_string(),
            QueryPlan::Sequence(vec![ready_batch(first), ready_batch(second)]),
        );

        let err = block_on(execute(plans)).expect_err("conflicting extrema");
        assert!(matches!(
            err,
            ExecutorError::ExtremumConflict { field: "min_all_time", .. }
        ));
    }

    #[test]
    fn empty_sequences_are_skipped() {
        let mut plans = BTreeMap::new();
        plans.insert("empty".to_string(), QueryPlan::Sequence(Vec::new()));
        plans.insert(
            "74".to_string(),
            QueryPlan::Single(ready_values(Vec::new())),
        );

        let results = block_on(execute(plans)).expect("execute");
        assert!(!results.contains_key("empty"));
        assert!(results.contains_key("74"));
    }

    #[test]
    fn source_failures_carry_their_key() {
        let mut plans = BTreeMap::new();
        plans.insert(
            "74".to_string(),
            QueryPlan::Single(
                async { Err(SourceError::new("backend unreachable")) }.boxed_local(),
            ),
        );

        let err = block_on(execute(plans)).expect_err("source failure");
        match err {
            ExecutorError::Source { key, .. } => assert_eq!(key, "74"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
