use foundation::observation::{Observation, TrendObservation};
use futures::future::LocalBoxFuture;

use crate::params::QueryParams;

/// Rows carried by one data series: plain observations or trend windows.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesRows {
    Values(Vec<Observation>),
    Trends(Vec<TrendObservation>),
}

impl SeriesRows {
    pub fn len(&self) -> usize {
        match self {
            SeriesRows::Values(rows) => rows.len(),
            SeriesRows::Trends(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SeriesRows::Values(_) => "values",
            SeriesRows::Trends(_) => "trends",
        }
    }
}

/// One query response: rows plus the optional global-extrema side channel.
///
/// `min_all_time` / `max_all_time` are all-time bounds the backend attaches
/// for legend scaling; at most one response per series may claim them.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesBatch {
    pub rows: SeriesRows,
    pub min_all_time: Option<Observation>,
    pub max_all_time: Option<Observation>,
}

impl SeriesBatch {
    pub fn values(rows: Vec<Observation>) -> Self {
        Self {
            rows: SeriesRows::Values(rows),
            min_all_time: None,
            max_all_time: None,
        }
    }

    pub fn trends(rows: Vec<TrendObservation>) -> Self {
        Self {
            rows: SeriesRows::Trends(rows),
            min_all_time: None,
            max_all_time: None,
        }
    }

    pub fn with_extrema(mut self, min: Observation, max: Observation) -> Self {
        self.min_all_time = Some(min);
        self.max_all_time = Some(max);
        self
    }

    pub fn observations(&self) -> Option<&[Observation]> {
        match &self.rows {
            SeriesRows::Values(rows) => Some(rows.as_slice()),
            SeriesRows::Trends(_) => None,
        }
    }

    pub fn trend_rows(&self) -> Option<&[TrendObservation]> {
        match &self.rows {
            SeriesRows::Trends(rows) => Some(rows.as_slice()),
            SeriesRows::Values(_) => None,
        }
    }
}

/// Upstream query failure. Transport detail stays with the source; the
/// engine only carries the message through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    pub message: String,
}

impl SourceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "query source failed: {}", self.message)
    }
}

impl std::error::Error for SourceError {}

pub type SourceFuture<'a> = LocalBoxFuture<'a, Result<SeriesBatch, SourceError>>;

/// A named query entry: one response, or ordered parts awaited strictly in
/// sequence and concatenated.
pub enum QueryPlan<'a> {
    Single(SourceFuture<'a>),
    Sequence(Vec<SourceFuture<'a>>),
}

/// An externally supplied asynchronous data series query.
pub trait SeriesSource {
    fn fetch(&self, params: QueryParams) -> SourceFuture<'_>;

    /// Sources that page their backend override this to a `Sequence`.
    fn plan(&self, params: QueryParams) -> QueryPlan<'_> {
        QueryPlan::Single(self.fetch(params))
    }

    /// POST-style sources that cannot run without a filters argument.
    fn requires_filters(&self) -> bool {
        false
    }
}
