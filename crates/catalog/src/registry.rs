use std::rc::Rc;

use foundation::feature::{GeoSource, PropertyFilter};
use foundation::ids::{MapModeId, MetricId};

use crate::metric::{Metric, Role, RoleStyles, StyleOptions};
use crate::params::{ParamError, Params, PolicyResolution, QueryParams, ResolveCtx};
use crate::source::SeriesSource;

/// The externally supplied query functions the catalogs are built over.
#[derive(Clone)]
pub struct SourceSet {
    pub policy_status: Rc<dyn SeriesSource>,
    pub lockdown_level: Rc<dyn SeriesSource>,
    pub caseload: Rc<dyn SeriesSource>,
    pub trend: Rc<dyn SeriesSource>,
}

/// Everything one map mode declares: its metrics, its geometry sources and
/// the trend query used for derived sub-series.
#[derive(Clone)]
pub struct ModeCatalog {
    pub mode: MapModeId,
    pub metrics: Vec<Metric>,
    pub geo_sources: Vec<GeoSource>,
    pub trend_source: Rc<dyn SeriesSource>,
}

impl ModeCatalog {
    pub fn metric(&self, id: &MetricId) -> Option<&Metric> {
        self.metrics.iter().find(|m| &m.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    UnknownMode(String),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::UnknownMode(mode) => write!(f, "no catalog for map mode '{mode}'"),
        }
    }
}

impl std::error::Error for CatalogError {}

/// Catalogs are produced eagerly by these factories; metric records hold no
/// deferred lookups.
pub fn catalog_for_mode(mode: &MapModeId, sources: &SourceSet) -> Result<ModeCatalog, CatalogError> {
    match mode.as_str() {
        "us" => Ok(us_catalog(sources)),
        "us-county" => Ok(us_county_catalog(sources)),
        "global" => Ok(global_catalog(sources)),
        other => Err(CatalogError::UnknownMode(other.to_string())),
    }
}

fn policy_status_params(ctx: &ResolveCtx<'_>, place_type: &str) -> Result<QueryParams, ParamError> {
    let filters = serde_json::to_value(ctx.filters)
        .map_err(|e| ParamError::new(format!("filters did not serialize: {e}")))?;

    let mut params = QueryParams::new();
    params.set("name", "policy_status_counts");
    params.set("map_id", ctx.map_mode.as_str());
    params.set("place_type", place_type);
    params.set("filters", filters);
    Ok(params)
}

fn lockdown_params() -> QueryParams {
    let mut params = QueryParams::new();
    params.set("name", "lockdown_level");
    params.set("fields", vec!["place_id", "value", "datestamp"]);
    params
}

fn caseload_params(metric_id: u64, spatial_resolution: &str) -> QueryParams {
    let mut params = QueryParams::new();
    params.set("metric_id", metric_id);
    params.set("temporal_resolution", "daily");
    params.set("spatial_resolution", spatial_resolution);
    params
}

fn us_catalog(sources: &SourceSet) -> ModeCatalog {
    let metrics = vec![
        Metric::new(
            "policy_status_counts",
            sources.policy_status.clone(),
            Params::Resolved(Rc::new(|ctx: &ResolveCtx<'_>| {
                policy_status_params(ctx, "state")
            })),
            vec![Role::Fill],
        )
        .with_link_field("state_name")
        .with_styles(RoleStyles::fill_style("policy_status_counts"))
        .with_filter(PropertyFilter::eq("type", "state"))
        .with_style_options(StyleOptions {
            outline: true,
            pattern: false,
        }),
        Metric::new(
            "lockdown_level",
            sources.lockdown_level.clone(),
            Params::Static(lockdown_params()),
            vec![Role::Fill],
        )
        .with_styles(RoleStyles::fill_style("lockdown_level"))
        .with_style_options(StyleOptions {
            outline: true,
            pattern: true,
        }),
        Metric::new(
            MetricId::from(74),
            sources.caseload.clone(),
            Params::Static(caseload_params(74, "state")),
            vec![Role::Circle],
        )
        .with_trend()
        .with_styles(RoleStyles::circle_style("circle")),
    ];

    ModeCatalog {
        mode: MapModeId::from("us"),
        metrics,
        geo_sources: vec![GeoSource::new("us-states"), GeoSource::new("us-centroids")],
        trend_source: sources.trend.clone(),
    }
}

fn us_county_catalog(sources: &SourceSet) -> ModeCatalog {
    let metrics = vec![
        Metric::new(
            "policy_status_counts",
            sources.policy_status.clone(),
            Params::Resolved(Rc::new(|ctx: &ResolveCtx<'_>| {
                let place_type = match ctx.policy_resolution {
                    PolicyResolution::Geo => "state",
                    PolicyResolution::SubGeo => "county",
                };
                policy_status_params(ctx, place_type)
            })),
            vec![Role::Fill],
        )
        .with_link_field("fips")
        .with_styles(RoleStyles::fill_style("policy_status_counts"))
        .with_filter(PropertyFilter::eq("type", "county")),
        Metric::new(
            MetricId::from(102),
            sources.caseload.clone(),
            Params::Static(caseload_params(102, "county")),
            vec![Role::Circle, Role::CircleState],
        )
        .with_trend()
        .with_styles(RoleStyles::circle_style("circle")),
    ];

    ModeCatalog {
        mode: MapModeId::from("us-county"),
        metrics,
        geo_sources: vec![
            GeoSource::new("us-counties"),
            GeoSource::new("county-centroids"),
            GeoSource::new("state-centroids"),
        ],
        trend_source: sources.trend.clone(),
    }
}

fn global_catalog(sources: &SourceSet) -> ModeCatalog {
    let metrics = vec![
        Metric::new(
            "policy_status_counts",
            sources.policy_status.clone(),
            Params::Resolved(Rc::new(|ctx: &ResolveCtx<'_>| {
                policy_status_params(ctx, "country")
            })),
            vec![Role::Fill],
        )
        .with_styles(RoleStyles::fill_style("policy_status_counts"))
        .with_filter(PropertyFilter::eq("type", "country")),
        Metric::new(
            MetricId::from(77),
            sources.caseload.clone(),
            Params::Static(caseload_params(77, "country")),
            vec![Role::Circle],
        )
        .with_trend()
        .with_styles(RoleStyles::circle_style("circle")),
    ];

    ModeCatalog {
        mode: MapModeId::from("global"),
        metrics,
        geo_sources: vec![
            GeoSource::new("countries"),
            GeoSource::new("country-centroids"),
        ],
        trend_source: sources.trend.clone(),
    }
}
