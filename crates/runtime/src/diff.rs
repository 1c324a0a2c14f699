use catalog::metric::Metric;

use crate::view::{ViewDelta, ViewParams};

/// The selector's verdict: metrics to refetch and metrics whose previous
/// data can be carried over unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdatePlan {
    pub update: Vec<Metric>,
    pub reuse: Vec<Metric>,
}

/// Decide which visible metrics must be refetched this cycle.
///
/// Only metrics whose id matches the active fill or circle selection are
/// considered at all. Partial reuse is only attempted while exactly one
/// selection axis is moving: with no prior data, a mode or date change, both
/// role selections moving at once, or no detectable change, everything
/// visible is refetched.
pub fn select_metrics(
    metrics: &[Metric],
    current: &ViewParams,
    previous: Option<&ViewParams>,
    has_prior_data: bool,
) -> UpdatePlan {
    let visible: Vec<&Metric> = metrics
        .iter()
        .filter(|metric| is_active(metric, current))
        .collect();

    let Some(prev) = previous else {
        return full_refetch(visible);
    };
    let delta = ViewDelta::between(current, prev);

    let update_all = !has_prior_data
        || delta.mode_changed
        || delta.date_changed
        || (delta.circle_changed && delta.fill_changed)
        || delta.all_unchanged();
    if update_all {
        return full_refetch(visible);
    }

    let mut plan = UpdatePlan::default();
    if delta.circle_changed && !delta.fill_changed && !delta.filters_changed {
        // Only the circle selection moved; fill-side series stay valid.
        for metric in visible {
            if matches_selection(metric, current.circle.as_ref()) {
                plan.update.push(metric.clone());
            } else {
                plan.reuse.push(metric.clone());
            }
        }
    } else if delta.fill_changed || delta.filters_changed {
        for metric in visible {
            if matches_selection(metric, current.fill.as_ref()) {
                plan.update.push(metric.clone());
            } else {
                plan.reuse.push(metric.clone());
            }
        }
    } else {
        plan.reuse = visible.into_iter().cloned().collect();
    }

    log::debug!(
        "refetching {} metrics, reusing {}",
        plan.update.len(),
        plan.reuse.len()
    );
    plan
}

fn full_refetch(visible: Vec<&Metric>) -> UpdatePlan {
    let plan = UpdatePlan {
        update: visible.into_iter().cloned().collect(),
        reuse: Vec::new(),
    };
    log::debug!("refetching all {} visible metrics", plan.update.len());
    plan
}

fn is_active(metric: &Metric, view: &ViewParams) -> bool {
    matches_selection(metric, view.fill.as_ref()) || matches_selection(metric, view.circle.as_ref())
}

fn matches_selection(metric: &Metric, selected: Option<&foundation::ids::MetricId>) -> bool {
    selected.is_some_and(|id| id == &metric.id)
}

#[cfg(test)]
mod tests {
    use super::{UpdatePlan, select_metrics};
    use crate::view::ViewParams;
    use catalog::metric::{Metric, Role, RoleStyles};
    use catalog::params::{Params, QueryParams};
    use catalog::source::{SeriesBatch, SeriesSource, SourceFuture};
    use chrono::NaiveDate;
    use foundation::filters::FilterSet;
    use foundation::ids::MetricId;
    use futures::FutureExt;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;
    use std::rc::Rc;

    struct StubSource;

    impl SeriesSource for StubSource {
        fn fetch(&self, _params: QueryParams) -> SourceFuture<'_> {
            async { Ok(SeriesBatch::values(Vec::new())) }.boxed_local()
        }
    }

    fn metric(id: &str, role: Role) -> Metric {
        let styles = match role {
            Role::Fill => RoleStyles::fill_style(id),
            _ => RoleStyles::circle_style("circle"),
        };
        Metric::new(
            id,
            Rc::new(StubSource),
            Params::Static(QueryParams::new()),
            vec![role],
        )
        .with_styles(styles)
    }

    fn metrics() -> Vec<Metric> {
        vec![
            metric("policy_status_counts", Role::Fill),
            metric("lockdown_level", Role::Fill),
            metric("74", Role::Circle),
            metric("102", Role::Circle),
        ]
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 3, d).expect("valid date")
    }

    fn base_view() -> ViewParams {
        ViewParams::new("us", day(1))
            .with_fill("policy_status_counts")
            .with_circle("74")
    }

    fn ids(plan: &[Metric]) -> BTreeSet<String> {
        plan.iter().map(|m| m.id.as_str().to_string()).collect()
    }

    fn assert_covers_visible_exactly_once(plan: &UpdatePlan) {
        let mut seen = ids(&plan.update);
        for metric in &plan.reuse {
            assert!(
                seen.insert(metric.id.as_str().to_string()),
                "metric {} appears in both sets",
                metric.id
            );
        }
        let visible: BTreeSet<String> = ["policy_status_counts".to_string(), "74".to_string()]
            .into_iter()
            .collect();
        assert_eq!(seen, visible);
    }

    #[test]
    fn first_cycle_updates_everything_visible() {
        let plan = select_metrics(&metrics(), &base_view(), None, false);
        assert_eq!(ids(&plan.update), ids_of(&["74", "policy_status_counts"]));
        assert!(plan.reuse.is_empty());
    }

    #[test]
    fn date_change_forces_a_full_refetch() {
        let prev = base_view();
        let mut current = base_view();
        current.date = day(2);

        let plan = select_metrics(&metrics(), &current, Some(&prev), true);
        assert_eq!(ids(&plan.update), ids_of(&["74", "policy_status_counts"]));
        assert!(plan.reuse.is_empty());
    }

    #[test]
    fn mode_change_forces_a_full_refetch() {
        let prev = base_view();
        let mut current = base_view();
        current.map_mode = "us-county".into();

        let plan = select_metrics(&metrics(), &current, Some(&prev), true);
        assert!(plan.reuse.is_empty());
        assert_covers_visible_exactly_once(&plan);
    }

    #[test]
    fn both_roles_changing_forces_a_full_refetch() {
        let prev = base_view();
        let current = ViewParams::new("us", day(1))
            .with_fill("lockdown_level")
            .with_circle("102");

        let plan = select_metrics(&metrics(), &current, Some(&prev), true);
        assert_eq!(ids(&plan.update), ids_of(&["102", "lockdown_level"]));
        assert!(plan.reuse.is_empty());
    }

    #[test]
    fn unchanged_view_falls_back_to_a_full_refetch() {
        let prev = base_view();
        let plan = select_metrics(&metrics(), &base_view(), Some(&prev), true);
        assert_eq!(ids(&plan.update), ids_of(&["74", "policy_status_counts"]));
        assert!(plan.reuse.is_empty());
    }

    #[test]
    fn circle_only_change_reuses_the_fill_side() {
        let prev = base_view();
        let current = ViewParams::new("us", day(1))
            .with_fill("policy_status_counts")
            .with_circle("102");

        let plan = select_metrics(&metrics(), &current, Some(&prev), true);
        assert_eq!(ids(&plan.update), ids_of(&["102"]));
        assert_eq!(ids(&plan.reuse), ids_of(&["policy_status_counts"]));
    }

    #[test]
    fn fill_only_change_reuses_the_circle_side() {
        let prev = base_view();
        let current = ViewParams::new("us", day(1))
            .with_fill("lockdown_level")
            .with_circle("74");

        let plan = select_metrics(&metrics(), &current, Some(&prev), true);
        assert_eq!(ids(&plan.update), ids_of(&["lockdown_level"]));
        assert_eq!(ids(&plan.reuse), ids_of(&["74"]));
    }

    #[test]
    fn filters_change_refetches_the_fill_side() {
        let prev = base_view();
        let mut filters = FilterSet::new();
        filters.insert("primary_ph_measure", vec!["Social distancing".into()]);
        let current = base_view().with_filters(filters);

        let plan = select_metrics(&metrics(), &current, Some(&prev), true);
        assert_eq!(ids(&plan.update), ids_of(&["policy_status_counts"]));
        assert_eq!(ids(&plan.reuse), ids_of(&["74"]));
        assert_covers_visible_exactly_once(&plan);
    }

    #[test]
    fn missing_prior_data_overrides_partial_reuse() {
        let prev = base_view();
        let current = ViewParams::new("us", day(1))
            .with_fill("policy_status_counts")
            .with_circle("102");

        let plan = select_metrics(&metrics(), &current, Some(&prev), false);
        assert_eq!(ids(&plan.update), ids_of(&["102", "policy_status_counts"]));
        assert!(plan.reuse.is_empty());
    }

    #[test]
    fn inactive_metrics_are_never_considered() {
        let view = ViewParams::new("us", day(1)).with_circle("74");
        let plan = select_metrics(&metrics(), &view, None, false);
        assert_eq!(ids(&plan.update), ids_of(&["74"]));
        assert!(plan.reuse.is_empty());
    }

    fn ids_of(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn numeric_and_string_selections_compare_canonically() {
        let view = ViewParams::new("us", day(1)).with_circle(MetricId::from(74));
        let plan = select_metrics(&metrics(), &view, None, false);
        assert_eq!(ids(&plan.update), ids_of(&["74"]));
    }
}
