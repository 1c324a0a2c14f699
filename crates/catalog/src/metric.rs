use std::rc::Rc;

use foundation::feature::PropertyFilter;
use foundation::ids::MetricId;
use serde::{Deserialize, Serialize};

use crate::params::Params;
use crate::source::SeriesSource;

/// Rendering roles a metric can drive. `CircleState` is the state-tier
/// variant of the circle channel used on modes with zoom-tiered circles.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Fill,
    Circle,
    CircleState,
}

impl Role {
    pub fn is_fill(self) -> bool {
        matches!(self, Role::Fill)
    }

    pub fn is_circle(self) -> bool {
        matches!(self, Role::Circle | Role::CircleState)
    }
}

/// Style option flags carried through to the rendering layer.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleOptions {
    pub outline: bool,
    pub pattern: bool,
}

/// Style identifiers per rendering role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleStyles {
    pub fill: Option<String>,
    pub circle: Option<String>,
}

impl RoleStyles {
    pub fn fill_style(id: impl Into<String>) -> Self {
        Self {
            fill: Some(id.into()),
            circle: None,
        }
    }

    pub fn circle_style(id: impl Into<String>) -> Self {
        Self {
            fill: None,
            circle: Some(id.into()),
        }
    }
}

/// Default feature-link field: the backend's place identifier.
pub const DEFAULT_LINK_FIELD: &str = "place_id";

/// A named, independently fetchable data series and how it binds to the map.
///
/// Defined once per map mode at startup and immutable for the session.
#[derive(Clone)]
pub struct Metric {
    pub id: MetricId,
    pub source: Rc<dyn SeriesSource>,
    pub params: Params,
    pub roles: Vec<Role>,
    pub link_field: String,
    pub styles: RoleStyles,
    pub filter: Option<PropertyFilter>,
    pub trend: bool,
    pub style_options: StyleOptions,
}

impl Metric {
    pub fn new(
        id: impl Into<MetricId>,
        source: Rc<dyn SeriesSource>,
        params: Params,
        roles: Vec<Role>,
    ) -> Self {
        Self {
            id: id.into(),
            source,
            params,
            roles,
            link_field: DEFAULT_LINK_FIELD.to_string(),
            styles: RoleStyles::default(),
            filter: None,
            trend: false,
            style_options: StyleOptions::default(),
        }
    }

    pub fn with_link_field(mut self, field: impl Into<String>) -> Self {
        self.link_field = field.into();
        self
    }

    pub fn with_styles(mut self, styles: RoleStyles) -> Self {
        self.styles = styles;
        self
    }

    pub fn with_filter(mut self, filter: PropertyFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_trend(mut self) -> Self {
        self.trend = true;
        self
    }

    pub fn with_style_options(mut self, options: StyleOptions) -> Self {
        self.style_options = options;
        self
    }

    pub fn has_fill_role(&self) -> bool {
        self.roles.iter().any(|r| r.is_fill())
    }

    pub fn has_circle_role(&self) -> bool {
        self.roles.iter().any(|r| r.is_circle())
    }
}

impl std::fmt::Debug for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metric")
            .field("id", &self.id)
            .field("roles", &self.roles)
            .field("link_field", &self.link_field)
            .field("trend", &self.trend)
            .finish_non_exhaustive()
    }
}
