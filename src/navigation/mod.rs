//! Navigation Presentation
//!
//! The sidebar tree, its route-driven highlighting, per-group open state and
//! the breadcrumb trail.
//!
//! - `groups`: open/closed state of collapsible groups
//! - `breadcrumbs`: trail derived from the current path
//!
//! Active state is a pure function of the current path: a link is active on
//! an exact path match, a group is active when any of its children is.

pub mod breadcrumbs;
pub mod groups;

use serde::Serialize;

use crate::locale::Locale;

pub use breadcrumbs::{breadcrumbs, Breadcrumb};
pub use groups::{GroupState, GroupStates};

/// Icon handle; the renderer maps it to an actual glyph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NavIcon {
    Home,
    BookOpen,
    List,
    Video,
    Users,
    Settings,
}

/// One entry of the navigation tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavItem {
    /// Stable identity (the translation key); survives locale changes
    pub key: String,
    /// Localized label
    pub name: String,
    pub path: Option<String>,
    pub icon: Option<NavIcon>,
    pub children: Vec<NavItem>,
    pub badge: Option<String>,
}

impl NavItem {
    pub fn is_group(&self) -> bool {
        !self.children.is_empty()
    }
}

struct NavSpec {
    key: &'static str,
    path: Option<&'static str>,
    icon: Option<NavIcon>,
    badge_key: Option<&'static str>,
    children: &'static [NavSpec],
}

const NAV_TREE: &[NavSpec] = &[
    NavSpec {
        key: "nav.overview",
        path: Some("/dashboard"),
        icon: Some(NavIcon::Home),
        badge_key: None,
        children: &[],
    },
    NavSpec {
        key: "nav.classrooms",
        path: None,
        icon: Some(NavIcon::BookOpen),
        badge_key: Some("nav.new_badge"),
        children: &[
            NavSpec {
                key: "nav.classroom_list",
                path: Some("/dashboard/classrooms"),
                icon: Some(NavIcon::List),
                badge_key: None,
                children: &[],
            },
            NavSpec {
                key: "nav.recordings",
                path: Some("/dashboard/recordings"),
                icon: Some(NavIcon::Video),
                badge_key: None,
                children: &[],
            },
        ],
    },
    NavSpec {
        key: "nav.student_list",
        path: None,
        icon: Some(NavIcon::Users),
        badge_key: None,
        children: &[
            NavSpec {
                key: "nav.all_students",
                path: Some("/dashboard/students"),
                icon: None,
                badge_key: None,
                children: &[],
            },
            NavSpec {
                key: "nav.absent_students",
                path: Some("/dashboard/absent"),
                icon: None,
                badge_key: None,
                children: &[],
            },
            NavSpec {
                key: "nav.score_students",
                path: Some("/dashboard/low_score"),
                icon: None,
                badge_key: None,
                children: &[],
            },
        ],
    },
    NavSpec {
        key: "nav.teachers",
        path: Some("/dashboard/teachers"),
        icon: Some(NavIcon::Users),
        badge_key: None,
        children: &[],
    },
    NavSpec {
        key: "nav.settings",
        path: Some("/dashboard/settings"),
        icon: Some(NavIcon::Settings),
        badge_key: None,
        children: &[],
    },
];

/// Build the localized dashboard navigation tree
pub fn build_nav(locale: &dyn Locale) -> Vec<NavItem> {
    NAV_TREE.iter().map(|spec| build_item(spec, locale)).collect()
}

fn build_item(spec: &NavSpec, locale: &dyn Locale) -> NavItem {
    NavItem {
        key: spec.key.to_string(),
        name: locale.translate(spec.key),
        path: spec.path.map(str::to_string),
        icon: spec.icon,
        children: spec
            .children
            .iter()
            .map(|child| build_item(child, locale))
            .collect(),
        badge: spec.badge_key.map(|key| locale.translate(key)),
    }
}

pub fn is_link_active(current_path: &str, item: &NavItem) -> bool {
    item.path.as_deref() == Some(current_path)
}

/// Independent of whether the group is open
pub fn is_group_active(current_path: &str, item: &NavItem) -> bool {
    item.children
        .iter()
        .any(|child| is_link_active(current_path, child))
}
