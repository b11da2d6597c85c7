//! Shell view model
//!
//! Plain data extracted from the shell before rendering. A renderer walks
//! these structs and reports user input back as `ShellAction`s.

use serde::Serialize;

use crate::directory::{Branch, Company};
use crate::navigation::{
    is_group_active, is_link_active, Breadcrumb, GroupStates, NavIcon, NavItem,
};
use crate::selection::ContextSnapshot;
use crate::session::GateDecision;
use crate::theme::ThemeMode;

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, Serialize)]
pub struct ShellView {
    pub gate: GateDecision,
    /// Spinner text while the gate is not `Render`
    pub loading_label: Option<String>,
    /// Full shell, only when the gate is `Render`
    pub frame: Option<ShellFrame>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShellFrame {
    pub header: HeaderView,
    pub sidebar: SidebarView,
    pub drawer: DrawerView,
    pub breadcrumbs: Vec<Breadcrumb>,
    pub footer: FooterView,
}

#[derive(Debug, Clone, Serialize)]
pub struct HeaderView {
    /// Target of the logo link
    pub home_path: String,
    pub locale_badge: String,
    pub language_toggle_title: String,
    pub theme: ThemeMode,
    pub theme_toggle_title: String,
    pub mobile_menu_open: bool,
}

/// Desktop sidebar
#[derive(Debug, Clone, Serialize)]
pub struct SidebarView {
    pub collapsed: bool,
    pub entries: Vec<NavEntryView>,
    pub location: LocationView,
}

/// Mobile drawer: groups always expanded, plus logout
#[derive(Debug, Clone, Serialize)]
pub struct DrawerView {
    pub open: bool,
    pub entries: Vec<NavEntryView>,
    pub location: LocationView,
    pub logout_label: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NavEntryView {
    pub key: String,
    /// `None` when the sidebar is collapsed to icons
    pub label: Option<String>,
    pub path: Option<String>,
    pub icon: Option<NavIcon>,
    pub badge: Option<String>,
    pub active: bool,
    pub group: Option<NavGroupView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NavGroupView {
    pub open: bool,
    pub children: Vec<NavLinkView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NavLinkView {
    pub key: String,
    pub label: String,
    pub path: Option<String>,
    pub icon: Option<NavIcon>,
    pub active: bool,
}

/// "Current location" block with the two cascading selectors
#[derive(Debug, Clone, Serialize)]
pub struct LocationView {
    pub title: String,
    /// Collapsed sidebar shows icons only
    pub compact: bool,
    pub company: SelectorView,
    pub branch: SelectorView,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectorView {
    pub label: String,
    pub placeholder: String,
    pub options: Vec<SelectOption>,
    pub selected: Option<String>,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FooterView {
    pub text: String,
}

/// Selector labels, already translated
pub(crate) struct LocationLabels {
    pub title: String,
    pub company: String,
    pub branch: String,
    pub select_company: String,
    pub select_branch: String,
}

/// Desktop entries: honor group state and the collapsed flag
pub(crate) fn sidebar_entries(
    items: &[NavItem],
    groups: &GroupStates,
    current_path: &str,
    collapsed: bool,
) -> Vec<NavEntryView> {
    items
        .iter()
        .map(|item| {
            let open = groups.is_open(&item.key);
            entry_view(item, current_path, !collapsed, open)
        })
        .collect()
}

/// Drawer entries: every group expanded, labels always shown
pub(crate) fn drawer_entries(items: &[NavItem], current_path: &str) -> Vec<NavEntryView> {
    items
        .iter()
        .map(|item| entry_view(item, current_path, true, true))
        .collect()
}

fn entry_view(item: &NavItem, current_path: &str, show_label: bool, open: bool) -> NavEntryView {
    let group = item.is_group().then(|| NavGroupView {
        open,
        children: item
            .children
            .iter()
            .map(|child| NavLinkView {
                key: child.key.clone(),
                label: child.name.clone(),
                path: child.path.clone(),
                icon: child.icon,
                active: is_link_active(current_path, child),
            })
            .collect(),
    });

    let active = if item.is_group() {
        is_group_active(current_path, item)
    } else {
        is_link_active(current_path, item)
    };

    NavEntryView {
        key: item.key.clone(),
        label: show_label.then(|| item.name.clone()),
        path: item.path.clone(),
        icon: item.icon,
        badge: if show_label { item.badge.clone() } else { None },
        active,
        group,
    }
}

/// Selectors with their enablement rules:
/// - company: disabled while loading or when there are no companies
/// - branch: disabled while loading, without a company, or without branches
pub(crate) fn location_view(
    context: &ContextSnapshot,
    labels: LocationLabels,
    compact: bool,
) -> LocationView {
    LocationView {
        title: labels.title,
        compact,
        company: SelectorView {
            label: labels.company,
            placeholder: labels.select_company,
            options: company_options(&context.companies),
            selected: context.selection.company_id.clone(),
            disabled: context.is_loading || context.companies.is_empty(),
        },
        branch: SelectorView {
            label: labels.branch,
            placeholder: labels.select_branch,
            options: branch_options(&context.branches),
            selected: context.selection.branch_code.clone(),
            disabled: context.is_loading
                || context.selection.company_id.is_none()
                || context.branches.is_empty(),
        },
    }
}

fn company_options(companies: &[Company]) -> Vec<SelectOption> {
    companies
        .iter()
        .map(|c| SelectOption {
            value: c.id.clone(),
            label: c.name.clone(),
        })
        .collect()
}

fn branch_options(branches: &[Branch]) -> Vec<SelectOption> {
    branches
        .iter()
        .map(|b| SelectOption {
            value: b.code.clone(),
            label: b.name.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::Catalog;
    use crate::navigation::build_nav;
    use crate::selection::{LoadPhase, Selection};

    fn labels() -> LocationLabels {
        LocationLabels {
            title: "Current location".into(),
            company: "Company".into(),
            branch: "Branch".into(),
            select_company: "Select company".into(),
            select_branch: "Select branch".into(),
        }
    }

    fn context(is_loading: bool, companies: usize, branches: usize, company: bool) -> ContextSnapshot {
        ContextSnapshot {
            phase: LoadPhase::BranchesReady,
            is_loading,
            companies: (0..companies)
                .map(|i| Company::new(format!("c{i}"), format!("Company {i}")))
                .collect(),
            branches: (0..branches)
                .map(|i| Branch::new("c0", format!("b{i}"), format!("Branch {i}")))
                .collect(),
            selection: Selection {
                company_id: company.then(|| "c0".to_string()),
                branch_code: None,
            },
        }
    }

    #[test]
    fn test_selector_enablement() {
        let ready = location_view(&context(false, 2, 2, true), labels(), false);
        assert!(!ready.company.disabled);
        assert!(!ready.branch.disabled);
        assert_eq!(ready.company.options[1].value, "c1");
        assert_eq!(ready.branch.options[0].label, "Branch 0");

        let loading = location_view(&context(true, 2, 2, true), labels(), false);
        assert!(loading.company.disabled);
        assert!(loading.branch.disabled);

        let no_companies = location_view(&context(false, 0, 0, false), labels(), false);
        assert!(no_companies.company.disabled);
        assert!(no_companies.branch.disabled);

        let no_company = location_view(&context(false, 2, 2, false), labels(), false);
        assert!(!no_company.company.disabled);
        assert!(no_company.branch.disabled);

        let no_branches = location_view(&context(false, 2, 0, true), labels(), false);
        assert!(no_branches.branch.disabled);
    }

    #[test]
    fn test_collapsed_sidebar_hides_labels_and_badges() {
        let nav = build_nav(&Catalog::builtin("en"));
        let groups = GroupStates::new();

        let entries = sidebar_entries(&nav, &groups, "/dashboard", true);
        assert!(entries.iter().all(|e| e.label.is_none() && e.badge.is_none()));
        assert!(entries[0].active);

        let expanded = sidebar_entries(&nav, &groups, "/dashboard", false);
        assert_eq!(expanded[1].badge.as_deref(), Some("New"));
        assert_eq!(expanded[0].label.as_deref(), Some("Overview"));
    }

    #[test]
    fn test_group_active_independent_of_open() {
        let nav = build_nav(&Catalog::builtin("en"));
        let groups = GroupStates::new();

        let entries = sidebar_entries(&nav, &groups, "/dashboard/recordings", false);
        let classrooms = &entries[1];
        assert!(classrooms.active);
        let group = classrooms.group.as_ref().unwrap();
        assert!(!group.open);
        assert!(group.children[1].active);
        assert!(!group.children[0].active);
    }

    #[test]
    fn test_drawer_expands_every_group() {
        let nav = build_nav(&Catalog::builtin("en"));
        let entries = drawer_entries(&nav, "/dashboard");
        assert!(entries
            .iter()
            .filter_map(|e| e.group.as_ref())
            .all(|g| g.open));
        assert!(entries.iter().all(|e| e.label.is_some()));
    }
}
