//! Application shell
//!
//! Composes the auth gate, header toggles, navigation, breadcrumbs and the
//! organizational context into one `ShellView`, and routes `ShellAction`s
//! back to the component that owns them. Presentation never touches the
//! store or the directory: company and branch changes go through the
//! selection controller only.

pub mod view;

use std::sync::Arc;

use chrono::Datelike;
use tracing::{debug, info};

use crate::config::ShellConfig;
use crate::directory::{DirectoryClient, HttpDirectoryClient};
use crate::error::ShellResult;
use crate::locale::{locale_badge, toggled_locale, Catalog, Locale};
use crate::navigation::{breadcrumbs, build_nav, GroupStates};
use crate::notifier::BranchNotifier;
use crate::selection::{SelectionChange, SelectionController};
use crate::session::{AuthProvider, GateDecision};
use crate::store::{open_store, SelectionStore};
use crate::theme::{ThemeMode, ThemeSettings};

pub use view::{
    DrawerView, FooterView, HeaderView, LocationView, NavEntryView, NavGroupView, NavLinkView,
    SelectOption, SelectorView, ShellFrame, ShellView, SidebarView,
};

use view::{drawer_entries, location_view, sidebar_entries, LocationLabels};

/// User input reported by the renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellAction {
    ToggleSidebar,
    ToggleMobileMenu,
    CloseMobileMenu,
    ToggleLanguage,
    ToggleTheme,
    /// Open/close a navigation group by key
    ToggleGroup(String),
    /// Route changed (link click or external navigation)
    Navigate(String),
    SelectCompany(String),
    SelectBranch(String),
    Logout,
}

/// Collaborators the shell is assembled from
pub struct ShellParts {
    pub controller: Arc<SelectionController>,
    pub auth: Arc<dyn AuthProvider>,
    pub locale: Arc<dyn Locale>,
    pub theme: ThemeSettings,
}

pub struct AppShell {
    config: ShellConfig,
    controller: Arc<SelectionController>,
    auth: Arc<dyn AuthProvider>,
    locale: Arc<dyn Locale>,
    theme: ThemeSettings,
    groups: GroupStates,
    current_path: String,
    sidebar_collapsed: bool,
    mobile_menu_open: bool,
    /// The context is initialized once per authenticated session
    context_started: bool,
}

impl AppShell {
    pub fn new(config: ShellConfig, parts: ShellParts) -> Self {
        let current_path = config.home_path.clone();
        let mut shell = Self {
            config,
            controller: parts.controller,
            auth: parts.auth,
            locale: parts.locale,
            theme: parts.theme,
            groups: GroupStates::new(),
            current_path,
            sidebar_collapsed: false,
            mobile_menu_open: false,
            context_started: false,
        };
        shell.sync_groups();
        shell
    }

    /// Wire the production stack: configured store, HTTP directory, the
    /// process-wide notifier and the embedded catalog.
    pub fn from_config(
        config: ShellConfig,
        auth: Arc<dyn AuthProvider>,
        system_prefers_dark: bool,
    ) -> ShellResult<Self> {
        let store = open_store(&config.store);
        let directory: Arc<dyn DirectoryClient> =
            Arc::new(HttpDirectoryClient::new(&config.directory)?);
        let controller = Arc::new(SelectionController::new(
            directory,
            SelectionStore::new(store.clone()),
            BranchNotifier::global_with_capacity(config.notifier_capacity),
        ));
        let locale: Arc<dyn Locale> = Arc::new(Catalog::builtin(&config.default_locale));
        let theme = ThemeSettings::load(store, system_prefers_dark);

        Ok(Self::new(
            config,
            ShellParts {
                controller,
                auth,
                locale,
                theme,
            },
        ))
    }

    pub fn gate(&self) -> GateDecision {
        GateDecision::evaluate(self.auth.status(), &self.config.login_path)
    }

    /// Follow the auth status: start the organizational context on the
    /// first authenticated check of a session, re-arm once signed out.
    ///
    /// Returns true when this call initialized the context.
    pub async fn sync_session(&mut self) -> bool {
        let status = self.auth.status();
        if status.is_loading {
            return false;
        }
        if !status.is_authenticated {
            self.context_started = false;
            return false;
        }
        if self.context_started {
            return false;
        }

        self.context_started = true;
        info!("Session authenticated, initializing organizational context");
        self.controller.initialize().await;
        true
    }

    /// Apply one user action.
    pub async fn dispatch(&mut self, action: ShellAction) -> ShellResult<()> {
        debug!(?action, "Shell action");
        match action {
            ShellAction::ToggleSidebar => self.sidebar_collapsed = !self.sidebar_collapsed,
            ShellAction::ToggleMobileMenu => self.mobile_menu_open = !self.mobile_menu_open,
            ShellAction::CloseMobileMenu => self.mobile_menu_open = false,
            ShellAction::ToggleLanguage => {
                let next = toggled_locale(&self.locale.current());
                self.locale.set_locale(next);
                self.sync_groups();
            }
            ShellAction::ToggleTheme => {
                self.theme.toggle();
            }
            ShellAction::ToggleGroup(key) => {
                self.groups.toggle(&key);
            }
            ShellAction::Navigate(path) => self.navigate(&path),
            ShellAction::SelectCompany(company_id) => {
                if let SelectionChange::Changed(resolution) =
                    self.controller.select_company(&company_id).await
                {
                    debug!(company_id = %company_id, ?resolution, "Company switch finished");
                }
            }
            ShellAction::SelectBranch(branch_code) => {
                self.controller.select_branch(&branch_code)?;
            }
            ShellAction::Logout => {
                self.mobile_menu_open = false;
                self.context_started = false;
                self.auth.logout();
            }
        }
        Ok(())
    }

    /// Route change: recompute breadcrumbs (on view), auto-open groups and
    /// close the mobile drawer.
    pub fn navigate(&mut self, path: &str) {
        self.current_path = path.to_string();
        self.mobile_menu_open = false;
        self.sync_groups();
    }

    fn sync_groups(&mut self) {
        let nav = build_nav(self.locale.as_ref());
        self.groups.sync(&nav, &self.current_path);
    }

    pub fn current_path(&self) -> &str {
        &self.current_path
    }

    pub fn controller(&self) -> &Arc<SelectionController> {
        &self.controller
    }

    pub fn theme(&self) -> ThemeMode {
        self.theme.mode()
    }

    /// Build the view model for the current state
    pub fn view(&self) -> ShellView {
        let gate = self.gate();
        if gate != GateDecision::Render {
            return ShellView {
                gate,
                loading_label: Some(self.t("shell.loading")),
                frame: None,
            };
        }

        let nav = build_nav(self.locale.as_ref());
        let context = self.controller.snapshot();
        let locale = self.locale.current();

        let header = HeaderView {
            home_path: self.config.home_path.clone(),
            locale_badge: locale_badge(&locale).to_string(),
            language_toggle_title: if locale == "vi" {
                self.t("header.switch_to_en")
            } else {
                self.t("header.switch_to_vi")
            },
            theme: self.theme.mode(),
            theme_toggle_title: if self.theme.is_dark() {
                self.t("header.switch_to_light")
            } else {
                self.t("header.switch_to_dark")
            },
            mobile_menu_open: self.mobile_menu_open,
        };

        let sidebar = SidebarView {
            collapsed: self.sidebar_collapsed,
            entries: sidebar_entries(
                &nav,
                &self.groups,
                &self.current_path,
                self.sidebar_collapsed,
            ),
            location: location_view(&context, self.location_labels(), self.sidebar_collapsed),
        };

        let drawer = DrawerView {
            open: self.mobile_menu_open,
            entries: drawer_entries(&nav, &self.current_path),
            location: location_view(&context, self.location_labels(), false),
            logout_label: self.t("shell.logout"),
        };

        let footer = FooterView {
            text: format!(
                "© {} {}. {}",
                chrono::Local::now().year(),
                self.config.brand_name,
                self.t("footer.copyright")
            ),
        };

        ShellView {
            gate,
            loading_label: None,
            frame: Some(ShellFrame {
                header,
                sidebar,
                drawer,
                breadcrumbs: breadcrumbs(&self.current_path),
                footer,
            }),
        }
    }

    fn location_labels(&self) -> LocationLabels {
        LocationLabels {
            title: self.t("sidebar.current_location"),
            company: self.t("sidebar.company"),
            branch: self.t("sidebar.branch"),
            select_company: self.t("sidebar.select_company"),
            select_branch: self.t("sidebar.select_branch"),
        }
    }

    fn t(&self, key: &str) -> String {
        self.locale.translate(key)
    }
}
