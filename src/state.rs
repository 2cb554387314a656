//! Core application state types for the piptui interface.
//!
//! This module defines the package descriptors shared by the data-access and
//! presentation layers, the two-tagged [`PackageDetail`] variant, and the
//! central [`AppState`] container mutated by the event and UI layers.

use ratatui::widgets::ListState;

/// One locally installed package as reported by `pip list`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct InstalledPackage {
    /// Canonical package name.
    pub name: String,
    /// Installed version string.
    pub version: String,
}

/// Metadata for a package read from the local installation via `pip show`.
///
/// Optional fields were either missing from the command output or carried the
/// `UNKNOWN` sentinel and were normalized to absent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InstalledDetail {
    /// Package name.
    pub name: String,
    /// Installed version string.
    pub version: String,
    /// Author name.
    pub author: Option<String>,
    /// Author contact email, rendered as the author link target.
    pub author_email: Option<String>,
    /// Upstream home page URL.
    pub home_page: Option<String>,
    /// License identifier or text.
    pub license: Option<String>,
    /// One-line summary.
    pub summary: Option<String>,
    /// Names of packages this package requires (`Requires`).
    pub requirements: Vec<String>,
    /// Names of installed packages that require this one (`Required-by`).
    pub required_by: Vec<String>,
}

/// Metadata for a package fetched from the index JSON API.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RemoteDetail {
    /// Package name as reported by the index.
    pub name: String,
    /// Latest version string.
    pub version: String,
    /// Author name.
    pub author: Option<String>,
    /// Author contact email.
    pub author_email: Option<String>,
    /// Upstream home page URL.
    pub home_page: Option<String>,
    /// License identifier or text.
    pub license: Option<String>,
    /// One-line summary.
    pub summary: Option<String>,
    /// Canonical index page for the package.
    pub package_url: Option<String>,
    /// Supported platform string.
    pub platform: Option<String>,
    /// Required Python version specifier.
    pub requires_python: Option<String>,
    /// Requirement specifiers from `requires_dist` (null maps to empty).
    pub requirements: Vec<String>,
}

/// Package metadata tagged by where it came from.
///
/// The two retrieval paths produce structurally different field sets; the
/// detail pane renders both through one templating function that switches on
/// the tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PackageDetail {
    /// Read from the local installation (`pip show`).
    Installed(InstalledDetail),
    /// Fetched from the index JSON API.
    Remote(RemoteDetail),
}

impl PackageDetail {
    /// Package name regardless of source.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Installed(d) => &d.name,
            Self::Remote(d) => &d.name,
        }
    }
}

/// Enabled state of the three per-package action keys.
///
/// The keys enforce the selection invariants by construction: an action whose
/// key is disabled is unreachable from the UI.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ActionKeys {
    /// Install the selected package.
    pub install: bool,
    /// Uninstall the selected package.
    pub uninstall: bool,
    /// Upgrade the selected package.
    pub upgrade: bool,
}

impl ActionKeys {
    /// Key state for a package that is currently installed.
    #[must_use]
    pub const fn installed() -> Self {
        Self {
            install: false,
            uninstall: true,
            upgrade: true,
        }
    }

    /// Key state for a package known to the index but not installed.
    #[must_use]
    pub const fn not_installed() -> Self {
        Self {
            install: true,
            uninstall: false,
            upgrade: false,
        }
    }
}

/// The one mutating pip action that may be in flight.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PendingAction {
    /// `pip install <name>`.
    Install(String),
    /// `pip uninstall -y <name>`.
    Uninstall(String),
    /// `pip install --upgrade <name>`.
    Upgrade(String),
    /// `pip install --upgrade pip`.
    UpgradePip,
}

impl PendingAction {
    /// Name of the package the action operates on.
    #[must_use]
    pub fn package(&self) -> &str {
        match self {
            Self::Install(n) | Self::Uninstall(n) | Self::Upgrade(n) => n,
            Self::UpgradePip => "pip",
        }
    }

    /// Verb used in log lines and failure dialogs.
    #[must_use]
    pub const fn verb(&self) -> &'static str {
        match self {
            Self::Install(_) => "install",
            Self::Uninstall(_) => "uninstall",
            Self::Upgrade(_) | Self::UpgradePip => "update",
        }
    }

    /// Title of the confirmation dialog shown when the action completes.
    #[must_use]
    pub const fn done_title(&self) -> &'static str {
        match self {
            Self::Install(_) => "Installation Complete",
            Self::Uninstall(_) => "Uninstallation Complete",
            Self::Upgrade(_) | Self::UpgradePip => "Update Complete",
        }
    }

    /// Body of the confirmation dialog shown when the action completes.
    #[must_use]
    pub fn done_message(&self) -> String {
        match self {
            Self::Install(n) => format!("{n} has been successfully installed."),
            Self::Uninstall(n) => format!("{n} has been successfully uninstalled."),
            Self::Upgrade(n) => format!("{n} has been successfully updated."),
            Self::UpgradePip => "pip has been successfully updated.".to_string(),
        }
    }
}

/// Which pane currently has keyboard focus.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Focus {
    /// Search input bar.
    #[default]
    Search,
    /// Installed-packages pane.
    Installed,
    /// Search-results pane.
    Results,
}

/// Modal dialog state for the UI.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Modal {
    /// No modal visible.
    #[default]
    None,
    /// Error or confirmation dialog, dismissed with Enter/Esc.
    Alert {
        /// Dialog title.
        title: String,
        /// Dialog body text.
        message: String,
    },
}

/// Global application state shared by the event, runtime, and UI layers.
#[derive(Debug)]
pub struct AppState {
    /// Current search input text.
    pub input: String,
    /// Which pane is currently focused.
    pub focus: Focus,
    /// Snapshot of installed packages backing the installed pane.
    pub installed: Vec<InstalledPackage>,
    /// List selection state for the installed pane.
    pub installed_state: ListState,
    /// Ranked search result names backing the results pane.
    pub results: Vec<String>,
    /// List selection state for the results pane.
    pub results_state: ListState,
    /// Currently selected package name, if any. At most one selection exists;
    /// selecting a new package replaces it.
    pub selection: Option<String>,
    /// Details for the current selection; discarded on re-selection.
    pub detail: Option<PackageDetail>,
    /// Enabled state of the install/uninstall/upgrade keys.
    pub keys: ActionKeys,
    /// The mutating action currently in flight. While set, all mutating keys
    /// are refused so external pip invocations never overlap.
    pub busy: Option<PendingAction>,
    /// Active modal dialog, if any.
    pub modal: Modal,
    /// If `true`, mutating pip commands are logged but not executed.
    pub dry_run: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            input: String::new(),
            focus: Focus::Search,
            installed: Vec::new(),
            installed_state: ListState::default(),
            results: Vec::new(),
            results_state: ListState::default(),
            selection: None,
            detail: None,
            keys: ActionKeys::default(),
            busy: None,
            modal: Modal::None,
            dry_run: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// What: Startup defaults describe an empty window
    ///
    /// - Input: `AppState::default()`
    /// - Output: No selection, no detail, every action key disabled
    #[test]
    fn state_defaults_have_no_selection_and_disabled_keys() {
        let app = AppState::default();
        assert!(app.selection.is_none());
        assert!(app.detail.is_none());
        assert_eq!(app.keys, ActionKeys::default());
        assert!(!app.keys.install && !app.keys.uninstall && !app.keys.upgrade);
        assert!(app.busy.is_none());
        assert_eq!(app.modal, Modal::None);
    }

    /// What: Confirmation dialog text names the package and the action
    ///
    /// - Input: Each `PendingAction` variant
    /// - Output: Titles and messages matching the action kind
    #[test]
    fn pending_action_dialog_text() {
        let a = PendingAction::Install("requests".into());
        assert_eq!(a.done_title(), "Installation Complete");
        assert_eq!(a.done_message(), "requests has been successfully installed.");
        assert_eq!(a.package(), "requests");

        let a = PendingAction::UpgradePip;
        assert_eq!(a.done_title(), "Update Complete");
        assert_eq!(a.done_message(), "pip has been successfully updated.");
        assert_eq!(a.package(), "pip");
        assert_eq!(a.verb(), "update");
    }
}
