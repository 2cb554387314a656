//! Pure UI transition logic.
//!
//! Every user action is a function over [`AppState`] returning an [`Effect`]
//! that names the I/O the runtime must perform, so the window behaviors are
//! testable without a live terminal or a pip binary. The runtime interprets
//! effects on background tasks and feeds completions back through
//! [`apply_action_outcome`] and the detail-commit functions.

use tracing::{error, warn};

use crate::error::Result;
use crate::search;
use crate::state::{
    ActionKeys, AppState, InstalledPackage, Modal, PackageDetail, PendingAction, RemoteDetail,
};

/// I/O requested by a state transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Nothing to do.
    None,
    /// Run `pip show` for the named package off the UI thread.
    FetchInstalledDetail(String),
    /// Fetch the named package's metadata from the index JSON API.
    FetchRemoteDetail(String),
    /// Run the mutating pip action, then refresh the installed snapshot.
    RunAction(PendingAction),
}

/// Select the installed-pane row at `row`.
///
/// Sets the selection, flips the action keys to the installed shape
/// (install off, uninstall/upgrade on) and requests the installed detail.
pub fn select_installed(app: &mut AppState, row: usize) -> Effect {
    let Some(pkg) = app.installed.get(row) else {
        return Effect::None;
    };
    app.selection = Some(pkg.name.clone());
    app.keys = ActionKeys::installed();
    app.detail = None;
    Effect::FetchInstalledDetail(pkg.name.clone())
}

/// Request the remote detail for the results-pane row at `row`.
///
/// Deliberately commits nothing yet: selection and keys only change once the
/// fetch succeeds, in [`commit_remote_detail`]. A failed fetch leaves the
/// window exactly as it was, apart from the error dialog.
pub fn select_result(app: &mut AppState, row: usize) -> Effect {
    match app.results.get(row) {
        Some(name) => Effect::FetchRemoteDetail(name.clone()),
        None => Effect::None,
    }
}

/// Commit a successful remote-detail fetch: set the selection, pick the key
/// shape from the installed snapshot, and render the detail.
pub fn commit_remote_detail(
    app: &mut AppState,
    name: String,
    detail: RemoteDetail,
    installed: bool,
) {
    app.selection = Some(name);
    app.keys = if installed {
        ActionKeys::installed()
    } else {
        ActionKeys::not_installed()
    };
    app.detail = Some(PackageDetail::Remote(detail));
}

/// Surface a failed remote-detail fetch. Selection, keys, and the detail
/// pane are left untouched.
pub fn remote_detail_failed(app: &mut AppState, name: &str) {
    app.modal = Modal::Alert {
        title: "Error".to_string(),
        message: format!("Unfortunately the package '{name}' is no longer available from the index"),
    };
}

/// Store a successfully fetched installed detail, unless the selection moved
/// on while the fetch was in flight.
pub fn commit_installed_detail(app: &mut AppState, name: &str, detail: PackageDetail) {
    if app.selection.as_deref() == Some(name) {
        app.detail = Some(detail);
    }
}

/// Run a search over the cached index names and replace the results rows.
///
/// An empty or whitespace-only input performs no search at all: the ranker
/// is not invoked and the results table keeps its previous rows. Returns
/// whether a search ran.
pub fn submit_search(app: &mut AppState, index_names: &[String]) -> bool {
    let term = app.input.trim();
    if term.is_empty() {
        return false;
    }
    app.results = search::rank(term, index_names);
    app.results_state.select(if app.results.is_empty() {
        None
    } else {
        Some(0)
    });
    true
}

/// Request the install of the current selection.
pub fn request_install(app: &mut AppState) -> Effect {
    if app.busy.is_some() || !app.keys.install {
        return Effect::None;
    }
    match app.selection.clone() {
        Some(name) => start_action(app, PendingAction::Install(name)),
        None => Effect::None,
    }
}

/// Request the uninstall of the current selection.
pub fn request_uninstall(app: &mut AppState) -> Effect {
    if app.busy.is_some() || !app.keys.uninstall {
        return Effect::None;
    }
    match app.selection.clone() {
        Some(name) => start_action(app, PendingAction::Uninstall(name)),
        None => Effect::None,
    }
}

/// Request the upgrade of the current selection.
pub fn request_upgrade(app: &mut AppState) -> Effect {
    if app.busy.is_some() || !app.keys.upgrade {
        return Effect::None;
    }
    match app.selection.clone() {
        Some(name) => start_action(app, PendingAction::Upgrade(name)),
        None => Effect::None,
    }
}

/// Request the self-upgrade of pip. Needs no selection, only idleness.
pub fn request_upgrade_pip(app: &mut AppState) -> Effect {
    if app.busy.is_some() {
        return Effect::None;
    }
    start_action(app, PendingAction::UpgradePip)
}

fn start_action(app: &mut AppState, action: PendingAction) -> Effect {
    app.busy = Some(action.clone());
    Effect::RunAction(action)
}

/// Apply a finished mutating action: clear the busy flag, replace the
/// installed table from the refreshed snapshot, show the confirmation or
/// failure dialog, and move the action keys to their post-action shape.
pub fn apply_action_outcome(
    app: &mut AppState,
    action: &PendingAction,
    result: Result<String>,
    installed: Option<Vec<InstalledPackage>>,
) {
    app.busy = None;
    if let Some(rows) = installed {
        app.installed = rows;
        let last = app.installed.len().checked_sub(1);
        match app.installed_state.selected() {
            Some(i) if Some(i) > last => app.installed_state.select(last),
            None if last.is_some() => app.installed_state.select(Some(0)),
            _ => {}
        }
    }
    match result {
        Ok(output) => {
            tracing::debug!(package = action.package(), output, "pip action finished");
            match action {
                PendingAction::Install(_) => app.keys = ActionKeys::installed(),
                PendingAction::Uninstall(_) => app.keys = ActionKeys::not_installed(),
                PendingAction::Upgrade(_) | PendingAction::UpgradePip => {}
            }
            app.modal = Modal::Alert {
                title: action.done_title().to_string(),
                message: action.done_message(),
            };
        }
        Err(e) => {
            error!(package = action.package(), error = %e, "pip action failed");
            app.modal = Modal::Alert {
                title: "Error".to_string(),
                message: format!("Could not {} '{}': {e}", action.verb(), action.package()),
            };
        }
    }
}

/// Surface a non-fatal error: log it and show a generic failure dialog
/// instead of crashing.
pub fn show_error(app: &mut AppState, message: String) {
    warn!(message, "surfacing error dialog");
    app.modal = Modal::Alert {
        title: "Error".to_string(),
        message,
    };
}

/// Dismiss the active modal, if any.
pub fn dismiss_modal(app: &mut AppState) {
    app.modal = Modal::None;
}
