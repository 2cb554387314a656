//! Application runtime: terminal lifecycle, background tasks, and the main
//! event loop.
//!
//! The original program ran every network fetch and pip invocation directly
//! inside its UI callbacks, freezing the window for the duration. Here each
//! requested [`Effect`] is interpreted on a tokio task and its completion is
//! fed back to the event loop as an [`AppMsg`], so the interface thread only
//! ever reacts to messages. The busy flag in [`AppState`] guarantees at most
//! one mutating pip command is in flight at a time.

use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{self, Event as CEvent},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::{select, sync::mpsc};
use tracing::{info, warn};

use crate::error::{RegistryError, Result};
use crate::events::{self as input, EventOutcome};
use crate::logic::{self, Effect};
use crate::pip::Pip;
use crate::pypi;
use crate::registry::PackageRegistry;
use crate::state::{AppState, InstalledDetail, InstalledPackage, PackageDetail, PendingAction, RemoteDetail};
use crate::theme;
use crate::ui::ui;

/// Boxed-error result for runtime plumbing outside the registry taxonomy.
type RunResult<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Options resolved from the command line before startup.
#[derive(Clone, Debug, Default)]
pub struct RunOptions {
    /// Log mutating pip commands instead of executing them.
    pub dry_run: bool,
    /// Override for the package index base URL.
    pub index_url: Option<String>,
    /// Override for the pip executable.
    pub pip_command: Option<String>,
}

/// Completion messages sent back to the event loop by background tasks.
enum AppMsg {
    /// `pip show` finished for the named package.
    InstalledDetail {
        name: String,
        result: Result<InstalledDetail>,
    },
    /// The index JSON API lookup finished, along with whether the package is
    /// in the installed snapshot.
    RemoteDetail {
        name: String,
        result: Result<RemoteDetail>,
        installed: bool,
    },
    /// A mutating pip action finished; carries the refreshed installed
    /// snapshot when the follow-up `pip list` succeeded.
    ActionDone {
        action: PendingAction,
        result: Result<String>,
        installed: Option<Vec<InstalledPackage>>,
    },
}

fn setup_terminal() -> RunResult<()> {
    enable_raw_mode()?;
    execute!(std::io::stdout(), EnterAlternateScreen)?;
    Ok(())
}

fn restore_terminal() -> RunResult<()> {
    disable_raw_mode()?;
    execute!(std::io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}

/// Start the runtime: construct the registry (one index fetch, one installed
/// snapshot), enter the terminal, and run the event loop until quit.
pub async fn run(opts: RunOptions) -> RunResult<()> {
    let prefs = theme::settings();
    let dry_run = opts.dry_run || prefs.dry_run_default;
    let index_url = opts
        .index_url
        .or(prefs.index_url)
        .unwrap_or_else(|| pypi::DEFAULT_INDEX_URL.to_string());
    let pip_command = opts.pip_command.or(prefs.pip_command);

    let pip = Pip::resolve(pip_command.as_deref(), dry_run)?;
    let registry = Arc::new(PackageRegistry::init(pip, pypi::client(), index_url).await?);

    let mut app = AppState {
        dry_run,
        installed: registry.installed(),
        ..Default::default()
    };
    if !app.installed.is_empty() {
        app.installed_state.select(Some(0));
    }
    info!(installed = app.installed.len(), "starting interface");

    setup_terminal()?;
    let outcome = event_loop(&mut app, &registry).await;
    restore_terminal()?;
    outcome
}

async fn event_loop(app: &mut AppState, registry: &Arc<PackageRegistry>) -> RunResult<()> {
    let mut terminal = Terminal::new(CrosstermBackend::new(std::io::stdout()))?;

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<CEvent>();
    std::thread::spawn(move || {
        loop {
            if let Ok(true) = event::poll(Duration::from_millis(50))
                && let Ok(ev) = event::read()
                && event_tx.send(ev).is_err()
            {
                break;
            }
        }
    });

    let (msg_tx, mut msg_rx) = mpsc::unbounded_channel::<AppMsg>();

    loop {
        terminal.draw(|f| ui(f, app))?;
        select! {
            Some(ev) = event_rx.recv() => {
                match input::handle_event(ev, app, registry.index_names()) {
                    EventOutcome::Quit => break,
                    EventOutcome::Run(effect) => dispatch(effect, registry, &msg_tx),
                    EventOutcome::Continue => {}
                }
            }
            Some(msg) = msg_rx.recv() => apply_msg(app, msg),
            else => break,
        }
    }
    Ok(())
}

/// Interpret one requested effect on a background task. Completions come
/// back through the message channel; nothing here blocks the caller.
fn dispatch(effect: Effect, registry: &Arc<PackageRegistry>, tx: &mpsc::UnboundedSender<AppMsg>) {
    match effect {
        Effect::None => {}
        Effect::FetchInstalledDetail(name) => {
            let reg = Arc::clone(registry);
            let tx = tx.clone();
            tokio::spawn(async move {
                let fetch_name = name.clone();
                let result =
                    tokio::task::spawn_blocking(move || reg.installed_detail(&fetch_name))
                        .await
                        .unwrap_or_else(|e| {
                            Err(RegistryError::Execution {
                                output: format!("detail task failed: {e}"),
                            })
                        });
                let _ = tx.send(AppMsg::InstalledDetail { name, result });
            });
        }
        Effect::FetchRemoteDetail(name) => {
            let reg = Arc::clone(registry);
            let tx = tx.clone();
            tokio::spawn(async move {
                let result = reg.remote_detail(&name).await;
                let installed = reg.is_installed(&name);
                let _ = tx.send(AppMsg::RemoteDetail {
                    name,
                    result,
                    installed,
                });
            });
        }
        Effect::RunAction(action) => {
            let reg = Arc::clone(registry);
            let tx = tx.clone();
            tokio::spawn(async move {
                let run_action = action.clone();
                let reg_run = Arc::clone(&reg);
                let result = tokio::task::spawn_blocking(move || match &run_action {
                    PendingAction::Install(n) => reg_run.install(n),
                    PendingAction::Uninstall(n) => reg_run.uninstall(n),
                    PendingAction::Upgrade(n) => reg_run.upgrade(n),
                    PendingAction::UpgradePip => reg_run.upgrade_pip(),
                })
                .await
                .unwrap_or_else(|e| {
                    Err(RegistryError::Execution {
                        output: format!("action task failed: {e}"),
                    })
                });

                // Full-replace refresh after every mutation, successful or
                // not; a failed refresh keeps the previous snapshot.
                let installed =
                    match tokio::task::spawn_blocking(move || reg.refresh_installed()).await {
                        Ok(Ok(rows)) => Some(rows),
                        Ok(Err(e)) => {
                            warn!(error = %e, "installed refresh failed");
                            None
                        }
                        Err(e) => {
                            warn!(error = %e, "installed refresh task failed");
                            None
                        }
                    };
                let _ = tx.send(AppMsg::ActionDone {
                    action,
                    result,
                    installed,
                });
            });
        }
    }
}

fn apply_msg(app: &mut AppState, msg: AppMsg) {
    match msg {
        AppMsg::InstalledDetail { name, result } => match result {
            Ok(detail) => {
                logic::commit_installed_detail(app, &name, PackageDetail::Installed(detail));
            }
            Err(e) => logic::show_error(app, format!("Could not read details for '{name}': {e}")),
        },
        AppMsg::RemoteDetail {
            name,
            result,
            installed,
        } => match result {
            Ok(detail) => logic::commit_remote_detail(app, name, detail, installed),
            Err(e) if e.is_not_found() => logic::remote_detail_failed(app, &name),
            Err(e) => {
                warn!(package = %name, error = %e, "remote detail fetch failed");
                logic::show_error(app, format!("Could not fetch details for '{name}': {e}"));
            }
        },
        AppMsg::ActionDone {
            action,
            result,
            installed,
        } => logic::apply_action_outcome(app, &action, result, installed),
    }
}
