//! The data-access layer: one registry owning pip and the remote index.
//!
//! The registry caches exactly two things: the index name list, fetched once
//! at construction and treated as a static snapshot for the process lifetime,
//! and the installed-package snapshot, which is wholesale-replaced after
//! every mutating action. Package details are fetched on demand and never
//! cached.

use std::sync::RwLock;

use reqwest::Client;
use tracing::info;

use crate::error::{RegistryError, Result};
use crate::pip::Pip;
use crate::pypi;
use crate::state::{InstalledDetail, InstalledPackage, RemoteDetail};

/// Wraps the pip binary and the remote index behind one interface.
#[derive(Debug)]
pub struct PackageRegistry {
    pip: Pip,
    client: Client,
    index_url: String,
    index_names: Vec<String>,
    installed: RwLock<Vec<InstalledPackage>>,
}

impl PackageRegistry {
    /// Construct the registry: fetch the index listing once and take the
    /// first installed-package snapshot.
    pub async fn init(pip: Pip, client: Client, index_url: String) -> Result<Self> {
        let index_names = pypi::fetch_index_names(&client, &index_url).await?;
        let lister = pip.clone();
        let installed = tokio::task::spawn_blocking(move || lister.list_installed())
            .await
            .map_err(|e| RegistryError::Execution {
                output: format!("pip list task failed: {e}"),
            })??;
        info!(
            index = index_names.len(),
            installed = installed.len(),
            "registry initialized"
        );
        Ok(Self {
            pip,
            client,
            index_url,
            index_names,
            installed: RwLock::new(installed),
        })
    }

    /// Registry over pre-supplied data, for tests that never touch the
    /// network or a pip binary.
    #[must_use]
    pub fn with_snapshot(
        pip: Pip,
        client: Client,
        index_url: String,
        index_names: Vec<String>,
        installed: Vec<InstalledPackage>,
    ) -> Self {
        Self {
            pip,
            client,
            index_url,
            index_names,
            installed: RwLock::new(installed),
        }
    }

    /// The startup-cached index name list. Never refetched.
    #[must_use]
    pub fn index_names(&self) -> &[String] {
        &self.index_names
    }

    /// Clone of the current installed-package snapshot.
    #[must_use]
    pub fn installed(&self) -> Vec<InstalledPackage> {
        self.installed.read().map(|g| g.clone()).unwrap_or_default()
    }

    /// Whether `name` appears in the installed snapshot.
    #[must_use]
    pub fn is_installed(&self, name: &str) -> bool {
        self.installed
            .read()
            .map(|g| g.iter().any(|p| p.name == name))
            .unwrap_or(false)
    }

    /// Re-run `pip list` and atomically replace the installed snapshot.
    /// Readers observe either the old or the new list, never a partial one.
    ///
    /// Blocking; call from `spawn_blocking`.
    pub fn refresh_installed(&self) -> Result<Vec<InstalledPackage>> {
        let rows = self.pip.list_installed()?;
        if let Ok(mut guard) = self.installed.write() {
            guard.clone_from(&rows);
        }
        Ok(rows)
    }

    /// Metadata for an installed package via `pip show`. Blocking.
    pub fn installed_detail(&self, name: &str) -> Result<InstalledDetail> {
        self.pip.installed_detail(name)
    }

    /// Metadata for a package from the index JSON API.
    pub async fn remote_detail(&self, name: &str) -> Result<RemoteDetail> {
        pypi::fetch_remote_detail(&self.client, &self.index_url, name).await
    }

    /// `pip install`. Blocking; returns the captured output.
    pub fn install(&self, name: &str) -> Result<String> {
        self.pip.install(name)
    }

    /// `pip uninstall -y`. Blocking; returns the captured output.
    pub fn uninstall(&self, name: &str) -> Result<String> {
        self.pip.uninstall(name)
    }

    /// `pip install --upgrade`. Blocking; returns the captured output.
    pub fn upgrade(&self, name: &str) -> Result<String> {
        self.pip.upgrade(name)
    }

    /// Upgrade pip itself. Blocking; returns the captured output.
    pub fn upgrade_pip(&self) -> Result<String> {
        self.pip.upgrade_pip()
    }
}
