// Package manager view: scope switching, bulk uninstall/disable/enable,
// and the single-package actions.

use std::path::Path;

use arc_swap::ArcSwap;
use tracing::debug;

use adbdeck_api::{AdbClient, PackageScope, validate};

use super::ListController;
use crate::batch::{BatchBackend, BatchResult};
use crate::client::DeviceClient;
use crate::convert::outcome_for_key;
use crate::error::CoreError;
use crate::model::Package;
use crate::refresh::{RecordSource, RefreshMode, RefreshOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum PackageBatch {
    Uninstall,
    Disable,
    Enable,
}

/// Lists and mutates packages within the current scope.
#[derive(Debug)]
pub struct PackageSource<C = AdbClient> {
    client: C,
    scope: ArcSwap<PackageScope>,
}

impl<C: DeviceClient> PackageSource<C> {
    pub fn new(client: C, scope: PackageScope) -> Self {
        Self {
            client,
            scope: ArcSwap::from_pointee(scope),
        }
    }

    pub fn scope(&self) -> PackageScope {
        **self.scope.load()
    }

    pub fn client(&self) -> &C {
        &self.client
    }
}

impl<C: DeviceClient> RecordSource for PackageSource<C> {
    type Record = Package;

    fn label(&self) -> &'static str {
        "packages"
    }

    async fn enumerate(&self) -> Result<Vec<Package>, CoreError> {
        let packages = self.client.list_packages(self.scope()).await?;
        Ok(packages.into_iter().map(Package::from).collect())
    }
}

impl<C: DeviceClient> BatchBackend<PackageBatch> for PackageSource<C> {
    async fn run_batch(&self, kind: PackageBatch, keys: &[String]) -> Result<BatchResult, CoreError> {
        let outcomes = match kind {
            PackageBatch::Uninstall => self.client.uninstall_many(keys).await,
            PackageBatch::Disable => self.client.disable_many(keys).await,
            PackageBatch::Enable => self.client.enable_many(keys).await,
        };
        Ok(BatchResult::PerKey(
            keys.iter()
                .zip(outcomes)
                .map(|(key, outcome)| outcome_for_key(key, outcome))
                .collect(),
        ))
    }
}

pub type PackagesView<C = AdbClient> = ListController<PackageSource<C>, PackageBatch>;

impl<C: DeviceClient> ListController<PackageSource<C>, PackageBatch> {
    pub fn scope(&self) -> PackageScope {
        self.source().scope()
    }

    /// Switch scope and reload. The old snapshot is invalidated so a
    /// listing still in flight for the previous scope is discarded.
    pub async fn set_scope(&self, scope: PackageScope) -> RefreshOutcome {
        if self.scope() == scope {
            return self.refresh_now().await;
        }
        debug!(%scope, "package scope changed");
        self.source().scope.store(scope.into());
        self.coordinator().invalidate();
        self.coordinator().refresh_now(RefreshMode::Visible).await
    }

    pub async fn install(&self, apk: &Path) -> Result<String, CoreError> {
        let client = self.source().client();
        self.run_operation("install", async { client.install(apk).await.map_err(CoreError::from) })
            .await
    }

    /// Enable a disabled package or disable an enabled one.
    pub async fn toggle_enabled(&self, package: &str) -> Result<String, CoreError> {
        let enabled = self
            .records()
            .iter()
            .find(|p| p.name == package)
            .map(|p| p.enabled);
        let Some(enabled) = enabled else {
            return Err(self.reject("toggle", format!("unknown package {package}")));
        };

        let client = self.source().client();
        if enabled {
            self.run_operation("disable", async {
                client.disable(package).await.map_err(|e| {
                    if e.to_string().contains("is not allowed") {
                        CoreError::Rejected {
                            operation: "disable".into(),
                            message: "(System app?)".into(),
                        }
                    } else {
                        e.into()
                    }
                })
            })
            .await
        } else {
            self.run_operation("enable", async { client.enable(package).await.map_err(CoreError::from) })
                .await
        }
    }

    pub async fn clear_data(&self, package: &str) -> Result<String, CoreError> {
        self.check_name("clear data", package)?;
        let client = self.source().client();
        self.run_operation("clear data", async { client.clear_data(package).await.map_err(CoreError::from) })
            .await
    }

    pub async fn pull_apk(&self, package: &str, dest: &Path) -> Result<String, CoreError> {
        self.check_name("pull apk", package)?;
        let client = self.source().client();
        self.run_operation("pull apk", async { client.pull_apk(package, dest).await.map_err(CoreError::from) })
            .await
    }

    /// Package names reach the device shell unquoted, so malformed ones are
    /// refused before any call.
    fn check_name(&self, operation: &str, package: &str) -> Result<(), CoreError> {
        validate::package_name(package).map_err(|e| self.reject(operation, e.to_string()))
    }
}
