//! The signed-in session: API client plus the persisted store snapshot
//!
//! Every store transition is written to disk before the method returns, so a
//! crash never leaves the file behind the in-memory state.

use anyhow::{Context, Result};
use luxe_core::store::{self, StoreSnapshot};
use luxe_core::types::User;
use luxe_http::types::{LoginRequest, RegisterRequest};
use luxe_http::LuxeClient;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub struct Session {
    client: LuxeClient,
    snapshot: StoreSnapshot,
    path: PathBuf,
}

impl Session {
    /// Open the snapshot at `path`, starting fresh when it does not exist
    pub fn open(client: LuxeClient, path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let snapshot = read_snapshot(&path)?;
        debug!(
            path = %path.display(),
            signed_in = snapshot.user.is_some(),
            cart_lines = snapshot.cart.len(),
            "Loaded store snapshot"
        );

        Ok(Self {
            client,
            snapshot,
            path,
        })
    }

    pub fn client(&self) -> &LuxeClient {
        &self.client
    }

    pub fn snapshot(&self) -> &StoreSnapshot {
        &self.snapshot
    }

    pub fn user(&self) -> Option<&User> {
        self.snapshot.user.as_ref()
    }

    /// Whether a user is recorded and a token is held for them
    pub fn is_signed_in(&self) -> bool {
        self.snapshot.user.is_some() && self.client.credentials().load().is_some()
    }

    /// Apply a store transition and persist the result
    pub fn update(&mut self, transition: impl FnOnce(&mut StoreSnapshot)) -> Result<()> {
        transition(&mut self.snapshot);
        self.save()
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<User> {
        let response = self
            .client
            .login(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await?;

        let user = response.user;
        self.update(|snapshot| snapshot.login(user.clone()))?;
        info!(user = %user.id, "Signed in");
        Ok(user)
    }

    pub async fn register(&mut self, request: &RegisterRequest) -> Result<User> {
        let response = self.client.register(request).await?;

        let user = response.user;
        self.update(|snapshot| snapshot.login(user.clone()))?;
        info!(user = %user.id, "Registered");
        Ok(user)
    }

    /// Sign out locally; the backend call is best effort
    pub async fn logout(&mut self) -> Result<()> {
        if let Err(err) = self.client.logout().await {
            warn!(error = %err, "Backend logout failed");
        }
        self.update(StoreSnapshot::logout)
    }

    /// Forget the local user after the session could not be refreshed
    pub fn expire(&mut self) -> Result<()> {
        if self.snapshot.user.is_none() {
            return Ok(());
        }
        self.update(StoreSnapshot::logout)
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        std::fs::write(&self.path, store::save(&self.snapshot))
            .with_context(|| format!("Failed to write store snapshot: {}", self.path.display()))?;
        Ok(())
    }
}

fn read_snapshot(path: &Path) -> Result<StoreSnapshot> {
    match std::fs::read(path) {
        Ok(bytes) => store::load(&bytes)
            .with_context(|| format!("Failed to read store snapshot: {}", path.display())),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(StoreSnapshot::default()),
        Err(err) => Err(err)
            .with_context(|| format!("Failed to open store snapshot: {}", path.display())),
    }
}
