//! RAII guard for the remote session of one deployment.

use remote::{RemoteError, RemoteSession};
use tracing::{debug, warn};
use uuid::Uuid;

/// Owns the deployment's remote session.
///
/// The workflow closes the session explicitly once it is done. If the guard
/// is dropped first (panic, aborted task), `Drop` spawns the close so the
/// connection and its key file do not outlive the run.
pub struct SessionGuard {
    deployment_id: Uuid,
    session: Option<Box<dyn RemoteSession>>,
}

impl SessionGuard {
    pub fn new(deployment_id: Uuid, session: Box<dyn RemoteSession>) -> Self {
        debug!(deployment_id = %deployment_id, "Session guard created");
        Self {
            deployment_id,
            session: Some(session),
        }
    }

    pub fn session_mut(&mut self) -> Result<&mut dyn RemoteSession, RemoteError> {
        match self.session.as_mut() {
            Some(session) => Ok(session.as_mut()),
            None => Err(RemoteError::Closed),
        }
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn deployment_id(&self) -> Uuid {
        self.deployment_id
    }

    /// Closes the session. Later calls are no-ops.
    pub async fn close(&mut self) -> Result<(), RemoteError> {
        let Some(mut session) = self.session.take() else {
            return Ok(());
        };
        debug!(deployment_id = %self.deployment_id, "Closing remote session");
        session.close().await
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };

        warn!(
            deployment_id = %self.deployment_id,
            "Session guard dropped with an open session - closing in background"
        );

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let deployment_id = self.deployment_id;
                handle.spawn(async move {
                    if let Err(e) = session.close().await {
                        warn!(
                            deployment_id = %deployment_id,
                            error = %e,
                            "Session close failed in Drop"
                        );
                    }
                });
            }
            Err(_) => warn!(
                deployment_id = %self.deployment_id,
                "No runtime available, session left to its own cleanup"
            ),
        }
    }
}
