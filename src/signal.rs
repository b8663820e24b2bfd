//! Ctrl-C delivery for the session loop.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::Result;

/// Something that can report "the user pressed Ctrl-C".
#[async_trait]
pub trait InterruptSource: Send {
    /// Resolves on the next interrupt. Pends forever once the source is gone.
    async fn interrupted(&mut self);
}

/// The process SIGINT / console Ctrl-C handler.
///
/// The handler is registered when this is built, so from then on an
/// interrupt never takes the default "kill the process" path; interrupts
/// that land between two awaits are buffered until the next one.
pub struct CtrlC {
    #[cfg(unix)]
    inner: tokio::signal::unix::Signal,
    #[cfg(windows)]
    inner: tokio::signal::windows::CtrlC,
}

impl CtrlC {
    /// Must be called from inside the runtime.
    pub fn install() -> Result<Self> {
        #[cfg(unix)]
        let inner = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())?;
        #[cfg(windows)]
        let inner = tokio::signal::windows::ctrl_c()?;
        Ok(Self { inner })
    }
}

#[async_trait]
impl InterruptSource for CtrlC {
    async fn interrupted(&mut self) {
        if self.inner.recv().await.is_none() {
            std::future::pending::<()>().await;
        }
    }
}

/// Interrupts sent by hand, e.g. from a test or another task.
#[async_trait]
impl InterruptSource for mpsc::UnboundedReceiver<()> {
    async fn interrupted(&mut self) {
        if self.recv().await.is_none() {
            std::future::pending::<()>().await;
        }
    }
}
