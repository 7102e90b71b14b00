//! Async owner of a [`Studio`].
//!
//! One task holds the studio and is its only writer. Commands arrive over a
//! channel from any number of [`StudioHandle`]s. Gateway round-trips run as
//! detached tasks and post their replies back to the engine, which applies
//! them through the studio's identity checks. A command never waits for the
//! backend, so edits and selection changes keep flowing while a request is
//! pending.

use crate::config::MAX_COMMAND_BUFFER;
use crate::error::{Result, SessionError, StudioError, WorkspaceError};
use crate::gateway::{AnalysisGateway, GatewayOperation, ValidationIssue};
use crate::locale::Locale;
use crate::metrics::StudioMetrics;
use crate::session::{
    AnalysisKind, AnalysisReply, AnalysisRequest, LookupReply, LookupRequest, SessionId,
};
use crate::studio::{Studio, StudioView};
use crate::workspace::{ArtifactId, ArtifactKind};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

type Reply<T> = oneshot::Sender<T>;

enum Command {
    View {
        reply: Reply<StudioView>,
    },
    Annotations {
        reply: Reply<Vec<ValidationIssue>>,
    },
    Select {
        id: ArtifactId,
        reply: Reply<bool>,
    },
    Create {
        name: String,
        kind: ArtifactKind,
        reply: Reply<std::result::Result<ArtifactId, WorkspaceError>>,
    },
    Delete {
        id: ArtifactId,
        reply: Reply<std::result::Result<(), WorkspaceError>>,
    },
    UpdateContent {
        id: ArtifactId,
        content: String,
        reply: Reply<std::result::Result<(), WorkspaceError>>,
    },
    Rename {
        id: ArtifactId,
        name: String,
        reply: Reply<std::result::Result<(), WorkspaceError>>,
    },
    SetLocale {
        locale: Locale,
        reply: Reply<()>,
    },
    Analyze {
        kind: AnalysisKind,
        reply: Reply<std::result::Result<SessionId, SessionError>>,
    },
    Lookup {
        args: String,
        reply: Reply<std::result::Result<SessionId, SessionError>>,
    },
}

/// Outcome of a detached gateway task
enum Arrival {
    Analysis {
        operation: GatewayOperation,
        reply: AnalysisReply,
    },
    AnalysisAborted {
        operation: GatewayOperation,
        session: SessionId,
    },
    Lookup(LookupReply),
    LookupAborted(SessionId),
}

pub struct StudioEngine {
    studio: Studio,
    gateway: Arc<dyn AnalysisGateway>,
    metrics: Arc<StudioMetrics>,
    commands: mpsc::Receiver<Command>,
    arrivals_tx: mpsc::UnboundedSender<Arrival>,
    arrivals_rx: mpsc::UnboundedReceiver<Arrival>,
}

impl StudioEngine {
    /// Start the engine task. It runs until every handle has been dropped.
    pub fn spawn(
        studio: Studio,
        gateway: Arc<dyn AnalysisGateway>,
        metrics: Arc<StudioMetrics>,
        command_buffer: usize,
    ) -> StudioHandle {
        let (commands_tx, commands) =
            mpsc::channel(command_buffer.clamp(1, MAX_COMMAND_BUFFER));
        let (arrivals_tx, arrivals_rx) = mpsc::unbounded_channel();

        metrics.set_artifact_count(studio.list_artifacts().len());

        let engine = Self {
            studio,
            gateway,
            metrics,
            commands,
            arrivals_tx,
            arrivals_rx,
        };
        tokio::spawn(engine.run());

        StudioHandle {
            commands: commands_tx,
        }
    }

    async fn run(mut self) {
        info!(
            "Studio engine started with {} files",
            self.studio.list_artifacts().len()
        );

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                Some(arrival) = self.arrivals_rx.recv() => self.handle_arrival(arrival),
            }
        }

        info!("Studio engine stopped");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::View { reply } => {
                let _ = reply.send(self.studio.view());
            }
            Command::Annotations { reply } => {
                let _ = reply.send(self.studio.annotations().to_vec());
            }
            Command::Select { id, reply } => {
                let _ = reply.send(self.studio.select_artifact(&id));
            }
            Command::Create { name, kind, reply } => {
                let result = self.studio.create_artifact(&name, kind);
                self.sync_artifact_count();
                let _ = reply.send(result);
            }
            Command::Delete { id, reply } => {
                let result = self.studio.delete_artifact(&id);
                self.sync_artifact_count();
                let _ = reply.send(result);
            }
            Command::UpdateContent { id, content, reply } => {
                let _ = reply.send(self.studio.update_content(&id, content));
            }
            Command::Rename { id, name, reply } => {
                let _ = reply.send(self.studio.rename_artifact(&id, &name));
            }
            Command::SetLocale { locale, reply } => {
                self.studio.set_locale(locale);
                let _ = reply.send(());
            }
            Command::Analyze { kind, reply } => {
                let result = self.studio.start_analysis(kind).map(|request| {
                    let session = request.session;
                    self.dispatch_analysis(request);
                    session
                });
                let _ = reply.send(result);
            }
            Command::Lookup { args, reply } => {
                let result = self.studio.start_lookup(&args).map(|request| {
                    let session = request.session;
                    self.dispatch_lookup(request);
                    session
                });
                let _ = reply.send(result);
            }
        }
    }

    fn handle_arrival(&mut self, arrival: Arrival) {
        match arrival {
            Arrival::Analysis { operation, reply } => {
                let session = reply.session;
                let degraded = reply.degraded;
                if self.studio.apply_analysis(reply) {
                    if degraded {
                        self.metrics.record_degraded(operation);
                    }
                    info!("{} session {} completed", operation, session);
                } else if self.studio.is_current_analysis(session) {
                    debug!("Rejected {} reply for session {}", operation, session);
                } else {
                    self.metrics.record_stale(operation);
                    debug!("Discarded stale {} reply for session {}", operation, session);
                }
            }
            Arrival::AnalysisAborted { operation, session } => {
                if self
                    .studio
                    .fail_analysis(session, "analysis task ended without a reply")
                {
                    self.metrics.record_aborted(operation);
                    error!("{} session {} aborted", operation, session);
                }
            }
            Arrival::Lookup(reply) => {
                let session = reply.session;
                let degraded = reply.degraded;
                if self.studio.apply_lookup(reply) {
                    if degraded {
                        self.metrics.record_degraded(GatewayOperation::Lookup);
                    }
                    info!("lookup session {} completed", session);
                } else if self.studio.is_current_lookup(session) {
                    debug!("Rejected lookup reply for session {}", session);
                } else {
                    self.metrics.record_stale(GatewayOperation::Lookup);
                    debug!("Discarded stale lookup reply for session {}", session);
                }
            }
            Arrival::LookupAborted(session) => {
                if self
                    .studio
                    .fail_lookup(session, "lookup task ended without a reply")
                {
                    self.metrics.record_aborted(GatewayOperation::Lookup);
                    error!("lookup session {} aborted", session);
                }
            }
        }
    }

    fn dispatch_analysis(&self, request: AnalysisRequest) {
        let operation = request.binding.kind.operation();
        let session = request.session;
        let gateway = Arc::clone(&self.gateway);
        let metrics = Arc::clone(&self.metrics);
        let arrivals = self.arrivals_tx.clone();

        metrics.record_request(operation);
        tokio::spawn(async move {
            let started = Instant::now();
            let result = AssertUnwindSafe(request.dispatch(gateway.as_ref()))
                .catch_unwind()
                .await;
            metrics.observe_duration(operation, started.elapsed().as_secs_f64());

            let arrival = match result {
                Ok(reply) => Arrival::Analysis { operation, reply },
                Err(_) => Arrival::AnalysisAborted { operation, session },
            };
            if arrivals.send(arrival).is_err() {
                debug!("Engine stopped before {} session {} returned", operation, session);
            }
        });
    }

    fn dispatch_lookup(&self, request: LookupRequest) {
        let session = request.session;
        let gateway = Arc::clone(&self.gateway);
        let metrics = Arc::clone(&self.metrics);
        let arrivals = self.arrivals_tx.clone();

        metrics.record_request(GatewayOperation::Lookup);
        tokio::spawn(async move {
            let started = Instant::now();
            let result = AssertUnwindSafe(request.dispatch(gateway.as_ref()))
                .catch_unwind()
                .await;
            metrics.observe_duration(GatewayOperation::Lookup, started.elapsed().as_secs_f64());

            let arrival = match result {
                Ok(reply) => Arrival::Lookup(reply),
                Err(_) => Arrival::LookupAborted(session),
            };
            if arrivals.send(arrival).is_err() {
                debug!("Engine stopped before lookup session {} returned", session);
            }
        });
    }

    fn sync_artifact_count(&self) {
        self.metrics
            .set_artifact_count(self.studio.list_artifacts().len());
    }
}

/// Cloneable handle for talking to a running [`StudioEngine`]
#[derive(Clone)]
pub struct StudioHandle {
    commands: mpsc::Sender<Command>,
}

impl StudioHandle {
    async fn call<T>(&self, command: impl FnOnce(Reply<T>) -> Command) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(command(reply))
            .await
            .map_err(|_| StudioError::EngineStopped)?;
        response.await.map_err(|_| StudioError::EngineStopped)
    }

    pub async fn view(&self) -> Result<StudioView> {
        self.call(|reply| Command::View { reply }).await
    }

    pub async fn annotations(&self) -> Result<Vec<ValidationIssue>> {
        self.call(|reply| Command::Annotations { reply }).await
    }

    /// Select a file; returns whether the selection changed
    pub async fn select(&self, id: ArtifactId) -> Result<bool> {
        self.call(|reply| Command::Select { id, reply }).await
    }

    pub async fn create_artifact(
        &self,
        name: impl Into<String>,
        kind: ArtifactKind,
    ) -> Result<ArtifactId> {
        let name = name.into();
        self.call(|reply| Command::Create { name, kind, reply })
            .await?
            .map_err(StudioError::from)
    }

    pub async fn delete_artifact(&self, id: ArtifactId) -> Result<()> {
        self.call(|reply| Command::Delete { id, reply })
            .await?
            .map_err(StudioError::from)
    }

    pub async fn update_content(&self, id: ArtifactId, content: impl Into<String>) -> Result<()> {
        let content = content.into();
        self.call(|reply| Command::UpdateContent { id, content, reply })
            .await?
            .map_err(StudioError::from)
    }

    pub async fn rename_artifact(&self, id: ArtifactId, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        self.call(|reply| Command::Rename { id, name, reply })
            .await?
            .map_err(StudioError::from)
    }

    pub async fn set_locale(&self, locale: Locale) -> Result<()> {
        self.call(|reply| Command::SetLocale { locale, reply }).await
    }

    /// Start validating the active file; returns the pending session id
    pub async fn validate(&self) -> Result<SessionId> {
        self.analyze(AnalysisKind::Validation).await
    }

    /// Start explaining the active file; returns the pending session id
    pub async fn explain(&self) -> Result<SessionId> {
        self.analyze(AnalysisKind::Explanation).await
    }

    pub async fn analyze(&self, kind: AnalysisKind) -> Result<SessionId> {
        self.call(|reply| Command::Analyze { kind, reply })
            .await?
            .map_err(StudioError::from)
    }

    /// Start a simulated lookup; returns the pending session id
    pub async fn lookup(&self, args: impl Into<String>) -> Result<SessionId> {
        let args = args.into();
        self.call(|reply| Command::Lookup { args, reply })
            .await?
            .map_err(StudioError::from)
    }
}
