use super::{Session, SessionId, SessionSlot};
use crate::error::SessionError;
use crate::gateway::{AnalysisGateway, LOOKUP_FAILURE};
use crate::locale::Locale;
use crate::workspace::ArtifactSnapshot;
use serde::Serialize;
use tracing::warn;

/// Query a lookup session was started with
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupBinding {
    /// Trimmed argument text, e.g. `-type=PTR 192.168.1.10`
    pub query: String,
    pub locale: Locale,
}

pub type LookupSession = Session<LookupBinding, String>;
pub type LookupSlot = SessionSlot<LookupBinding, String>;

/// A dispatched lookup carrying the whole-workspace snapshot it runs against
#[derive(Debug, Clone)]
pub struct LookupRequest {
    pub session: SessionId,
    pub query: String,
    pub artifacts: Vec<ArtifactSnapshot>,
    pub locale: Locale,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupReply {
    pub session: SessionId,
    pub output: String,
    pub degraded: bool,
}

impl LookupRequest {
    pub async fn dispatch(self, gateway: &dyn AnalysisGateway) -> LookupReply {
        match gateway
            .simulate_lookup(&self.query, &self.artifacts, self.locale)
            .await
        {
            Ok(output) => LookupReply {
                session: self.session,
                output,
                degraded: false,
            },
            Err(e) => {
                warn!("Lookup `{}` failed, returning fallback output: {}", self.query, e);
                LookupReply {
                    session: self.session,
                    output: LOOKUP_FAILURE.to_string(),
                    degraded: true,
                }
            }
        }
    }
}

impl LookupSession {
    pub fn last_query(&self) -> &str {
        &self.binding.query
    }

    pub fn last_output(&self) -> Option<&str> {
        self.result().map(String::as_str)
    }
}

impl LookupSlot {
    /// Start a lookup; blank arguments are refused before anything is sent
    pub fn start(
        &mut self,
        args: &str,
        artifacts: Vec<ArtifactSnapshot>,
        locale: Locale,
    ) -> Result<LookupRequest, SessionError> {
        let query = args.trim();
        if query.is_empty() {
            return Err(SessionError::EmptyQuery);
        }

        let session = self.begin(LookupBinding {
            query: query.to_string(),
            locale,
        });

        Ok(LookupRequest {
            session,
            query: query.to_string(),
            artifacts,
            locale,
        })
    }

    pub fn apply(&mut self, reply: LookupReply) -> bool {
        self.complete(reply.session, reply.output)
    }
}
