use base64::Engine;

use super::gss::{ContextGuard, GssMechanism};
use crate::error::NegotiationError;
use crate::http::{HttpRequest, HttpResponse, HttpTransport};

pub const GSS_PATH: &str = "step-auth-gss";

const SESSION_COOKIE: &str = "JSESSIONID";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationState {
    Init,
    ChallengeSent,
    ContextEstablishing,
    ResponseSent,
    Authenticated,
    Failed,
}

pub fn negotiation_url(host: &str) -> String {
    format!("https://{host}:443/{GSS_PATH}")
}

/// One SPNEGO handshake against a tracker host, yielding its session cookie.
///
/// Not retried: a failed attempt leaves the state at [`NegotiationState::Failed`]
/// and a new `Negotiation` is needed for another try.
pub struct Negotiation<'a> {
    host: String,
    transport: &'a dyn HttpTransport,
    mechanism: &'a dyn GssMechanism,
    state: NegotiationState,
}

impl<'a> Negotiation<'a> {
    pub fn new(
        host: impl Into<String>,
        transport: &'a dyn HttpTransport,
        mechanism: &'a dyn GssMechanism,
    ) -> Self {
        Self {
            host: host.into(),
            transport,
            mechanism,
            state: NegotiationState::Init,
        }
    }

    pub fn state(&self) -> NegotiationState {
        self.state
    }

    /// Runs the handshake and returns `JSESSIONID=<value>`.
    pub async fn run(&mut self) -> Result<String, NegotiationError> {
        if self.state != NegotiationState::Init {
            return Err(NegotiationError::Protocol(format!(
                "negotiation already ran (state {:?})",
                self.state
            )));
        }
        let result = self.handshake().await;
        if let Err(e) = &result {
            tracing::debug!(host = %self.host, error = %e, "Negotiation failed");
            self.enter(NegotiationState::Failed);
        }
        result
    }

    async fn handshake(&mut self) -> Result<String, NegotiationError> {
        let url = negotiation_url(&self.host);

        self.enter(NegotiationState::ChallengeSent);
        let challenge = self.transport.send(HttpRequest::get(&url)).await?;
        self.expect_challenge(&challenge)?;

        self.enter(NegotiationState::ContextEstablishing);
        let token = {
            let mut ctx = ContextGuard::acquire(self.mechanism, &format!("HTTP@{}", self.host))?;
            let token = ctx.step(None)?;
            ctx.release()?;
            base64::engine::general_purpose::STANDARD.encode(token)
        };
        tracing::debug!("Acquired Kerberos negotiation token");

        self.enter(NegotiationState::ResponseSent);
        let request =
            HttpRequest::get(&url).with_header("Authorization", format!("Negotiate {token}"));
        let response = self.transport.send(request).await?;
        let cookie = self.expect_session(&response)?;

        self.enter(NegotiationState::Authenticated);
        Ok(cookie)
    }

    fn expect_challenge(&self, response: &HttpResponse) -> Result<(), NegotiationError> {
        match response.status {
            401 => {}
            403 => return Err(self.forbidden()),
            status => {
                return Err(NegotiationError::Protocol(format!(
                    "expected a 401 challenge from {}, got HTTP {status}",
                    self.host
                )))
            }
        }

        let offered = response.headers_named("WWW-Authenticate");
        if offered.is_empty() {
            return Err(NegotiationError::Protocol(
                "401 response carried no WWW-Authenticate challenge".into(),
            ));
        }
        // Servers may offer several schemes side by side
        let challenge = offered
            .iter()
            .find(|value| {
                value
                    .split_whitespace()
                    .next()
                    .is_some_and(|scheme| scheme.eq_ignore_ascii_case("Negotiate"))
            })
            .ok_or_else(|| {
                NegotiationError::Protocol(format!(
                    "server does not offer Negotiate authentication ({})",
                    offered.join(", ")
                ))
            })?;
        tracing::debug!(challenge = *challenge, "SPNEGO challenge");
        Ok(())
    }

    fn expect_session(&self, response: &HttpResponse) -> Result<String, NegotiationError> {
        match response.status {
            200 => {}
            403 => return Err(self.forbidden()),
            status => {
                return Err(NegotiationError::Protocol(format!(
                    "negotiation response from {} was HTTP {status}",
                    self.host
                )))
            }
        }

        response
            .headers_named("Set-Cookie")
            .into_iter()
            .find(|c| c.trim_start().starts_with(SESSION_COOKIE))
            .and_then(|c| c.split(';').next())
            .map(|pair| pair.trim().to_string())
            .ok_or_else(|| {
                NegotiationError::Protocol(format!("no {SESSION_COOKIE} cookie in response"))
            })
    }

    fn forbidden(&self) -> NegotiationError {
        NegotiationError::Forbidden {
            host: self.host.clone(),
        }
    }

    fn enter(&mut self, next: NegotiationState) {
        tracing::debug!(from = ?self.state, to = ?next, "Negotiation state");
        self.state = next;
    }
}
