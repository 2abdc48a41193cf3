pub mod gss;
pub mod negotiate;

use crate::error::NegotiationError;
use crate::http::ReqwestTransport;

/// Negotiates a Jira session cookie with the Kerberos credentials of the current user.
pub async fn negotiate_session(host: &str, strict_ssl: bool) -> Result<String, NegotiationError> {
    tracing::debug!(host, "Negotiating GSS auth");
    let transport = ReqwestTransport::new(strict_ssl)?;
    let mechanism = gss::default_mechanism();
    negotiate::Negotiation::new(host, &transport, mechanism.as_ref())
        .run()
        .await
}
