//! Per-attempt security contexts for negotiated authentication.

use crate::error::NegotiationError;

/// An initiated client security context.
pub trait SecurityContext: Send {
    /// Runs one initiation step and returns the token to send to the server.
    fn step(&mut self, input: Option<&[u8]>) -> Result<Vec<u8>, NegotiationError>;

    /// Deletes the context. Called exactly once.
    fn release(&mut self) -> Result<(), NegotiationError>;
}

/// Creates client security contexts for a service principal such as `HTTP@host`.
pub trait GssMechanism: Send + Sync {
    fn init_context(&self, service: &str) -> Result<Box<dyn SecurityContext>, NegotiationError>;
}

/// Owns a context for the length of one negotiation step and releases it on every exit path.
pub struct ContextGuard {
    ctx: Option<Box<dyn SecurityContext>>,
}

impl ContextGuard {
    pub fn acquire(mechanism: &dyn GssMechanism, service: &str) -> Result<Self, NegotiationError> {
        let ctx = mechanism.init_context(service)?;
        tracing::debug!(service, "Initialized security context");
        Ok(Self { ctx: Some(ctx) })
    }

    pub fn step(&mut self, input: Option<&[u8]>) -> Result<Vec<u8>, NegotiationError> {
        match self.ctx.as_mut() {
            Some(ctx) => ctx.step(input),
            None => Err(NegotiationError::Context("context already released".into())),
        }
    }

    /// Releases now and reports cleanup failures, instead of only logging them on drop.
    pub fn release(mut self) -> Result<(), NegotiationError> {
        match self.ctx.take() {
            Some(mut ctx) => ctx.release(),
            None => Ok(()),
        }
    }
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        if let Some(mut ctx) = self.ctx.take() {
            if let Err(e) = ctx.release() {
                tracing::warn!(error = %e, "Failed to release security context");
            }
        }
    }
}

/// The mechanism available in this build.
#[cfg(feature = "gssapi")]
pub fn default_mechanism() -> Box<dyn GssMechanism> {
    Box::new(kerberos::Kerberos)
}

#[cfg(not(feature = "gssapi"))]
pub fn default_mechanism() -> Box<dyn GssMechanism> {
    Box::new(Unavailable)
}

/// Stand-in used when the binary is built without the `gssapi` feature.
#[cfg(not(feature = "gssapi"))]
pub struct Unavailable;

#[cfg(not(feature = "gssapi"))]
impl GssMechanism for Unavailable {
    fn init_context(&self, _service: &str) -> Result<Box<dyn SecurityContext>, NegotiationError> {
        Err(NegotiationError::Context(
            "cardsync was built without the `gssapi` feature".into(),
        ))
    }
}

#[cfg(feature = "gssapi")]
mod kerberos {
    use libgssapi::context::{ClientCtx, CtxFlags};
    use libgssapi::name::Name;
    use libgssapi::oid::{GSS_MECH_KRB5, GSS_NT_HOSTBASED_SERVICE};

    use super::{GssMechanism, SecurityContext};
    use crate::error::NegotiationError;

    pub struct Kerberos;

    struct KerberosContext {
        ctx: Option<ClientCtx>,
    }

    fn context_error(e: libgssapi::error::Error) -> NegotiationError {
        NegotiationError::Context(e.to_string())
    }

    impl GssMechanism for Kerberos {
        fn init_context(&self, service: &str) -> Result<Box<dyn SecurityContext>, NegotiationError> {
            let name = Name::new(service.as_bytes(), Some(&GSS_NT_HOSTBASED_SERVICE))
                .and_then(|n| n.canonicalize(Some(&GSS_MECH_KRB5)))
                .map_err(context_error)?;
            let ctx = ClientCtx::new(None, name, CtxFlags::GSS_C_MUTUAL_FLAG, Some(&GSS_MECH_KRB5));
            Ok(Box::new(KerberosContext { ctx: Some(ctx) }))
        }
    }

    impl SecurityContext for KerberosContext {
        fn step(&mut self, input: Option<&[u8]>) -> Result<Vec<u8>, NegotiationError> {
            let ctx = self
                .ctx
                .as_mut()
                .ok_or_else(|| NegotiationError::Context("context already released".into()))?;
            let token = ctx.step(input, None).map_err(context_error)?;
            token
                .map(|buf| buf.to_vec())
                .ok_or_else(|| NegotiationError::Context("Kerberos produced no token".into()))
        }

        fn release(&mut self) -> Result<(), NegotiationError> {
            // Dropping the ClientCtx deletes the underlying GSS context.
            self.ctx.take();
            Ok(())
        }
    }
}

#[cfg(test)]
pub mod mock {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    /// Counts context creations and releases; optionally fails the step.
    #[derive(Clone, Default)]
    pub struct MockMechanism {
        pub created: Arc<AtomicUsize>,
        pub released: Arc<AtomicUsize>,
        pub services: Arc<std::sync::Mutex<Vec<String>>>,
        pub fail_step: bool,
    }

    impl MockMechanism {
        pub fn created(&self) -> usize {
            self.created.load(Ordering::SeqCst)
        }

        pub fn released(&self) -> usize {
            self.released.load(Ordering::SeqCst)
        }
    }

    struct MockContext {
        released: Arc<AtomicUsize>,
        fail_step: bool,
    }

    impl GssMechanism for MockMechanism {
        fn init_context(&self, service: &str) -> Result<Box<dyn SecurityContext>, NegotiationError> {
            self.created.fetch_add(1, Ordering::SeqCst);
            self.services.lock().unwrap().push(service.to_string());
            Ok(Box::new(MockContext {
                released: self.released.clone(),
                fail_step: self.fail_step,
            }))
        }
    }

    impl SecurityContext for MockContext {
        fn step(&mut self, _input: Option<&[u8]>) -> Result<Vec<u8>, NegotiationError> {
            if self.fail_step {
                return Err(NegotiationError::Context("no credentials cache".into()));
            }
            Ok(b"token".to_vec())
        }

        fn release(&mut self) -> Result<(), NegotiationError> {
            self.released.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }
}
