//! Authentication error types.

use core::fmt;

/// The kind of authentication error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthErrorKind {
    /// Digest verification failed; the payload must be discarded.
    VerificationFailed,
    /// The carried digest bytes do not form a full 32-byte digest.
    MalformedDigest,
}

/// An error from digest authentication.
///
/// A verification failure is not fatal: the caller discards the payload and
/// treats the receive as "no new data". It is the frame, not the channel,
/// that is rejected.
#[derive(Debug, Clone)]
pub struct AuthError {
    kind: AuthErrorKind,
    /// Optional context about what was being authenticated.
    context: Option<String>,
}

impl AuthError {
    /// Creates a new authentication error with the given kind.
    #[must_use]
    pub const fn new(kind: AuthErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Creates a verification failure error.
    #[must_use]
    pub const fn verification_failed() -> Self {
        Self::new(AuthErrorKind::VerificationFailed)
    }

    /// Creates a malformed digest error.
    #[must_use]
    pub const fn malformed_digest() -> Self {
        Self::new(AuthErrorKind::MalformedDigest)
    }

    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> AuthErrorKind {
        self.kind
    }

    /// Returns `true` if this is a verification failure.
    #[must_use]
    pub const fn is_verification_failure(&self) -> bool {
        matches!(self.kind, AuthErrorKind::VerificationFailed)
    }

    /// Adds context to the error.
    #[must_use]
    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context = Some(ctx.into());
        self
    }

    /// Returns the error context, if any.
    #[must_use]
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self.kind {
            AuthErrorKind::VerificationFailed => "digest verification failed",
            AuthErrorKind::MalformedDigest => "malformed message digest",
        };

        write!(f, "{msg}")?;

        if let Some(ctx) = &self.context {
            write!(f, ": {ctx}")?;
        }

        Ok(())
    }
}

impl std::error::Error for AuthError {}

/// Result type for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;
