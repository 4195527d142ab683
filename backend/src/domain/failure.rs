//! Tagged failure values raised by request handlers.
//!
//! Failures are transport agnostic. The failure boundary is the single
//! point that turns them into responses; handlers only raise them. A
//! failure carries a category tag, an optional safe message that may be
//! disclosed to callers, and an optional internal diagnostic that only ever
//! reaches the logger.

use std::borrow::Cow;

/// Category tag attached to every raised failure.
///
/// Tags are open-ended strings: handlers may raise categories the registry
/// has never heard of, and those classify as the catch-all. The well-known
/// tags of the default taxonomy are provided as constants.
///
/// # Examples
/// ```
/// use faultline::domain::FailureCategory;
///
/// assert_eq!(FailureCategory::NOT_FOUND.as_str(), "not-found");
/// assert_eq!(FailureCategory::new("disk-full").as_str(), "disk-full");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FailureCategory(Cow<'static, str>);

impl FailureCategory {
    /// The request is malformed or fails validation.
    pub const VALIDATION: Self = Self::from_static("validation-error");
    /// Authentication failed or is missing.
    pub const NOT_AUTHENTICATED: Self = Self::from_static("not-authenticated");
    /// Authenticated but not permitted to perform this action.
    pub const NOT_AUTHORIZED: Self = Self::from_static("not-authorized");
    /// The requested resource does not exist.
    pub const NOT_FOUND: Self = Self::from_static("not-found");
    /// A domain rule rejected an otherwise well-formed request.
    pub const BUSINESS_RULE: Self = Self::from_static("business-rule-violation");
    /// Catch-all for failures no specific rule accepts.
    pub const UNKNOWN: Self = Self::from_static("unknown");

    const fn from_static(tag: &'static str) -> Self {
        Self(Cow::Borrowed(tag))
    }

    /// Construct a category from an arbitrary tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self(Cow::Owned(tag.into()))
    }

    /// The tag as written into envelopes and log records.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Failure raised during request handling.
///
/// Owned by the handler that raises it and consumed exactly once by the
/// classifier. The `message` is the safe, caller-visible text; handlers
/// must never put sensitive values there. Internal context belongs in the
/// `diagnostic`, which is only surfaced through the logger.
///
/// # Examples
/// ```
/// use faultline::domain::{Failure, FailureCategory};
///
/// let failure = Failure::not_found("Order 42 not found");
/// assert_eq!(failure.category(), &FailureCategory::NOT_FOUND);
/// assert_eq!(failure.message(), Some("Order 42 not found"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    category: FailureCategory,
    message: Option<String>,
    diagnostic: Option<String>,
}

impl Failure {
    /// Create a failure with a safe, caller-visible message.
    pub fn new(category: FailureCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: Some(message.into()),
            diagnostic: None,
        }
    }

    /// Create a failure carrying only its category tag.
    #[must_use]
    pub fn tagged(category: FailureCategory) -> Self {
        Self {
            category,
            message: None,
            diagnostic: None,
        }
    }

    /// Attach internal diagnostic context.
    ///
    /// The diagnostic never appears in a response; it reaches logs only.
    #[must_use]
    pub fn with_diagnostic(mut self, diagnostic: impl Into<String>) -> Self {
        self.diagnostic = Some(diagnostic.into());
        self
    }

    /// Category tag used for classification.
    #[must_use]
    pub fn category(&self) -> &FailureCategory {
        &self.category
    }

    /// Safe message, if the raising handler attached one.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Internal diagnostic context, if any.
    #[must_use]
    pub fn diagnostic(&self) -> Option<&str> {
        self.diagnostic.as_deref()
    }

    /// Convenience constructor for [`FailureCategory::VALIDATION`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(FailureCategory::VALIDATION, message)
    }

    /// Convenience constructor for [`FailureCategory::NOT_AUTHENTICATED`].
    pub fn not_authenticated(message: impl Into<String>) -> Self {
        Self::new(FailureCategory::NOT_AUTHENTICATED, message)
    }

    /// Convenience constructor for [`FailureCategory::NOT_AUTHORIZED`].
    pub fn not_authorized(message: impl Into<String>) -> Self {
        Self::new(FailureCategory::NOT_AUTHORIZED, message)
    }

    /// Convenience constructor for [`FailureCategory::NOT_FOUND`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(FailureCategory::NOT_FOUND, message)
    }

    /// Convenience constructor for [`FailureCategory::BUSINESS_RULE`].
    pub fn business_rule(message: impl Into<String>) -> Self {
        Self::new(FailureCategory::BUSINESS_RULE, message)
    }

    /// Convenience constructor for [`FailureCategory::UNKNOWN`].
    ///
    /// The message still lands in logs, but the boundary replaces it with a
    /// generic string before anything is disclosed to the caller.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(FailureCategory::UNKNOWN, message)
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {message}", self.category),
            None => write!(f, "{}", self.category),
        }
    }
}

impl std::error::Error for Failure {}
