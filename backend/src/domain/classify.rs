//! Failure classification rules and the ordered rule registry.
//!
//! The registry is configured once at process start and is read-only while
//! requests are served. Order encodes specificity: classification walks the
//! rules in insertion order and the first matching rule wins. The builder
//! appends the catch-all rule itself, so every registry ends with exactly
//! one catch-all and classification can never fail.

use std::borrow::Cow;
use std::sync::LazyLock;

use actix_web::http::StatusCode;

use super::failure::{Failure, FailureCategory};

static DEFAULT_REGISTRY: LazyLock<RuleRegistry> = LazyLock::new(RuleRegistry::with_defaults);

/// Predicate over a failure's category tag.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Matcher {
    /// Accepts exactly one category tag.
    Category(FailureCategory),
    /// Accepts every category. Only the trailing catch-all uses this.
    Any,
}

impl Matcher {
    fn accepts(&self, category: &FailureCategory) -> bool {
        match self {
            Self::Category(tag) => tag == category,
            Self::Any => true,
        }
    }
}

/// One entry of the classification taxonomy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRule {
    matcher: Matcher,
    status: StatusCode,
    title: Cow<'static, str>,
    category: FailureCategory,
}

impl ClassificationRule {
    /// Transport status code written for failures matching this rule.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Short stable title written into the envelope.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Category tag written into the envelope.
    #[must_use]
    pub fn category(&self) -> &FailureCategory {
        &self.category
    }

    /// Whether this is the trailing catch-all rule.
    #[must_use]
    pub fn is_catch_all(&self) -> bool {
        matches!(self.matcher, Matcher::Any)
    }
}

/// Ordered, read-only registry of classification rules.
///
/// The catch-all is stored apart from the specific rules, which makes the
/// invariant literal: there is exactly one, and it is always consulted
/// last.
///
/// # Examples
/// ```
/// use actix_web::http::StatusCode;
/// use faultline::domain::{Failure, FailureCategory, RuleRegistry};
///
/// let registry = RuleRegistry::builder()
///     .rule(FailureCategory::new("teapot"), StatusCode::IM_A_TEAPOT, "Teapot")
///     .build();
/// let rule = registry.classify(&Failure::new(FailureCategory::new("teapot"), "short"));
/// assert_eq!(rule.status(), StatusCode::IM_A_TEAPOT);
/// ```
#[derive(Debug, Clone)]
pub struct RuleRegistry {
    rules: Vec<ClassificationRule>,
    catch_all: ClassificationRule,
}

impl RuleRegistry {
    /// Registry holding the default taxonomy.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::builder()
            .rule(
                FailureCategory::VALIDATION,
                StatusCode::BAD_REQUEST,
                "Validation Failed",
            )
            .rule(
                FailureCategory::NOT_AUTHENTICATED,
                StatusCode::UNAUTHORIZED,
                "Not Authenticated",
            )
            .rule(
                FailureCategory::NOT_AUTHORIZED,
                StatusCode::FORBIDDEN,
                "Not Authorized",
            )
            .rule(
                FailureCategory::NOT_FOUND,
                StatusCode::NOT_FOUND,
                "Not Found",
            )
            .rule(
                FailureCategory::BUSINESS_RULE,
                StatusCode::UNPROCESSABLE_ENTITY,
                "Business Rule Violated",
            )
            .build()
    }

    /// Process-wide registry with the default taxonomy.
    ///
    /// Used by the `ResponseError` fallback when a failure escapes without
    /// passing through a boundary carrying an injected registry.
    #[must_use]
    pub fn shared_default() -> &'static Self {
        &DEFAULT_REGISTRY
    }

    /// Start building a registry.
    #[must_use]
    pub fn builder() -> RuleRegistryBuilder {
        RuleRegistryBuilder::default()
    }

    /// First rule accepting the failure's category.
    ///
    /// Falls through to the trailing catch-all, so classification is
    /// deterministic, side-effect-free, and infallible.
    #[must_use]
    pub fn classify(&self, failure: &Failure) -> &ClassificationRule {
        self.rules
            .iter()
            .find(|rule| rule.matcher.accepts(failure.category()))
            .unwrap_or(&self.catch_all)
    }

    /// All rules in classification order, catch-all last.
    pub fn rules(&self) -> impl Iterator<Item = &ClassificationRule> {
        self.rules.iter().chain(std::iter::once(&self.catch_all))
    }
}

/// Builder collecting specific rules in priority order.
#[derive(Debug, Default)]
pub struct RuleRegistryBuilder {
    rules: Vec<ClassificationRule>,
}

impl RuleRegistryBuilder {
    /// Append a rule matching exactly `category`.
    #[must_use]
    pub fn rule(
        mut self,
        category: FailureCategory,
        status: StatusCode,
        title: impl Into<Cow<'static, str>>,
    ) -> Self {
        self.rules.push(ClassificationRule {
            matcher: Matcher::Category(category.clone()),
            status,
            title: title.into(),
            category,
        });
        self
    }

    /// Finish the registry, appending the mandatory catch-all rule.
    #[must_use]
    pub fn build(self) -> RuleRegistry {
        RuleRegistry {
            rules: self.rules,
            catch_all: ClassificationRule {
                matcher: Matcher::Any,
                status: StatusCode::INTERNAL_SERVER_ERROR,
                title: Cow::Borrowed("Internal Server Error"),
                category: FailureCategory::UNKNOWN,
            },
        }
    }
}
