//! Result-typed specification combinators.
//!
//! A specification is a named predicate that explains *why* a candidate is
//! rejected instead of returning a bare bool. Rules compose with [`all`],
//! [`any`] and [`not`]; leaf rules are plain closures wrapped by [`spec`].

use thiserror::Error;

/// Why a specification rejected its candidate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct Unsatisfied {
    reason: String,
}

impl Unsatisfied {
    /// Creates a rejection with the given reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// Returns the rejection reason.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// A verdict over a candidate: satisfied, or rejected with a reason.
pub trait Specification<T> {
    fn is_satisfied_by(&self, candidate: &T) -> Result<(), Unsatisfied>;
}

impl<T, F> Specification<T> for F
where
    F: Fn(&T) -> Result<(), Unsatisfied>,
{
    fn is_satisfied_by(&self, candidate: &T) -> Result<(), Unsatisfied> {
        self(candidate)
    }
}

/// Wraps a closure as a specification. Purely a readability aid at call
/// sites; any matching closure already implements the trait.
pub fn spec<T, F>(f: F) -> F
where
    F: Fn(&T) -> Result<(), Unsatisfied>,
{
    f
}

/// Satisfied when every inner specification is satisfied; reports the first
/// rejection.
pub struct AllOf<T> {
    specs: Vec<Box<dyn Specification<T>>>,
}

/// Builds an AND composition.
pub fn all<T>(specs: Vec<Box<dyn Specification<T>>>) -> AllOf<T> {
    AllOf { specs }
}

impl<T> Specification<T> for AllOf<T> {
    fn is_satisfied_by(&self, candidate: &T) -> Result<(), Unsatisfied> {
        for spec in &self.specs {
            spec.is_satisfied_by(candidate)?;
        }
        Ok(())
    }
}

/// Satisfied when at least one inner specification is satisfied; reports the
/// last rejection when none are.
pub struct AnyOf<T> {
    specs: Vec<Box<dyn Specification<T>>>,
}

/// Builds an OR composition.
pub fn any<T>(specs: Vec<Box<dyn Specification<T>>>) -> AnyOf<T> {
    AnyOf { specs }
}

impl<T> Specification<T> for AnyOf<T> {
    fn is_satisfied_by(&self, candidate: &T) -> Result<(), Unsatisfied> {
        let mut last = Unsatisfied::new("no alternatives given");
        for spec in &self.specs {
            match spec.is_satisfied_by(candidate) {
                Ok(()) => return Ok(()),
                Err(rejection) => last = rejection,
            }
        }
        Err(last)
    }
}

/// Inverts an inner specification, rejecting with the given reason when the
/// inner one is satisfied.
pub struct Not<T> {
    inner: Box<dyn Specification<T>>,
    reason: String,
}

/// Builds a NOT composition.
pub fn not<T>(inner: Box<dyn Specification<T>>, reason: impl Into<String>) -> Not<T> {
    Not {
        inner,
        reason: reason.into(),
    }
}

impl<T> Specification<T> for Not<T> {
    fn is_satisfied_by(&self, candidate: &T) -> Result<(), Unsatisfied> {
        match self.inner.is_satisfied_by(candidate) {
            Ok(()) => Err(Unsatisfied::new(self.reason.clone())),
            Err(_) => Ok(()),
        }
    }
}
