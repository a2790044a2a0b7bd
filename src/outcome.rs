use std::any::Any;
use std::fmt::{Debug, Display};
use std::panic;

/// Result of one gated test invocation.
#[derive(Debug)]
pub enum Outcome {
    Pass,
    Fail(Failure),
    /// Not run and not failed.
    Skip(String),
}

/// Why a test body failed after a successful probe.
pub enum Failure {
    Error(anyhow::Error),
    /// Payload of a panic raised by the body, e.g. a failed `assert!`.
    Panic(Box<dyn Any + Send>),
}

impl Failure {
    pub fn message(&self) -> String {
        match self {
            Failure::Error(err) => format!("{err:#}"),
            Failure::Panic(payload) => {
                if let Some(s) = payload.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = payload.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "non-string panic payload".to_string()
                }
            }
        }
    }
}

impl Debug for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Failure::Error(err) => write!(f, "Error({err:?})"),
            Failure::Panic(_) => write!(f, "Panic({:?})", self.message()),
        }
    }
}

impl Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl Outcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, Self::Skip(_))
    }

    pub fn is_fail(&self) -> bool {
        matches!(self, Self::Fail(_))
    }

    pub fn skip_reason(&self) -> Option<&str> {
        match self {
            Self::Skip(reason) => Some(reason),
            _ => None,
        }
    }

    /// Hands the outcome to libtest, which has no skip state of its own.
    ///
    /// A skip logs a marker and returns so the test shows as passed. A body
    /// panic is resumed with its original payload.
    pub fn report(self, test_name: &str) {
        match self {
            Outcome::Pass => {}
            Outcome::Skip(reason) => info!("SKIPPED {test_name}: {reason}"),
            Outcome::Fail(Failure::Panic(payload)) => panic::resume_unwind(payload),
            Outcome::Fail(Failure::Error(err)) => panic!("{test_name} failed: {err:#}"),
        }
    }
}
