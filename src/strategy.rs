//! Ordered fallback evaluation

use std::fmt;

use tracing::debug;

/// Failures collected from every candidate that was tried
#[derive(Debug)]
pub struct Attempts<C, E> {
    pub failures: Vec<(C, E)>,
}

impl<C: PartialEq, E: fmt::Display> Attempts<C, E> {
    /// Message recorded for one candidate, if it was tried
    pub fn message_for(&self, candidate: &C) -> Option<String> {
        self.failures
            .iter()
            .find(|(c, _)| c == candidate)
            .map(|(_, e)| e.to_string())
    }
}

impl<C, E: fmt::Display> Attempts<C, E> {
    /// Message of the last failure
    pub fn last_message(&self) -> String {
        self.failures
            .last()
            .map(|(_, e)| e.to_string())
            .unwrap_or_else(|| "no strategy was attempted".to_string())
    }
}

impl<C: fmt::Debug, E: fmt::Display> fmt::Display for Attempts<C, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (candidate, error)) in self.failures.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{:?}: {}", candidate, error)?;
        }
        Ok(())
    }
}

/// Try `attempt` on each candidate in order and return the first success.
/// Later candidates are not tried once one succeeds.
pub fn first_success<C, T, E, I, F>(candidates: I, mut attempt: F) -> Result<T, Attempts<C, E>>
where
    C: fmt::Debug,
    E: fmt::Display,
    I: IntoIterator<Item = C>,
    F: FnMut(&C) -> Result<T, E>,
{
    let mut failures = Vec::new();
    for candidate in candidates {
        match attempt(&candidate) {
            Ok(value) => {
                debug!(candidate = ?candidate, "strategy succeeded");
                return Ok(value);
            }
            Err(error) => {
                debug!(candidate = ?candidate, error = %error, "strategy failed");
                failures.push((candidate, error));
            }
        }
    }
    Err(Attempts { failures })
}
