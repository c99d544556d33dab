//! Tagged result for remote reads.

/// Outcome of a read against the target system.
///
/// Absence is ordinary control flow (it triggers creation), so it must not
/// travel on the error channel: remote reads return
/// `Result<Lookup<T>, SomeError>`, keeping `NotFound` and transport/API
/// failures impossible to confuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

impl<T> Lookup<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    /// The found value, if any.
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound => None,
        }
    }
}

impl<T> From<Option<T>> for Lookup<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Lookup::Found(v),
            None => Lookup::NotFound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn found_unwraps_to_some() {
        assert_eq!(Lookup::Found(3).found(), Some(3));
        assert_eq!(Lookup::<i64>::NotFound.found(), None);
    }

    #[test]
    fn converts_from_option() {
        assert_eq!(Lookup::from(Some(1)), Lookup::Found(1));
        assert_eq!(Lookup::<i64>::from(None), Lookup::NotFound);
    }
}
