/// Outcome of a reducer application.
///
/// Reducers are total: a missing target degrades to a `NotFound` no-op
/// instead of an error, and tests can assert on that path deliberately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Apply {
    /// The state changed (or the change was already in effect and the
    /// reducer kept it idempotently).
    Applied,
    /// The target entity does not exist; the state is untouched.
    NotFound,
}

impl Apply {
    pub fn is_applied(self) -> bool {
        matches!(self, Apply::Applied)
    }
}
