use super::errors::{Error, ErrorClass, Severity};

/// Collects the errors and warnings reported by every phase.
///
/// Phases keep going after a failure so that one run reports as many
/// problems as possible; nothing is printed from here.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    reported: Vec<Error>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics::default()
    }

    pub fn report(&mut self, error: Error) {
        self.reported.push(error);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.reported.extend(other.reported);
    }

    pub fn has_errors(&self) -> bool {
        self.reported
            .iter()
            .any(|error| error.get_severity() == Severity::Error)
    }

    pub fn error_count(&self) -> usize {
        self.reported.iter().filter(|error| !error.is_warning()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.reported.iter().filter(|error| error.is_warning()).count()
    }

    pub fn len(&self) -> usize {
        self.reported.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reported.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Error> {
        self.reported.iter()
    }

    pub fn of_class(&self, class: ErrorClass) -> impl Iterator<Item = &Error> {
        self.reported
            .iter()
            .filter(move |error| error.get_error_class() == class)
    }

    /// Messages of every reported diagnostic, in report order.
    pub fn messages(&self) -> Vec<String> {
        self.reported.iter().map(|error| error.get_message()).collect()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Error;
    type IntoIter = std::slice::Iter<'a, Error>;

    fn into_iter(self) -> Self::IntoIter {
        self.reported.iter()
    }
}
