use crate::path::FieldPath;
use crate::record::{FieldValue, Record};

/// Read access to the configuration state the assembler consults.
///
/// Mirrors the primitives a schema engine exposes: whether the user set a
/// path in the current configuration, and whether the value at a path
/// differs from the previously stored state.
pub trait ConfigState {
    /// Value explicitly present at `path` in the current configuration.
    fn get_ok(&self, path: &FieldPath) -> Option<&FieldValue>;

    /// True when the value at `path` differs from the prior state.
    fn has_change(&self, path: &FieldPath) -> bool;
}

/// Planned configuration paired with the prior stored state.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub planned: &'a Record,
    pub prior: Option<&'a Record>,
}

impl<'a> Snapshot<'a> {
    pub fn new(planned: &'a Record, prior: Option<&'a Record>) -> Self {
        Self { planned, prior }
    }

    /// Snapshot with no prior state, as on first create.
    pub fn fresh(planned: &'a Record) -> Self {
        Self::new(planned, None)
    }
}

impl ConfigState for Snapshot<'_> {
    fn get_ok(&self, path: &FieldPath) -> Option<&FieldValue> {
        self.planned.lookup(path)
    }

    fn has_change(&self, path: &FieldPath) -> bool {
        let before = self.prior.and_then(|prior| prior.lookup(path));
        before != self.planned.lookup(path)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigState, Snapshot};
    use crate::path::FieldPath;
    use crate::record::Record;

    #[test]
    fn removed_field_reports_change() {
        let prior = Record::new().with("comments", "old").with("status", "enable");
        let planned = Record::new().with("status", "enable");
        let snapshot = Snapshot::new(&planned, Some(&prior));

        assert!(snapshot.has_change(&FieldPath::field("comments")));
        assert!(!snapshot.has_change(&FieldPath::field("status")));
        assert!(snapshot.get_ok(&FieldPath::field("comments")).is_none());
    }

    #[test]
    fn fresh_snapshot_only_changes_set_fields() {
        let planned = Record::new().with("status", "enable");
        let snapshot = Snapshot::fresh(&planned);
        assert!(snapshot.has_change(&FieldPath::field("status")));
        assert!(!snapshot.has_change(&FieldPath::field("comments")));
    }
}
