use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathSegment {
    /// Named field of a record.
    Field(String),
    /// Position inside a list or set value.
    Index(usize),
}

/// Address of a field or sub-field inside a configuration record.
///
/// Rendered as a dotted string such as `entry.0.port_range.1.start_port`,
/// which is the form the configuration state is queried with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    /// Empty path addressing the record itself.
    pub fn root() -> Self {
        Self::default()
    }

    /// Path with a single top-level field.
    pub fn field(name: impl Into<String>) -> Self {
        Self {
            segments: vec![PathSegment::Field(name.into())],
        }
    }

    /// Return a new path extended with a named field.
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut out = self.clone();
        out.segments.push(PathSegment::Field(name.into()));
        out
    }

    /// Return a new path extended with a list index.
    pub fn index(&self, idx: usize) -> Self {
        let mut out = self.clone();
        out.segments.push(PathSegment::Index(idx));
        out
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Name of the last field segment, if any.
    pub fn leaf_name(&self) -> Option<&str> {
        self.segments.iter().rev().find_map(|segment| match segment {
            PathSegment::Field(name) => Some(name.as_str()),
            PathSegment::Index(_) => None,
        })
    }

    /// Dotted form with list indices removed, e.g. `nac_ports.onboarding_vlan`.
    ///
    /// Used as the lookup key for per-field metadata that does not depend on
    /// element position.
    pub fn schema_key(&self) -> String {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                PathSegment::Field(name) => Some(name.as_str()),
                PathSegment::Index(_) => None,
            })
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (idx, segment) in self.segments.iter().enumerate() {
            if idx > 0 {
                write!(f, ".")?;
            }
            match segment {
                PathSegment::Field(name) => write!(f, "{name}")?,
                PathSegment::Index(i) => write!(f, "{i}")?,
            }
        }
        Ok(())
    }
}

impl FromStr for FieldPath {
    type Err = std::convert::Infallible;

    /// Numeric segments become indices. Catalog loading rejects numeric field
    /// names, so the two never collide.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments = s
            .split('.')
            .filter(|part| !part.is_empty())
            .map(|part| match part.parse::<usize>() {
                Ok(idx) => PathSegment::Index(idx),
                Err(_) => PathSegment::Field(part.to_string()),
            })
            .collect();
        Ok(Self { segments })
    }
}

impl From<&str> for FieldPath {
    fn from(value: &str) -> Self {
        match value.parse() {
            Ok(path) => path,
            Err(never) => match never {},
        }
    }
}

/// Map a configuration field name to its wire spelling (`port_range` -> `port-range`).
pub fn to_wire_name(field: &str) -> String {
    field.replace('_', "-")
}

/// Map a wire key to its configuration spelling (`port-range` -> `port_range`).
pub fn from_wire_name(key: &str) -> String {
    key.replace('-', "_")
}
