use schema_transcode::{Record, Snapshot};
use serde::{Deserialize, Serialize};

/// One managed resource instance.
///
/// `config` is what the user wants, `applied` is the configuration last
/// sent to the device and `state` is what the device reported on the last
/// read. Removal detection compares `config` against `applied`, so fields
/// the device fills in on its own are never reset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub config: Record,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied: Option<Record>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<Record>,
}

impl ResourceData {
    pub fn new(config: Record) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Data for an existing object known only by its id.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn is_tracked(&self) -> bool {
        self.id.is_some()
    }

    /// Planned configuration paired with the last applied one.
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot::new(&self.config, self.applied.as_ref())
    }

    /// Forget the remote object; used when it disappeared or was deleted.
    pub fn clear(&mut self) {
        self.id = None;
        self.applied = None;
        self.state = None;
    }
}
