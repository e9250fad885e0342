use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Device firmware version, compared component-wise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FirmwareVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid firmware version '{0}'")]
pub struct VersionParseError(pub String);

impl FirmwareVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl FromStr for FirmwareVersion {
    type Err = VersionParseError;

    /// Accepts `v7.2.0`, `7.2`, `7.2.0 build1234` and `v7.4.1-build2463`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let body = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('V'))
            .unwrap_or(trimmed);
        let numeric: String = body
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == '.')
            .collect();
        if numeric.is_empty() {
            return Err(VersionParseError(s.to_string()));
        }

        let mut parts = [0u32; 3];
        for (idx, part) in numeric.split('.').enumerate() {
            if idx >= parts.len() {
                break;
            }
            if part.is_empty() {
                return Err(VersionParseError(s.to_string()));
            }
            parts[idx] = part
                .parse()
                .map_err(|_| VersionParseError(s.to_string()))?;
        }

        Ok(Self::new(parts[0], parts[1], parts[2]))
    }
}

impl TryFrom<String> for FirmwareVersion {
    type Error = VersionParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FirmwareVersion> for String {
    fn from(value: FirmwareVersion) -> Self {
        value.to_string()
    }
}

impl Display for FirmwareVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Inclusive firmware range a field is available in. Open on missing sides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VersionRange {
    pub since: Option<FirmwareVersion>,
    pub until: Option<FirmwareVersion>,
}

impl VersionRange {
    pub fn new(since: Option<FirmwareVersion>, until: Option<FirmwareVersion>) -> Self {
        Self { since, until }
    }

    pub fn is_unbounded(&self) -> bool {
        self.since.is_none() && self.until.is_none()
    }

    pub fn contains(&self, version: &FirmwareVersion) -> bool {
        let after_start = self.since.map_or(true, |since| *version >= since);
        let before_end = self.until.map_or(true, |until| *version <= until);
        after_start && before_end
    }
}

impl Display for VersionRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match (self.since, self.until) {
            (Some(since), Some(until)) => write!(f, "{since} - {until}"),
            (Some(since), None) => write!(f, ">= {since}"),
            (None, Some(until)) => write!(f, "<= {until}"),
            (None, None) => write!(f, "any"),
        }
    }
}
