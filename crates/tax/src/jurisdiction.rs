use core::str::FromStr;

use serde::{Deserialize, Serialize};

use recon_core::{DomainError, DomainResult};

/// Opaque code of a taxing region (typically a two-digit state code).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JurisdictionCode(String);

impl JurisdictionCode {
    /// Trims the input; an empty code is rejected.
    pub fn new(code: impl AsRef<str>) -> DomainResult<Self> {
        let trimmed = code.as_ref().trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("jurisdiction code cannot be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for JurisdictionCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<JurisdictionCode> for String {
    fn from(value: JurisdictionCode) -> Self {
        value.0
    }
}

impl FromStr for JurisdictionCode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl core::fmt::Display for JurisdictionCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where goods move from and to, plus the inter-jurisdiction override.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyRoute {
    #[serde(default)]
    pub origin: Option<JurisdictionCode>,
    #[serde(default)]
    pub destination: Option<JurisdictionCode>,
    #[serde(default)]
    pub force_inter_jurisdiction: bool,
}

impl SupplyRoute {
    pub fn new(
        origin: Option<JurisdictionCode>,
        destination: Option<JurisdictionCode>,
        force_inter_jurisdiction: bool,
    ) -> Self {
        Self {
            origin,
            destination,
            force_inter_jurisdiction,
        }
    }

    /// Route between two known codes, no override.
    pub fn between(origin: JurisdictionCode, destination: JurisdictionCode) -> Self {
        Self::new(Some(origin), Some(destination), false)
    }

    /// Inter-jurisdiction if forced, or if both codes are present and differ.
    /// A missing code on either side is treated as intra-jurisdiction.
    pub fn is_inter_jurisdiction(&self) -> bool {
        if self.force_inter_jurisdiction {
            return true;
        }
        match (&self.origin, &self.destination) {
            (Some(origin), Some(destination)) => origin != destination,
            _ => false,
        }
    }

    /// Fill in the origin from a default when the route does not name one.
    pub fn with_default_origin(mut self, default: Option<&JurisdictionCode>) -> Self {
        if self.origin.is_none() {
            self.origin = default.cloned();
        }
        self
    }
}
