//! # Region Taxonomy — Single Source of Truth
//!
//! Defines the `Region` enum covering the receiving agencies the assembler
//! can build sequences for. This is the ONE definition used across the
//! entire stack; every `match` on `Region` must be exhaustive, so adding an
//! agency forces every consumer to handle it at compile time.
//!
//! Which modules a region mandates is *configuration*, not code — see the
//! rule table in `ectd-region`. This enum only fixes the closed set of
//! region codes accepted at the boundary.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::UnknownRegion;

/// A receiving regulatory agency for eCTD sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Region {
    /// U.S. Food and Drug Administration.
    Fda,
    /// European Medicines Agency.
    Ema,
    /// Pharmaceuticals and Medical Devices Agency (Japan).
    Pmda,
}

/// Total number of configured regions. Used for exhaustiveness assertions.
pub const REGION_COUNT: usize = 3;

impl Region {
    /// Returns all regions in canonical order.
    pub fn all_regions() -> &'static [Region] {
        &[Self::Fda, Self::Ema, Self::Pmda]
    }

    /// Returns the uppercase region code, matching the serde format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fda => "FDA",
            Self::Ema => "EMA",
            Self::Pmda => "PMDA",
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = UnknownRegion;

    /// Parse a region from its code.
    ///
    /// An exact uppercase match is tried first; one case-insensitive retry
    /// is attempted before failing with [`UnknownRegion`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let exact = match s {
            "FDA" => Some(Self::Fda),
            "EMA" => Some(Self::Ema),
            "PMDA" => Some(Self::Pmda),
            _ => None,
        };
        if let Some(region) = exact {
            return Ok(region);
        }
        match s.trim().to_ascii_uppercase().as_str() {
            "FDA" => Ok(Self::Fda),
            "EMA" => Ok(Self::Ema),
            "PMDA" => Ok(Self::Pmda),
            _ => Err(UnknownRegion(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_regions_count() {
        assert_eq!(Region::all_regions().len(), REGION_COUNT);
    }

    #[test]
    fn test_as_str_roundtrip() {
        for region in Region::all_regions() {
            let parsed: Region = region.as_str().parse().unwrap();
            assert_eq!(*region, parsed);
        }
    }

    #[test]
    fn test_case_insensitive_retry() {
        assert_eq!("fda".parse::<Region>().unwrap(), Region::Fda);
        assert_eq!("Ema".parse::<Region>().unwrap(), Region::Ema);
        assert_eq!(" pmda ".parse::<Region>().unwrap(), Region::Pmda);
    }

    #[test]
    fn test_unknown_region_rejected() {
        let err = "HC-SC".parse::<Region>().unwrap_err();
        assert_eq!(err, UnknownRegion("HC-SC".to_string()));
        assert!("".parse::<Region>().is_err());
    }

    #[test]
    fn test_serde_format_matches_as_str() {
        for region in Region::all_regions() {
            let json = serde_json::to_string(region).unwrap();
            assert_eq!(json, format!("\"{}\"", region.as_str()));
            let parsed: Region = serde_json::from_str(&json).unwrap();
            assert_eq!(*region, parsed);
        }
    }

    #[test]
    fn test_display_matches_as_str() {
        for region in Region::all_regions() {
            assert_eq!(region.to_string(), region.as_str());
        }
    }
}
