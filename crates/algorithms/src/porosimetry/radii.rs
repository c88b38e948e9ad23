//! Candidate disk radii for porosimetry

use poromet_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Strictly increasing, non-empty set of positive pixel radii
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u32>", into = "Vec<u32>")]
pub struct RadiusSet {
    radii: Vec<u32>,
}

impl RadiusSet {
    /// Every integer radius from 1 through `max_radius`
    pub fn up_to(max_radius: u32) -> Result<Self> {
        if max_radius == 0 {
            return Err(Error::invalid_parameter(
                "max_radius",
                max_radius,
                "radius bound must be at least 1 pixel",
            ));
        }
        Ok(Self {
            radii: (1..=max_radius).collect(),
        })
    }

    /// Validate an explicit list of radii
    ///
    /// The list must be non-empty, start at 1 and be strictly increasing.
    pub fn new(radii: Vec<u32>) -> Result<Self> {
        if radii.is_empty() {
            return Err(Error::invalid_parameter(
                "radii",
                "[]",
                "at least one radius is required",
            ));
        }
        if radii[0] != 1 {
            return Err(Error::invalid_parameter(
                "radii",
                format!("{:?}", radii),
                "smallest radius must be 1",
            ));
        }
        if radii.windows(2).any(|w| w[0] >= w[1]) {
            return Err(Error::invalid_parameter(
                "radii",
                format!("{:?}", radii),
                "radii must be strictly increasing",
            ));
        }
        Ok(Self { radii })
    }

    /// Radii in increasing order
    pub fn as_slice(&self) -> &[u32] {
        &self.radii
    }

    /// Number of radii
    pub fn len(&self) -> usize {
        self.radii.len()
    }

    /// Never true for a constructed set
    pub fn is_empty(&self) -> bool {
        self.radii.is_empty()
    }

    /// Largest radius
    pub fn max(&self) -> u32 {
        self.radii.last().copied().unwrap_or(0)
    }

    /// Radii from largest to smallest
    pub fn descending(&self) -> impl Iterator<Item = u32> + '_ {
        self.radii.iter().rev().copied()
    }
}

impl TryFrom<Vec<u32>> for RadiusSet {
    type Error = Error;

    fn try_from(radii: Vec<u32>) -> Result<Self> {
        RadiusSet::new(radii)
    }
}

impl From<RadiusSet> for Vec<u32> {
    fn from(set: RadiusSet) -> Self {
        set.radii
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_up_to() {
        let set = RadiusSet::up_to(4).unwrap();
        assert_eq!(set.as_slice(), &[1, 2, 3, 4]);
        assert_eq!(set.max(), 4);
        assert_eq!(set.descending().collect::<Vec<_>>(), vec![4, 3, 2, 1]);
        assert!(RadiusSet::up_to(0).is_err());
    }

    #[test]
    fn test_validation() {
        assert!(RadiusSet::new(vec![]).is_err());
        assert!(RadiusSet::new(vec![0, 1]).is_err());
        assert!(RadiusSet::new(vec![2, 3]).is_err());
        assert!(RadiusSet::new(vec![1, 3, 3]).is_err());
        assert!(RadiusSet::new(vec![2, 1]).is_err());
        assert!(RadiusSet::new(vec![1, 2, 5, 9]).is_ok());
    }

    #[test]
    fn test_serde_validates() {
        let set: RadiusSet = serde_json::from_str("[1, 2, 4]").unwrap();
        assert_eq!(set.len(), 3);
        assert!(serde_json::from_str::<RadiusSet>("[3, 2]").is_err());
    }
}
