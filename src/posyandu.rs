//! Service-unit assignment
//!
//! Children are registered to a posyandu (neighborhood health post) by
//! their RT/RW administrative units. The map below is the fixed assignment
//! for the served village; combinations outside it are an error, never a
//! default unit.

use serde::{Deserialize, Serialize};

use crate::error::GrowthError;

/// Posyandu units serving the village
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceUnit {
    Larasati1,
    Larasati2,
    Larasati3,
    Larasati4,
    Larasati5,
}

impl ServiceUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceUnit::Larasati1 => "Larasati 1",
            ServiceUnit::Larasati2 => "Larasati 2",
            ServiceUnit::Larasati3 => "Larasati 3",
            ServiceUnit::Larasati4 => "Larasati 4",
            ServiceUnit::Larasati5 => "Larasati 5",
        }
    }
}

impl std::fmt::Display for ServiceUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Map an RT/RW pair to its service unit.
pub fn service_unit_for(rt: u8, rw: u8) -> Result<ServiceUnit, GrowthError> {
    match (rw, rt) {
        (6, 1..=3) => Ok(ServiceUnit::Larasati1),
        (4 | 5, 1 | 2) => Ok(ServiceUnit::Larasati2),
        (2 | 3, 1..=3) => Ok(ServiceUnit::Larasati3),
        (1, 1..=3) => Ok(ServiceUnit::Larasati4),
        (7, 1..=3) => Ok(ServiceUnit::Larasati5),
        _ => Err(GrowthError::UnmappedServiceArea { rt, rw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_assignment_table() {
        assert_eq!(service_unit_for(1, 6).unwrap(), ServiceUnit::Larasati1);
        assert_eq!(service_unit_for(3, 6).unwrap(), ServiceUnit::Larasati1);
        assert_eq!(service_unit_for(2, 4).unwrap(), ServiceUnit::Larasati2);
        assert_eq!(service_unit_for(1, 5).unwrap(), ServiceUnit::Larasati2);
        assert_eq!(service_unit_for(3, 2).unwrap(), ServiceUnit::Larasati3);
        assert_eq!(service_unit_for(1, 3).unwrap(), ServiceUnit::Larasati3);
        assert_eq!(service_unit_for(2, 1).unwrap(), ServiceUnit::Larasati4);
        assert_eq!(service_unit_for(3, 7).unwrap(), ServiceUnit::Larasati5);
    }

    #[test]
    fn test_unmapped_combinations_fail() {
        // RT 3 exists in RW 6 but not RW 4.
        assert!(matches!(
            service_unit_for(3, 4),
            Err(GrowthError::UnmappedServiceArea { rt: 3, rw: 4 })
        ));
        assert!(matches!(
            service_unit_for(4, 6),
            Err(GrowthError::UnmappedServiceArea { .. })
        ));
        assert!(matches!(
            service_unit_for(1, 8),
            Err(GrowthError::UnmappedServiceArea { .. })
        ));
        assert!(matches!(
            service_unit_for(0, 1),
            Err(GrowthError::UnmappedServiceArea { .. })
        ));
    }

    #[test]
    fn test_display_names() {
        assert_eq!(ServiceUnit::Larasati1.to_string(), "Larasati 1");
        assert_eq!(ServiceUnit::Larasati5.to_string(), "Larasati 5");
    }
}
