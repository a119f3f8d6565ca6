//! ASPRS point classification codes used by the pipeline

/// Bare ground
pub const GROUND: u8 = 2;
/// Low vegetation (grass, hedges, shrubs)
pub const LOW_VEGETATION: u8 = 3;
/// Medium vegetation
pub const MEDIUM_VEGETATION: u8 = 4;
/// Tall vegetation (trees)
pub const HIGH_VEGETATION: u8 = 5;
/// Buildings
pub const BUILDING: u8 = 6;

pub struct ClassInfo {
    pub id: u8,
    pub name: &'static str,
}

pub const CLASS_MAP: &[ClassInfo] = &[
    ClassInfo { id: 0, name: "never classified" },
    ClassInfo { id: 1, name: "unclassified" },
    ClassInfo { id: GROUND, name: "ground" },
    ClassInfo { id: LOW_VEGETATION, name: "vegetation - low" },
    ClassInfo { id: MEDIUM_VEGETATION, name: "vegetation - medium" },
    ClassInfo { id: HIGH_VEGETATION, name: "vegetation - high" },
    ClassInfo { id: BUILDING, name: "buildings" },
    ClassInfo { id: 9, name: "water" },
];

pub fn class_name(id: u8) -> &'static str {
    CLASS_MAP
        .iter()
        .find(|c| c.id == id)
        .map_or("unknown", |c| c.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_name() {
        assert_eq!(class_name(HIGH_VEGETATION), "vegetation - high");
        assert_eq!(class_name(200), "unknown");
    }
}
