/***************************************/
/*           Local modules             */
/***************************************/
use crate::config::AccessConfig;
use crate::shared::{ArrivalOutcome, Floor, SecurityClearance};

/**
 * Floor access table.
 *
 * Stores the minimum clearance needed to exit at each floor. A clearance is
 * allowed at a floor when it is at least that minimum, so a higher clearance
 * always has every permission of a lower one.
 *
 * The standard table:
 *
 * | Floor     | Allowed clearances     |
 * |-----------|------------------------|
 * | Ground    | any                    |
 * | Mezzanine | Secret, TopSecret      |
 * | Tier1     | TopSecret              |
 * | Tier2     | TopSecret              |
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessPolicy {
    minimum: [SecurityClearance; Floor::COUNT],
}

/***************************************/
/*             Public API              */
/***************************************/
impl AccessPolicy {
    pub const fn new(minimum: [SecurityClearance; Floor::COUNT]) -> AccessPolicy {
        AccessPolicy { minimum }
    }

    pub const fn standard() -> AccessPolicy {
        AccessPolicy::new([
            SecurityClearance::Confidential,
            SecurityClearance::Secret,
            SecurityClearance::TopSecret,
            SecurityClearance::TopSecret,
        ])
    }

    pub fn can_access(&self, clearance: SecurityClearance, floor: Floor) -> bool {
        clearance >= self.minimum_for(floor)
    }

    pub fn evaluate(&self, clearance: SecurityClearance, floor: Floor) -> ArrivalOutcome {
        ArrivalOutcome::from(self.can_access(clearance, floor))
    }

    pub fn minimum_for(&self, floor: Floor) -> SecurityClearance {
        self.minimum[floor.index() as usize]
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        AccessPolicy::standard()
    }
}

impl From<&AccessConfig> for AccessPolicy {
    fn from(config: &AccessConfig) -> Self {
        AccessPolicy::new([config.ground, config.mezzanine, config.tier1, config.tier2])
    }
}
