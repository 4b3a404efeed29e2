use serde::{Deserialize, Serialize};

use crate::core::types::{AllianceId, PlayerId, Tick};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alliance {
    pub id: AllianceId,
    pub requestor: PlayerId,
    pub recipient: PlayerId,
    pub created_at: Tick,
}

impl Alliance {
    pub fn involves(&self, player: PlayerId) -> bool {
        self.requestor == player || self.recipient == player
    }

    pub fn other(&self, player: PlayerId) -> PlayerId {
        if self.requestor == player {
            self.recipient
        } else {
            self.requestor
        }
    }

    pub fn is_between(&self, a: PlayerId, b: PlayerId) -> bool {
        (self.requestor == a && self.recipient == b) || (self.requestor == b && self.recipient == a)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllianceRequest {
    pub requestor: PlayerId,
    pub recipient: PlayerId,
    pub created_at: Tick,
}
