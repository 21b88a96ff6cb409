use serde::{Deserialize, Serialize};
use ticket_type_rep::section::MID;

/// What a node agrees to countersign when it is on the responding side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponderPolicy {
    /// Section a transferred ticket must have for this node to sign.
    #[serde(default = "default_transfer_required_section")]
    pub transfer_required_section: i32,
    /// Whether this node countersigns the retirement of its tickets.
    #[serde(default = "default_accept_exit")]
    pub accept_exit: bool,
}

fn default_transfer_required_section() -> i32 {
    MID
}

fn default_accept_exit() -> bool {
    true
}

impl Default for ResponderPolicy {
    fn default() -> Self {
        ResponderPolicy {
            transfer_required_section: default_transfer_required_section(),
            accept_exit: default_accept_exit(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeConfig {
    pub name: String,
    #[serde(default)]
    pub responder: ResponderPolicy,
}
