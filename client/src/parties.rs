use ledger_api::IdentityService;
use ticket_type_rep::Party;

use crate::FlowError;

/// Lists the parties known to the network, optionally keeping only those whose
/// name contains `filter`.
pub async fn get_parties(identities: &dyn IdentityService, filter: Option<&str>) -> Vec<Party> {
    identities
        .all_parties()
        .await
        .into_iter()
        .filter(|party| filter.map_or(true, |f| party.name().contains(f)))
        .collect()
}

/// Resolves a display name to the party registered under it.
pub async fn resolve_party(identities: &dyn IdentityService, name: &str) -> Result<Party, FlowError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(FlowError::Input("party name must not be empty".to_string()));
    }
    identities
        .well_known_party_from_name(name)
        .await
        .ok_or_else(|| FlowError::Input(format!("no party named {name:?} is known")))
}
