use ledger_api::{FlowSession, SignedTransaction, StateAndRef, TransactionBuilder};
use sandbox::{Network, Notary};
use std::sync::Arc;
use ticket_contract::{Command, TicketCommand};
use ticket_type_rep::TicketState;
use ticket_type_rep::section::MID;
use tokio::sync::{Mutex, mpsc};

use crate::config::ResponderPolicy;
use crate::vault::InMemoryVault;
use crate::{FlowError, Node, NodeServices};

/// A notary and network shared by the nodes of one test.
pub struct TestNet {
    pub notary: Arc<Notary>,
    pub network: Arc<Network>,
    inboxes: Mutex<Vec<mpsc::UnboundedReceiver<FlowSession>>>,
}

impl TestNet {
    pub fn new() -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        TestNet {
            notary: Arc::new(Notary::new()),
            network: Arc::new(Network::new()),
            inboxes: Mutex::new(Vec::new()),
        }
    }

    /// A registered node whose inbound sessions are held but never served.
    pub async fn node(&self, name: &str) -> Node {
        let services = NodeServices {
            vault: Arc::new(InMemoryVault::new()),
            finality: self.notary.clone(),
            messaging: self.network.clone(),
            identities: self.network.clone(),
        };
        let node = Node::generate(name, services, ResponderPolicy::default());
        let inbox = self
            .network
            .register(node.our_identity().clone())
            .await
            .expect("test party names are unique");
        self.inboxes.lock().await.push(inbox);
        node
    }
}

/// Issues a ticket from `issuer` to `holder` through the notary and returns an
/// exit of it signed by the issuer only.
pub async fn exit_proposal(issuer: &Node, holder: &Node) -> Result<SignedTransaction, FlowError> {
    let ticket = TicketState::new(
        issuer.our_identity().clone(),
        holder.our_identity().clone(),
        MID,
    );
    let issue = TransactionBuilder::new()
        .add_command(Command::new(TicketCommand::Buy, [issuer.our_key()]))
        .add_output_state(ticket.clone())
        .to_wire_transaction()?;
    let issued = issuer.sign_initial_transaction(issue);
    issuer.finality().notarise_and_record(&issued).await?;
    for node in [issuer, holder] {
        node.vault().record_transaction(&issued).await;
    }

    let exit = TransactionBuilder::new()
        .add_command(Command::new(TicketCommand::Exit, ticket.participant_keys()))
        .add_input_state(StateAndRef {
            state: ticket,
            reference: issued.tx().output_ref(0),
        })
        .to_wire_transaction()?;
    Ok(issuer.sign_initial_transaction(exit))
}
