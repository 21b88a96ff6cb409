use tokio::sync::mpsc;
use ticket_type_rep::Party;
use tracing::debug;

use crate::messages::{FlowKind, FlowMessage};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no party named '{0}' is reachable on the network")]
    UnknownParty(String),
    #[error("session with {counterparty} closed")]
    Closed { counterparty: String },
    #[error("expected {expected} from {counterparty}, received {received}")]
    Unexpected {
        counterparty: String,
        expected: &'static str,
        received: &'static str,
    },
}

/// One end of an ordered, reliable conversation with a single counterparty.
///
/// Sessions are created in pairs by [`FlowSession::pair`]; whatever one end
/// sends, the other end receives in the same order.
#[derive(Debug)]
pub struct FlowSession {
    counterparty: Party,
    flow: FlowKind,
    outbound: mpsc::UnboundedSender<FlowMessage>,
    inbound: mpsc::UnboundedReceiver<FlowMessage>,
}

impl FlowSession {
    /// Returns `(initiator_end, responder_end)`.
    pub fn pair(initiator: Party, responder: Party, flow: FlowKind) -> (FlowSession, FlowSession) {
        let (to_responder, from_initiator) = mpsc::unbounded_channel();
        let (to_initiator, from_responder) = mpsc::unbounded_channel();
        let initiator_end = FlowSession {
            counterparty: responder,
            flow,
            outbound: to_responder,
            inbound: from_responder,
        };
        let responder_end = FlowSession {
            counterparty: initiator,
            flow,
            outbound: to_initiator,
            inbound: from_initiator,
        };
        (initiator_end, responder_end)
    }

    pub fn counterparty(&self) -> &Party {
        &self.counterparty
    }

    pub fn flow(&self) -> FlowKind {
        self.flow
    }

    pub fn send(&self, message: FlowMessage) -> Result<(), SessionError> {
        debug!(
            flow = %self.flow,
            to = %self.counterparty,
            message = message.label(),
            "Sending"
        );
        self.outbound.send(message).map_err(|_| self.closed())
    }

    /// Suspends until the counterparty's next message arrives.
    pub async fn receive(&mut self) -> Result<FlowMessage, SessionError> {
        let message = self.inbound.recv().await.ok_or_else(|| self.closed())?;
        debug!(
            flow = %self.flow,
            from = %self.counterparty,
            message = message.label(),
            "Received"
        );
        Ok(message)
    }

    pub fn unexpected(&self, expected: &'static str, received: &FlowMessage) -> SessionError {
        SessionError::Unexpected {
            counterparty: self.counterparty.to_string(),
            expected,
            received: received.label(),
        }
    }

    fn closed(&self) -> SessionError {
        SessionError::Closed {
            counterparty: self.counterparty.to_string(),
        }
    }
}
