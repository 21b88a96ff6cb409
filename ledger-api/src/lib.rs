//! Wire-level types exchanged between ticket nodes, and the services a node
//! consumes from the network it runs on.

pub mod messages;
pub mod services;
pub mod session;
pub mod transaction;

pub use messages::{FlowKind, FlowMessage};
pub use services::{
    FinalityError, FinalityService, IdentityService, SessionMessaging, StateStatus, VaultService,
};
pub use session::{FlowSession, SessionError};
pub use transaction::{
    BuilderError, SignatureError, SignedTransaction, StateAndRef, StateRef, TransactionBuilder,
    TransactionId, TransactionSignature, WireTransaction,
};
