use chrono::{DateTime, Utc};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fmt;
use ticket_contract::{Command, TicketCommand, VerificationError};
use ticket_type_rep::{KeyError, Party, PublicKey, TicketState};
use uuid::Uuid;

/// SHA-256 of a [`WireTransaction`]'s canonical encoding.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TransactionId([u8; 32]);

impl TransactionId {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransactionId({}..)", hex::encode(&self.0[..6]))
    }
}

/// Points at one output of a notarised transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StateRef {
    pub tx_id: TransactionId,
    pub index: u32,
}

impl fmt::Display for StateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.tx_id, self.index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateAndRef {
    pub state: TicketState,
    pub reference: StateRef,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BuilderError {
    #[error("a transaction needs a command")]
    NoCommand,
    #[error("a transaction takes exactly one command, found {0}")]
    MultipleCommands(usize),
}

/// Assembles a [`WireTransaction`] one piece at a time.
#[derive(Debug, Clone, Default)]
pub struct TransactionBuilder {
    inputs: Vec<StateAndRef>,
    outputs: Vec<TicketState>,
    commands: Vec<Command>,
}

impl TransactionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_command(mut self, command: Command) -> Self {
        self.commands.push(command);
        self
    }

    pub fn add_input_state(mut self, input: StateAndRef) -> Self {
        self.inputs.push(input);
        self
    }

    pub fn add_output_state(mut self, output: TicketState) -> Self {
        self.outputs.push(output);
        self
    }

    pub fn to_wire_transaction(&self) -> Result<WireTransaction, BuilderError> {
        let command = match self.commands.as_slice() {
            [] => return Err(BuilderError::NoCommand),
            [command] => command.clone(),
            commands => return Err(BuilderError::MultipleCommands(commands.len())),
        };
        Ok(WireTransaction {
            inputs: self.inputs.clone(),
            outputs: self.outputs.clone(),
            command,
            nonce: Uuid::new_v4(),
            created_at: Utc::now(),
        })
    }
}

/// An unsigned proposal: which versions it consumes, which it creates, and
/// the one command that justifies it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireTransaction {
    pub inputs: Vec<StateAndRef>,
    pub outputs: Vec<TicketState>,
    pub command: Command,
    pub nonce: Uuid,
    pub created_at: DateTime<Utc>,
}

impl WireTransaction {
    /// Hashes a fixed field-by-field binary layout rather than any serde
    /// rendering: counts and integers little-endian, strings length-prefixed.
    pub fn id(&self) -> TransactionId {
        let mut hasher = Sha256::new();
        hasher.update((self.inputs.len() as u64).to_le_bytes());
        for input in &self.inputs {
            hasher.update(input.reference.tx_id.as_bytes());
            hasher.update(input.reference.index.to_le_bytes());
            hash_state(&mut hasher, &input.state);
        }
        hasher.update((self.outputs.len() as u64).to_le_bytes());
        for output in &self.outputs {
            hash_state(&mut hasher, output);
        }
        hash_str(&mut hasher, &self.command.value.to_string());
        hasher.update((self.command.signers.len() as u64).to_le_bytes());
        for signer in &self.command.signers {
            hasher.update(signer.as_bytes());
        }
        hasher.update(self.nonce.as_bytes());
        hasher.update(self.created_at.timestamp_micros().to_le_bytes());
        TransactionId(hasher.finalize().into())
    }

    pub fn input_states(&self) -> Vec<TicketState> {
        self.inputs.iter().map(|input| input.state.clone()).collect()
    }

    pub fn command_kind(&self) -> TicketCommand {
        self.command.value
    }

    pub fn required_signers(&self) -> &BTreeSet<PublicKey> {
        &self.command.signers
    }

    /// Runs the ticket contract over this transaction.
    pub fn verify(&self) -> Result<(), VerificationError> {
        ticket_contract::verify(
            self.command.value,
            &self.input_states(),
            &self.outputs,
            &self.command.signers,
        )
    }

    /// Every party with a stake in the inputs or outputs, without repeats.
    pub fn participants(&self) -> Vec<Party> {
        let mut participants: Vec<Party> = Vec::new();
        let states = self.inputs.iter().map(|i| &i.state).chain(self.outputs.iter());
        for party in states.flat_map(TicketState::participants) {
            if !participants.contains(&party) {
                participants.push(party);
            }
        }
        participants
    }

    pub fn output_ref(&self, index: u32) -> StateRef {
        StateRef {
            tx_id: self.id(),
            index,
        }
    }
}

fn hash_str(hasher: &mut Sha256, value: &str) {
    hasher.update((value.len() as u64).to_le_bytes());
    hasher.update(value.as_bytes());
}

fn hash_party(hasher: &mut Sha256, party: &Party) {
    hash_str(hasher, party.name());
    hasher.update(party.owning_key().as_bytes());
}

fn hash_state(hasher: &mut Sha256, state: &TicketState) {
    hash_party(hasher, &state.issuer);
    hash_party(hasher, &state.holder);
    hasher.update(state.section.to_le_bytes());
    match state.linear_id.external_id() {
        Some(external_id) => {
            hasher.update([1u8]);
            hash_str(hasher, external_id);
        }
        None => hasher.update([0u8]),
    }
    hasher.update(state.linear_id.id().as_bytes());
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("invalid signature by {by}")]
    Invalid { by: PublicKey },
    #[error("signature by {by}, which is not a required signer")]
    UnexpectedSigner { by: PublicKey },
    #[error("missing signatures from {missing:?}")]
    Missing { missing: Vec<PublicKey> },
    #[error(transparent)]
    Key(#[from] KeyError),
}

/// An ed25519 signature over a transaction id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSignature {
    pub by: PublicKey,
    pub signature: Signature,
}

impl TransactionSignature {
    pub fn sign(id: &TransactionId, key: &SigningKey) -> Self {
        TransactionSignature {
            by: PublicKey::from(&key.verifying_key()),
            signature: key.sign(id.as_bytes()),
        }
    }

    pub fn verify(&self, id: &TransactionId) -> Result<(), SignatureError> {
        self.by
            .to_verifying_key()?
            .verify(id.as_bytes(), &self.signature)
            .map_err(|_| SignatureError::Invalid { by: self.by })
    }
}

/// A [`WireTransaction`] plus the signatures collected for it so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    tx: WireTransaction,
    sigs: Vec<TransactionSignature>,
}

impl SignedTransaction {
    pub fn new(tx: WireTransaction, sigs: Vec<TransactionSignature>) -> Self {
        SignedTransaction { tx, sigs }
    }

    pub fn id(&self) -> TransactionId {
        self.tx.id()
    }

    pub fn tx(&self) -> &WireTransaction {
        &self.tx
    }

    pub fn sigs(&self) -> &[TransactionSignature] {
        &self.sigs
    }

    /// Adds `sig`, replacing any earlier signature by the same key.
    pub fn with_additional_signature(mut self, sig: TransactionSignature) -> Self {
        self.sigs.retain(|existing| existing.by != sig.by);
        self.sigs.push(sig);
        self
    }

    pub fn verify(&self) -> Result<(), VerificationError> {
        self.tx.verify()
    }

    pub fn signed_by(&self) -> BTreeSet<PublicKey> {
        self.sigs.iter().map(|sig| sig.by).collect()
    }

    pub fn missing_signers(&self) -> BTreeSet<PublicKey> {
        let signed = self.signed_by();
        self.tx
            .required_signers()
            .iter()
            .filter(|key| !signed.contains(key))
            .copied()
            .collect()
    }

    /// Checks every attached signature, then that nobody outside
    /// `allowed_to_be_missing` still has to sign.
    pub fn verify_signatures_except(
        &self,
        allowed_to_be_missing: &BTreeSet<PublicKey>,
    ) -> Result<(), SignatureError> {
        let id = self.id();
        let required = self.tx.required_signers();
        for sig in &self.sigs {
            if !required.contains(&sig.by) {
                return Err(SignatureError::UnexpectedSigner { by: sig.by });
            }
            sig.verify(&id)?;
        }
        let missing: Vec<PublicKey> = self
            .missing_signers()
            .into_iter()
            .filter(|key| !allowed_to_be_missing.contains(key))
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(SignatureError::Missing { missing })
        }
    }

    pub fn verify_required_signatures(&self) -> Result<(), SignatureError> {
        self.verify_signatures_except(&BTreeSet::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;
    use ticket_type_rep::section::MID;

    struct TestSigner {
        key: SigningKey,
        party: Party,
    }

    fn signer(name: &str) -> TestSigner {
        let key = SigningKey::generate(&mut OsRng);
        let party = Party::new(name, PublicKey::from(&key.verifying_key()));
        TestSigner { key, party }
    }

    fn exit_tx(alice: &Party, bob: &Party) -> WireTransaction {
        let ticket = TicketState::new(alice.clone(), bob.clone(), MID);
        let issued = TransactionBuilder::new()
            .add_command(Command::new(TicketCommand::Buy, [alice.owning_key()]))
            .add_output_state(ticket.clone())
            .to_wire_transaction()
            .unwrap();
        TransactionBuilder::new()
            .add_command(Command::new(
                TicketCommand::Exit,
                ticket.participant_keys(),
            ))
            .add_input_state(StateAndRef {
                state: ticket,
                reference: issued.output_ref(0),
            })
            .to_wire_transaction()
            .unwrap()
    }

    #[test]
    fn test_builder_requires_single_command() {
        let alice = signer("Alice");
        assert_eq!(
            TransactionBuilder::new().to_wire_transaction(),
            Err(BuilderError::NoCommand)
        );
        let command = Command::new(TicketCommand::Buy, [alice.party.owning_key()]);
        let result = TransactionBuilder::new()
            .add_command(command.clone())
            .add_command(command)
            .to_wire_transaction();
        assert_eq!(result, Err(BuilderError::MultipleCommands(2)));
    }

    #[test]
    fn test_id_is_stable_and_content_addressed() {
        let alice = signer("Alice");
        let bob = signer("Bob");
        let tx = exit_tx(&alice.party, &bob.party);
        assert_eq!(tx.id(), tx.clone().id());

        let mut altered = tx.clone();
        altered.inputs[0].state.section = 50;
        assert_ne!(altered.id(), tx.id());

        let mut later = tx.clone();
        later.created_at += chrono::Duration::microseconds(1);
        assert_ne!(later.id(), tx.id());
        let mut renonced = tx.clone();
        renonced.nonce = Uuid::new_v4();
        assert_ne!(renonced.id(), tx.id());

        let json = serde_json::to_string(&tx).unwrap();
        let decoded: WireTransaction = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.id(), tx.id());
        let pretty = serde_json::to_string_pretty(&tx).unwrap();
        let decoded: WireTransaction = serde_json::from_str(&pretty).unwrap();
        assert_eq!(decoded.id(), tx.id());
    }

    #[test]
    fn test_signatures_collect_until_complete() {
        let alice = signer("Alice");
        let bob = signer("Bob");
        let tx = exit_tx(&alice.party, &bob.party);
        let id = tx.id();

        let partial = SignedTransaction::new(tx, vec![TransactionSignature::sign(&id, &alice.key)]);
        assert_eq!(
            partial.verify_required_signatures(),
            Err(SignatureError::Missing {
                missing: vec![bob.party.owning_key()]
            })
        );
        let allowed = BTreeSet::from([bob.party.owning_key()]);
        assert_eq!(partial.verify_signatures_except(&allowed), Ok(()));

        let full = partial.with_additional_signature(TransactionSignature::sign(&id, &bob.key));
        assert_eq!(full.verify_required_signatures(), Ok(()));
        assert!(full.missing_signers().is_empty());
        assert_eq!(full.verify(), Ok(()));
    }

    #[test]
    fn test_rejects_signature_from_outsider() {
        let alice = signer("Alice");
        let bob = signer("Bob");
        let mallory = signer("Mallory");
        let tx = exit_tx(&alice.party, &bob.party);
        let id = tx.id();
        let stx = SignedTransaction::new(tx, vec![TransactionSignature::sign(&id, &mallory.key)]);
        assert_eq!(
            stx.verify_required_signatures(),
            Err(SignatureError::UnexpectedSigner {
                by: mallory.party.owning_key()
            })
        );
    }

    #[test]
    fn test_rejects_signature_over_other_transaction() {
        let alice = signer("Alice");
        let bob = signer("Bob");
        let tx = exit_tx(&alice.party, &bob.party);
        let other = exit_tx(&alice.party, &bob.party);
        let forged = TransactionSignature::sign(&other.id(), &alice.key);
        let stx = SignedTransaction::new(tx, vec![forged]);
        assert_eq!(
            stx.verify_required_signatures(),
            Err(SignatureError::Invalid {
                by: alice.party.owning_key()
            })
        );
    }

    #[test]
    fn test_participants_are_deduplicated() {
        let alice = signer("Alice");
        let bob = signer("Bob");
        let tx = exit_tx(&alice.party, &bob.party);
        assert_eq!(tx.participants(), vec![alice.party, bob.party]);
    }
}
