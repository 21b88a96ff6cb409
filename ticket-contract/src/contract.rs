//! Contract verification for ticket transactions.
//!
//! `verify` is a pure function of its arguments. Arity is checked first and
//! stops verification; after that every rule is evaluated in a fixed order,
//! the first broken one is reported as the error's rule and the rest ride
//! along in `also_violated`.

use std::collections::BTreeSet;
use ticket_type_rep::{PublicKey, TicketState, section};

use crate::command::TicketCommand;
use crate::error::{Rule, VerificationError};

pub fn verify(
    command: TicketCommand,
    inputs: &[TicketState],
    outputs: &[TicketState],
    signers: &BTreeSet<PublicKey>,
) -> Result<(), VerificationError> {
    let mut check = Check::new(command);
    match command {
        TicketCommand::Buy => verify_buy(&mut check, inputs, outputs, signers)?,
        TicketCommand::Transfer => verify_transfer(&mut check, inputs, outputs, signers)?,
        TicketCommand::Exit => verify_exit(&mut check, inputs, outputs, signers)?,
    }
    check.finish()
}

fn verify_buy(
    check: &mut Check,
    inputs: &[TicketState],
    outputs: &[TicketState],
    signers: &BTreeSet<PublicKey>,
) -> Result<(), VerificationError> {
    check.require(inputs.is_empty(), || Rule::InputsNotAllowed)?;
    check.require(outputs.len() == 1, || Rule::OutputCount {
        expected: 1,
        actual: outputs.len(),
    })?;

    let output = &outputs[0];
    check.rule(output.issuer != output.holder, || Rule::IssuerEqualsHolder);
    check.rule(section::is_allowed(output.section), || {
        Rule::SectionNotAllowed {
            section: output.section,
        }
    });
    check.signed_by(signers, [output.issuer.owning_key()]);
    Ok(())
}

fn verify_transfer(
    check: &mut Check,
    inputs: &[TicketState],
    outputs: &[TicketState],
    signers: &BTreeSet<PublicKey>,
) -> Result<(), VerificationError> {
    check.require(inputs.len() == 1, || Rule::InputCount {
        expected: 1,
        actual: inputs.len(),
    })?;
    check.require(outputs.len() == 1, || Rule::OutputCount {
        expected: 1,
        actual: outputs.len(),
    })?;

    let input = &inputs[0];
    let output = &outputs[0];
    // Literal rule: the new holder must be the input's issuer.
    check.rule(input.issuer == output.holder, || Rule::IssuerNotNewHolder);
    check.rule(input.holder != output.holder, || Rule::HolderUnchanged);
    check.rule(input.section == output.section, || {
        Rule::SectionNotConserved {
            input: input.section,
            output: output.section,
        }
    });
    check.rule(input.linear_id == output.linear_id, || {
        Rule::LinearIdNotConserved
    });
    check.signed_by(
        signers,
        [input.holder.owning_key(), output.holder.owning_key()],
    );
    Ok(())
}

fn verify_exit(
    check: &mut Check,
    inputs: &[TicketState],
    outputs: &[TicketState],
    signers: &BTreeSet<PublicKey>,
) -> Result<(), VerificationError> {
    check.require(inputs.len() == 1, || Rule::InputCount {
        expected: 1,
        actual: inputs.len(),
    })?;
    check.require(outputs.is_empty(), || Rule::OutputsNotAllowed)?;
    check.signed_by(signers, inputs[0].participant_keys());
    Ok(())
}

struct Check {
    command: TicketCommand,
    broken: Vec<Rule>,
}

impl Check {
    fn new(command: TicketCommand) -> Self {
        Check {
            command,
            broken: Vec::new(),
        }
    }

    /// A rule the remaining checks depend on: fails straight away.
    fn require(&mut self, holds: bool, rule: impl FnOnce() -> Rule) -> Result<(), VerificationError> {
        self.rule(holds, rule);
        if holds { Ok(()) } else { self.finish() }
    }

    fn rule(&mut self, holds: bool, rule: impl FnOnce() -> Rule) {
        if !holds {
            self.broken.push(rule());
        }
    }

    fn signed_by(&mut self, signers: &BTreeSet<PublicKey>, required: impl IntoIterator<Item = PublicKey>) {
        let missing: Vec<PublicKey> = required
            .into_iter()
            .filter(|key| !signers.contains(key))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        self.rule(missing.is_empty(), || Rule::MissingSigners { missing });
    }

    fn finish(&mut self) -> Result<(), VerificationError> {
        let mut broken = std::mem::take(&mut self.broken).into_iter();
        match broken.next() {
            None => Ok(()),
            Some(rule) => Err(VerificationError {
                command: self.command,
                rule,
                also_violated: broken.collect(),
            }),
        }
    }
}
