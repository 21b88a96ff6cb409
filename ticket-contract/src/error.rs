use std::fmt;
use ticket_type_rep::PublicKey;

use crate::command::TicketCommand;

/// The contract rule a transaction broke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    InputsNotAllowed,
    OutputsNotAllowed,
    InputCount { expected: usize, actual: usize },
    OutputCount { expected: usize, actual: usize },
    IssuerEqualsHolder,
    SectionNotAllowed { section: i32 },
    /// The transfer rule compares the input's issuer with the output's holder.
    IssuerNotNewHolder,
    HolderUnchanged,
    SectionNotConserved { input: i32, output: i32 },
    LinearIdNotConserved,
    MissingSigners { missing: Vec<PublicKey> },
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::InputsNotAllowed => write!(f, "No input can be consumed when buying"),
            Rule::OutputsNotAllowed => write!(f, "No output can be created when exiting"),
            Rule::InputCount { expected, actual } => {
                write!(f, "Exactly {} input(s) required, found {}", expected, actual)
            }
            Rule::OutputCount { expected, actual } => {
                write!(f, "Exactly {} output(s) required, found {}", expected, actual)
            }
            Rule::IssuerEqualsHolder => write!(f, "Issuer and holder can't be equal"),
            Rule::SectionNotAllowed { section } => write!(
                f,
                "Only LOW=15, MID=30 or HIGH=50 section allowed, found {}",
                section
            ),
            Rule::IssuerNotNewHolder => {
                write!(f, "Input's issuer must be equal to output's holder")
            }
            Rule::HolderUnchanged => {
                write!(f, "Input's holder and output's holder can't be equal")
            }
            Rule::SectionNotConserved { input, output } => write!(
                f,
                "Section has to be conserved in the transfer ({} -> {})",
                input, output
            ),
            Rule::LinearIdNotConserved => {
                write!(f, "LinearId has to be conserved in the transfer")
            }
            Rule::MissingSigners { missing } => {
                write!(f, "Required signers missing from the command: {:?}", missing)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{command} contract verification failed: {rule}{}", also(.also_violated))]
pub struct VerificationError {
    pub command: TicketCommand,
    /// The first broken rule, in evaluation order.
    pub rule: Rule,
    pub also_violated: Vec<Rule>,
}

impl VerificationError {
    pub fn violates(&self, rule: &Rule) -> bool {
        self.rule == *rule || self.also_violated.contains(rule)
    }
}

fn also(rules: &[Rule]) -> String {
    rules.iter().map(|rule| format!("; {}", rule)).collect()
}
