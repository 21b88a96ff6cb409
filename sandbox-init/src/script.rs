use anyhow::{Context, Result, anyhow};
use client::parties::{get_parties, resolve_party};
use flows::bootstrap::RunningNode;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use ticket_type_rep::LinearId;
use tracing::{error, info};

/// One operation of a script, run on behalf of `node`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum Step {
    Issue {
        node: String,
        holder: String,
        section: i32,
        /// Name later steps can use instead of the linear id.
        label: Option<String>,
    },
    Transfer {
        node: String,
        ticket: String,
        to: String,
    },
    Exit {
        node: String,
        ticket: String,
    },
    ListIssuedBy {
        node: String,
        issuer: String,
    },
    /// Parties the node can see, optionally only those whose name contains
    /// `filter`.
    ListParties {
        node: String,
        filter: Option<String>,
    },
}

impl Step {
    fn node(&self) -> &str {
        match self {
            Step::Issue { node, .. }
            | Step::Transfer { node, .. }
            | Step::Exit { node, .. }
            | Step::ListIssuedBy { node, .. }
            | Step::ListParties { node, .. } => node,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Script {
    pub steps: Vec<Step>,
}

pub fn read_script<P: AsRef<Path>>(path: P) -> Result<Script> {
    let s = fs::read_to_string(&path)
        .with_context(|| format!("failed to read script '{}'", path.as_ref().display()))?;
    toml::from_str(&s).context("failed to parse TOML script")
}

#[derive(Debug, Default)]
pub struct Report {
    pub succeeded: usize,
    pub failed: usize,
}

/// Runs the steps in order. A failed step is logged and skipped unless
/// `fail_fast` is set, in which case it ends the run with its error.
pub async fn run_script(
    nodes: &BTreeMap<String, RunningNode>,
    script: &Script,
    fail_fast: bool,
) -> Result<Report> {
    let mut labels: HashMap<String, LinearId> = HashMap::new();
    let mut report = Report::default();
    for (index, step) in script.steps.iter().enumerate() {
        let number = index + 1;
        match run_step(nodes, &mut labels, step).await {
            Ok(output) => {
                info!(step = number, node = step.node(), "{}", output);
                report.succeeded += 1;
            }
            Err(err) => {
                error!(step = number, node = step.node(), "Step failed: {:#}", err);
                report.failed += 1;
                if fail_fast {
                    return Err(err.context(format!("step {number} failed")));
                }
            }
        }
    }
    Ok(report)
}

async fn run_step(
    nodes: &BTreeMap<String, RunningNode>,
    labels: &mut HashMap<String, LinearId>,
    step: &Step,
) -> Result<String> {
    let running = nodes
        .get(step.node())
        .ok_or_else(|| anyhow!("no node named '{}' in the config", step.node()))?;
    let api = running.api();
    match step {
        Step::Issue {
            holder,
            section,
            label,
            ..
        } => {
            let outcome = api.issue(holder, *section).await?;
            if let (Some(label), Some(state)) = (label, outcome.states.first()) {
                labels.insert(label.clone(), state.linear_id.clone());
            }
            Ok(format!("issue: {}", serde_json::to_string(&outcome)?))
        }
        Step::Transfer { ticket, to, .. } => {
            let linear_id = ticket_ref(labels, ticket)?;
            let outcome = api.transfer(&linear_id, to).await?;
            Ok(format!("transfer: {}", serde_json::to_string(&outcome)?))
        }
        Step::Exit { ticket, .. } => {
            let linear_id = ticket_ref(labels, ticket)?;
            let outcome = api.exit(&linear_id).await?;
            Ok(format!("exit: {}", serde_json::to_string(&outcome)?))
        }
        Step::ListIssuedBy { issuer, .. } => {
            let issuer = resolve_party(running.node().identities(), issuer).await?;
            let states = api.list_issued_by(&issuer).await;
            Ok(format!("issued by {}: {}", issuer, serde_json::to_string(&states)?))
        }
        Step::ListParties { filter, .. } => {
            let parties = get_parties(running.node().identities(), filter.as_deref()).await;
            let names: Vec<&str> = parties.iter().map(|party| party.name()).collect();
            Ok(format!("parties: {}", names.join(", ")))
        }
    }
}

/// A label given to an earlier `issue`, or a linear id spelled out.
fn ticket_ref(labels: &HashMap<String, LinearId>, ticket: &str) -> Result<LinearId> {
    if let Some(linear_id) = labels.get(ticket) {
        return Ok(linear_id.clone());
    }
    ticket
        .parse()
        .with_context(|| format!("'{ticket}' is neither a ticket label nor a linear id"))
}
