//! End-to-end ticket scenarios, each run against an in-process sandbox of
//! nodes, notary and network.

#[cfg(test)]
mod common;
#[cfg(test)]
mod concurrency;
#[cfg(test)]
mod issuance;
#[cfg(test)]
mod retirement;
#[cfg(test)]
mod transfer;
