//! DAO operations backend.
//!
//! A thin HTTP service that wires together three external systems: an IPFS
//! node for content-addressed file storage, the Arkiv ledger for expiring
//! metadata entities (DAOs, proposals, tasks, memberships, attachments), and
//! an optional Storacha pinning step for uploaded files.

pub mod api;
pub mod arkiv;
pub mod config;
pub mod ipfs;
pub mod pinning;
