//! Account-merging subsystem of the Wayfarer travel-journal backend.
//!
//! Two accounts can present as one joint public identity under a stable
//! merge slug, and later dissolve that identity again. This crate owns the
//! invitation lifecycle, the atomic merge/unmerge transitions, public
//! identity resolution (including the bot-facing preview surface), and the
//! append-only history ledger. The wider application (journals, checklists,
//! blog, authentication) is an external collaborator reached only through
//! ports.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod outbound;
pub mod server;

pub use doc::ApiDoc;
