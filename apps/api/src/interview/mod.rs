// Candidate review workflow: field catalogue, per-stage field sets, the
// role-based visibility policy, persistence, CSV export and HTTP handlers.

pub mod export;
pub mod fields;
pub mod fieldsets;
pub mod handlers;
#[cfg(test)]
pub mod memory;
pub mod policy;
pub mod store;
