//! Quote funnel intake: the wizard state machine, the priority scoring
//! heuristic, and lead persistence.

pub mod controller;
pub mod domain;
pub mod router;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use controller::FunnelController;
pub use domain::{
    BudgetRange, FormPatch, FunnelStep, Lead, LeadAdminView, MoveSize, MoveTiming, QuoteForm,
    ServiceSelections,
};
pub use router::funnel_router;
pub use scoring::score;
pub use service::{FunnelError, FunnelSessionId, FunnelView, LeadFunnelService};
