use chrono::Utc;

use super::domain::{FormPatch, FunnelStep, Lead, QuoteForm};
use super::scoring;
use super::service::FunnelError;

/// Wizard state machine for one visitor session: the current step plus the
/// in-progress form. Persistence lives with [`super::service::LeadFunnelService`];
/// the controller itself only ever mutates its own state.
#[derive(Debug, Clone, PartialEq)]
pub struct FunnelController {
    step: FunnelStep,
    form: QuoteForm,
}

impl Default for FunnelController {
    fn default() -> Self {
        Self::new()
    }
}

impl FunnelController {
    pub fn new() -> Self {
        Self {
            step: FunnelStep::Contact,
            form: QuoteForm::default(),
        }
    }

    pub fn step(&self) -> FunnelStep {
        self.step
    }

    pub fn form(&self) -> &QuoteForm {
        &self.form
    }

    /// Live score for the current form state.
    pub fn current_score(&self) -> u8 {
        scoring::score(&self.form)
    }

    /// Move forward one step; clamped at `Budget`, inert once `Submitted`.
    pub fn advance(&mut self) {
        self.step = self.step.next();
    }

    /// Move back one step; clamped at `Contact`, inert once `Submitted`.
    pub fn retreat(&mut self) {
        self.step = self.step.prev();
    }

    /// Merge a partial update into the form. Always legal; the thank-you
    /// screen still edits the email after submission.
    pub fn apply(&mut self, patch: FormPatch) {
        self.form.apply(patch);
    }

    /// Finalize the quote request. Only legal from `Budget`; scores the
    /// form once, stamps the creation time, and moves to `Submitted`.
    pub fn submit(&mut self) -> Result<Lead, FunnelError> {
        if self.step != FunnelStep::Budget {
            return Err(FunnelError::NotAtFinalStep { step: self.step });
        }

        let lead = Lead::from_form(self.form.clone(), self.current_score(), Utc::now());
        self.step = FunnelStep::Submitted;
        Ok(lead)
    }

    /// Back to a fresh `Contact` step, as when the dialog is reopened.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
