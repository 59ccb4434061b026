use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Home or job size options offered by the quote wizard. Serde labels match
/// the literals the site renders, which is also how stored leads carry them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveSize {
    Studio,
    #[serde(rename = "Apartment (1-2 BR)")]
    Apartment,
    Townhouse,
    #[serde(rename = "Single Family Home")]
    SingleFamilyHome,
    #[serde(rename = "Office / Commercial")]
    OfficeCommercial,
}

/// How soon the visitor wants to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveTiming {
    #[serde(rename = "ASAP (within 7 days)")]
    Asap,
    #[serde(rename = "Within 30 days")]
    Within30Days,
    #[serde(rename = "1–3 months")]
    OneToThreeMonths,
}

/// Fixed budget brackets in dollars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BudgetRange {
    #[serde(rename = "500-1000")]
    Usd500To1000,
    #[serde(rename = "1000-2000")]
    Usd1000To2000,
    #[serde(rename = "2000-4000")]
    Usd2000To4000,
    #[serde(rename = "4000+")]
    Usd4000Plus,
}

/// The five add-on service switches. A fixed field per switch keeps the
/// "exactly five keys" shape structural instead of conventional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSelections {
    pub packing: bool,
    pub junk: bool,
    pub assembly: bool,
    pub long_carry: bool,
    pub freight: bool,
}

impl Default for ServiceSelections {
    fn default() -> Self {
        Self {
            packing: false,
            junk: false,
            assembly: true,
            long_carry: false,
            freight: false,
        }
    }
}

impl ServiceSelections {
    pub fn enabled_count(self) -> u8 {
        [
            self.packing,
            self.junk,
            self.assembly,
            self.long_carry,
            self.freight,
        ]
        .into_iter()
        .filter(|enabled| *enabled)
        .count() as u8
    }
}

/// The in-progress wizard form. No validation happens here; presence
/// enforcement stays at the edge collecting the input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub from_zip: String,
    pub to_zip: String,
    pub date: Option<NaiveDate>,
    pub size: MoveSize,
    pub services: ServiceSelections,
    pub timing: MoveTiming,
    pub budget: BudgetRange,
    pub notes: String,
}

impl Default for QuoteForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            from_zip: String::new(),
            to_zip: String::new(),
            date: None,
            size: MoveSize::Apartment,
            services: ServiceSelections::default(),
            timing: MoveTiming::Asap,
            budget: BudgetRange::Usd1000To2000,
            notes: String::new(),
        }
    }
}

impl QuoteForm {
    pub fn apply(&mut self, patch: FormPatch) {
        let FormPatch {
            name,
            email,
            phone,
            from_zip,
            to_zip,
            date,
            size,
            services,
            timing,
            budget,
            notes,
        } = patch;

        if let Some(value) = name {
            self.name = value;
        }
        if let Some(value) = email {
            self.email = value;
        }
        if let Some(value) = phone {
            self.phone = value;
        }
        if let Some(value) = from_zip {
            self.from_zip = value;
        }
        if let Some(value) = to_zip {
            self.to_zip = value;
        }
        if let Some(value) = date {
            self.date = Some(value);
        }
        if let Some(value) = size {
            self.size = value;
        }
        if let Some(value) = services {
            self.services = value;
        }
        if let Some(value) = timing {
            self.timing = value;
        }
        if let Some(value) = budget {
            self.budget = value;
        }
        if let Some(value) = notes {
            self.notes = value;
        }
    }
}

/// Partial form update; every field optional, applied without validation.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub from_zip: Option<String>,
    pub to_zip: Option<String>,
    pub date: Option<NaiveDate>,
    pub size: Option<MoveSize>,
    pub services: Option<ServiceSelections>,
    pub timing: Option<MoveTiming>,
    pub budget: Option<BudgetRange>,
    pub notes: Option<String>,
}

/// A captured quote request; immutable once persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub from_zip: String,
    pub to_zip: String,
    pub date: Option<NaiveDate>,
    pub size: MoveSize,
    pub services: ServiceSelections,
    pub timing: MoveTiming,
    pub budget: BudgetRange,
    pub notes: String,
    pub lead_score: u8,
    pub created_at: DateTime<Utc>,
}

impl Lead {
    pub(crate) fn from_form(form: QuoteForm, lead_score: u8, created_at: DateTime<Utc>) -> Self {
        let QuoteForm {
            name,
            email,
            phone,
            from_zip,
            to_zip,
            date,
            size,
            services,
            timing,
            budget,
            notes,
        } = form;

        Self {
            name,
            email,
            phone,
            from_zip,
            to_zip,
            date,
            size,
            services,
            timing,
            budget,
            notes,
            lead_score,
            created_at,
        }
    }

    /// Condensed row for the admin panel listing.
    pub fn admin_view(&self) -> LeadAdminView {
        LeadAdminView {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            route: format!("{} → {}", self.from_zip, self.to_zip),
            size: self.size,
            lead_score: self.lead_score,
            created_at: self.created_at,
        }
    }
}

/// What the admin panel shows per lead: who, where to where, how hot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadAdminView {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub route: String,
    pub size: MoveSize,
    pub lead_score: u8,
    pub created_at: DateTime<Utc>,
}

/// Wizard steps in order. `Submitted` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunnelStep {
    Contact,
    MoveDetails,
    Services,
    Budget,
    Submitted,
}

impl FunnelStep {
    pub const fn label(self) -> &'static str {
        match self {
            FunnelStep::Contact => "Contact",
            FunnelStep::MoveDetails => "Move Details",
            FunnelStep::Services => "Services",
            FunnelStep::Budget => "Budget",
            FunnelStep::Submitted => "Submitted",
        }
    }

    /// Forward one step, clamped at `Budget`; `Submitted` only via submit.
    pub(crate) const fn next(self) -> Self {
        match self {
            FunnelStep::Contact => FunnelStep::MoveDetails,
            FunnelStep::MoveDetails => FunnelStep::Services,
            FunnelStep::Services => FunnelStep::Budget,
            FunnelStep::Budget => FunnelStep::Budget,
            FunnelStep::Submitted => FunnelStep::Submitted,
        }
    }

    /// Back one step, clamped at `Contact`.
    pub(crate) const fn prev(self) -> Self {
        match self {
            FunnelStep::Contact => FunnelStep::Contact,
            FunnelStep::MoveDetails => FunnelStep::Contact,
            FunnelStep::Services => FunnelStep::MoveDetails,
            FunnelStep::Budget => FunnelStep::Services,
            FunnelStep::Submitted => FunnelStep::Submitted,
        }
    }
}
