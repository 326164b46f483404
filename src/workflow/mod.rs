pub mod wizard;
pub mod wizard_ctx;
pub mod wizard_flow;

pub use wizard::{NextOutcome, WizardSession, WizardState};
pub use wizard_ctx::WizardCtx;
pub use wizard_flow::{ProcessResult, WizardFlow};
