pub mod generation;
pub mod validator;
pub mod warn_writer;

pub use generation::GenerationService;
pub use validator::{FieldError, FormField};
pub use warn_writer::WarnWriter;
