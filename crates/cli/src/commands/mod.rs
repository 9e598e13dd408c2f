//! Command implementations.

mod fields;
mod info;
mod run;
mod validate;

pub use fields::run_fields;
pub use info::run_info;
pub use run::run_pipeline;
pub use validate::run_validate;
