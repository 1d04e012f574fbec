pub mod plan;
pub mod settings;
pub mod sync;
