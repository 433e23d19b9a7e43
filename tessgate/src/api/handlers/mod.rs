pub mod engine;
pub mod extract;

pub use engine::{engine_version, list_languages};
pub use extract::extract_text;
