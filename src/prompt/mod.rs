// Declare submodules
mod categorization;
mod common;
mod entity;

pub use categorization::{categorization_prompt, CATEGORY_TREE};
pub use common::global_context;
pub use entity::entity_extraction_prompt;
