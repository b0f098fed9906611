pub mod add;
pub mod common;
pub mod completions;
pub mod delete;
pub mod edit;
pub mod export;
pub mod languages;
pub mod list;
pub mod pin;
