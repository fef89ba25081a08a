pub mod alias;
pub mod catalog;
pub mod line;
pub mod mapping;
