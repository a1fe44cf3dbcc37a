pub mod dirs;
pub mod startup;
