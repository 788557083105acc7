pub mod catalog;
pub mod handlers;
pub mod keywords;
pub mod selector;
