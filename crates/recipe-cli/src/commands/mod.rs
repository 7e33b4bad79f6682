pub mod history;
pub mod recipes;
pub mod search;
