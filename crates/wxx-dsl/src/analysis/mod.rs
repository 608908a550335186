pub mod checker;

pub use checker::{check, check_with};
