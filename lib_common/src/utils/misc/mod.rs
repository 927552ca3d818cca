/// Time and text helpers.
pub mod utils;
