pub mod book;
pub mod columns;
pub mod config;
pub mod dashboard;
pub mod enrich;
pub mod error;
pub mod open_library_api;
pub mod session;
pub mod table;
pub mod view;

pub use error::{Error, Result};

/// Search terms are typed plus-separated (`the+lord+of+the+rings`) or with
/// spaces; both become one space-separated term, which form encoding then
/// sends as `q=the+lord+of+the+rings`.
pub fn query_string(input: &str) -> String {
    input
        .replace('+', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plus_and_space_separated_terms_agree() {
        assert_eq!(query_string("the+lord+of+the+rings"), "the lord of the rings");
        assert_eq!(query_string("  the lord  of+the rings "), "the lord of the rings");
        assert_eq!(query_string(""), "");
    }
}
