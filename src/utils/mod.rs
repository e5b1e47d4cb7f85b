// Request body parsing
pub mod url_encoding;

// Value parsing
pub mod parse_flag;

pub use parse_flag::parse_flag;
pub use url_encoding::parse_urlencoded_body;
