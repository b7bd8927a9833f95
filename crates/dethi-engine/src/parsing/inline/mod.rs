pub mod cursor;
pub mod kinds;
pub mod parser;
pub mod types;

pub use kinds::TableRow;
pub use parser::parse_inline;
pub use types::InlineToken;
