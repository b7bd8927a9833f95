pub mod assets;
pub mod editing;
pub mod io;
pub mod parsing;

// Re-export key types for easier usage
pub use assets::{Asset, AssetKind, AssetMap, FormulaSource};
pub use editing::{Cmd, Patch, RawDocument};
pub use parsing::blocks::{Answer, Block, Part, Question, QuestionType};
pub use parsing::{ParsedExam, parse_document};
