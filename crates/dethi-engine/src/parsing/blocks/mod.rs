pub mod scanner;
pub mod types;

pub use scanner::ExamScanner;
pub use types::{Answer, Block, Part, Question, QuestionType};
