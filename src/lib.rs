pub mod lexer;
pub mod error;
pub mod env;
pub mod evaluator;
pub mod session;

pub use lexer::*;
pub use error::*;
pub use env::*;
pub use evaluator::*;
pub use session::*;
