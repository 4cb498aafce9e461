// promptclean-core/src/stages/mod.rs
//! The five pipeline stages, in the order the pipeline runs them.
//!
//! 1. `pii` - structured PII tokens.
//! 2. `code` - script, template and process-execution fragments.
//! 3. `gate` - whole-text sensitivity verdict.
//! 4. `normalizer` - whitespace, charset, length.
//! 5. `profanity` - denylisted words.

pub mod code;
pub mod gate;
pub mod normalizer;
pub mod pii;
pub mod profanity;

pub use code::CodeRedactor;
pub use gate::ClassifierGate;
pub use normalizer::Normalizer;
pub use pii::PiiRedactor;
pub use profanity::ProfanityRedactor;
