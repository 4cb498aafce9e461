//! Rule compilation shared by the PII and code redaction stages.
//!
//! `compiler` turns validated `PatternRule`s into `CompiledRules`, which the
//! stages in `crate::stages` apply in order.

pub mod compiler;
