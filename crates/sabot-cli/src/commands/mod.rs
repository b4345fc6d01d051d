pub mod eval;
pub mod run;
