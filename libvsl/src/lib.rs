extern crate itertools;
#[macro_use] extern crate log;
extern crate nom;
extern crate thiserror;

pub mod ast;
pub mod compiler;
pub mod error;
pub mod helpers;
pub mod parser;
pub mod scope;
pub mod semantic;
pub mod source_file;
pub mod symbol;
