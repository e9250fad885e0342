//! Descriptor-driven conversion between wire objects and records.

pub mod assemble;
mod block;
pub mod disassemble;
pub mod sort;
mod table;

pub use assemble::{AssembleMode, Assembler};
pub use disassemble::Disassembler;
pub use sort::{natural_cmp, sort_rows, SortMode};
