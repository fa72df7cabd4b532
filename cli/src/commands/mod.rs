//! CLI subcommands.

pub mod assemble;
pub mod decode;
pub mod encode;
pub mod run;

pub use assemble::AssembleCommand;
pub use decode::DecodeCommand;
pub use encode::EncodeCommand;
pub use run::RunCommand;
