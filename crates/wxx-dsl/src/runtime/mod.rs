pub mod builtins;
pub mod value;
pub mod vm;

pub use builtins::{Arity, Builtins, HostIo};
pub use value::Value;
pub use vm::Vm;
