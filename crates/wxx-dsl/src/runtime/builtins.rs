use std::collections::HashMap;

use crate::document::MapRoot;
use crate::runtime::value::Value;

/// How many arguments a builtin takes. The static checker reads arities
/// from the registry, so the registry is the single source of truth for
/// both phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    Variadic,
}

/// What a builtin may touch while it runs: the document under edit and the
/// VM's output buffer. Builtins never see the variable environment.
pub struct HostIo<'a> {
    pub doc: &'a mut MapRoot,
    pub out: &'a mut Vec<String>,
}

/// A builtin returns a value on success. `Err` is a fault and aborts the
/// script; recoverable problems come back as `Ok(Value::Error(..))` so the
/// script can observe them.
pub type NativeFn = Box<dyn Fn(&mut HostIo, &[Value]) -> Result<Value, String>>;

struct Builtin {
    arity: Arity,
    run: NativeFn,
}

/// Registry of callable functions. Hosts may extend it through
/// [`Builtins::register`] to expose extra capabilities to scripts.
pub struct Builtins {
    fns: HashMap<String, Builtin>,
}

impl Builtins {
    pub fn empty() -> Self {
        Self { fns: HashMap::new() }
    }

    /// The stock registry: `load`, `save`, and `print`.
    pub fn standard() -> Self {
        let mut reg = Self::empty();
        reg.register("load", Arity::Exact(1), Box::new(load));
        reg.register("save", Arity::Exact(1), Box::new(save));
        reg.register("print", Arity::Variadic, Box::new(print));
        reg
    }

    pub fn register(&mut self, name: impl Into<String>, arity: Arity, run: NativeFn) {
        self.fns.insert(name.into(), Builtin { arity, run });
    }

    pub fn arity(&self, name: &str) -> Option<Arity> {
        self.fns.get(name).map(|b| b.arity)
    }

    /// Runs the named builtin, or `None` if it is not registered.
    pub fn invoke(&self, name: &str, io: &mut HostIo, args: &[Value]) -> Option<Result<Value, String>> {
        self.fns.get(name).map(|b| (b.run)(io, args))
    }
}

// ─── Stock builtins ──────────────────────────────────────────────────────────

fn require_filename(name: &str, args: &[Value]) -> Result<String, String> {
    if args.len() != 1 {
        return Err(format!("{name}: requires exactly one argument"));
    }
    match &args[0] {
        Value::Str(s) => Ok(s.clone()),
        _ => Err(format!("{name}: argument must be a string")),
    }
}

/// Loads a map document. The extension check fails soft: scripts get a
/// `Value::Error` they can inspect rather than an aborted run.
fn load(_io: &mut HostIo, args: &[Value]) -> Result<Value, String> {
    let filename = require_filename("load", args)?;
    if !filename.ends_with(".wxx") {
        return Ok(Value::Error("file name must end with .wxx".into()));
    }
    log::debug!("load: mocking read of {filename:?}");
    Ok(Value::Map(MapRoot::mock()))
}

fn save(io: &mut HostIo, args: &[Value]) -> Result<Value, String> {
    let filename = require_filename("save", args)?;
    if !filename.ends_with(".wxx") {
        return Ok(Value::Error("file name must end with .wxx".into()));
    }
    io.out.push(format!("save: converting... mocking writing to: {filename:?}"));
    Ok(Value::Unit)
}

fn print(io: &mut HostIo, args: &[Value]) -> Result<Value, String> {
    for arg in args {
        let line = arg.to_text(io.doc);
        io.out.push(line);
    }
    Ok(Value::Unit)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn run(name: &str, args: &[Value]) -> (Result<Value, String>, Vec<String>) {
        let reg = Builtins::standard();
        let mut doc = MapRoot::mock();
        let mut out = Vec::new();
        let result = reg
            .invoke(name, &mut HostIo { doc: &mut doc, out: &mut out }, args)
            .expect("builtin should be registered");
        (result, out)
    }

    #[test]
    fn registry_knows_arities() {
        let reg = Builtins::standard();
        assert_eq!(reg.arity("load"), Some(Arity::Exact(1)));
        assert_eq!(reg.arity("save"), Some(Arity::Exact(1)));
        assert_eq!(reg.arity("print"), Some(Arity::Variadic));
        assert_eq!(reg.arity("missing"), None);
    }

    #[test]
    fn load_returns_a_map_for_wxx_files() {
        let (result, _) = run("load", &[Value::Str("world.wxx".into())]);
        assert_eq!(result, Ok(Value::Map(MapRoot::mock())));
    }

    #[test]
    fn load_bad_extension_is_a_value_level_error() {
        let (result, _) = run("load", &[Value::Str("world.txt".into())]);
        assert_eq!(result, Ok(Value::Error("file name must end with .wxx".into())));
    }

    #[test]
    fn load_non_string_argument_is_a_fault() {
        let (result, _) = run("load", &[Value::Int(1)]);
        assert_eq!(result, Err("load: argument must be a string".into()));
    }

    #[test]
    fn save_writes_a_progress_line() {
        let (result, out) = run("save", &[Value::Str("world.wxx".into())]);
        assert_eq!(result, Ok(Value::Unit));
        assert_eq!(out, vec!["save: converting... mocking writing to: \"world.wxx\""]);
    }

    #[test]
    fn print_emits_one_line_per_argument() {
        let (result, out) = run("print", &[Value::Str("a".into()), Value::Int(2)]);
        assert_eq!(result, Ok(Value::Unit));
        assert_eq!(out, vec!["a", "2"]);
    }
}
