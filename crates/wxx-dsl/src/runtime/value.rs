use crate::document::MapRoot;

/// A runtime value. Hexes are never owned by the environment: a `HexRef`
/// is an index into the document the VM is currently executing against, so
/// mutating through a loop variable writes straight into the document.
///
/// `Error` is a value, not a fault: builtins hand recoverable problems back
/// to the script as data (a bad file extension, for example) while genuine
/// misuse aborts execution through `RuntimeError`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    HexRef(usize),
    List(Vec<Value>),
    Map(MapRoot),
    Error(String),
    Unit,
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Str(_) => "text",
            Self::Bool(_) => "boolean",
            Self::HexRef(_) => "hex",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Error(_) => "error",
            Self::Unit => "nothing",
        }
    }

    /// Renders the value for `print` and for `+` concatenation. Needs the
    /// document because a `HexRef` only means something relative to it.
    pub fn to_text(&self, doc: &MapRoot) -> String {
        match self {
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Str(s) => s.clone(),
            Self::Bool(b) => b.to_string(),
            Self::HexRef(i) => match doc.hexes.get(*i) {
                Some(hex) => format!("hex({})", hex.terrain),
                None => format!("hex(#{i})"),
            },
            Self::List(items) => {
                let rendered: Vec<String> = items.iter().map(|v| v.to_text(doc)).collect();
                format!("[{}]", rendered.join(", "))
            }
            Self::Map(map) => format!("map({} hexes)", map.hexes.len()),
            Self::Error(msg) => format!("error: {msg}"),
            Self::Unit => String::new(),
        }
    }

    /// Accepts an integer or a whole-valued float as a hex index. The
    /// parser produces `Int` for bare digits, but scripts may compute an
    /// index that comes out as a float.
    pub fn as_index(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }
}
