use std::sync::Arc;

use serde::{Serialize, Serializer};

use crate::locals::LiveLocals;
use crate::util::fast_map::FastHashMap;

mod convert;


/// A runtime value held by a frame slot or an indirection cell.
///
/// `Nil` is an ordinary value. An unbound slot is represented by the slot
/// holding no `Val` at all.
#[derive(Clone, Default)]
pub enum Val {
    /// String type, wrapped in Arc<str> for efficient cloning
    Str(Arc<str>),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Map type, wrapped in Arc<FastHashMap> to avoid deep cloning
    Map(Arc<FastHashMap<Arc<str>, Val>>),
    /// List type, stored as Arc<[Val]> for compact, immutable sharing
    List(Arc<[Val]>),
    /// A live view over some frame, stored like any other value.
    Locals(Arc<LiveLocals>),
    #[default]
    Nil,
}

impl Val {
    #[inline]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Val::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl PartialEq for Val {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Val::Str(a), Val::Str(b)) => a == b,
            (Val::Int(a), Val::Int(b)) => a == b,
            (Val::Float(a), Val::Float(b)) => a == b,
            (Val::Int(a), Val::Float(b)) | (Val::Float(b), Val::Int(a)) => (*a as f64) == *b,
            (Val::Bool(a), Val::Bool(b)) => a == b,
            (Val::Map(a), Val::Map(b)) => Arc::ptr_eq(a, b) || a == b,
            (Val::List(a), Val::List(b)) => Arc::ptr_eq(a, b) || a == b,
            // Views compare by identity; two views over one frame are interned anyway.
            (Val::Locals(a), Val::Locals(b)) => Arc::ptr_eq(a, b),
            (Val::Nil, Val::Nil) => true,
            _ => false,
        }
    }
}

// Mappings print as their repr only; printing their contents could recurse
// through a variable that holds the mapping itself.
impl core::fmt::Debug for Val {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Val::Str(s) => write!(f, "Str({:?})", s.as_ref()),
            Val::Int(i) => write!(f, "Int({i})"),
            Val::Float(fl) => write!(f, "Float({fl})"),
            Val::Bool(b) => write!(f, "Bool({b})"),
            Val::Map(m) => f.debug_tuple("Map").field(&**m).finish(),
            Val::List(l) => f.debug_tuple("List").field(&&**l).finish(),
            Val::Locals(l) => write!(f, "Locals({})", l),
            Val::Nil => write!(f, "Nil"),
        }
    }
}

impl core::fmt::Display for Val {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Val::Int(i) => write!(f, "{i}"),
            Val::Float(fl) => write!(f, "{fl}"),
            Val::Bool(b) => write!(f, "{b}"),
            Val::Str(s) => write!(f, "{}", s.as_ref()),
            Val::Map(m) => match serde_json::to_string(&**m) {
                Ok(s) => write!(f, "{}", s),
                Err(_) => write!(f, "{:?}", m),
            },
            Val::List(l) => match serde_json::to_string(&**l) {
                Ok(s) => write!(f, "{}", s),
                Err(_) => write!(f, "{:?}", l),
            },
            Val::Locals(l) => write!(f, "{}", l),
            Val::Nil => write!(f, "nil"),
        }
    }
}

impl Serialize for Val {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Val::Str(s) => serializer.serialize_str(s.as_ref()),
            Val::Int(i) => serializer.serialize_i64(*i),
            Val::Float(f) => serializer.serialize_f64(*f),
            Val::Bool(b) => serializer.serialize_bool(*b),
            Val::Map(m) => (**m).serialize(serializer),
            Val::List(l) => (**l).serialize(serializer),
            Val::Locals(l) => serializer.collect_str(&**l),
            Val::Nil => serializer.serialize_unit(),
        }
    }
}
