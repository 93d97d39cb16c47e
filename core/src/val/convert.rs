use std::sync::Arc;

use anyhow::Result;

use crate::locals::LiveLocals;
use crate::util::fast_map::{FastHashMap, fast_hash_map_with_capacity};

use super::Val;

impl From<String> for Val {
    #[inline]
    fn from(s: String) -> Self {
        Val::Str(Arc::<str>::from(s))
    }
}

impl From<&str> for Val {
    #[inline]
    fn from(s: &str) -> Self {
        Val::Str(Arc::from(s))
    }
}

impl From<i64> for Val {
    #[inline]
    fn from(i: i64) -> Self {
        Val::Int(i)
    }
}

impl From<i32> for Val {
    #[inline]
    fn from(i: i32) -> Self {
        Val::Int(i as i64)
    }
}

impl From<f64> for Val {
    #[inline]
    fn from(f: f64) -> Self {
        Val::Float(f)
    }
}

impl From<bool> for Val {
    #[inline]
    fn from(b: bool) -> Self {
        Val::Bool(b)
    }
}

impl From<Arc<LiveLocals>> for Val {
    #[inline]
    fn from(l: Arc<LiveLocals>) -> Self {
        Val::Locals(l)
    }
}

impl<T> From<Vec<T>> for Val
where
    T: Into<Val>,
{
    fn from(v: Vec<T>) -> Self {
        let v: Vec<Val> = v.into_iter().map(Into::into).collect();
        Val::List(Arc::<[Val]>::from(v))
    }
}

impl<T> From<Option<T>> for Val
where
    T: Into<Val>,
{
    fn from(o: Option<T>) -> Self {
        match o {
            Some(v) => v.into(),
            None => Val::Nil,
        }
    }
}

impl From<serde_json::Value> for Val {
    fn from(val: serde_json::Value) -> Self {
        match val {
            serde_json::Value::String(s) => Val::Str(Arc::<str>::from(s)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Val::Int(i)
                } else if let Some(f) = n.as_f64() {
                    Val::Float(f)
                } else {
                    Val::Nil
                }
            }
            serde_json::Value::Bool(b) => Val::Bool(b),
            serde_json::Value::Array(a) => {
                let v: Vec<Val> = a.into_iter().map(Val::from).collect();
                Val::List(Arc::from(v))
            }
            serde_json::Value::Object(o) => {
                let mut m: FastHashMap<Arc<str>, Val> = fast_hash_map_with_capacity(o.len());
                for (k, v) in o {
                    m.insert(Arc::<str>::from(k), Val::from(v));
                }
                Val::Map(Arc::new(m))
            }
            serde_json::Value::Null => Val::Nil,
        }
    }
}

impl Val {
    /// Converts any serializable Rust value by way of its JSON form.
    pub fn try_from<T>(val: T) -> Result<Self>
    where
        T: serde::Serialize,
    {
        Ok(serde_json::to_value(val)?.into())
    }
}
