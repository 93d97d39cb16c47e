//! Slot-based name resolution for frame variables.
//!
//! A frame's storage is one flat index space laid out as
//! `[locals][cellvars][freevars]`. The resolver is a pure function of the
//! code metadata: it maps a declared name to its `SlotRef` and an index back
//! to its name. The name index is built once, when the `CodeMeta` is
//! created, and shared by every frame running that code.

use std::fmt;
use std::sync::Arc;

use crate::error::{LocalsError, Result};
use crate::util::fast_map::{FastHashMap, fast_hash_map_with_capacity};

/// Storage kind of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotKind {
    /// Direct ("fast") slot holding the value itself.
    Local,
    /// Indirection cell created by this frame and captured by nested scopes.
    Cell,
    /// Indirection cell captured from an enclosing scope.
    Free,
}

impl SlotKind {
    #[inline]
    pub fn is_indirect(self) -> bool {
        !matches!(self, SlotKind::Local)
    }
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SlotKind::Local => "local",
            SlotKind::Cell => "cell",
            SlotKind::Free => "free",
        };
        f.write_str(s)
    }
}

/// Resolved storage location: kind plus index in the frame's flat index space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotRef {
    pub kind: SlotKind,
    pub index: usize,
}

impl SlotRef {
    #[inline]
    pub const fn new(kind: SlotKind, index: usize) -> Self {
        Self { kind, index }
    }

    #[inline]
    pub const fn local(index: usize) -> Self {
        Self::new(SlotKind::Local, index)
    }
}

/// Static variable layout of a compiled routine.
pub struct CodeMeta {
    name: Arc<str>,
    locals: Vec<Arc<str>>,
    cellvars: Vec<Arc<str>>,
    freevars: Vec<Arc<str>>,
    resolver: SlotResolver,
}

impl CodeMeta {
    /// Builds the layout, rejecting any name declared twice within or across
    /// the three sequences.
    pub fn new(name: &str, locals: &[&str], cellvars: &[&str], freevars: &[&str]) -> Result<Arc<Self>> {
        let intern = |names: &[&str]| names.iter().map(|n| Arc::<str>::from(*n)).collect::<Vec<_>>();
        let locals = intern(locals);
        let cellvars = intern(cellvars);
        let freevars = intern(freevars);
        let resolver = SlotResolver::build(&locals, &cellvars, &freevars)?;
        Ok(Arc::new(Self {
            name: Arc::from(name),
            locals,
            cellvars,
            freevars,
            resolver,
        }))
    }

    /// Shorthand for code without cell or free variables.
    pub fn with_locals(name: &str, locals: &[&str]) -> Result<Arc<Self>> {
        Self::new(name, locals, &[], &[])
    }

    #[inline]
    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    #[inline]
    pub fn locals(&self) -> &[Arc<str>] {
        &self.locals
    }

    #[inline]
    pub fn cellvars(&self) -> &[Arc<str>] {
        &self.cellvars
    }

    #[inline]
    pub fn freevars(&self) -> &[Arc<str>] {
        &self.freevars
    }

    #[inline]
    pub fn nlocals(&self) -> usize {
        self.locals.len()
    }

    #[inline]
    pub fn ncells(&self) -> usize {
        self.cellvars.len()
    }

    #[inline]
    pub fn nfree(&self) -> usize {
        self.freevars.len()
    }

    /// Total number of slots in a frame running this code.
    #[inline]
    pub fn nslots(&self) -> usize {
        self.nlocals() + self.ncells() + self.nfree()
    }

    #[inline]
    pub fn resolver(&self) -> &SlotResolver {
        &self.resolver
    }
}

impl fmt::Debug for CodeMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodeMeta")
            .field("name", &self.name)
            .field("locals", &self.locals)
            .field("cellvars", &self.cellvars)
            .field("freevars", &self.freevars)
            .finish()
    }
}

/// Name <-> slot mapping for one `CodeMeta`.
#[derive(Debug, Clone)]
pub struct SlotResolver {
    /// Declared names in index order: locals, then cells, then free.
    names: Vec<Arc<str>>,
    index: FastHashMap<Arc<str>, usize>,
    nlocals: usize,
    ncells: usize,
}

impl SlotResolver {
    fn build(locals: &[Arc<str>], cellvars: &[Arc<str>], freevars: &[Arc<str>]) -> Result<Self> {
        let names: Vec<Arc<str>> = locals.iter().chain(cellvars).chain(freevars).cloned().collect();
        let mut index = fast_hash_map_with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            if index.insert(Arc::clone(name), i).is_some() {
                return Err(LocalsError::DuplicateName { name: Arc::clone(name) });
            }
        }
        Ok(Self {
            names,
            index,
            nlocals: locals.len(),
            ncells: cellvars.len(),
        })
    }

    /// Resolve a declared name to its slot.
    pub fn resolve(&self, name: &str) -> Option<SlotRef> {
        let index = *self.index.get(name)?;
        self.slot_at(index)
    }

    /// Kind of the slot at `index`, or `None` past the last declared slot.
    pub fn slot_at(&self, index: usize) -> Option<SlotRef> {
        let kind = if index < self.nlocals {
            SlotKind::Local
        } else if index < self.nlocals + self.ncells {
            SlotKind::Cell
        } else if index < self.names.len() {
            SlotKind::Free
        } else {
            return None;
        };
        Some(SlotRef::new(kind, index))
    }

    /// Name declared at `index`.
    #[inline]
    pub fn name_of(&self, index: usize) -> Option<&Arc<str>> {
        self.names.get(index)
    }

    /// All declared names in enumeration order.
    #[inline]
    pub fn declared_names(&self) -> &[Arc<str>] {
        &self.names
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    #[inline]
    pub fn nlocals(&self) -> usize {
        self.nlocals
    }

    #[inline]
    pub fn ncells(&self) -> usize {
        self.ncells
    }

    #[inline]
    pub fn nfree(&self) -> usize {
        self.names.len() - self.nlocals - self.ncells
    }

    /// First index of the cell and free range.
    #[inline]
    pub fn cells_start(&self) -> usize {
        self.nlocals
    }
}
