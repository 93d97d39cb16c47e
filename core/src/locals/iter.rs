use std::iter::FusedIterator;
use std::sync::Arc;

use crate::val::Val;

use super::LiveLocals;

/// Walks the declared slots in order, reading each one only when reached.
///
/// Slots bound or unbound after the iterator was created are seen as they
/// are when the cursor gets to them. A frame that stops being live ends the
/// walk.
struct Cursor<'a> {
    locals: &'a LiveLocals,
    next: usize,
}

impl<'a> Cursor<'a> {
    fn new(locals: &'a LiveLocals) -> Self {
        Self { locals, next: 0 }
    }

    fn remaining(&self) -> usize {
        self.locals.code.resolver().len().saturating_sub(self.next)
    }

    fn advance(&mut self) -> Option<(Arc<str>, Val)> {
        let resolver = self.locals.code.resolver();
        while let Some(slot) = resolver.slot_at(self.next) {
            self.next += 1;
            match self.locals.read_slot(slot) {
                Ok(Some(value)) => {
                    let name = resolver.name_of(slot.index)?;
                    return Some((Arc::clone(name), value));
                }
                Ok(None) => continue,
                Err(_) => {
                    self.next = resolver.len();
                    return None;
                }
            }
        }
        None
    }
}

/// Iterator over `(name, value)` pairs of assigned variables.
pub struct Items<'a>(Cursor<'a>);

impl<'a> Items<'a> {
    pub(super) fn new(locals: &'a LiveLocals) -> Self {
        Self(Cursor::new(locals))
    }
}

impl Iterator for Items<'_> {
    type Item = (Arc<str>, Val);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.advance()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.0.remaining()))
    }
}

impl FusedIterator for Items<'_> {}

/// Iterator over names of assigned variables.
pub struct Keys<'a>(Cursor<'a>);

impl<'a> Keys<'a> {
    pub(super) fn new(locals: &'a LiveLocals) -> Self {
        Self(Cursor::new(locals))
    }
}

impl Iterator for Keys<'_> {
    type Item = Arc<str>;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.advance().map(|(name, _)| name)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.0.remaining()))
    }
}

impl FusedIterator for Keys<'_> {}

/// Iterator over values of assigned variables.
pub struct Values<'a>(Cursor<'a>);

impl<'a> Values<'a> {
    pub(super) fn new(locals: &'a LiveLocals) -> Self {
        Self(Cursor::new(locals))
    }
}

impl Iterator for Values<'_> {
    type Item = Val;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.advance().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.0.remaining()))
    }
}

impl FusedIterator for Values<'_> {}
