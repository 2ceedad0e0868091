//! Heap value representation.
//!
//! A heap object is a tagged union of a scalar integer and a composite pair
//! of references. References are [`ObjRef`] handles into the owning
//! [`Heap`](crate::Heap); they carry no ownership, so composites may form
//! arbitrary graphs including cycles and self references.

use std::fmt;

// ============================================================================
// ObjRef - handle to a heap object
// ============================================================================

/// A non-owning reference to a [`HeapObject`].
///
/// Two `ObjRef`s are equal exactly when they name the same allocation.
/// The generation distinguishes successive occupants of the same heap slot,
/// so a handle to a reclaimed object never aliases a newer one.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjRef {
    index: u32,
    generation: u32,
}

impl ObjRef {
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index of this reference inside its heap.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Generation of the slot at the time this reference was handed out.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }

    pub(crate) const fn slot(self) -> usize {
        self.index as usize
    }
}

impl fmt::Debug for ObjRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjRef({}#{})", self.index, self.generation)
    }
}

// ============================================================================
// ObjectKind / Payload
// ============================================================================

/// Discriminant of a heap object. Fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    /// An integer value with no outgoing references.
    Scalar,
    /// A pair of references to other heap objects.
    Composite,
}

/// The language-visible contents of a heap object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    /// An integer value.
    Scalar(i64),
    /// Two references; `None` marks a field that has not been filled in yet.
    Composite {
        /// First field (the "head" of a pair).
        first: Option<ObjRef>,
        /// Second field (the "tail" of a pair).
        second: Option<ObjRef>,
    },
}

impl Payload {
    /// Outgoing references of this payload, skipping absent fields.
    pub fn edges(&self) -> impl Iterator<Item = ObjRef> {
        let (first, second) = match *self {
            Self::Scalar(_) => (None, None),
            Self::Composite { first, second } => (first, second),
        };
        first.into_iter().chain(second)
    }
}

// ============================================================================
// HeapObject
// ============================================================================

/// A single garbage-collected value.
///
/// The mark flag is only meaningful while a collection is in progress; every
/// object observed outside a mark phase is unmarked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeapObject {
    payload: Payload,
    marked: bool,
}

impl HeapObject {
    /// A new, unmarked scalar.
    #[must_use]
    pub const fn scalar(value: i64) -> Self {
        Self {
            payload: Payload::Scalar(value),
            marked: false,
        }
    }

    /// A new, unmarked composite.
    #[must_use]
    pub const fn composite(first: Option<ObjRef>, second: Option<ObjRef>) -> Self {
        Self {
            payload: Payload::Composite { first, second },
            marked: false,
        }
    }

    /// The variant of this object.
    #[must_use]
    pub const fn kind(&self) -> ObjectKind {
        match self.payload {
            Payload::Scalar(_) => ObjectKind::Scalar,
            Payload::Composite { .. } => ObjectKind::Composite,
        }
    }

    /// The object's contents.
    #[must_use]
    pub const fn payload(&self) -> &Payload {
        &self.payload
    }

    /// The integer value, if this is a scalar.
    #[must_use]
    pub const fn as_scalar(&self) -> Option<i64> {
        match self.payload {
            Payload::Scalar(value) => Some(value),
            Payload::Composite { .. } => None,
        }
    }

    /// The `(first, second)` fields, if this is a composite.
    #[must_use]
    pub const fn as_composite(&self) -> Option<(Option<ObjRef>, Option<ObjRef>)> {
        match self.payload {
            Payload::Scalar(_) => None,
            Payload::Composite { first, second } => Some((first, second)),
        }
    }

    /// Whether the current mark phase has reached this object.
    #[must_use]
    pub const fn is_marked(&self) -> bool {
        self.marked
    }

    pub(crate) fn set_marked(&mut self, marked: bool) {
        self.marked = marked;
    }

    /// Rewrites a composite field. Returns `false` for scalars.
    pub(crate) fn set_field(&mut self, field: Field, target: Option<ObjRef>) -> bool {
        match &mut self.payload {
            Payload::Scalar(_) => false,
            Payload::Composite { first, second } => {
                match field {
                    Field::First => *first = target,
                    Field::Second => *second = target,
                }
                true
            }
        }
    }
}

/// Selects one of the two fields of a composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Field {
    First,
    Second,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_objects_are_unmarked() {
        assert!(!HeapObject::scalar(7).is_marked());
        assert!(!HeapObject::composite(None, None).is_marked());
    }

    #[test]
    fn test_kind_and_accessors() {
        let s = HeapObject::scalar(-3);
        assert_eq!(s.kind(), ObjectKind::Scalar);
        assert_eq!(s.as_scalar(), Some(-3));
        assert_eq!(s.as_composite(), None);

        let a = ObjRef::new(0, 0);
        let c = HeapObject::composite(Some(a), None);
        assert_eq!(c.kind(), ObjectKind::Composite);
        assert_eq!(c.as_scalar(), None);
        assert_eq!(c.as_composite(), Some((Some(a), None)));
    }

    #[test]
    fn test_edges_skip_absent_fields() {
        let a = ObjRef::new(1, 0);
        let b = ObjRef::new(2, 0);
        assert_eq!(Payload::Scalar(1).edges().count(), 0);
        assert_eq!(
            Payload::Composite {
                first: None,
                second: Some(b)
            }
            .edges()
            .collect::<Vec<_>>(),
            vec![b]
        );
        assert_eq!(
            Payload::Composite {
                first: Some(a),
                second: Some(b)
            }
            .edges()
            .collect::<Vec<_>>(),
            vec![a, b]
        );
    }

    #[test]
    fn test_set_field_keeps_kind() {
        let target = ObjRef::new(3, 1);
        let mut c = HeapObject::composite(None, None);
        assert!(c.set_field(Field::Second, Some(target)));
        assert_eq!(c.as_composite(), Some((None, Some(target))));
        assert_eq!(c.kind(), ObjectKind::Composite);

        let mut s = HeapObject::scalar(1);
        assert!(!s.set_field(Field::First, Some(target)));
        assert_eq!(s.kind(), ObjectKind::Scalar);
    }

    #[test]
    fn test_identity_includes_generation() {
        assert_ne!(ObjRef::new(4, 0), ObjRef::new(4, 1));
        assert_eq!(format!("{:?}", ObjRef::new(4, 1)), "ObjRef(4#1)");
    }
}
