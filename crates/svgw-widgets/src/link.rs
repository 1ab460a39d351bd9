//! Bidirectional field links.
//!
//! A link binds two fields on two widgets so that a write to either one is
//! mirrored to the other. Writes go through [`Links::write`], which applies
//! the write and then walks every active link reachable from the written
//! field. Each field is written at most once per walk, so two linked fields
//! never bounce a value back and forth, and chains of links settle in one pass.

use std::collections::{HashSet, VecDeque};
use svgw_core::{AttrValue, FieldError, NodeId};

/// A named field on a widget.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldRef {
    pub owner: NodeId,
    pub field: String,
}

impl FieldRef {
    pub fn new(owner: NodeId, field: impl Into<String>) -> Self {
        Self {
            owner,
            field: field.into(),
        }
    }
}

impl std::fmt::Display for FieldRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.owner, self.field)
    }
}

/// Something that owns widget fields and can read and write them.
///
/// `write` applies the owner's own coercion and validation and reports
/// whether the stored value changed.
pub trait FieldStore {
    fn read(&self, field: &FieldRef) -> Option<AttrValue>;
    fn write(&mut self, field: &FieldRef, value: AttrValue) -> Result<bool, FieldError>;
}

/// Handle returned by [`Links::link`]; pass it to [`Links::unlink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkHandle(usize);

#[derive(Debug, Clone)]
struct Link {
    a: FieldRef,
    b: FieldRef,
}

impl Link {
    fn other_end(&self, field: &FieldRef) -> Option<&FieldRef> {
        if &self.a == field {
            Some(&self.b)
        } else if &self.b == field {
            Some(&self.a)
        } else {
            None
        }
    }
}

/// The set of field links of one panel.
#[derive(Debug, Default)]
pub struct Links {
    /// Slots stay put after unlinking so handles remain valid.
    slots: Vec<Option<Link>>,
}

impl Links {
    pub fn new() -> Self {
        Self::default()
    }

    /// Link `a` and `b`, first copying `a`'s current value into `b`.
    ///
    /// The link is created even if that first copy fails; the failure is
    /// logged and `b` keeps its value until the next successful write.
    pub fn link<S: FieldStore>(&mut self, store: &mut S, a: FieldRef, b: FieldRef) -> LinkHandle {
        match store.read(&a) {
            Some(value) => {
                if let Err(err) = store.write(&b, value) {
                    log::warn!("initial sync {a} -> {b} failed: {err}");
                }
            }
            None => log::warn!("initial sync {a} -> {b} failed: {a} is not readable"),
        }
        log::debug!("linked {a} <-> {b}");
        self.slots.push(Some(Link { a, b }));
        LinkHandle(self.slots.len() - 1)
    }

    /// Stop propagating through this link. Returns `false` if it was
    /// already broken.
    pub fn unlink(&mut self, handle: LinkHandle) -> bool {
        match self.slots.get_mut(handle.0).and_then(Option::take) {
            Some(link) => {
                log::debug!("unlinked {} <-> {}", link.a, link.b);
                true
            }
            None => false,
        }
    }

    pub fn is_active(&self, handle: LinkHandle) -> bool {
        matches!(self.slots.get(handle.0), Some(Some(_)))
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Active links as field pairs, in creation order.
    pub fn pairs(&self) -> impl Iterator<Item = (&FieldRef, &FieldRef)> {
        self.slots.iter().flatten().map(|l| (&l.a, &l.b))
    }

    /// Write `value` to `target` and mirror the stored result across links.
    ///
    /// Returns every field whose value changed, starting with `target`. A
    /// rejected write to `target` is an error and propagates nothing; a
    /// linked field that rejects the mirrored value keeps its old value and
    /// the walk does not continue past it.
    pub fn write<S: FieldStore>(
        &self,
        store: &mut S,
        target: &FieldRef,
        value: AttrValue,
    ) -> Result<Vec<FieldRef>, FieldError> {
        if !store.write(target, value)? {
            return Ok(Vec::new());
        }

        let mut changed = vec![target.clone()];
        let mut visited: HashSet<FieldRef> = HashSet::from([target.clone()]);
        let mut queue: VecDeque<FieldRef> = VecDeque::from([target.clone()]);

        while let Some(source) = queue.pop_front() {
            let Some(current) = store.read(&source) else {
                continue;
            };
            for link in self.slots.iter().flatten() {
                let Some(other) = link.other_end(&source) else {
                    continue;
                };
                if !visited.insert(other.clone()) {
                    continue;
                }
                match store.write(other, current.clone()) {
                    Ok(did_change) => {
                        if did_change {
                            log::debug!("propagated {source} -> {other}");
                            changed.push(other.clone());
                        }
                        queue.push_back(other.clone());
                    }
                    Err(err) => log::warn!("link {source} -> {other} rejected value: {err}"),
                }
            }
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    /// Plain map store; numeric fields are the ones whose name starts with `n`.
    #[derive(Default)]
    struct MapStore {
        values: HashMap<FieldRef, AttrValue>,
        writes: usize,
    }

    impl MapStore {
        fn with(fields: &[(&FieldRef, AttrValue)]) -> Self {
            let mut store = Self::default();
            for (f, v) in fields {
                store.values.insert((*f).clone(), v.clone());
            }
            store
        }
    }

    impl FieldStore for MapStore {
        fn read(&self, field: &FieldRef) -> Option<AttrValue> {
            self.values.get(field).cloned()
        }

        fn write(&mut self, field: &FieldRef, value: AttrValue) -> Result<bool, FieldError> {
            self.writes += 1;
            let Some(slot) = self.values.get_mut(field) else {
                return Err(FieldError::UnknownField {
                    owner: field.owner,
                    field: field.field.clone(),
                });
            };
            let value = if field.field.starts_with('n') {
                svgw_core::AttrType::Number
                    .coerce(value)
                    .map_err(|source| FieldError::Coerce {
                        owner: field.owner,
                        field: field.field.clone(),
                        source,
                    })?
            } else {
                value
            };
            if *slot == value {
                return Ok(false);
            }
            *slot = value;
            Ok(true)
        }
    }

    fn field(owner: &str, name: &str) -> FieldRef {
        FieldRef::new(NodeId::intern(owner), name)
    }

    #[test]
    fn link_copies_source_into_target() {
        let a = field("toggle", "value");
        let b = field("canvas", "mode");
        let mut store = MapStore::with(&[(&a, "rect".into()), (&b, "select".into())]);
        let mut links = Links::new();
        links.link(&mut store, a.clone(), b.clone());
        assert_eq!(store.read(&b), Some("rect".into()));
        assert_eq!(links.active_count(), 1);
    }

    #[test]
    fn writes_propagate_both_ways() {
        let a = field("toggle", "value");
        let b = field("canvas", "mode");
        let mut store = MapStore::with(&[(&a, "select".into()), (&b, "select".into())]);
        let mut links = Links::new();
        links.link(&mut store, a.clone(), b.clone());

        let changed = links.write(&mut store, &a, "circle".into()).unwrap();
        assert_eq!(changed, vec![a.clone(), b.clone()]);
        assert_eq!(store.read(&b), Some("circle".into()));

        links.write(&mut store, &b, "line".into()).unwrap();
        assert_eq!(store.read(&a), Some("line".into()));
    }

    #[test]
    fn no_ping_pong() {
        let a = field("p", "x");
        let b = field("q", "x");
        let mut store = MapStore::with(&[(&a, "0".into()), (&b, "0".into())]);
        let mut links = Links::new();
        links.link(&mut store, a.clone(), b.clone());
        store.writes = 0;

        links.write(&mut store, &a, "1".into()).unwrap();
        assert_eq!(store.writes, 2);
    }

    #[test]
    fn chains_and_cycles_settle() {
        let a = field("a", "v");
        let b = field("b", "v");
        let c = field("c", "v");
        let mut store = MapStore::with(&[(&a, "0".into()), (&b, "0".into()), (&c, "0".into())]);
        let mut links = Links::new();
        links.link(&mut store, a.clone(), b.clone());
        links.link(&mut store, b.clone(), c.clone());
        links.link(&mut store, c.clone(), a.clone());

        let changed = links.write(&mut store, &c, "9".into()).unwrap();
        assert_eq!(changed.len(), 3);
        for f in [&a, &b, &c] {
            assert_eq!(store.read(f), Some("9".into()));
        }
    }

    #[test]
    fn unlink_stops_propagation() {
        let a = field("s", "value");
        let b = field("t", "value");
        let mut store = MapStore::with(&[(&a, "x".into()), (&b, "x".into())]);
        let mut links = Links::new();
        let handle = links.link(&mut store, a.clone(), b.clone());

        assert!(links.unlink(handle));
        assert!(!links.unlink(handle));
        assert!(!links.is_active(handle));
        links.write(&mut store, &a, "y".into()).unwrap();
        assert_eq!(store.read(&b), Some("x".into()));
        assert_eq!(links.active_count(), 0);
    }

    #[test]
    fn rejected_mirror_keeps_old_value() {
        let a = field("dropdown", "value");
        let b = field("slider", "nvalue");
        let mut store = MapStore::with(&[(&a, "2".into()), (&b, AttrValue::Number(2.0))]);
        let mut links = Links::new();
        links.link(&mut store, a.clone(), b.clone());

        let changed = links.write(&mut store, &a, "wide".into()).unwrap();
        assert_eq!(changed, vec![a.clone()]);
        assert_eq!(store.read(&b), Some(AttrValue::Number(2.0)));
    }

    #[test]
    fn failed_initial_sync_still_links() {
        let a = field("text", "value");
        let b = field("slider", "nvalue");
        let mut store = MapStore::with(&[(&a, "abc".into()), (&b, AttrValue::Number(1.0))]);
        let mut links = Links::new();
        let handle = links.link(&mut store, a.clone(), b.clone());
        assert!(links.is_active(handle));
        assert_eq!(store.read(&b), Some(AttrValue::Number(1.0)));

        links.write(&mut store, &a, "4".into()).unwrap();
        assert_eq!(store.read(&b), Some(AttrValue::Number(4.0)));
    }

    #[test]
    fn rejected_origin_write_is_an_error() {
        let a = field("x", "nval");
        let mut store = MapStore::with(&[(&a, AttrValue::Number(1.0))]);
        let links = Links::new();
        assert!(links.write(&mut store, &a, "abc".into()).is_err());
        assert_eq!(store.read(&a), Some(AttrValue::Number(1.0)));
    }
}
