//! Scoped, path-addressable style store.
//!
//! Scopes are stored in a flat arena and linked to their parent by index.
//! A lookup that misses in one scope continues in its parent, so a widget
//! state such as `button.down` only has to define what differs from
//! `button`, which in turn only defines what differs from the theme root.
//!
//! ```text
//! root            text_color = black
//! └── button      text_color = white
//!     └── down    image = ...
//! ```
//!
//! `["button", "down", "text_color"]` resolves to white: `down` has no
//! `text_color`, so the lookup falls back to `button`.

use std::collections::BTreeMap;
use std::fmt;

use quilt_types::error::{QuiltError, Result, display_path};

/// Index of a scope in its [`ScopedStore`].
pub type ScopeId = usize;

/// Something that names a key or a sequence of keys.
///
/// Implemented for `str` (a single key) and for slices, arrays and vectors of
/// strings (a path).
pub trait KeyPath {
    fn segments(&self) -> Vec<&str>;
}

impl KeyPath for str {
    fn segments(&self) -> Vec<&str> {
        vec![self]
    }
}

impl KeyPath for String {
    fn segments(&self) -> Vec<&str> {
        vec![self.as_str()]
    }
}

impl<S: AsRef<str>> KeyPath for [S] {
    fn segments(&self) -> Vec<&str> {
        self.iter().map(AsRef::as_ref).collect()
    }
}

impl<S: AsRef<str>, const N: usize> KeyPath for [S; N] {
    fn segments(&self) -> Vec<&str> {
        self.as_slice().segments()
    }
}

impl<S: AsRef<str>> KeyPath for Vec<S> {
    fn segments(&self) -> Vec<&str> {
        self.as_slice().segments()
    }
}

/// A value to assign into the store. Tables become child scopes.
#[derive(Debug, Clone, PartialEq)]
pub enum Item<V> {
    Value(V),
    Table(BTreeMap<String, Item<V>>),
}

impl<V> Item<V> {
    /// Build a table item from `(key, item)` pairs.
    pub fn table<K: Into<String>>(entries: impl IntoIterator<Item = (K, Item<V>)>) -> Self {
        Self::Table(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

#[derive(Debug, Clone)]
enum Slot<V> {
    Value(V),
    Scope(ScopeId),
}

#[derive(Debug, Clone)]
struct ScopeNode<V> {
    parent: Option<ScopeId>,
    entries: BTreeMap<String, Slot<V>>,
    live: bool,
}

impl<V> ScopeNode<V> {
    fn new(parent: Option<ScopeId>) -> Self {
        Self {
            parent,
            entries: BTreeMap::new(),
            live: true,
        }
    }
}

/// Arena of scopes rooted at [`ScopedStore::ROOT`].
///
/// Overwriting a key that held a child scope frees that scope and all of
/// its descendants: their values are dropped at once and their slots are
/// reused by later tables. A freed [`ScopeId`] may come back naming a
/// different scope.
#[derive(Debug, Clone)]
pub struct ScopedStore<V> {
    nodes: Vec<ScopeNode<V>>,
    free: Vec<ScopeId>,
}

impl<V> Default for ScopedStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> ScopedStore<V> {
    /// The root scope, which has no parent.
    pub const ROOT: ScopeId = 0;

    /// A store holding only an empty root scope.
    pub fn new() -> Self {
        Self {
            nodes: vec![ScopeNode::new(None)],
            free: Vec::new(),
        }
    }

    /// A store whose root holds `table`, with nested tables as child scopes.
    pub fn from_table(table: BTreeMap<String, Item<V>>) -> Self {
        let mut store = Self::new();
        for (key, item) in table {
            store.insert(Self::ROOT, key, item);
        }
        store
    }

    pub fn root(&self) -> Scope<'_, V> {
        Scope {
            store: self,
            id: Self::ROOT,
        }
    }

    /// View of the scope `id`, if it exists.
    pub fn scope(&self, id: ScopeId) -> Option<Scope<'_, V>> {
        self.nodes
            .get(id)
            .filter(|node| node.live)
            .map(|_| Scope { store: self, id })
    }

    /// Number of live scopes, the root included.
    pub fn scope_count(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Assign `item` to `key` directly in `scope`, never in a parent.
    ///
    /// # Panics
    ///
    /// If `scope` does not belong to this store or has been freed.
    pub fn insert(&mut self, scope: ScopeId, key: impl Into<String>, item: Item<V>) {
        assert!(self.nodes[scope].live, "insert into freed scope #{scope}");
        let slot = match item {
            Item::Value(v) => Slot::Value(v),
            Item::Table(table) => {
                let child = self.alloc(scope);
                for (k, v) in table {
                    self.insert(child, k, v);
                }
                Slot::Scope(child)
            }
        };
        if let Some(Slot::Scope(old)) = self.nodes[scope].entries.insert(key.into(), slot) {
            self.release(old);
        }
    }

    fn alloc(&mut self, parent: ScopeId) -> ScopeId {
        match self.free.pop() {
            Some(id) => {
                self.nodes[id] = ScopeNode::new(Some(parent));
                id
            }
            None => {
                self.nodes.push(ScopeNode::new(Some(parent)));
                self.nodes.len() - 1
            }
        }
    }

    /// Free `id` and every scope below it, dropping their values.
    fn release(&mut self, id: ScopeId) {
        let mut pending = vec![id];
        while let Some(id) = pending.pop() {
            let node = &mut self.nodes[id];
            let entries = std::mem::take(&mut node.entries);
            node.parent = None;
            node.live = false;
            self.free.push(id);
            pending.extend(entries.into_values().filter_map(|slot| match slot {
                Slot::Scope(child) => Some(child),
                Slot::Value(_) => None,
            }));
        }
        log::trace!("released scope #{id}; {} slots free", self.free.len());
    }

    /// Assign at `path` relative to the root. See [`ScopedStore::set_path_in`].
    pub fn set_path<P: KeyPath + ?Sized>(&mut self, path: &P, item: Item<V>) -> Result<()> {
        self.set_path_in(Self::ROOT, path, item)
    }

    /// Navigate from `scope` to the scope named by all but the last segment
    /// of `path`, then assign the last segment there.
    ///
    /// Intermediate segments resolve with scope fallback; the write itself is
    /// always local to the scope reached.
    pub fn set_path_in<P: KeyPath + ?Sized>(
        &mut self,
        scope: ScopeId,
        path: &P,
        item: Item<V>,
    ) -> Result<()> {
        let segments = path.segments();
        let (target, key) = {
            let start = self
                .scope(scope)
                .ok_or_else(|| QuiltError::KeyNotFound(format!("scope #{scope}")))?;
            let (target, key) = start.walk(&segments)?;
            (target.id, key.to_owned())
        };
        self.insert(target, key, item);
        Ok(())
    }
}

/// Result of resolving a path: a leaf value or a nested scope.
pub enum Resolved<'a, V> {
    Value(&'a V),
    Scope(Scope<'a, V>),
}

impl<'a, V> Resolved<'a, V> {
    pub fn as_value(&self) -> Option<&'a V> {
        match self {
            Self::Value(v) => Some(v),
            Self::Scope(_) => None,
        }
    }

    pub fn as_scope(&self) -> Option<Scope<'a, V>> {
        match self {
            Self::Value(_) => None,
            Self::Scope(s) => Some(*s),
        }
    }
}

impl<V> Clone for Resolved<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for Resolved<'_, V> {}

impl<V: PartialEq> PartialEq for Resolved<'_, V> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Value(a), Self::Value(b)) => a == b,
            (Self::Scope(a), Self::Scope(b)) => a == b,
            _ => false,
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for Resolved<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Scope(s) => f.debug_tuple("Scope").field(s).finish(),
        }
    }
}

/// Read-only view of one scope.
pub struct Scope<'a, V> {
    store: &'a ScopedStore<V>,
    id: ScopeId,
}

impl<V> Clone for Scope<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for Scope<'_, V> {}

impl<V> PartialEq for Scope<'_, V> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.store, other.store) && self.id == other.id
    }
}

impl<V> fmt::Debug for Scope<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("id", &self.id)
            .field("parent", &self.node().parent)
            .field("keys", &self.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<'a, V> Scope<'a, V> {
    fn node(&self) -> &'a ScopeNode<V> {
        &self.store.nodes[self.id]
    }

    fn resolve(&self, slot: &'a Slot<V>) -> Resolved<'a, V> {
        match slot {
            Slot::Value(v) => Resolved::Value(v),
            Slot::Scope(id) => Resolved::Scope(Scope {
                store: self.store,
                id: *id,
            }),
        }
    }

    pub fn id(&self) -> ScopeId {
        self.id
    }

    pub fn parent(&self) -> Option<Scope<'a, V>> {
        self.node().parent.map(|id| Scope {
            store: self.store,
            id,
        })
    }

    /// Keys defined directly in this scope.
    pub fn keys(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.node().entries.keys().map(String::as_str)
    }

    /// Number of keys defined directly in this scope.
    pub fn len(&self) -> usize {
        self.node().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node().entries.is_empty()
    }

    pub fn contains_local(&self, key: &str) -> bool {
        self.node().entries.contains_key(key)
    }

    /// Resolve `key` in this scope only.
    pub fn get_local(&self, key: &str) -> Option<Resolved<'a, V>> {
        self.node().entries.get(key).map(|slot| self.resolve(slot))
    }

    /// Resolve a single key, falling back through the parent chain.
    pub fn lookup(&self, key: &str) -> Option<Resolved<'a, V>> {
        let mut current = Some(*self);
        while let Some(scope) = current {
            if let Some(found) = scope.get_local(key) {
                return Some(found);
            }
            current = scope.parent();
        }
        None
    }

    /// Follow all but the last segment, returning the scope reached and the
    /// last segment.
    fn walk<'p>(&self, segments: &[&'p str]) -> Result<(Scope<'a, V>, &'p str)> {
        let Some((last, init)) = segments.split_last() else {
            return Err(QuiltError::EmptyPath);
        };
        let mut scope = *self;
        for (i, key) in init.iter().enumerate() {
            scope = match scope.lookup(key) {
                Some(Resolved::Scope(child)) => child,
                Some(Resolved::Value(_)) => {
                    return Err(QuiltError::NotAScope(display_path(&segments[..=i])));
                }
                None => return Err(QuiltError::KeyNotFound(display_path(&segments[..=i]))),
            };
        }
        Ok((scope, last))
    }

    /// Resolve `path`, returning `None` when the final key is missing from
    /// the whole scope chain.
    ///
    /// Every segment but the last must name a scope; an empty path is an
    /// error.
    pub fn get<P: KeyPath + ?Sized>(&self, path: &P) -> Result<Option<Resolved<'a, V>>> {
        let segments = path.segments();
        let (scope, key) = self.walk(&segments)?;
        Ok(scope.lookup(key))
    }

    /// Resolve `path` to a leaf, substituting `default` when it is missing.
    pub fn get_or<P: KeyPath + ?Sized>(&self, path: &P, default: &'a V) -> Result<&'a V> {
        match self.get(path)? {
            Some(Resolved::Value(v)) => Ok(v),
            Some(Resolved::Scope(_)) => Err(QuiltError::NotAValue(display_path(&path.segments()))),
            None => Ok(default),
        }
    }

    /// Resolve `path`, failing when the final key is missing.
    ///
    /// An empty path resolves to this scope.
    pub fn index<P: KeyPath + ?Sized>(&self, path: &P) -> Result<Resolved<'a, V>> {
        let segments = path.segments();
        if segments.is_empty() {
            return Ok(Resolved::Scope(*self));
        }
        let (scope, key) = self.walk(&segments)?;
        scope
            .lookup(key)
            .ok_or_else(|| QuiltError::KeyNotFound(display_path(&segments)))
    }

    /// [`index`](Scope::index) narrowed to a leaf value.
    pub fn value<P: KeyPath + ?Sized>(&self, path: &P) -> Result<&'a V> {
        match self.index(path)? {
            Resolved::Value(v) => Ok(v),
            Resolved::Scope(_) => Err(QuiltError::NotAValue(display_path(&path.segments()))),
        }
    }

    /// [`index`](Scope::index) narrowed to a child scope.
    pub fn scope<P: KeyPath + ?Sized>(&self, path: &P) -> Result<Scope<'a, V>> {
        match self.index(path)? {
            Resolved::Scope(s) => Ok(s),
            Resolved::Value(_) => Err(QuiltError::NotAScope(display_path(&path.segments()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(n: i32) -> Item<i32> {
        Item::Value(n)
    }

    /// root { color: 1, size: 10, button { color: 2, down { image: 3 } }, label: 7 }
    fn sample() -> ScopedStore<i32> {
        ScopedStore::from_table(BTreeMap::from([
            ("color".to_string(), v(1)),
            ("size".to_string(), v(10)),
            (
                "button".to_string(),
                Item::table([("color", v(2)), ("down", Item::table([("image", v(3))]))]),
            ),
            ("label".to_string(), v(7)),
        ]))
    }

    fn value_at<P: KeyPath + ?Sized>(store: &ScopedStore<i32>, path: &P) -> Option<i32> {
        store
            .root()
            .get(path)
            .unwrap()
            .and_then(|r| r.as_value().copied())
    }

    #[test]
    fn single_key_local_hit() {
        let store = sample();
        assert_eq!(value_at(&store, "color"), Some(1));
    }

    #[test]
    fn path_local_hit_shadows_parent() {
        let store = sample();
        assert_eq!(value_at(&store, &["button", "color"]), Some(2));
    }

    #[test]
    fn path_miss_falls_back_to_parent() {
        let store = sample();
        assert_eq!(value_at(&store, &["button", "size"]), Some(10));
        assert_eq!(value_at(&store, &["button", "down", "color"]), Some(2));
        assert_eq!(value_at(&store, &["button", "down", "size"]), Some(10));
    }

    #[test]
    fn root_miss_yields_none_or_default() {
        let store = sample();
        let root = store.root();
        assert!(root.get("missing").unwrap().is_none());
        assert_eq!(*root.get_or(&["button", "missing"], &42).unwrap(), 42);
    }

    #[test]
    fn get_or_rejects_scope() {
        let store = sample();
        let err = store.root().get_or("button", &0).unwrap_err();
        assert!(matches!(err, QuiltError::NotAValue(p) if p == "button"));
    }

    #[test]
    fn get_with_empty_path_is_error() {
        let store = sample();
        let empty: [&str; 0] = [];
        assert!(matches!(store.root().get(&empty), Err(QuiltError::EmptyPath)));
    }

    #[test]
    fn index_with_empty_path_is_self() {
        let store = sample();
        let button = store.root().scope("button").unwrap();
        let empty: Vec<&str> = Vec::new();
        assert_eq!(button.index(&empty).unwrap().as_scope(), Some(button));
    }

    #[test]
    fn index_miss_names_full_path() {
        let store = sample();
        let err = store.root().index(&["button", "down", "nope"]).unwrap_err();
        assert!(matches!(err, QuiltError::KeyNotFound(p) if p == "button.down.nope"));
    }

    #[test]
    fn intermediate_miss_is_error_even_for_get() {
        let store = sample();
        let err = store.root().get(&["panel", "color"]).unwrap_err();
        assert!(matches!(err, QuiltError::KeyNotFound(p) if p == "panel"));
    }

    #[test]
    fn intermediate_leaf_is_not_a_scope() {
        let store = sample();
        let err = store.root().get(&["button", "color", "x"]).unwrap_err();
        assert!(matches!(err, QuiltError::NotAScope(p) if p == "button.color"));
    }

    #[test]
    fn intermediate_segments_fall_back_too() {
        let store = sample();
        // `down` has no `button`, but the root does.
        let down = store.root().scope(&["button", "down"]).unwrap();
        assert_eq!(down.value(&["button", "color"]).unwrap(), &2);
    }

    #[test]
    fn value_and_scope_narrowing() {
        let store = sample();
        let root = store.root();
        assert!(matches!(root.value("button"), Err(QuiltError::NotAValue(_))));
        assert!(matches!(root.scope("color"), Err(QuiltError::NotAScope(_))));
    }

    #[test]
    fn child_scopes_link_to_assigning_scope() {
        let store = sample();
        let button = store.root().scope("button").unwrap();
        let down = button.scope("down").unwrap();
        assert_eq!(down.parent(), Some(button));
        assert_eq!(button.parent(), Some(store.root()));
        assert_eq!(store.root().parent(), None);
    }

    #[test]
    fn keys_are_local_only() {
        let store = sample();
        let button = store.root().scope("button").unwrap();
        assert_eq!(button.keys().collect::<Vec<_>>(), vec!["color", "down"]);
        assert_eq!(button.len(), 2);
        assert!(!button.contains_local("size"));
        assert!(button.get_local("size").is_none());
        assert!(button.lookup("size").is_some());
    }

    #[test]
    fn set_path_writes_locally() {
        let mut store = sample();
        store.set_path(&["button", "size"], v(99)).unwrap();
        assert_eq!(value_at(&store, &["button", "size"]), Some(99));
        assert_eq!(value_at(&store, "size"), Some(10));
    }

    #[test]
    fn set_path_with_table_creates_child_scope() {
        let mut store = sample();
        store
            .set_path(&["button", "hover"], Item::table([("image", v(5))]))
            .unwrap();
        let hover = store.root().scope(&["button", "hover"]).unwrap();
        assert_eq!(hover.parent(), store.root().scope("button").ok());
        assert_eq!(hover.value("image").unwrap(), &5);
        assert_eq!(hover.value("color").unwrap(), &2);
    }

    #[test]
    fn set_path_empty_is_error() {
        let mut store = sample();
        let empty: [&str; 0] = [];
        assert!(matches!(
            store.set_path(&empty, v(1)),
            Err(QuiltError::EmptyPath)
        ));
    }

    #[test]
    fn overwriting_scope_with_value() {
        let mut store = sample();
        store.set_path("button", v(0)).unwrap();
        assert_eq!(value_at(&store, "button"), Some(0));
        assert!(store.root().get(&["button", "color"]).is_err());
    }

    #[test]
    fn overwritten_subtree_is_freed() {
        let mut store = sample();
        assert_eq!(store.scope_count(), 3);
        let down = store.root().scope(&["button", "down"]).unwrap().id();
        for n in 0..100 {
            store
                .set_path("button", Item::table([("inner", Item::table([("x", v(n))]))]))
                .unwrap();
            assert_eq!(store.scope_count(), 3);
        }
        assert_eq!(value_at(&store, &["button", "inner", "x"]), Some(99));
        assert_eq!(value_at(&store, &["button", "inner", "size"]), Some(10));
        assert!(store.root().get(&["button", "down"]).is_err());
        // The old `down` slot now holds a live scope again or nothing.
        if let Some(s) = store.scope(down) {
            assert!(!s.contains_local("image"));
        }
    }

    #[test]
    fn replaced_values_are_dropped() {
        use std::rc::Rc;

        let shared = Rc::new(5);
        let mut store = ScopedStore::new();
        let nested = || {
            Item::table([(
                "a",
                Item::table([("b", Item::Value(Rc::clone(&shared)))]),
            )])
        };
        store.insert(ScopedStore::<Rc<i32>>::ROOT, "button", nested());
        assert_eq!(Rc::strong_count(&shared), 2);
        store.insert(ScopedStore::<Rc<i32>>::ROOT, "button", Item::Value(Rc::new(0)));
        assert_eq!(Rc::strong_count(&shared), 1);
        assert_eq!(store.scope_count(), 1);
    }

    #[test]
    fn freed_scope_ids_are_unknown() {
        let mut store = sample();
        let down = store.root().scope(&["button", "down"]).unwrap().id();
        store.set_path("button", v(0)).unwrap();
        assert_eq!(store.scope_count(), 1);
        assert!(store.scope(down).is_none());
        assert!(store.set_path_in(down, "x", v(1)).is_err());
    }

    #[test]
    #[should_panic(expected = "freed scope")]
    fn insert_into_freed_scope_panics() {
        let mut store = sample();
        let down = store.root().scope(&["button", "down"]).unwrap().id();
        store.set_path("button", v(0)).unwrap();
        store.insert(down, "x", v(1));
    }

    #[test]
    fn unknown_scope_id() {
        let mut store = sample();
        assert!(store.scope(1000).is_none());
        assert!(store.set_path_in(1000, "x", v(1)).is_err());
    }

    mod prop {
        use super::*;
        use proptest::collection::btree_map;
        use proptest::prelude::*;

        const KEYS: &[&str] = &["a", "b", "c", "d", "e"];

        fn level() -> impl Strategy<Value = BTreeMap<String, i32>> {
            btree_map(
                proptest::sample::select(KEYS).prop_map(str::to_string),
                any::<i32>(),
                0..KEYS.len(),
            )
        }

        /// Build a chain root > s1 > s2 > ... named `scope` at every level.
        fn chain(levels: &[BTreeMap<String, i32>]) -> ScopedStore<i32> {
            let mut store = ScopedStore::new();
            let mut path: Vec<String> = Vec::new();
            for level in levels {
                let table = Item::table(level.iter().map(|(k, n)| (k.clone(), Item::Value(*n))));
                if path.is_empty() {
                    if let Item::Table(t) = table {
                        for (k, item) in t {
                            store.insert(ScopedStore::<i32>::ROOT, k, item);
                        }
                    }
                } else {
                    store.set_path(&path, table).unwrap();
                }
                path.push("scope".to_string());
            }
            store
        }

        proptest! {
            #[test]
            fn miss_delegates_to_parent(levels in proptest::collection::vec(level(), 2..5)) {
                let store = chain(&levels);
                let mut scope = store.root();
                for _ in 1..levels.len() {
                    let child = scope.scope("scope").unwrap();
                    for key in KEYS {
                        if !child.contains_local(key) {
                            prop_assert_eq!(child.get(*key).unwrap(), scope.get(*key).unwrap());
                        }
                    }
                    scope = child;
                }
            }

            #[test]
            fn local_value_shadows_every_ancestor(levels in proptest::collection::vec(level(), 1..5)) {
                let store = chain(&levels);
                let mut scope = store.root();
                for (depth, level) in levels.iter().enumerate() {
                    for (key, n) in level {
                        prop_assert_eq!(scope.value(key.as_str()).unwrap(), n);
                    }
                    if depth + 1 < levels.len() {
                        scope = scope.scope("scope").unwrap();
                    }
                }
            }

            #[test]
            fn path_resolution_is_associative(
                levels in proptest::collection::vec(level(), 3..4),
                key in proptest::sample::select(KEYS),
            ) {
                let store = chain(&levels);
                let root = store.root();
                let whole = root.get(&["scope", "scope", key]).unwrap();
                let a = root.scope("scope").unwrap();
                let split = a.get(&["scope", key]).unwrap();
                let stepwise = a.scope("scope").unwrap().get(&[key]).unwrap();
                prop_assert_eq!(whole, split);
                prop_assert_eq!(split, stepwise);
            }

            #[test]
            fn set_path_never_touches_parent(
                levels in proptest::collection::vec(level(), 2..4),
                key in proptest::sample::select(KEYS),
                n in any::<i32>(),
            ) {
                let mut store = chain(&levels);
                let child = store.root().scope("scope").unwrap().id();
                let had = store.root().get_local(key).and_then(|r| r.as_value().copied());

                store.set_path_in(child, key, Item::Value(n)).unwrap();

                let root = store.root();
                prop_assert_eq!(root.get_local(key).and_then(|r| r.as_value().copied()), had);
                let child = root.scope("scope").unwrap();
                prop_assert_eq!(child.parent(), Some(root));
                prop_assert_eq!(child.value(key).unwrap(), &n);
            }
        }
    }
}
