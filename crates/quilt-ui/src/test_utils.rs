//! Shared test utilities for quilt graphics tests.
//!
//! Provides a [`MockBatch`] that records every vertex list it allocates so
//! tests can assert on the geometry an element uploaded.

use std::cell::RefCell;
use std::rc::Rc;

use quilt_types::backend::{
    Batch, Primitive, RenderGroup, TexCoordData, VertexData, VertexList,
};
use quilt_types::error::{QuiltError, Result};

/// Owned copy of the texture coordinates a vertex list was created with.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCoords {
    None,
    Uv(Vec<f32>),
    Uvw(Vec<f32>),
}

/// A vertex list as the mock batch last saw it.
#[derive(Debug, Clone)]
pub struct RecordedList {
    pub primitive: Primitive,
    pub group: RenderGroup,
    pub positions: Vec<i32>,
    pub colors: Vec<u8>,
    pub tex_coords: RecordedCoords,
    /// Number of `set_positions` calls.
    pub rewrites: usize,
    pub deleted: bool,
}

type Lists = Rc<RefCell<Vec<RecordedList>>>;

/// A batch that records all allocations for test assertions.
pub struct MockBatch {
    lists: Lists,
    fail: bool,
}

impl MockBatch {
    pub fn new() -> Self {
        Self {
            lists: Rc::new(RefCell::new(Vec::new())),
            fail: false,
        }
    }

    /// A batch whose every `add` fails with a backend error.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    /// Snapshot of the `index`-th allocation.
    pub fn list(&self, index: usize) -> RecordedList {
        self.lists.borrow()[index].clone()
    }

    /// Number of allocations ever made.
    pub fn len(&self) -> usize {
        self.lists.borrow().len()
    }

    /// Returns `true` when nothing has been allocated.
    pub fn is_empty(&self) -> bool {
        self.lists.borrow().is_empty()
    }

    /// Allocations not yet deleted.
    pub fn live_count(&self) -> usize {
        self.lists.borrow().iter().filter(|l| !l.deleted).count()
    }
}

impl Default for MockBatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Batch for MockBatch {
    fn add(&mut self, data: VertexData<'_>) -> Result<Box<dyn VertexList>> {
        if self.fail {
            return Err(QuiltError::Backend("mock batch is full".into()));
        }
        let count = data.count();
        assert_eq!(data.colors.len(), count * 4, "one RGBA color per vertex");
        let tex_coords = match data.tex_coords {
            TexCoordData::None => RecordedCoords::None,
            TexCoordData::Uv(c) => {
                assert_eq!(c.len(), count * 2, "two coords per vertex");
                RecordedCoords::Uv(c.to_vec())
            }
            TexCoordData::Uvw(c) => {
                assert_eq!(c.len(), count * 3, "three coords per vertex");
                RecordedCoords::Uvw(c.to_vec())
            }
        };

        let mut lists = self.lists.borrow_mut();
        lists.push(RecordedList {
            primitive: data.primitive,
            group: data.group,
            positions: data.positions.to_vec(),
            colors: data.colors.to_vec(),
            tex_coords,
            rewrites: 0,
            deleted: false,
        });
        Ok(Box::new(MockVertexList {
            index: lists.len() - 1,
            lists: Rc::clone(&self.lists),
        }))
    }
}

struct MockVertexList {
    index: usize,
    lists: Lists,
}

impl VertexList for MockVertexList {
    fn set_positions(&mut self, positions: &[i32]) {
        let mut lists = self.lists.borrow_mut();
        let list = &mut lists[self.index];
        assert!(!list.deleted, "rewrite of a deleted vertex list");
        assert_eq!(
            list.positions.len(),
            positions.len(),
            "vertex count must not change"
        );
        list.positions = positions.to_vec();
        list.rewrites += 1;
    }

    fn delete(self: Box<Self>) {
        let mut lists = self.lists.borrow_mut();
        let list = &mut lists[self.index];
        assert!(!list.deleted, "vertex list deleted twice");
        list.deleted = true;
    }
}
