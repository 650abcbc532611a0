use std::collections::HashMap;

/// Maps entity ids to dense row/column positions and back.
///
/// Order is insertion order. Inserting an id that is already present is a
/// no-op, so the first occurrence decides the position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdIndex {
    ids: Vec<i64>,
    positions: HashMap<i64, usize>,
}

impl IdIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the position of `id`, adding it at the end if unseen
    pub fn insert(&mut self, id: i64) -> usize {
        if let Some(&pos) = self.positions.get(&id) {
            return pos;
        }
        let pos = self.ids.len();
        self.ids.push(id);
        self.positions.insert(id, pos);
        pos
    }

    pub fn position(&self, id: i64) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    pub fn id_at(&self, pos: usize) -> i64 {
        self.ids[pos]
    }

    pub fn contains(&self, id: i64) -> bool {
        self.positions.contains_key(&id)
    }

    pub fn ids(&self) -> &[i64] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl FromIterator<i64> for IdIndex {
    fn from_iter<T: IntoIterator<Item = i64>>(iter: T) -> Self {
        let mut index = IdIndex::new();
        for id in iter {
            index.insert(id);
        }
        index
    }
}

/// Dense square similarity matrix labelled by the same ids on both axes
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    index: IdIndex,
    values: Vec<f64>,
}

impl SimilarityMatrix {
    /// `values` is row-major with `index.len()` rows and columns
    pub(crate) fn from_parts(index: IdIndex, values: Vec<f64>) -> Self {
        debug_assert_eq!(values.len(), index.len() * index.len());
        Self { index, values }
    }

    pub fn index(&self) -> &IdIndex {
        &self.index
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Similarity between two ids, `None` when either is unknown
    pub fn get(&self, a: i64, b: i64) -> Option<f64> {
        let i = self.index.position(a)?;
        let j = self.index.position(b)?;
        Some(self.values[i * self.len() + j])
    }

    /// The full row for `id`, ordered like `index()`
    pub fn row(&self, id: i64) -> Option<&[f64]> {
        let i = self.index.position(id)?;
        let n = self.len();
        Some(&self.values[i * n..(i + 1) * n])
    }

    pub fn row_at(&self, pos: usize) -> &[f64] {
        let n = self.len();
        &self.values[pos * n..(pos + 1) * n]
    }
}

/// Binary user × session enrollment matrix
#[derive(Debug, Clone, PartialEq)]
pub struct UserItemMatrix {
    users: IdIndex,
    sessions: IdIndex,
    cells: Vec<u8>,
}

impl UserItemMatrix {
    /// All-zero matrix over the given universes
    pub fn zeros(users: IdIndex, sessions: IdIndex) -> Self {
        let cells = vec![0; users.len() * sessions.len()];
        Self {
            users,
            sessions,
            cells,
        }
    }

    /// Marks (user, session) as enrolled. Both ids must be in the universes.
    pub(crate) fn mark(&mut self, user_pos: usize, session_pos: usize) {
        let n = self.sessions.len();
        self.cells[user_pos * n + session_pos] = 1;
    }

    pub fn users(&self) -> &IdIndex {
        &self.users
    }

    pub fn sessions(&self) -> &IdIndex {
        &self.sessions
    }

    pub fn get(&self, user_id: i64, session_id: i64) -> Option<u8> {
        let i = self.users.position(user_id)?;
        let j = self.sessions.position(session_id)?;
        Some(self.cells[i * self.sessions.len() + j])
    }

    pub fn row(&self, user_id: i64) -> Option<&[u8]> {
        self.users.position(user_id).map(|i| self.row_at(i))
    }

    pub fn row_at(&self, pos: usize) -> &[u8] {
        let n = self.sessions.len();
        &self.cells[pos * n..(pos + 1) * n]
    }

    /// Number of enrolled (user, session) pairs
    pub fn enrollment_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c == 1).count()
    }
}
