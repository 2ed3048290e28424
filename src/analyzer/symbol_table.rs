use std::ops::{Index, IndexMut};

use log::debug;

use super::{Symbol, SymbolId, SymbolKind};

/// Number of hash buckets. Prime, from the hashpjw description in the dragon book.
pub const TABLE_SIZE: usize = 211;

#[derive(Clone, Debug)]
struct Entry {
    symbol: Symbol,
    next: Option<SymbolId>,
}

/// Depth-tagged chained hash table over an arena of records.
///
/// Every bucket is a singly linked chain threaded through the arena, newest
/// record first, so a lookup always finds the innermost declaration of a
/// name. Deleted records leave a tombstone in the arena: their ids are never
/// handed out again.
#[derive(Clone, Debug)]
pub struct SymbolTable {
    buckets: Vec<Option<SymbolId>>,
    arena: Vec<Option<Entry>>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            buckets: vec![None; TABLE_SIZE],
            arena: vec![],
        }
    }

    /// hashpjw
    pub fn hash(name: &str) -> usize {
        let mut h: u32 = 0;
        for c in name.chars() {
            h = (h << 4).wrapping_add(c as u32);
            let g = h & 0xf000_0000;
            if g != 0 {
                h ^= g >> 24;
                h ^= g;
            }
        }
        h as usize % TABLE_SIZE
    }

    /// Creates a new record at the head of its bucket. An existing record with
    /// the same name stays in the chain, hidden until this one is deleted.
    pub fn insert(&mut self, name: &str, kind: SymbolKind, depth: usize) -> SymbolId {
        let bucket = Self::hash(name);
        let id = SymbolId(self.arena.len());
        self.arena.push(Some(Entry {
            symbol: Symbol::new(name, kind, depth),
            next: self.buckets[bucket],
        }));
        self.buckets[bucket] = Some(id);
        id
    }

    /// Innermost live record named `name`.
    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        let mut cursor = self.buckets[Self::hash(name)];
        while let Some(id) = cursor {
            let entry = self.entry(id)?;
            if entry.symbol.name == name {
                return Some(id);
            }
            cursor = entry.next;
        }
        None
    }

    pub fn lookup_symbol(&self, name: &str) -> Option<&Symbol> {
        self.lookup(name).and_then(|id| self.get(id))
    }

    fn entry(&self, id: SymbolId) -> Option<&Entry> {
        self.arena.get(id.0).and_then(|e| e.as_ref())
    }

    /// `None` once the record's depth has been deleted.
    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.entry(id).map(|e| &e.symbol)
    }

    pub fn get_mut(&mut self, id: SymbolId) -> Option<&mut Symbol> {
        self.arena
            .get_mut(id.0)
            .and_then(|e| e.as_mut())
            .map(|e| &mut e.symbol)
    }

    pub fn is_live(&self, id: SymbolId) -> bool {
        self.entry(id).is_some()
    }

    /// Removes every record declared at `depth`. Depths 0 and 1 (global and
    /// class level) are never torn down.
    pub fn delete_depth(&mut self, depth: usize) {
        if depth < 2 {
            return;
        }

        let mut removed = 0;
        for bucket in 0..TABLE_SIZE {
            // Records deeper than `depth` should not exist under strict
            // nesting; they are stepped over and left linked.
            let mut prev: Option<SymbolId> = None;
            let mut cursor = self.buckets[bucket];
            while let Some(id) = cursor {
                let Some(entry) = self.entry(id) else { break };
                if entry.symbol.depth <= depth {
                    break;
                }
                prev = Some(id);
                cursor = entry.next;
            }

            while let Some(id) = cursor {
                let Some(entry) = self.entry(id) else { break };
                if entry.symbol.depth != depth {
                    break;
                }
                cursor = entry.next;
                self.arena[id.0] = None;
                removed += 1;
            }

            match prev {
                Some(p) => {
                    if let Some(Some(entry)) = self.arena.get_mut(p.0) {
                        entry.next = cursor;
                    }
                }
                None => self.buckets[bucket] = cursor,
            }
        }

        debug!("deleted {} symbol(s) at depth {}", removed, depth);
    }

    /// Live records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.arena
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.as_ref().map(|e| (SymbolId(i), &e.symbol)))
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Most negative offset held by any live record (0 if none is negative).
    pub fn min_offset(&self) -> i32 {
        self.iter().map(|(_, s)| s.offset).fold(0, i32::min)
    }

    /// Sum of `size` over the live records at `depth`.
    pub fn depth_size(&self, depth: usize) -> i32 {
        self.iter()
            .filter(|(_, s)| s.depth == depth)
            .map(|(_, s)| s.size)
            .sum()
    }

    pub fn symbols_at_depth(&self, depth: usize) -> Vec<&Symbol> {
        self.iter()
            .filter(|(_, s)| s.depth == depth)
            .map(|(_, s)| s)
            .collect()
    }

    pub fn children_of(&self, owner: SymbolId) -> Vec<&Symbol> {
        self.iter()
            .filter(|(_, s)| s.owner == Some(owner))
            .map(|(_, s)| s)
            .collect()
    }

    /// Name of a record's owner, if it has one that is still live.
    pub fn owner_name(&self, id: SymbolId) -> Option<&str> {
        let owner = self.get(id)?.owner?;
        self.get(owner).map(|s| s.name.as_str())
    }

    /// Method `method` declared by class `class`.
    pub fn find_method(&self, class: &str, method: &str) -> Option<&Symbol> {
        self.iter()
            .filter(|(_, s)| s.is_method() && s.name == method)
            .find(|(id, _)| self.owner_name(*id) == Some(class))
            .map(|(_, s)| s)
    }

    fn describe_child(symbol: &Symbol) -> String {
        let ty = symbol.value_type();
        let mut s = symbol.passing_mode().prefix().to_string();
        if ty.sizeof() > 0 {
            s.push_str(ty.name());
            s.push(' ');
        }
        s.push_str(&symbol.name);
        s
    }

    /// Children of `owner` one per line, for the table dump.
    pub fn children_print(&self, owner: SymbolId) -> String {
        let mut s = String::from("\n");
        for child in self.children_of(owner) {
            s.push_str(" => ");
            s.push_str(&Self::describe_child(child));
            s.push('\n');
        }
        s
    }

    /// Human readable listing of one depth.
    pub fn write_table(&self, depth: usize) -> String {
        let mut out = format!("Symbol Table - Depth {}\n----------------------\n", depth);
        for symbol in self.symbols_at_depth(depth) {
            out.push_str(&symbol.to_string());
            out.push('\n');
        }
        out
    }
}

impl Index<SymbolId> for SymbolTable {
    type Output = Symbol;

    fn index(&self, id: SymbolId) -> &Symbol {
        self.get(id)
            .unwrap_or_else(|| panic!("symbol {:?} has been deleted", id))
    }
}

impl IndexMut<SymbolId> for SymbolTable {
    fn index_mut(&mut self, id: SymbolId) -> &mut Symbol {
        self.get_mut(id)
            .unwrap_or_else(|| panic!("symbol {:?} has been deleted", id))
    }
}
