//! State shared by the two map flavors.
//!
//! Both flavors are a thin policy layer over the same base: the root table
//! (always fixed, always present — emptiness is an entry count of zero),
//! the entry count, and the two option-derived flags.

use std::fmt;

use crate::config::Config;
use crate::counts::{self, Counts};
use crate::iter::Iter;
use crate::key;
use crate::map::TableOption;
use crate::node::Node;
use crate::ops;
use crate::table::{FixedTable, Table};

pub(crate) struct Base<C: Config, V> {
    pub(crate) root: Table<C, V>,
    pub(crate) nentries: usize,
    pub(crate) grade: bool,
    pub(crate) start_fixed: bool,
}

impl<C: Config, V> Base<C, V> {
    pub(crate) fn new(opt: TableOption) -> Self {
        let (grade, start_fixed) = opt.flags();
        Self {
            root: Table::Fixed(FixedTable::new(0, 0)),
            nentries: 0,
            grade,
            start_fixed,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.nentries == 0
    }

    pub(crate) fn get(&self, key: &[u8]) -> Option<&V> {
        if self.is_empty() {
            return None;
        }
        ops::get::lookup(&self.root, C::hash(key), key)
    }

    /// Copies the table graph; leaves stay shared.
    pub(crate) fn deep_copy(&self) -> Self {
        Self {
            root: self.root.deep_copy(),
            nentries: self.nentries,
            grade: self.grade,
            start_fixed: self.start_fixed,
        }
    }

    pub(crate) fn count(&self) -> (u32, Counts) {
        counts::count::<C, V>(&self.root, self.nentries)
    }

    pub(crate) fn iter(&self) -> Iter<'_, C, V> {
        Iter::new(&self.root)
    }

    /// Full recursive dump, one node per line.
    pub(crate) fn long_string(&self, name: &str, indent: &str) -> String
    where
        V: fmt::Debug,
    {
        let mut out = format!("{indent}{name}{{ nentries: {}, root:\n", self.nentries);
        write_table(&self.root, &mut out, indent, 1);
        out.push_str(indent);
        out.push('}');
        out
    }
}

// Shallow copy: the root's children are shared handles.
impl<C: Config, V> Clone for Base<C, V> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            nentries: self.nentries,
            grade: self.grade,
            start_fixed: self.start_fixed,
        }
    }
}

fn write_table<C: Config, V: fmt::Debug>(
    table: &Table<C, V>,
    out: &mut String,
    indent: &str,
    level: usize,
) {
    let pad = format!("{indent}{}", "  ".repeat(level));
    let kind = match table {
        Table::Fixed(_) => "FixedTable",
        Table::Sparse(_) => "SparseTable",
    };
    out.push_str(&format!(
        "{pad}{kind}{{ depth: {}, path: {}, nentries: {} }}\n",
        table.depth(),
        key::hash_path_string::<C>(table.hash_path(), table.depth()),
        table.nentries(),
    ));
    for (idx, node) in table.entries() {
        match &**node {
            Node::Leaf(leaf) => {
                out.push_str(&format!("{pad}  [{idx:02}]: {}\n", leaf.summary()));
            }
            Node::Table(child) => {
                out.push_str(&format!("{pad}  [{idx:02}]:\n"));
                write_table(child, out, indent, level + 2);
            }
        }
    }
}
