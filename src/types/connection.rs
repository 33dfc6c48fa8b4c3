//! Connections (perforations) and the per-well connection set

use super::state::{ConnectionState, Direction};
use serde::{Deserialize, Serialize};

/// A single perforation of a well into one grid cell.
///
/// Grid coordinates are stored 0-based. The completion number is the unit of
/// bulk addressing and is stable unless a lumping record reassigns it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Connection {
    pub i: usize,
    pub j: usize,
    pub k: usize,
    pub global_index: usize,
    pub state: ConnectionState,
    pub direction: Direction,
    pub complnum: u32,
    pub connection_factor: Option<f64>,
    pub diameter: Option<f64>,
    pub kh: Option<f64>,
    pub skin_factor: f64,
    pub sat_table_id: Option<u32>,
}

impl Connection {
    pub fn is_open(&self) -> bool {
        self.state == ConnectionState::Open
    }

    pub fn same_cell(&self, i: usize, j: usize, k: usize) -> bool {
        self.i == i && self.j == j && self.k == k
    }
}

/// Ordered set of a well's connections, in creation order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WellConnections {
    pub(crate) connections: Vec<Connection>,
}

impl WellConnections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Connection> {
        self.connections.iter()
    }

    pub fn get(&self, i: usize, j: usize, k: usize) -> Option<&Connection> {
        self.connections.iter().find(|c| c.same_cell(i, j, k))
    }

    pub fn num_open(&self) -> usize {
        self.connections.iter().filter(|c| c.is_open()).count()
    }

    /// True when at least one connection exists and none of them is open
    pub fn all_shut(&self) -> bool {
        !self.connections.is_empty() && self.num_open() == 0
    }

    pub fn max_complnum(&self) -> u32 {
        self.connections.iter().map(|c| c.complnum).max().unwrap_or(0)
    }

    pub fn with_complnum(&self, complnum: u32) -> impl Iterator<Item = &Connection> {
        self.connections.iter().filter(move |c| c.complnum == complnum)
    }
}

impl<'a> IntoIterator for &'a WellConnections {
    type Item = &'a Connection;
    type IntoIter = std::slice::Iter<'a, Connection>;

    fn into_iter(self) -> Self::IntoIter {
        self.connections.iter()
    }
}
