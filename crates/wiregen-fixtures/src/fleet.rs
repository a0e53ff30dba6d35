//! Types described by `schema.json`.

use std::collections::{BTreeMap, HashMap};

use wiregen_runtime::Complex32;

mod fleet_wire {
    include!(concat!(env!("OUT_DIR"), "/fleet_wire.rs"));
}

pub const SLOTS: usize = 4;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header {
    pub id: u16,
    pub flags: u8,
    pub ok: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Cell(pub i16, pub bool);

/// Every construct the generator handles, in one record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fleet {
    /// Embedded; reached through the snake_case type name.
    pub header: Header,
    pub cells: [Cell; 3],
    pub grid: Vec<Vec<String>>,
    pub index: HashMap<String, BTreeMap<u32, Vec<u8>>>,
    pub span: (u64, f32),
    pub slots: [u8; SLOTS],
    pub r#try: u8,
    pub r#type: i64,
    pub phase: Complex32,
    pub size: usize,
    pub offset: isize,
    pub ratio: f64,
    pub notes: Vec<Header>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ids(pub Vec<u32>);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Empty {}
