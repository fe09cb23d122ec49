//! Port types and the process-wide type registry.
//!
//! The engine stores every output of one type in one contiguous arena, so the
//! set of port types is closed: [`PortType`] enumerates it and each variant
//! carries a stable numeric key.  Absolute port numbering walks a block's
//! port sets in ascending key order.
//!
//! [`TypeRegistry`] maps raw keys (as they arrive from hosts and link tables)
//! to a [`TypeDescriptor`].  It is built once and read-only afterwards.

use std::fmt;
use std::sync::OnceLock;

use crate::{ConfigError, ConfigResult};

// ── PortType ──────────────────────────────────────────────────────────────────

/// Element type of a port set.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u32)]
pub enum PortType {
    Bool = 1,
    Byte = 2,
    Int  = 3,
    Real = 5,
    Time = 6,
}

impl PortType {
    /// Every type in ascending key order.
    pub const ALL: [PortType; 5] = [
        PortType::Bool,
        PortType::Byte,
        PortType::Int,
        PortType::Real,
        PortType::Time,
    ];

    /// Stable numeric key used by link tables and hosts.
    #[inline]
    pub fn key(self) -> u32 {
        self as u32
    }

    /// Position of this type in [`PortType::ALL`].
    #[inline]
    pub fn ordinal(self) -> usize {
        match self {
            PortType::Bool => 0,
            PortType::Byte => 1,
            PortType::Int  => 2,
            PortType::Real => 3,
            PortType::Time => 4,
        }
    }

    /// Descriptor from the global registry.
    pub fn descriptor(self) -> &'static TypeDescriptor {
        &TypeRegistry::global().entries[self.ordinal()]
    }
}

impl fmt::Display for PortType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.descriptor().name)
    }
}

// ── TypeDescriptor ────────────────────────────────────────────────────────────

/// Size and naming information for one port type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeDescriptor {
    pub ty:       PortType,
    /// Element size in bytes.
    pub size:     usize,
    /// Element type name in generated source (`double`).
    pub name:     &'static str,
    /// Arena name in generated source (`reals`).
    pub codename: &'static str,
}

// ── TypeRegistry ──────────────────────────────────────────────────────────────

/// Read-only lookup from raw type keys to descriptors.
#[derive(Debug)]
pub struct TypeRegistry {
    entries: Vec<TypeDescriptor>,
}

impl TypeRegistry {
    /// The registry shared by the whole process, populated on first use.
    pub fn global() -> &'static TypeRegistry {
        static REGISTRY: OnceLock<TypeRegistry> = OnceLock::new();
        REGISTRY.get_or_init(TypeRegistry::standard)
    }

    fn standard() -> Self {
        let entry = |ty, size, name, codename| TypeDescriptor { ty, size, name, codename };
        Self {
            entries: vec![
                entry(PortType::Bool, 1, "bool", "bools"),
                entry(PortType::Byte, 1, "uint8_t", "bytes"),
                entry(PortType::Int,  4, "int", "ints"),
                entry(PortType::Real, 8, "double", "reals"),
                entry(PortType::Time, 8, "long long", "times"),
            ],
        }
    }

    /// Descriptor for a raw key.
    pub fn lookup(&self, key: u32) -> ConfigResult<&TypeDescriptor> {
        self.entries
            .iter()
            .find(|d| d.ty.key() == key)
            .ok_or(ConfigError::UnknownType(key))
    }

    /// Resolve a raw key to its [`PortType`].
    pub fn resolve(&self, key: u32) -> ConfigResult<PortType> {
        self.lookup(key).map(|d| d.ty)
    }

    pub fn size_of(&self, key: u32) -> ConfigResult<usize> {
        self.lookup(key).map(|d| d.size)
    }

    pub fn name_of(&self, key: u32) -> ConfigResult<&'static str> {
        self.lookup(key).map(|d| d.name)
    }

    pub fn codename_of(&self, key: u32) -> ConfigResult<&'static str> {
        self.lookup(key).map(|d| d.codename)
    }

    /// All descriptors in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.entries.iter()
    }
}
