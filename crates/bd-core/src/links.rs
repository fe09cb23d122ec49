//! Link descriptions, one struct per addressing mode.
//!
//! Each link says "this consumer input reads that producer output".  The
//! four modes differ only in how the two ports are named:
//!
//! | Type                | Producer named by              | Consumer named by              |
//! |---------------------|--------------------------------|--------------------------------|
//! | [`AbsoluteLink`]    | scheme-wide absolute output    | scheme-wide absolute input     |
//! | [`RelativeLink`]    | type + scheme-wide output of that type | type + scheme-wide input of that type |
//! | [`BlockLink`]       | block + block-absolute port    | block + block-absolute port    |
//! | [`RelativeBlockLink`] | block + port of the given type | block + port of the given type |
//!
//! Hosts often hold link tables as flat `u32` arrays; `from_flat` parses
//! those, rejecting lengths that are not a whole number of links.

use crate::{ConfigError, ConfigResult};

/// `(output, input)` by scheme-wide absolute index.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbsoluteLink {
    pub output: u32,
    pub input:  u32,
}

/// `(type, output, input)` by scheme-wide index within one type.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RelativeLink {
    pub type_key: u32,
    pub output:   u32,
    pub input:    u32,
}

/// `(producer, producer port, consumer, consumer port)`, ports absolute
/// within their block.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockLink {
    pub producer:      u32,
    pub producer_port: u32,
    pub consumer:      u32,
    pub consumer_port: u32,
}

/// Like [`BlockLink`] but ports are numbered within one type.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RelativeBlockLink {
    pub type_key:      u32,
    pub producer:      u32,
    pub producer_port: u32,
    pub consumer:      u32,
    pub consumer_port: u32,
}

fn chunks<const N: usize>(flat: &[u32]) -> ConfigResult<impl Iterator<Item = [u32; N]> + '_> {
    if flat.len() % N != 0 {
        return Err(ConfigError::MalformedLinkTable { len: flat.len(), stride: N });
    }
    Ok(flat.chunks_exact(N).map(|c| {
        let mut out = [0u32; N];
        out.copy_from_slice(c);
        out
    }))
}

impl AbsoluteLink {
    pub fn from_flat(flat: &[u32]) -> ConfigResult<Vec<Self>> {
        Ok(chunks::<2>(flat)?.map(|[output, input]| Self { output, input }).collect())
    }
}

impl RelativeLink {
    pub fn from_flat(flat: &[u32]) -> ConfigResult<Vec<Self>> {
        Ok(chunks::<3>(flat)?
            .map(|[type_key, output, input]| Self { type_key, output, input })
            .collect())
    }
}

impl BlockLink {
    pub fn new(producer: u32, producer_port: u32, consumer: u32, consumer_port: u32) -> Self {
        Self { producer, producer_port, consumer, consumer_port }
    }

    pub fn from_flat(flat: &[u32]) -> ConfigResult<Vec<Self>> {
        Ok(chunks::<4>(flat)?
            .map(|[producer, producer_port, consumer, consumer_port]| Self {
                producer,
                producer_port,
                consumer,
                consumer_port,
            })
            .collect())
    }
}

impl RelativeBlockLink {
    pub fn from_flat(flat: &[u32]) -> ConfigResult<Vec<Self>> {
        Ok(chunks::<5>(flat)?
            .map(|[type_key, producer, producer_port, consumer, consumer_port]| Self {
                type_key,
                producer,
                producer_port,
                consumer,
                consumer_port,
            })
            .collect())
    }
}
