//! Staging file encoding
//!
//! Format: 4-byte magic `TWIX`, 4-byte little-endian version, then bincode of
//! the nested node records followed by the root hash. Children are written in
//! name order, so the same logical tree always encodes to the same bytes.
//! Decoding recomputes every directory hash and checks the stored root hash.

use crate::error::StorageError;
use crate::tree::mem::MemTree;
use crate::tree::node::{DirectoryNode, Node};
use crate::tree::path::validate_name;
use crate::tree::TreeView;
use crate::types::Hash;
use bincode::Options;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const INDEX_MAGIC: &[u8; 4] = b"TWIX";
const INDEX_VERSION_V1: u32 = 1;
const HEADER_LEN: usize = 8;

#[derive(Debug, Serialize, Deserialize)]
enum NodeRecord {
    File { content_hash: Hash },
    Directory { children: Vec<(String, NodeRecord)> },
}

#[derive(Debug, Serialize, Deserialize)]
struct IndexRecord {
    root: NodeRecord,
    root_hash: Hash,
}

fn bincode_options(limit: u64) -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
        .with_limit(limit)
        .reject_trailing_bytes()
}

/// Encode a tree into the staging file format
pub fn encode(tree: &MemTree) -> Result<Vec<u8>, StorageError> {
    let record = IndexRecord {
        root: to_record(tree.root_node()),
        root_hash: tree.hash(),
    };

    let payload = bincode_options(u64::MAX)
        .serialize(&record)
        .map_err(|e| StorageError::Serialization(format!("Failed to encode tree: {}", e)))?;

    let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
    bytes.extend_from_slice(INDEX_MAGIC);
    bytes.extend_from_slice(&INDEX_VERSION_V1.to_le_bytes());
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

/// Decode a tree from the staging file format
pub fn decode(bytes: &[u8]) -> Result<MemTree, StorageError> {
    if bytes.len() < HEADER_LEN {
        return Err(StorageError::Serialization(
            "Staging file too short".to_string(),
        ));
    }
    if &bytes[0..4] != INDEX_MAGIC {
        return Err(StorageError::Serialization(
            "Staging file has an unknown magic number".to_string(),
        ));
    }
    let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    if version != INDEX_VERSION_V1 {
        return Err(StorageError::Serialization(format!(
            "Unsupported staging file version: {}",
            version
        )));
    }

    let payload = &bytes[HEADER_LEN..];
    let record: IndexRecord = bincode_options(payload.len() as u64)
        .deserialize(payload)
        .map_err(|e| StorageError::Serialization(format!("Failed to decode tree: {}", e)))?;

    let root = match from_record(record.root)? {
        Node::Directory(dir) => dir,
        Node::File(_) => {
            return Err(StorageError::Serialization(
                "Staging file root is not a directory".to_string(),
            ))
        }
    };

    if root.hash() != record.root_hash {
        return Err(StorageError::HashMismatch {
            expected: record.root_hash,
            actual: root.hash(),
        });
    }

    Ok(MemTree::from_root(root))
}

fn to_record(node: &Node) -> NodeRecord {
    match node {
        Node::File(file) => NodeRecord::File {
            content_hash: file.content_hash,
        },
        Node::Directory(dir) => NodeRecord::Directory {
            children: dir
                .children()
                .map(|(name, child)| (name.to_string(), to_record(child)))
                .collect(),
        },
    }
}

fn from_record(record: NodeRecord) -> Result<Node, StorageError> {
    match record {
        NodeRecord::File { content_hash } => Ok(Node::file(content_hash)),
        NodeRecord::Directory { children } => {
            let mut entries = BTreeMap::new();
            let mut previous: Option<String> = None;
            for (name, child) in children {
                validate_name(&name).map_err(|reason| {
                    StorageError::Serialization(format!("Invalid entry name {:?}: {}", name, reason))
                })?;
                if let Some(prev) = &previous {
                    if prev.as_str() >= name.as_str() {
                        return Err(StorageError::Serialization(format!(
                            "Entries out of order or duplicated: {:?} after {:?}",
                            name, prev
                        )));
                    }
                }
                let node = from_record(child)?;
                previous = Some(name.clone());
                entries.insert(name, node);
            }
            Ok(Node::Directory(DirectoryNode::from_children(entries)))
        }
    }
}
