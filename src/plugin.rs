//! Explicit node registration, done once at plugin load and undone at unload.

use crate::error::{LSystemError, Result};
use crate::node::{
    LSYSTEM_INSTANCE_NODE_ID, LSYSTEM_INSTANCE_NODE_NAME, LSystemInstanceNode, Node,
    RANDOM_NODE_ID, RANDOM_NODE_NAME, RandomNode,
};
use std::fmt;
use std::path::{Path, PathBuf};

/// Per-load plugin state handed to node creators.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PluginContext {
    load_path: PathBuf,
}

impl PluginContext {
    pub fn new(load_path: impl Into<PathBuf>) -> Self {
        Self {
            load_path: load_path.into(),
        }
    }

    /// Directory that relative grammar files are resolved against.
    pub fn load_path(&self) -> &Path {
        &self.load_path
    }
}

pub type NodeCreator = fn(&PluginContext) -> Box<dyn Node>;

/// A registered node type.
#[derive(Clone, Copy)]
pub struct NodeDescriptor {
    pub name: &'static str,
    pub type_id: u32,
    pub creator: NodeCreator,
}

impl fmt::Debug for NodeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeDescriptor")
            .field("name", &self.name)
            .field("type_id", &format_args!("{:#06x}", self.type_id))
            .finish()
    }
}

/// The set of node types known to the host.
#[derive(Debug, Default)]
pub struct NodeRegistry {
    nodes: Vec<NodeDescriptor>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node type. Both its name and its type id must be unused.
    pub fn register(&mut self, descriptor: NodeDescriptor) -> Result<()> {
        if self
            .nodes
            .iter()
            .any(|n| n.name == descriptor.name || n.type_id == descriptor.type_id)
        {
            return Err(LSystemError::NodeAlreadyRegistered {
                name: descriptor.name.to_string(),
            });
        }
        tracing::info!(
            node = descriptor.name,
            type_id = descriptor.type_id,
            "registered node"
        );
        self.nodes.push(descriptor);
        Ok(())
    }

    /// Removes a node type by id, returning its descriptor.
    pub fn deregister(&mut self, type_id: u32) -> Result<NodeDescriptor> {
        let idx = self
            .nodes
            .iter()
            .position(|n| n.type_id == type_id)
            .ok_or(LSystemError::NodeNotRegistered { type_id })?;
        let descriptor = self.nodes.remove(idx);
        tracing::info!(node = descriptor.name, type_id, "deregistered node");
        Ok(descriptor)
    }

    pub fn get(&self, name: &str) -> Option<&NodeDescriptor> {
        self.nodes.iter().find(|n| n.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Instantiates a node by type name.
    pub fn create(&self, name: &str, ctx: &PluginContext) -> Option<Box<dyn Node>> {
        self.get(name).map(|n| (n.creator)(ctx))
    }
}

fn create_random_node(_ctx: &PluginContext) -> Box<dyn Node> {
    Box::new(RandomNode::default())
}

fn create_lsystem_instance_node(ctx: &PluginContext) -> Box<dyn Node> {
    Box::new(LSystemInstanceNode::new(ctx.load_path()))
}

/// Descriptors for every node this plugin provides.
pub fn node_descriptors() -> [NodeDescriptor; 2] {
    [
        NodeDescriptor {
            name: RANDOM_NODE_NAME,
            type_id: RANDOM_NODE_ID,
            creator: create_random_node,
        },
        NodeDescriptor {
            name: LSYSTEM_INSTANCE_NODE_NAME,
            type_id: LSYSTEM_INSTANCE_NODE_ID,
            creator: create_lsystem_instance_node,
        },
    ]
}

/// Registers both nodes. On failure, nodes registered by this call are rolled back.
pub fn initialize_plugin(
    registry: &mut NodeRegistry,
    load_path: impl Into<PathBuf>,
) -> Result<PluginContext> {
    let mut added = Vec::new();
    for descriptor in node_descriptors() {
        if let Err(e) = registry.register(descriptor) {
            for type_id in added {
                let _ = registry.deregister(type_id);
            }
            return Err(e);
        }
        added.push(descriptor.type_id);
    }
    Ok(PluginContext::new(load_path))
}

/// Deregisters both nodes. Every node is attempted; the first failure is returned.
pub fn uninitialize_plugin(registry: &mut NodeRegistry) -> Result<()> {
    let mut result = Ok(());
    for descriptor in node_descriptors() {
        if let Err(e) = registry.deregister(descriptor.type_id) {
            tracing::warn!(error = %e, node = descriptor.name, "failed to deregister node");
            if result.is_ok() {
                result = Err(e);
            }
        }
    }
    result
}
