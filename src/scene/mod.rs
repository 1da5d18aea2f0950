//! 场景图模块
//!
//! 节点池式的场景树：[`Scene`] 持有所有 [`Node`]，[`NodeId`] 是非拥有的代数句柄。

mod graph;
mod node;
mod transform;

pub use graph::{NodeId, RenderItem, Scene};
pub use node::Node;
pub use transform::Transform;
