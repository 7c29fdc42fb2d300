//! Octree color quantization.
//!
//! Each sampled color is inserted along its RGB bit planes, most significant bit first,
//! so that a node at level `l` covers all colors sharing their top `l` bits.
//! Nodes that hold pixel data are tracked per level.
//! While there are more data nodes than requested colors,
//! a data node from the deepest level is folded into its parent.
//!
//! Nodes live in a flat arena and refer to each other by `u32` index.

use crate::{color::from_point, sample::sample, OctreeOptions, PixelBuffer, Result};
use palette::Srgb;

/// The index of the root node in the arena.
const ROOT: u32 = 0;

/// A node in the octree arena.
#[derive(Debug, Clone, Default)]
struct Node {
    /// The per-channel sum of the colors folded into this node.
    sum: [u64; 3],
    /// The number of colors folded into this node.
    count: u32,
    /// The arena indices of the children.
    children: [Option<u32>; 8],
    /// The arena index of the parent, or [`ROOT`] for the root itself.
    parent: u32,
    /// The depth of this node, where the root is `0`.
    level: u8,
}

/// An octree stored in an arena with data-bearing nodes listed per level.
#[derive(Debug, Clone)]
struct Octree {
    /// The node arena.
    nodes: Vec<Node>,
    /// For each level, the nodes at that level with a nonzero count.
    levels: Vec<Vec<u32>>,
    /// The total number of nodes with a nonzero count.
    data_nodes: usize,
    /// The deepest level colors are inserted to.
    max_level: u8,
}

/// Which of the 8 children `color` belongs to below `level`.
#[inline]
fn child_index(color: Srgb<u8>, level: u8) -> usize {
    let shift = 7 - level;
    let bit = |c: u8| usize::from((c >> shift) & 1);
    (bit(color.red) << 2) | (bit(color.green) << 1) | bit(color.blue)
}

impl Octree {
    fn new(max_level: u8) -> Self {
        let max_level = max_level.clamp(1, 8);
        Self {
            nodes: vec![Node::default()],
            levels: vec![Vec::new(); usize::from(max_level) + 1],
            data_nodes: 0,
            max_level,
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn insert(&mut self, color: Srgb<u8>) {
        let mut node = ROOT;
        for level in 0..self.max_level {
            let child = child_index(color, level);
            node = if let Some(next) = self.nodes[node as usize].children[child] {
                next
            } else {
                let next = self.nodes.len() as u32;
                self.nodes.push(Node { parent: node, level: level + 1, ..Node::default() });
                self.nodes[node as usize].children[child] = Some(next);
                next
            };
        }

        let leaf = &mut self.nodes[node as usize];
        if leaf.count == 0 {
            self.levels[usize::from(leaf.level)].push(node);
            self.data_nodes += 1;
        }
        leaf.count += 1;
        for (sum, c) in leaf.sum.iter_mut().zip([color.red, color.green, color.blue]) {
            *sum += u64::from(c);
        }
    }

    /// Folds data nodes into their parents until at most `k` remain.
    fn reduce(&mut self, k: usize) {
        let k = k.max(1);
        while self.data_nodes > k {
            let Some(level) = (1..self.levels.len()).rev().find(|&l| !self.levels[l].is_empty()) else {
                break;
            };
            let Some(index) = self.levels[level].pop() else {
                break;
            };

            let node = std::mem::take(&mut self.nodes[index as usize]);
            let parent = &mut self.nodes[node.parent as usize];
            if let Some(slot) = parent.children.iter_mut().find(|c| **c == Some(index)) {
                *slot = None;
            }

            if parent.count == 0 {
                self.levels[usize::from(parent.level)].push(node.parent);
            } else {
                self.data_nodes -= 1;
            }
            parent.count += node.count;
            for (d, s) in parent.sum.iter_mut().zip(node.sum) {
                *d += s;
            }
        }
    }

    /// The mean color of every data node, shallowest level first.
    #[allow(clippy::cast_precision_loss)]
    fn colors(&self) -> Vec<Srgb<u8>> {
        self.levels
            .iter()
            .flatten()
            .map(|&i| &self.nodes[i as usize])
            .filter(|node| node.count > 0)
            .map(|node| {
                let n = f64::from(node.count);
                from_point(node.sum.map(|s| s as f64 / n))
            })
            .collect()
    }
}

/// Computes a palette of at most `k` colors by building and reducing an octree over a sample.
///
/// When the sample has at most `k` distinct colors and the maximum level is `8`,
/// each distinct color is returned exactly.
pub fn palette(pixels: PixelBuffer, k: usize, options: OctreeOptions) -> Result<Vec<Srgb<u8>>> {
    let samples = sample(pixels, options.max_samples, options.seed)?;

    let mut tree = Octree::new(options.max_level);
    for &offset in samples.iter() {
        tree.insert(pixels.color_at(offset));
    }

    let leaves = tree.data_nodes;
    tree.reduce(k);
    tracing::debug!(nodes = tree.nodes.len(), leaves, reduced = tree.data_nodes, "built octree");

    Ok(tree.colors())
}
