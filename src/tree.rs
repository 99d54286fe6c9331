//! Binary prefix-code trees.
//!
//! A [`PrefixTree`] is either built from a declarative [`Shape`] (a list of
//! `(symbol, path)` pairs) or by the Huffman algorithm from symbol weights.
//! Codewords are root-to-leaf paths with left = 0 and right = 1.

use std::borrow::Borrow;
use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap, HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;

use bitvec::prelude::*;
use derivative::Derivative;
use total_float_wrap::TotalF64;
use tracing::{debug, warn};

use crate::bits::{parse_bit_string, to_bit_string};
use crate::distribution::{FrequencyTable, WeightedDistribution};
use crate::error::{ConfigError, DecodeError, Error, Result};

#[derive(Debug, Clone)]
enum NodeKind<Symbol> {
    Leaf(Symbol),
    Internal {
        left: Box<Node<Symbol>>,
        right: Box<Node<Symbol>>,
    },
}

/// Nodes order by weight, then by creation order, so the Huffman heap pops
/// equal weights first-in first-out.
#[derive(Debug, Clone, Derivative)]
#[derivative(PartialEq, Eq, PartialOrd, Ord)]
struct Node<Symbol> {
    weight: TotalF64,

    order: usize,

    #[derivative(PartialEq = "ignore")]
    #[derivative(PartialOrd = "ignore")]
    #[derivative(Ord = "ignore")]
    kind: NodeKind<Symbol>,
}

impl<Symbol> Node<Symbol> {
    fn leaf(s: Symbol, weight: f64, order: usize) -> Self {
        Self {
            weight: TotalF64(weight),
            order,
            kind: NodeKind::Leaf(s),
        }
    }

    fn from_children(left: Node<Symbol>, right: Node<Symbol>, order: usize) -> Self {
        Self {
            weight: TotalF64(left.weight.0 + right.weight.0),
            order,
            kind: NodeKind::Internal {
                left: Box::new(left),
                right: Box::new(right),
            },
        }
    }

    fn depth(&self) -> usize {
        match &self.kind {
            NodeKind::Leaf(_) => 0,
            NodeKind::Internal { left, right } => 1 + left.depth().max(right.depth()),
        }
    }
}

/// Declarative description of a tree: every leaf with its codeword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape<Symbol> {
    leaves: Vec<(Symbol, BitVec)>,
}

impl<Symbol> Shape<Symbol> {
    pub fn new(leaves: Vec<(Symbol, BitVec)>) -> Self {
        Self { leaves }
    }

    /// Reads paths written as `'0'`/`'1'` text.
    pub fn from_paths<'a>(paths: impl IntoIterator<Item = (Symbol, &'a str)>) -> Result<Self> {
        let leaves = paths
            .into_iter()
            .map(|(s, path)| -> Result<(Symbol, BitVec)> { Ok((s, parse_bit_string(path)?)) })
            .collect::<Result<_>>()?;

        Ok(Self { leaves })
    }

    /// A complete tree where every codeword has length `log2(n)`; the i-th
    /// symbol gets `i` in binary.
    pub fn balanced(symbols: Vec<Symbol>) -> Result<Self> {
        let n = symbols.len();
        if n == 0 {
            return Err(ConfigError::EmptyAlphabet.into());
        }
        if !n.is_power_of_two() {
            return Err(ConfigError::InvalidShape(format!(
                "balanced shape needs a power-of-two alphabet, got {} symbols",
                n
            ))
            .into());
        }

        let depth = n.trailing_zeros();
        let leaves = symbols
            .into_iter()
            .enumerate()
            .map(|(i, s)| {
                let path: BitVec = (0..depth).rev().map(|d| (i >> d) & 1 == 1).collect();
                (s, path)
            })
            .collect();

        Ok(Self { leaves })
    }

    /// Each symbol sits one level below the previous one: `0`, `10`, `110`,
    /// ... and the last two share the deepest level.
    pub fn staircase(symbols: Vec<Symbol>) -> Result<Self> {
        let n = symbols.len();
        if n == 0 {
            return Err(ConfigError::EmptyAlphabet.into());
        }

        let leaves = symbols
            .into_iter()
            .enumerate()
            .map(|(i, s)| {
                let mut path = bitvec![1; i];
                if i + 1 < n {
                    path.push(false);
                }
                (s, path)
            })
            .collect();

        Ok(Self { leaves })
    }

    pub fn leaves(&self) -> &[(Symbol, BitVec)] {
        &self.leaves
    }
}

impl Shape<u8> {
    /// `"3bit"`: balanced over `a..=h`. `"3bit-skewed"`: staircase over `a..=h`.
    pub fn named(name: &str) -> Result<Self> {
        let symbols = (b'a'..=b'h').collect();
        match name {
            "3bit" => Self::balanced(symbols),
            "3bit-skewed" => Self::staircase(symbols),
            _ => Err(ConfigError::UnknownShape(name.to_owned()).into()),
        }
    }
}

/// Partially built tree used while inserting shape paths.
enum Slot<Symbol> {
    Empty,
    Leaf(Symbol),
    Branch(Box<Slot<Symbol>>, Box<Slot<Symbol>>),
}

fn insert<Symbol>(
    slot: &mut Slot<Symbol>,
    path: &BitSlice,
    full: &BitSlice,
    s: Symbol,
) -> Result<()> {
    let Some((bit, rest)) = path.split_first() else {
        return match slot {
            Slot::Empty => {
                *slot = Slot::Leaf(s);
                Ok(())
            }
            _ => Err(ConfigError::InvalidShape(format!(
                "codeword `{}` is already taken or is a prefix of another",
                to_bit_string(full)
            ))
            .into()),
        };
    };

    if let Slot::Empty = slot {
        *slot = Slot::Branch(Box::new(Slot::Empty), Box::new(Slot::Empty));
    }

    match slot {
        Slot::Branch(left, right) => {
            let child = if *bit { right } else { left };
            insert(child, rest, full, s)
        }
        _ => Err(ConfigError::InvalidShape(format!(
            "codeword `{}` extends another codeword",
            to_bit_string(full)
        ))
        .into()),
    }
}

fn into_node<Symbol>(
    slot: Slot<Symbol>,
    path: &mut BitVec,
    order: &mut usize,
) -> Result<Node<Symbol>> {
    let node = match slot {
        Slot::Empty => {
            return Err(ConfigError::InvalidShape(format!(
                "no leaf below `{}`: every internal node needs two children",
                to_bit_string(path)
            ))
            .into())
        }
        Slot::Leaf(s) => Node::leaf(s, 0.0, *order),
        Slot::Branch(left, right) => {
            path.push(false);
            let left = into_node(*left, path, order)?;
            path.pop();

            path.push(true);
            let right = into_node(*right, path, order)?;
            path.pop();

            Node::from_children(left, right, *order)
        }
    };

    *order += 1;
    Ok(node)
}

/// A prefix code with its codeword tables, read-only once built.
#[derive(Debug, Clone)]
pub struct PrefixTree<Symbol> {
    root: Node<Symbol>,
    encode_table: HashMap<Symbol, BitBox>,
    decode_table: HashMap<BitVec, Symbol>,
}

impl<Symbol> PrefixTree<Symbol>
where
    Symbol: Ord + Hash + Clone + Debug,
{
    fn from_root(root: Node<Symbol>) -> Self {
        fn traverse<Symbol: Clone>(
            node: &Node<Symbol>,
            v: &mut BitVec,
            dec: &mut HashMap<BitVec, Symbol>,
        ) {
            match &node.kind {
                NodeKind::Leaf(sym) => {
                    dec.insert(v.clone(), sym.clone());
                }
                NodeKind::Internal { left, right } => {
                    v.push(false);
                    traverse(left, v, dec);
                    v.pop();

                    v.push(true);
                    traverse(right, v, dec);
                    v.pop();
                }
            }
        }

        let mut bv = BitVec::new();
        let mut dec = HashMap::new();
        traverse(&root, &mut bv, &mut dec);

        let enc = dec
            .iter()
            .map(|(k, v)| (v.clone(), k.clone().into_boxed_bitslice()))
            .collect();

        Self {
            root,
            encode_table: enc,
            decode_table: dec,
        }
    }

    /// Builds the tree a shape describes. Fails unless the paths form a
    /// complete binary tree with one distinct symbol per leaf.
    pub fn from_shape(shape: Shape<Symbol>) -> Result<Self> {
        if shape.leaves.is_empty() {
            return Err(ConfigError::EmptyAlphabet.into());
        }

        let mut seen = HashSet::new();
        let mut root = Slot::Empty;
        for (s, path) in shape.leaves {
            if !seen.insert(s.clone()) {
                return Err(ConfigError::InvalidShape(format!("symbol {:?} appears twice", s)).into());
            }
            insert(&mut root, &path, &path, s)?;
        }

        let root = into_node(root, &mut BitVec::new(), &mut 0)?;
        let tree = Self::from_root(root);
        debug!(
            symbols = tree.alphabet_size(),
            depth = tree.depth(),
            "built tree from shape"
        );
        Ok(tree)
    }

    /// Huffman code for counted symbols.
    pub fn huffman(frequencies: &FrequencyTable<Symbol>) -> Result<Self> {
        Self::huffman_from_weights(frequencies.iter().map(|(s, c)| (s.clone(), c as f64)))
    }

    /// Huffman code for a known distribution.
    pub fn from_distribution(dist: &WeightedDistribution<Symbol>) -> Result<Self> {
        Self::huffman_from_weights(dist.iter().map(|(s, p)| (s.clone(), p)))
    }

    /// Repeatedly merges the two lightest nodes until one remains.
    ///
    /// Leaves are numbered in input order and merged nodes after them, so
    /// among equal weights the earlier-created node is popped first.
    fn huffman_from_weights(weights: impl IntoIterator<Item = (Symbol, f64)>) -> Result<Self> {
        let mut order = 0;
        let mut pq = BinaryHeap::new();
        for (s, w) in weights {
            pq.push(Reverse(Node::leaf(s, w, order)));
            order += 1;
        }

        loop {
            let Reverse(left) = pq.pop().ok_or(ConfigError::EmptyAlphabet)?;
            let Some(Reverse(right)) = pq.pop() else {
                let tree = Self::from_root(left);
                if tree.is_single_symbol() {
                    warn!("huffman tree has a single symbol; its codeword is empty");
                }
                debug!(
                    symbols = tree.alphabet_size(),
                    depth = tree.depth(),
                    "built huffman tree"
                );
                return Ok(tree);
            };

            pq.push(Reverse(Node::from_children(left, right, order)));
            order += 1;
        }
    }

    pub fn codeword_of(&self, symbol: &Symbol) -> Option<&BitSlice> {
        self.encode_table.get(symbol).map(|b| b.as_bitslice())
    }

    pub fn symbol_of_codeword(&self, codeword: &BitSlice) -> Option<&Symbol> {
        self.decode_table.get(&codeword.to_bitvec())
    }

    /// All codewords keyed by symbol.
    pub fn codewords(&self) -> BTreeMap<&Symbol, &BitSlice> {
        self.encode_table
            .iter()
            .map(|(s, code)| (s, code.as_bitslice()))
            .collect()
    }

    pub fn encode<I>(&self, symbols: I) -> Result<BitVec>
    where
        I: IntoIterator,
        I::Item: Borrow<Symbol>,
    {
        let mut out = BitVec::new();
        for s in symbols {
            let s = s.borrow();
            let code = self.encode_table.get(s).ok_or_else(|| Error::Encoding {
                symbol: format!("{:?}", s),
            })?;
            out.extend_from_bitslice(code.as_bitslice());
        }

        Ok(out)
    }

    /// Walks the tree one bit at a time, emitting a symbol at each leaf and
    /// restarting from the root. Bits left over inside the tree are an error.
    pub fn decode(&self, input: &BitSlice) -> Result<Vec<Symbol>> {
        let root = match &self.root.kind {
            NodeKind::Internal { left, right } => (left.as_ref(), right.as_ref()),
            NodeKind::Leaf(_) if input.is_empty() => return Ok(Vec::new()),
            NodeKind::Leaf(_) => {
                return Err(DecodeError::SingleSymbolTree { bits: input.len() }.into())
            }
        };

        let mut out = Vec::new();
        let mut cursor = root;
        let mut start = 0;
        for (position, bit) in input.iter().by_vals().enumerate() {
            let next = if bit { cursor.1 } else { cursor.0 };
            match &next.kind {
                NodeKind::Internal { left, right } => cursor = (left.as_ref(), right.as_ref()),
                NodeKind::Leaf(sym) => {
                    out.push(sym.clone());
                    cursor = root;
                    start = position + 1;
                }
            }
        }

        if start != input.len() {
            return Err(DecodeError::Truncated {
                position: start,
                pending: input.len() - start,
            }
            .into());
        }

        Ok(out)
    }

    pub fn alphabet_size(&self) -> usize {
        self.encode_table.len()
    }

    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// A lone leaf: its only codeword is empty.
    pub fn is_single_symbol(&self) -> bool {
        matches!(self.root.kind, NodeKind::Leaf(_))
    }
}

impl PrefixTree<u8> {
    /// Builds one of the named reference shapes, see [`Shape::named`].
    pub fn manual(name: &str) -> Result<Self> {
        Self::from_shape(Shape::named(name)?)
    }
}
