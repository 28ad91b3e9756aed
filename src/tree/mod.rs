//! The per-method radix tree.
//!
//! Nodes live in an arena (`Vec<Node<T>>`) and refer to their children by
//! index; the root is always index `0`. Nodes are never removed, which is
//! all a route table built once at startup needs.

use crate::helpers::percent_decode_request_path;
use crate::types::Params;
use crate::Error;
use std::borrow::Cow;
use std::mem;

pub(crate) use self::method_trees::MethodTrees;
use self::wildcard::{check, find_wildcard, validate_path};

mod method_trees;
mod wildcard;

#[cfg(test)]
mod tests;

/// What a node matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Static,
    Root,
    Param,
    CatchAll,
}

/// One node of a [`Tree`].
#[derive(Debug, Clone)]
pub struct Node<T> {
    path: String,
    kind: NodeKind,
    indices: Vec<char>,
    children: Vec<usize>,
    wild_child: bool,
    priority: u32,
    value: Option<T>,
    full_path: String,
}

impl<T> Node<T> {
    fn new(kind: NodeKind, path: &str, full_path: &str) -> Node<T> {
        Node {
            path: path.to_owned(),
            kind,
            indices: Vec::new(),
            children: Vec::new(),
            wild_child: false,
            priority: 0,
            value: None,
            full_path: full_path.to_owned(),
        }
    }

    /// The segment this node matches.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// First character of every static child, in child order.
    pub fn indices(&self) -> &[char] {
        &self.indices
    }

    /// Child node ids. A wildcard child, if any, is last.
    pub fn children(&self) -> &[usize] {
        &self.children
    }

    pub fn wild_child(&self) -> bool {
        self.wild_child
    }

    /// Number of registered routes passing through this node.
    pub fn priority(&self) -> u32 {
        self.priority
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn full_path(&self) -> &str {
        &self.full_path
    }

    fn add_child(&mut self, child: usize) {
        if self.wild_child && !self.children.is_empty() {
            let wildcard = self.children.len() - 1;
            self.children.insert(wildcard, child);
        } else {
            self.children.push(child);
        }
    }
}

/// The result of a lookup.
#[derive(Debug)]
pub struct NodeValue<'t, T> {
    /// The value registered for the path, if it matched.
    pub value: Option<&'t T>,
    /// Set when the path would match with a trailing slash added or removed.
    pub tsr: bool,
    /// The registered route path of the match, empty on a miss.
    pub full_path: &'t str,
}

/// A node the matcher may come back to when a static branch dead ends.
#[derive(Debug, Clone, Copy)]
pub struct SkippedNode {
    pos: usize,
    node: usize,
    params_count: usize,
}

/// A compressed prefix tree mapping route paths to values.
///
/// # Examples
///
/// ```
/// use gon::tree::Tree;
/// use gon::Params;
///
/// let mut tree = Tree::new();
/// tree.add_route("/users/:id", "user").unwrap();
/// tree.add_route("/users/new", "new user").unwrap();
///
/// let mut params = Params::new();
/// let mut skipped = Vec::new();
/// let found = tree.get_value("/users/42", Some(&mut params), &mut skipped, false);
/// assert_eq!(found.value, Some(&"user"));
/// assert_eq!(params.get("id"), Some("42"));
///
/// let found = tree.get_value("/users/new", None, &mut skipped, false);
/// assert_eq!(found.value, Some(&"new user"));
/// ```
#[derive(Debug, Clone)]
pub struct Tree<T> {
    nodes: Vec<Node<T>>,
}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Tree::new()
    }
}

impl<T> Tree<T> {
    pub fn new() -> Tree<T> {
        Tree {
            nodes: vec![Node::new(NodeKind::Root, "", "/")],
        }
    }

    pub fn root(&self) -> &Node<T> {
        &self.nodes[0]
    }

    pub fn node(&self, id: usize) -> Option<&Node<T>> {
        self.nodes.get(id)
    }

    /// Number of nodes, the root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes[0].children.is_empty() && self.nodes[0].value.is_none()
    }

    /// Every registered `(path, value)` pair, depth first.
    pub fn routes(&self) -> Routes<'_, T> {
        Routes {
            tree: self,
            stack: vec![0],
        }
    }

    /// Looks up `path`.
    ///
    /// Captured parameters are written into `params` when it is given; both
    /// `params` and `skipped` are cleared first. With `unescape` set the
    /// captured values are percent-decoded.
    ///
    /// On a miss, `tsr` is only set when the path with its trailing slash
    /// added or removed has a value.
    pub fn get_value<'t>(
        &'t self,
        path: &str,
        params: Option<&mut Params>,
        skipped: &mut Vec<SkippedNode>,
        unescape: bool,
    ) -> NodeValue<'t, T> {
        let mut value = self.find(path, params, skipped, unescape);
        if value.tsr {
            value.tsr = self.matches_with_slash_toggled(path, skipped);
        }
        value
    }

    fn matches_with_slash_toggled(&self, path: &str, skipped: &mut Vec<SkippedNode>) -> bool {
        let toggled = match path.strip_suffix('/') {
            Some("") => return false,
            Some(stripped) => Cow::Borrowed(stripped),
            None => Cow::Owned(format!("{}/", path)),
        };
        self.find(&toggled, None, skipped, false).value.is_some()
    }

    fn find<'t>(
        &'t self,
        path: &str,
        mut params: Option<&mut Params>,
        skipped: &mut Vec<SkippedNode>,
        unescape: bool,
    ) -> NodeValue<'t, T> {
        if let Some(params) = params.as_deref_mut() {
            params.clear();
        }
        skipped.clear();

        let mut value = NodeValue {
            value: None,
            tsr: false,
            full_path: "",
        };
        let mut cursor = Cursor::default();

        loop {
            let node = &self.nodes[cursor.node];
            let skip_static = mem::take(&mut cursor.from_skipped);
            let rest = &path[cursor.pos..];
            let prefix = node.path.as_str();

            if rest.len() > prefix.len() && rest.starts_with(prefix) {
                let node_pos = cursor.pos;
                cursor.pos += prefix.len();
                let rest = &path[cursor.pos..];

                if !skip_static {
                    let next = rest.chars().next();
                    if let Some(i) = node.indices.iter().position(|&c| Some(c) == next) {
                        if node.wild_child {
                            skipped.push(SkippedNode {
                                pos: node_pos,
                                node: cursor.node,
                                params_count: cursor.params_count,
                            });
                        }
                        cursor.node = node.children[i];
                        continue;
                    }
                }

                if !node.wild_child {
                    if rest != "/" && cursor.roll_back(skipped, &mut params) {
                        continue;
                    }
                    value.tsr = rest == "/" && node.value.is_some();
                    return value;
                }

                let Some(&wildcard) = node.children.last() else {
                    return value;
                };
                let node = &self.nodes[wildcard];
                cursor.node = wildcard;
                cursor.params_count += 1;

                match node.kind {
                    NodeKind::Param => {
                        let end = rest.find('/').unwrap_or(rest.len());
                        if let Some(params) = params.as_deref_mut() {
                            params.push(&node.path[1..], &decode(&rest[..end], unescape));
                        }

                        if end < rest.len() {
                            if let Some(&child) = node.children.first() {
                                cursor.pos += end;
                                cursor.node = child;
                                continue;
                            }
                            value.tsr = rest.len() == end + 1;
                            return value;
                        }

                        if let Some(found) = &node.value {
                            value.value = Some(found);
                            value.full_path = &node.full_path;
                            return value;
                        }
                        if let [child] = node.children[..] {
                            let child = &self.nodes[child];
                            value.tsr = (child.path == "/" && child.value.is_some())
                                || (child.path.is_empty() && child.indices == ['/']);
                        }
                        return value;
                    }
                    NodeKind::CatchAll => {
                        if let Some(params) = params.as_deref_mut() {
                            params.push(&node.path[2..], &decode(rest, unescape));
                        }
                        value.value = node.value.as_ref();
                        value.full_path = &node.full_path;
                        return value;
                    }
                    NodeKind::Static | NodeKind::Root => {
                        debug_assert!(false, "wildcard child of kind {:?}", node.kind);
                        return value;
                    }
                }
            }

            if rest == prefix {
                if node.value.is_none() && rest != "/" && cursor.roll_back(skipped, &mut params) {
                    continue;
                }

                if let Some(found) = &node.value {
                    value.value = Some(found);
                    value.full_path = &node.full_path;
                    return value;
                }

                // A wildcard child below means the same path with a trailing
                // slash has a handler.
                if rest == "/" && node.wild_child && node.kind != NodeKind::Root {
                    value.tsr = true;
                    return value;
                }
                if rest == "/" && node.kind == NodeKind::Static {
                    value.tsr = true;
                    return value;
                }

                if let Some(i) = node.indices.iter().position(|&c| c == '/') {
                    let child = &self.nodes[node.children[i]];
                    value.tsr = (child.path.len() == 1 && child.value.is_some())
                        || (child.kind == NodeKind::CatchAll
                            && child
                                .children
                                .first()
                                .map_or(false, |&leaf| self.nodes[leaf].value.is_some()));
                }
                return value;
            }

            // Nothing found. A leaf for the path plus a trailing slash still
            // earns a redirect suggestion.
            value.tsr = rest == "/"
                || (prefix.len() == rest.len() + 1
                    && prefix.as_bytes()[rest.len()] == b'/'
                    && prefix.starts_with(rest)
                    && node.value.is_some());

            if !value.tsr && rest != "/" && cursor.roll_back(skipped, &mut params) {
                continue;
            }
            return value;
        }
    }
}

impl<T: Clone> Tree<T> {
    /// Registers `value` under `path`.
    ///
    /// On error the tree is left exactly as it was before the call.
    pub fn add_route(&mut self, path: &str, value: T) -> Result<(), Error> {
        validate_path(path)?;

        let mut inserter = Inserter::new(&mut self.nodes);
        match inserter.add_route(path, value) {
            Ok(()) => Ok(()),
            Err(err) => {
                inserter.roll_back();
                Err(err)
            }
        }
    }
}

fn decode(raw: &str, unescape: bool) -> Cow<'_, str> {
    if unescape {
        percent_decode_request_path(raw)
    } else {
        Cow::Borrowed(raw)
    }
}

/// Length of the common prefix of `a` and `b`, on a char boundary.
fn longest_common_prefix(a: &str, b: &str) -> usize {
    let mut i = a.bytes().zip(b.bytes()).take_while(|(x, y)| x == y).count();
    while !a.is_char_boundary(i) {
        i -= 1;
    }
    i
}

#[derive(Debug, Default)]
struct Cursor {
    node: usize,
    pos: usize,
    params_count: usize,
    from_skipped: bool,
}

impl Cursor {
    /// Resumes at the most recent skipped node, whose wildcard child has
    /// not been tried yet.
    fn roll_back(&mut self, skipped: &mut Vec<SkippedNode>, params: &mut Option<&mut Params>) -> bool {
        let Some(last) = skipped.pop() else {
            return false;
        };
        self.node = last.node;
        self.pos = last.pos;
        self.params_count = last.params_count;
        self.from_skipped = true;
        if let Some(params) = params.as_deref_mut() {
            params.truncate(last.params_count);
        }
        true
    }
}

/// Applies one insertion, remembering every node it touches so a failed
/// insertion can be undone.
struct Inserter<'a, T> {
    nodes: &'a mut Vec<Node<T>>,
    len: usize,
    saved: Vec<(usize, Node<T>)>,
}

impl<'a, T: Clone> Inserter<'a, T> {
    fn new(nodes: &'a mut Vec<Node<T>>) -> Self {
        let len = nodes.len();
        Inserter {
            nodes,
            len,
            saved: Vec::new(),
        }
    }

    fn node(&self, id: usize) -> &Node<T> {
        &self.nodes[id]
    }

    fn node_mut(&mut self, id: usize) -> &mut Node<T> {
        if id < self.len && !self.saved.iter().any(|(saved, _)| *saved == id) {
            self.saved.push((id, self.nodes[id].clone()));
        }
        &mut self.nodes[id]
    }

    fn push(&mut self, node: Node<T>) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    fn roll_back(self) {
        self.nodes.truncate(self.len);
        for (id, node) in self.saved {
            self.nodes[id] = node;
        }
    }

    fn add_route(&mut self, full_path: &str, value: T) -> Result<(), Error> {
        let mut id = 0;
        let mut path = full_path;
        self.node_mut(id).priority += 1;

        let root = self.node(id);
        if root.path.is_empty() && root.children.is_empty() {
            self.insert_child(id, path, full_path, value)?;
            self.node_mut(id).kind = NodeKind::Root;
            return Ok(());
        }

        let mut parent_full_path_index = 0;
        loop {
            let i = longest_common_prefix(path, &self.node(id).path);

            if i < self.node(id).path.len() {
                self.split_edge(id, i, &full_path[..parent_full_path_index + i]);
            }

            if i < path.len() {
                path = &path[i..];
                let Some(c) = path.chars().next() else {
                    break;
                };
                let node = self.node(id);

                // '/' after a param
                if node.kind == NodeKind::Param && c == '/' && node.children.len() == 1 {
                    parent_full_path_index += node.path.len();
                    id = node.children[0];
                    self.node_mut(id).priority += 1;
                    continue;
                }

                if let Some(pos) = node.indices.iter().position(|&index| index == c) {
                    parent_full_path_index += node.path.len();
                    let pos = self.increment_child_prio(id, pos);
                    id = self.node(id).children[pos];
                    continue;
                }

                if c != ':' && c != '*' && node.kind != NodeKind::CatchAll {
                    let child = self.push(Node::new(NodeKind::Static, "", full_path));
                    let parent = self.node_mut(id);
                    parent.indices.push(c);
                    parent.add_child(child);
                    let pos = parent.indices.len() - 1;
                    self.increment_child_prio(id, pos);
                    id = child;
                } else if node.wild_child {
                    let Some(&wildcard) = node.children.last() else {
                        break;
                    };
                    id = wildcard;
                    self.node_mut(id).priority += 1;

                    // Same wildcard again, unless the new one is longer
                    // (`:name` vs `:names`) or follows a catch-all.
                    let node = self.node(id);
                    if path.starts_with(node.path.as_str())
                        && node.kind != NodeKind::CatchAll
                        && (node.path.len() >= path.len() || path.as_bytes()[node.path.len()] == b'/')
                    {
                        continue;
                    }
                    return Err(self.wildcard_conflict(id, path, full_path));
                }

                return self.insert_child(id, path, full_path, value);
            }

            break;
        }

        let node = self.node_mut(id);
        if node.value.is_some() {
            return Err(Error::DuplicateRoute {
                path: full_path.to_owned(),
            });
        }
        node.value = Some(value);
        node.full_path = full_path.to_owned();
        Ok(())
    }

    /// Moves everything past `i` in the node's segment into a new child.
    fn split_edge(&mut self, id: usize, i: usize, full_path_prefix: &str) {
        let node = self.node_mut(id);
        let child = Node {
            path: node.path[i..].to_owned(),
            kind: NodeKind::Static,
            indices: mem::take(&mut node.indices),
            children: mem::take(&mut node.children),
            wild_child: node.wild_child,
            priority: node.priority.saturating_sub(1),
            value: node.value.take(),
            full_path: node.full_path.clone(),
        };
        let first = child.path.chars().next();

        let child = self.push(child);
        let node = self.node_mut(id);
        node.children = vec![child];
        node.indices = first.into_iter().collect();
        node.path.truncate(i);
        node.wild_child = false;
        node.full_path = full_path_prefix.to_owned();
    }

    /// Bumps a static child's priority and moves it ahead of lower
    /// priority siblings. Returns its new position.
    fn increment_child_prio(&mut self, id: usize, pos: usize) -> usize {
        let child = self.node(id).children[pos];
        self.node_mut(child).priority += 1;
        let priority = self.node(child).priority;

        let mut new_pos = pos;
        while new_pos > 0 && self.node(self.node(id).children[new_pos - 1]).priority < priority {
            new_pos -= 1;
        }

        if new_pos != pos {
            let node = self.node_mut(id);
            node.children[new_pos..=pos].rotate_right(1);
            node.indices[new_pos..=pos].rotate_right(1);
        }
        new_pos
    }

    fn insert_child(&mut self, mut id: usize, mut path: &str, full_path: &str, value: T) -> Result<(), Error> {
        while let Some(wildcard) = find_wildcard(path) {
            check(&wildcard, full_path)?;
            let start = wildcard.start;

            if !wildcard.is_catch_all() {
                if start > 0 {
                    self.node_mut(id).path = path[..start].to_owned();
                    path = &path[start..];
                }

                let child = self.push(Node::new(NodeKind::Param, wildcard.text, full_path));
                let node = self.node_mut(id);
                node.add_child(child);
                node.wild_child = true;
                id = child;
                self.node_mut(id).priority += 1;

                // Text after the param continues with a '/'.
                if wildcard.text.len() < path.len() {
                    path = &path[wildcard.text.len()..];
                    let mut fresh = Node::new(NodeKind::Static, "", full_path);
                    fresh.priority = 1;
                    let child = self.push(fresh);
                    self.node_mut(id).add_child(child);
                    id = child;
                    continue;
                }

                self.node_mut(id).value = Some(value);
                return Ok(());
            }

            if wildcard.end() != path.len() {
                return Err(Error::CatchAllNotAtEnd {
                    path: full_path.to_owned(),
                });
            }

            let node = self.node(id);
            if node.path.ends_with('/') {
                let segment = node
                    .children
                    .first()
                    .map(|&child| self.node(child).path.split('/').next().unwrap_or_default())
                    .unwrap_or_default()
                    .to_owned();
                return Err(Error::CatchAllConflict {
                    wildcard: path.to_owned(),
                    path: full_path.to_owned(),
                    prefix: format!("{}{}", node.path, segment),
                    segment,
                });
            }

            if start == 0 || path.as_bytes()[start - 1] != b'/' {
                return Err(Error::NoSlashBeforeCatchAll {
                    path: full_path.to_owned(),
                });
            }
            let slash = start - 1;

            // The '/' gets a structural node of its own so the leaf can
            // capture it as part of the value.
            let mut structural = Node::new(NodeKind::CatchAll, "", full_path);
            structural.wild_child = true;
            structural.priority = 1;
            let structural = self.push(structural);

            let mut leaf = Node::new(NodeKind::CatchAll, &path[slash..], full_path);
            leaf.priority = 1;
            leaf.value = Some(value);
            let leaf = self.push(leaf);
            self.node_mut(structural).children.push(leaf);

            let node = self.node_mut(id);
            node.path = path[..slash].to_owned();
            node.add_child(structural);
            node.indices = vec!['/'];
            return Ok(());
        }

        let node = self.node_mut(id);
        node.path = path.to_owned();
        node.value = Some(value);
        node.full_path = full_path.to_owned();
        Ok(())
    }

    fn wildcard_conflict(&self, id: usize, path: &str, full_path: &str) -> Error {
        let node = self.node(id);
        let segment = if node.kind == NodeKind::CatchAll {
            path
        } else {
            path.split('/').next().unwrap_or(path)
        };
        let at = full_path.find(segment).unwrap_or(0);

        Error::WildcardConflict {
            segment: segment.to_owned(),
            path: full_path.to_owned(),
            wildcard: node.path.clone(),
            prefix: format!("{}{}", &full_path[..at], node.path),
        }
    }
}

/// Iterator over the routes of a [`Tree`], see [`Tree::routes`].
#[derive(Debug)]
pub struct Routes<'t, T> {
    tree: &'t Tree<T>,
    stack: Vec<usize>,
}

impl<'t, T> Iterator for Routes<'t, T> {
    type Item = (&'t str, &'t T);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.stack.pop() {
            let node = &self.tree.nodes[id];
            self.stack.extend(node.children.iter().rev());
            if let Some(value) = &node.value {
                return Some((&node.full_path, value));
            }
        }
        None
    }
}
