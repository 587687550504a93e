//! The compressed radix tree backing the router.
//!
//! Each HTTP method gets one tree. Nodes store a shared byte prefix, so
//! common route prefixes like `/blog/` exist exactly once. Children are
//! kept sorted by priority (the number of routes registered below them),
//! which lets lookups try the most popular branches first. Prefixes are
//! handled as raw bytes so splitting at an arbitrary shared length never
//! has to care about UTF-8 character boundaries.

use crate::error::{Result, RouterError};
use crate::params::Params;

/// What a node's prefix represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    /// A literal path fragment.
    Static,
    /// The root of a tree.
    Root,
    /// A `:name` segment parameter.
    Param,
    /// A `*name` catch-all suffix.
    CatchAll,
}

/// A single node of the tree.
///
/// `indices` holds the first byte of each static child, in the same order
/// as `children`, so finding the next branch is a byte scan instead of a
/// map lookup. When `wild_child` is set the node has exactly one child,
/// a [`NodeKind::Param`] or [`NodeKind::CatchAll`] node.
#[derive(Debug)]
pub(crate) struct Node<T> {
    prefix: Vec<u8>,
    indices: Vec<u8>,
    wild_child: bool,
    kind: NodeKind,
    priority: u32,
    children: Vec<Node<T>>,
    value: Option<T>,
}

impl<T> Node<T> {
    /// Creates an empty tree.
    pub(crate) fn empty() -> Self {
        Self {
            prefix: Vec::new(),
            indices: Vec::new(),
            wild_child: false,
            kind: NodeKind::Static,
            priority: 0,
            children: Vec::new(),
            value: None,
        }
    }

    /// Registers a value for the given route pattern.
    ///
    /// Conflicting, duplicate, and malformed patterns are rejected with
    /// an error instead of being silently shadowed.
    pub(crate) fn add_route(&mut self, full_path: &str, value: T) -> Result<()> {
        self.priority += 1;

        // Empty tree
        if self.prefix.is_empty() && self.children.is_empty() {
            self.kind = NodeKind::Root;
            return self.insert_child(full_path.as_bytes(), full_path, value);
        }

        self.add(full_path.as_bytes(), full_path, value)
    }

    /// One step of the registration walk. The caller has already bumped
    /// this node's priority.
    fn add(&mut self, path: &[u8], full_path: &str, value: T) -> Result<()> {
        let i = longest_common_prefix(path, &self.prefix);

        // The new path diverges inside this node's prefix, so the edge is
        // split: the tail of the prefix moves into a new child that keeps
        // everything this node used to hold.
        if i < self.prefix.len() {
            let child = Node {
                prefix: self.prefix[i..].to_vec(),
                indices: std::mem::take(&mut self.indices),
                wild_child: self.wild_child,
                kind: NodeKind::Static,
                priority: self.priority - 1,
                children: std::mem::take(&mut self.children),
                value: self.value.take(),
            };
            self.indices = vec![self.prefix[i]];
            self.children = vec![child];
            self.prefix.truncate(i);
            self.wild_child = false;
        }

        // The new path ends at this node
        if i == path.len() {
            if self.value.is_some() {
                return Err(RouterError::DuplicateRoute {
                    path: full_path.to_string(),
                });
            }
            self.value = Some(value);
            return Ok(());
        }

        let path = &path[i..];

        if self.wild_child {
            let child = &mut self.children[0];
            child.priority += 1;

            // The existing wildcard must match the whole next segment,
            // e.g. `:name` cannot coexist with `:names` or a literal
            if path.len() >= child.prefix.len()
                && child.prefix[..] == path[..child.prefix.len()]
                && child.kind != NodeKind::CatchAll
                && (child.prefix.len() >= path.len() || path[child.prefix.len()] == b'/')
            {
                return child.add(path, full_path, value);
            }
            return Err(RouterError::WildcardConflict {
                path: full_path.to_string(),
                existing: format!(
                    "existing wildcard '{}'",
                    String::from_utf8_lossy(&child.prefix)
                ),
            });
        }

        let idxc = path[0];

        // Slash after a parameter
        if self.kind == NodeKind::Param && idxc == b'/' && self.children.len() == 1 {
            let child = &mut self.children[0];
            child.priority += 1;
            return child.add(path, full_path, value);
        }

        // Existing static child with a matching first byte
        if let Some(pos) = self.indices.iter().position(|&c| c == idxc) {
            let pos = self.increment_child_priority(pos);
            return self.children[pos].add(path, full_path, value);
        }

        // No match; the remainder is inserted below a fresh child, unless
        // it starts with a wildcard of its own
        if idxc == b':' || idxc == b'*' {
            return self.insert_child(path, full_path, value);
        }
        self.indices.push(idxc);
        self.children.push(Node::empty());
        let pos = self.increment_child_priority(self.children.len() - 1);
        self.children[pos].insert_child(path, full_path, value)
    }

    /// Inserts `path` below this (empty) node, creating wildcard nodes
    /// for every `:param` and `*catchall` it contains.
    fn insert_child(&mut self, path: &[u8], full_path: &str, value: T) -> Result<()> {
        let Some((wildcard, start, valid)) = find_wildcard(path) else {
            // No wildcard left, the whole remainder is a static prefix
            self.prefix = path.to_vec();
            self.value = Some(value);
            return Ok(());
        };

        if !valid {
            return Err(RouterError::TooManyWildcards {
                segment: String::from_utf8_lossy(wildcard).into_owned(),
                path: full_path.to_string(),
            });
        }

        // A wildcard would shadow every route already registered below
        if !self.children.is_empty() {
            return Err(RouterError::WildcardConflict {
                path: full_path.to_string(),
                existing: "existing children in the path segment".to_string(),
            });
        }

        if wildcard.len() < 2 {
            return Err(RouterError::UnnamedWildcard {
                path: full_path.to_string(),
            });
        }

        if wildcard[0] == b':' {
            if start > 0 {
                self.prefix = path[..start].to_vec();
            }
            self.wild_child = true;

            let mut child = Node::empty();
            child.kind = NodeKind::Param;
            child.prefix = wildcard.to_vec();
            child.priority = 1;
            self.children = vec![child];
            let child = &mut self.children[0];

            // A static subpath follows the parameter
            if start + wildcard.len() < path.len() {
                let rest = &path[start + wildcard.len()..];
                let mut grandchild = Node::empty();
                grandchild.priority = 1;
                child.children = vec![grandchild];
                return child.children[0].insert_child(rest, full_path, value);
            }

            child.value = Some(value);
            return Ok(());
        }

        // Catch-all: must be the final segment
        if start + wildcard.len() != path.len() {
            return Err(RouterError::CatchAllNotTerminal {
                path: full_path.to_string(),
            });
        }
        if !self.prefix.is_empty() && self.prefix.last() == Some(&b'/') {
            return Err(RouterError::WildcardConflict {
                path: full_path.to_string(),
                existing: "existing handle for the path segment root".to_string(),
            });
        }
        if start == 0 || path[start - 1] != b'/' {
            return Err(RouterError::CatchAllNoSlash {
                path: full_path.to_string(),
            });
        }

        // The catch-all consumes the slash before it
        let start = start - 1;
        self.prefix = path[..start].to_vec();

        // First node: a catch-all with an empty prefix, reached through
        // the slash index
        let mut child = Node::empty();
        child.wild_child = true;
        child.kind = NodeKind::CatchAll;
        child.priority = 1;
        self.children = vec![child];
        self.indices = vec![b'/'];

        // Second node: holds the variable name and the value
        let mut leaf = Node::empty();
        leaf.prefix = path[start..].to_vec();
        leaf.kind = NodeKind::CatchAll;
        leaf.priority = 1;
        leaf.value = Some(value);
        self.children[0].children = vec![leaf];
        Ok(())
    }

    /// Bumps the priority of the child at `pos` and bubbles it forward so
    /// children stay sorted by descending priority. Returns the child's
    /// new position. Equal priorities keep their relative order.
    fn increment_child_priority(&mut self, pos: usize) -> usize {
        self.children[pos].priority += 1;
        let priority = self.children[pos].priority;

        let mut new_pos = pos;
        while new_pos > 0 && self.children[new_pos - 1].priority < priority {
            self.children.swap(new_pos - 1, new_pos);
            self.indices.swap(new_pos - 1, new_pos);
            new_pos -= 1;
        }
        new_pos
    }

    /// Looks up the value registered for `path`.
    ///
    /// Returns the value (if any), the matched parameters, and a flag
    /// recommending a trailing-slash redirect: when no value exists but
    /// adding or removing a single trailing slash would produce a path
    /// that does.
    pub(crate) fn get_value(&self, path: &str) -> (Option<&T>, Params, bool) {
        let mut params = Params::new();
        let mut n = self;
        let mut path = path.as_bytes();

        'walk: loop {
            let prefix = &n.prefix[..];
            if path.len() > prefix.len() {
                if &path[..prefix.len()] == prefix {
                    path = &path[prefix.len()..];

                    if !n.wild_child {
                        let idxc = path[0];
                        for (pos, &c) in n.indices.iter().enumerate() {
                            if c == idxc {
                                n = &n.children[pos];
                                continue 'walk;
                            }
                        }

                        // Nothing matched; a redirect works if the path
                        // minus its trailing slash has a value here
                        let tsr = path == b"/" && n.value.is_some();
                        return (None, params, tsr);
                    }

                    n = &n.children[0];
                    match n.kind {
                        NodeKind::Param => {
                            // Consume the path up to the next slash
                            let end =
                                path.iter().position(|&c| c == b'/').unwrap_or(path.len());
                            params.push(
                                String::from_utf8_lossy(&n.prefix[1..]).into_owned(),
                                String::from_utf8_lossy(&path[..end]).into_owned(),
                            );

                            if end < path.len() {
                                if !n.children.is_empty() {
                                    path = &path[end..];
                                    n = &n.children[0];
                                    continue 'walk;
                                }

                                // ... but we can't descend any deeper
                                let tsr = path.len() == end + 1;
                                return (None, params, tsr);
                            }

                            if n.value.is_some() {
                                return (n.value.as_ref(), params, false);
                            }
                            if n.children.len() == 1 {
                                // No value here, but maybe at path + '/'
                                let child = &n.children[0];
                                let tsr = child.prefix == b"/" && child.value.is_some();
                                return (None, params, tsr);
                            }
                            return (None, params, false);
                        }
                        NodeKind::CatchAll => {
                            params.push(
                                String::from_utf8_lossy(&n.prefix[2..]).into_owned(),
                                String::from_utf8_lossy(path).into_owned(),
                            );
                            return (n.value.as_ref(), params, false);
                        }
                        NodeKind::Static | NodeKind::Root => {
                            unreachable!("wildcard child must be a param or catch-all node")
                        }
                    }
                }
            } else if path == prefix {
                // The path ends at this node
                if n.value.is_some() {
                    return (n.value.as_ref(), params, false);
                }

                if path == b"/" && n.wild_child && n.kind != NodeKind::Root {
                    return (None, params, true);
                }

                // No value; recommend a redirect when path + '/' has one
                for (pos, &c) in n.indices.iter().enumerate() {
                    if c == b'/' {
                        let child = &n.children[pos];
                        let tsr = (child.prefix.len() == 1 && child.value.is_some())
                            || (child.kind == NodeKind::CatchAll
                                && child.children[0].value.is_some());
                        return (None, params, tsr);
                    }
                }
                return (None, params, false);
            }

            // Nothing matched; recommend a redirect when removing the
            // trailing slash would hit a value at this node
            let tsr = path == b"/"
                || (prefix.len() == path.len() + 1
                    && prefix[path.len()] == b'/'
                    && path == &prefix[..path.len()]
                    && n.value.is_some());
            return (None, params, tsr);
        }
    }

    /// Finds a registered path that matches `path` ignoring ASCII case,
    /// optionally also repairing a missing or extra trailing slash.
    ///
    /// Returns the correctly-cased registered path on success.
    pub(crate) fn find_case_insensitive_path(
        &self,
        path: &str,
        fix_trailing_slash: bool,
    ) -> Option<String> {
        let fixed = self.case_insensitive_walk(path.as_bytes(), fix_trailing_slash)?;
        // Wildcard segments echo the request bytes, which came from &str
        Some(String::from_utf8_lossy(&fixed).into_owned())
    }

    fn case_insensitive_walk(&self, path: &[u8], fix_trailing_slash: bool) -> Option<Vec<u8>> {
        let mut out: Vec<u8> = Vec::with_capacity(path.len() + 1);
        let mut n = self;
        let mut path = path;

        while path.len() >= n.prefix.len()
            && path[..n.prefix.len()].eq_ignore_ascii_case(&n.prefix)
        {
            path = &path[n.prefix.len()..];
            out.extend_from_slice(&n.prefix);

            if path.is_empty() {
                // The path ends at this node
                if n.value.is_some() {
                    return Some(out);
                }

                // Try fixing by adding a trailing slash
                if fix_trailing_slash {
                    if let Some(pos) = n.indices.iter().position(|&c| c == b'/') {
                        let child = &n.children[pos];
                        if (child.prefix.len() == 1 && child.value.is_some())
                            || (child.kind == NodeKind::CatchAll
                                && child.children[0].value.is_some())
                        {
                            out.push(b'/');
                            return Some(out);
                        }
                    }
                }
                return None;
            }

            if !n.wild_child {
                // Both the folded and the original first byte may lead to
                // a match, so every candidate child is tried in turn
                let folded = path[0].to_ascii_lowercase();
                for (pos, &c) in n.indices.iter().enumerate() {
                    if c.to_ascii_lowercase() == folded {
                        if let Some(rest) =
                            n.children[pos].case_insensitive_walk(path, fix_trailing_slash)
                        {
                            out.extend_from_slice(&rest);
                            return Some(out);
                        }
                    }
                }

                // Try fixing by removing the trailing slash
                if fix_trailing_slash && path == b"/" && n.value.is_some() {
                    return Some(out);
                }
                return None;
            }

            n = &n.children[0];
            match n.kind {
                NodeKind::Param => {
                    // Wildcard segments keep the request's own casing
                    let end = path.iter().position(|&c| c == b'/').unwrap_or(path.len());
                    out.extend_from_slice(&path[..end]);

                    if end < path.len() {
                        if !n.children.is_empty() {
                            path = &path[end..];
                            n = &n.children[0];
                            continue;
                        }

                        if fix_trailing_slash && path.len() == end + 1 {
                            return Some(out);
                        }
                        return None;
                    }

                    if n.value.is_some() {
                        return Some(out);
                    }
                    if fix_trailing_slash && n.children.len() == 1 {
                        let child = &n.children[0];
                        if child.prefix == b"/" && child.value.is_some() {
                            out.push(b'/');
                            return Some(out);
                        }
                    }
                    return None;
                }
                NodeKind::CatchAll => {
                    out.extend_from_slice(path);
                    return Some(out);
                }
                NodeKind::Static | NodeKind::Root => {
                    unreachable!("wildcard child must be a param or catch-all node")
                }
            }
        }

        // Nothing matched; try the trailing slash fixes
        if fix_trailing_slash {
            if path == b"/" {
                return Some(out);
            }
            if path.len() + 1 == n.prefix.len()
                && n.prefix[path.len()] == b'/'
                && path.eq_ignore_ascii_case(&n.prefix[..path.len()])
                && n.value.is_some()
            {
                out.extend_from_slice(&n.prefix);
                return Some(out);
            }
        }
        None
    }
}

/// Returns the length of the shared prefix of `a` and `b`.
fn longest_common_prefix(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}

/// Scans `path` for the first wildcard and returns it along with its
/// byte offset. `valid` is false when the wildcard segment contains a
/// second `:` or `*`.
fn find_wildcard(path: &[u8]) -> Option<(&[u8], usize, bool)> {
    for (start, &c) in path.iter().enumerate() {
        if c != b':' && c != b'*' {
            continue;
        }

        let mut valid = true;
        for (offset, &c) in path[start + 1..].iter().enumerate() {
            match c {
                b'/' => return Some((&path[start..start + 1 + offset], start, valid)),
                b':' | b'*' => valid = false,
                _ => {}
            }
        }
        return Some((&path[start..], start, valid));
    }
    None
}
