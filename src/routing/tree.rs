//! Resource tree
//!
//! Built once from the `actions` section before the listener starts and
//! read-only afterwards. There is one tree per HTTP method; each tree maps
//! slash-separated path segments to interior nodes or leaf responders.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use hyper::Method;

use crate::config::{Actions, ResourceConfig};
use crate::error::ConfigError;
use crate::handler::Responder;

#[derive(Debug)]
pub enum ResourceNode {
    Interior(HashMap<String, ResourceNode>),
    Leaf(Responder),
}

impl ResourceNode {
    fn interior() -> Self {
        Self::Interior(HashMap::new())
    }
}

/// Outcome of looking up a request
#[derive(Debug)]
pub enum Lookup<'a> {
    Found(&'a Responder),
    /// The path is routed, but only for these methods
    MethodNotAllowed(Vec<Method>),
    NotFound,
}

#[derive(Debug, Default)]
pub struct ResourceTree {
    roots: HashMap<Method, ResourceNode>,
}

impl ResourceTree {
    /// Build the tree for every `(method, path, config)` in `actions`
    pub fn build(actions: &Actions) -> Result<Self, ConfigError> {
        let mut tree = Self::default();
        for (method, paths) in actions {
            for (path, raw) in paths {
                let conf = ResourceConfig::from_raw(method, path, raw)?;
                tree.insert(method, path, Responder::new(&conf))?;
            }
        }
        Ok(tree)
    }

    /// Attach `responder` at `method` + `path`
    pub fn insert(
        &mut self,
        method: &str,
        path: &str,
        responder: Responder,
    ) -> Result<(), ConfigError> {
        let parsed = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
            .map_err(|_| ConfigError::InvalidMethod(method.to_string()))?;
        let Some(rest) = path.strip_prefix('/') else {
            return Err(ConfigError::InvalidPath(path.to_string()));
        };

        let leaf_has_children = || ConfigError::LeafHasChildren {
            method: method.to_string(),
            path: path.to_string(),
        };

        let mut segments: Vec<&str> = rest.split('/').collect();
        // split always yields at least one element
        let last = segments.pop().unwrap_or_default();

        let mut parent = self.roots.entry(parsed).or_insert_with(ResourceNode::interior);
        for segment in segments {
            parent = match parent {
                ResourceNode::Interior(children) => children
                    .entry(segment.to_string())
                    .or_insert_with(ResourceNode::interior),
                ResourceNode::Leaf(_) => return Err(leaf_has_children()),
            };
        }

        let ResourceNode::Interior(children) = parent else {
            return Err(leaf_has_children());
        };
        match children.entry(last.to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(ResourceNode::Leaf(responder));
                Ok(())
            }
            Entry::Occupied(existing) => match existing.get() {
                ResourceNode::Leaf(_) => Err(ConfigError::DuplicateRoute {
                    method: method.to_string(),
                    path: path.to_string(),
                }),
                ResourceNode::Interior(_) => Err(leaf_has_children()),
            },
        }
    }

    /// Find the responder for a request.
    ///
    /// A leaf also serves any deeper path below it. `HEAD` falls back to the
    /// `GET` routes when no `HEAD` routes exist.
    pub fn lookup(&self, method: &Method, path: &str) -> Lookup<'_> {
        let root = match self.roots.get(method) {
            None if *method == Method::HEAD => self.roots.get(&Method::GET),
            root => root,
        };
        if let Some(responder) = root.and_then(|root| find_leaf(root, path)) {
            return Lookup::Found(responder);
        }

        let mut allowed: Vec<Method> = self
            .roots
            .iter()
            .filter(|(_, root)| find_leaf(root, path).is_some())
            .map(|(m, _)| m.clone())
            .collect();
        if allowed.is_empty() {
            return Lookup::NotFound;
        }
        allowed.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        Lookup::MethodNotAllowed(allowed)
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

fn find_leaf<'a>(root: &'a ResourceNode, path: &str) -> Option<&'a Responder> {
    let rest = path.strip_prefix('/')?;
    let mut node = root;
    for segment in rest.split('/') {
        match node {
            ResourceNode::Leaf(responder) => return Some(responder),
            ResourceNode::Interior(children) => node = children.get(segment)?,
        }
    }
    match node {
        ResourceNode::Leaf(responder) => Some(responder),
        ResourceNode::Interior(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RawResourceConfig;
    use std::collections::BTreeMap;

    fn fixed() -> RawResourceConfig {
        RawResourceConfig {
            kind: Some("fixed".to_string()),
            content_length: Some(10),
            ..RawResourceConfig::default()
        }
    }

    fn actions(routes: &[(&str, &str)]) -> Actions {
        let mut actions: Actions = BTreeMap::new();
        for (method, path) in routes {
            actions
                .entry((*method).to_string())
                .or_default()
                .insert((*path).to_string(), fixed());
        }
        actions
    }

    #[test]
    fn test_lookup() {
        let tree = ResourceTree::build(&actions(&[
            ("GET", "/obj/a"),
            ("GET", "/obj/deep/b"),
            ("GET", "/"),
            ("POST", "/upload"),
        ]))
        .unwrap();

        assert!(matches!(tree.lookup(&Method::GET, "/obj/a"), Lookup::Found(_)));
        assert!(matches!(tree.lookup(&Method::GET, "/obj/deep/b"), Lookup::Found(_)));
        assert!(matches!(tree.lookup(&Method::GET, "/"), Lookup::Found(_)));
        // Leaves serve everything below them
        assert!(matches!(tree.lookup(&Method::GET, "/obj/a/extra"), Lookup::Found(_)));

        assert!(matches!(tree.lookup(&Method::GET, "/obj"), Lookup::NotFound));
        assert!(matches!(tree.lookup(&Method::GET, "/obj/"), Lookup::NotFound));
        assert!(matches!(tree.lookup(&Method::GET, "/missing"), Lookup::NotFound));
    }

    #[test]
    fn test_method_handling() {
        let tree = ResourceTree::build(&actions(&[("GET", "/a"), ("post", "/b")])).unwrap();

        assert!(matches!(tree.lookup(&Method::POST, "/b"), Lookup::Found(_)));
        assert!(matches!(tree.lookup(&Method::HEAD, "/a"), Lookup::Found(_)));
        match tree.lookup(&Method::PUT, "/a") {
            Lookup::MethodNotAllowed(allowed) => assert_eq!(allowed, vec![Method::GET]),
            other => panic!("Expected MethodNotAllowed, got {other:?}"),
        }
    }

    #[test]
    fn test_leaf_cannot_contain_children() {
        let err = ResourceTree::build(&actions(&[("GET", "/a"), ("GET", "/a/b")])).unwrap_err();
        assert!(matches!(err, ConfigError::LeafHasChildren { .. }));
        assert!(err.to_string().contains("leaf cannot contain children"));

        // Registering a leaf where children already hang is the same conflict
        let mut tree = ResourceTree::default();
        let conf = ResourceConfig::from_raw("GET", "/x/y", &fixed()).unwrap();
        tree.insert("GET", "/x/y", Responder::new(&conf)).unwrap();
        assert!(matches!(
            tree.insert("GET", "/x", Responder::new(&conf)),
            Err(ConfigError::LeafHasChildren { .. })
        ));
        // Other methods have their own tree
        tree.insert("POST", "/x", Responder::new(&conf)).unwrap();
    }

    #[test]
    fn test_config_errors() {
        let mut untyped = actions(&[("GET", "/a")]);
        untyped.get_mut("GET").unwrap().get_mut("/a").unwrap().kind = None;
        assert!(matches!(
            ResourceTree::build(&untyped),
            Err(ConfigError::MissingType { .. })
        ));

        let mut unknown = actions(&[("GET", "/a")]);
        unknown.get_mut("GET").unwrap().get_mut("/a").unwrap().kind = Some("proxy".to_string());
        assert!(matches!(
            ResourceTree::build(&unknown),
            Err(ConfigError::UnknownType { .. })
        ));

        assert!(matches!(
            ResourceTree::build(&actions(&[("GET", "relative")])),
            Err(ConfigError::InvalidPath(_))
        ));
        assert!(matches!(
            ResourceTree::build(&actions(&[("GE T", "/a")])),
            Err(ConfigError::InvalidMethod(_))
        ));
    }

    #[test]
    fn test_duplicate_route() {
        let mut tree = ResourceTree::default();
        let conf = ResourceConfig::from_raw("GET", "/a", &fixed()).unwrap();
        tree.insert("GET", "/a", Responder::new(&conf)).unwrap();
        assert!(matches!(
            tree.insert("get", "/a", Responder::new(&conf)),
            Err(ConfigError::DuplicateRoute { .. })
        ));
    }
}
