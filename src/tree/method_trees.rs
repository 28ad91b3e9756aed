use super::Tree;
use http::Method;

#[derive(Debug, Clone)]
struct MethodTree<T> {
    method: Method,
    root: Tree<T>,
}

/// One tree per HTTP method, selected by exact method match.
///
/// There are rarely more than a handful of methods in use, so a linear scan
/// beats hashing here.
#[derive(Debug, Clone)]
pub(crate) struct MethodTrees<T> {
    trees: Vec<MethodTree<T>>,
}

impl<T> Default for MethodTrees<T> {
    fn default() -> Self {
        MethodTrees {
            trees: Vec::with_capacity(9),
        }
    }
}

impl<T> MethodTrees<T> {
    pub fn get(&self, method: &Method) -> Option<&Tree<T>> {
        self.trees.iter().find(|tree| tree.method == *method).map(|tree| &tree.root)
    }

    pub fn get_or_insert(&mut self, method: &Method) -> &mut Tree<T> {
        let pos = match self.trees.iter().position(|tree| tree.method == *method) {
            Some(pos) => pos,
            None => {
                self.trees.push(MethodTree {
                    method: method.clone(),
                    root: Tree::new(),
                });
                self.trees.len() - 1
            }
        };
        &mut self.trees[pos].root
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Method, &Tree<T>)> {
        self.trees.iter().map(|tree| (&tree.method, &tree.root))
    }
}
