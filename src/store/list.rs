use std::sync::Arc;

/// Persistent singly-linked list. `push` returns a new list that shares
/// `self` as its tail; nothing is ever mutated in place.
#[derive(Debug)]
pub struct ConsList<T> {
    head: Option<Arc<Node<T>>>,
    len: usize,
}

#[derive(Debug)]
struct Node<T> {
    value: T,
    next: Option<Arc<Node<T>>>,
}

impl<T> ConsList<T> {
    pub fn new() -> Self {
        Self { head: None, len: 0 }
    }

    pub fn singleton(value: T) -> Self {
        Self::new().push(value)
    }

    pub fn push(&self, value: T) -> Self {
        Self {
            head: Some(Arc::new(Node {
                value,
                next: self.head.clone(),
            })),
            len: self.len + 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn head(&self) -> Option<&T> {
        self.head.as_deref().map(|n| &n.value)
    }

    /// Splits into the first element and the (shared) rest of the list.
    pub fn uncons(&self) -> Option<(&T, ConsList<T>)> {
        self.head.as_deref().map(|n| {
            (
                &n.value,
                ConsList {
                    head: n.next.clone(),
                    len: self.len - 1,
                },
            )
        })
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            next: self.head.as_deref(),
        }
    }
}

impl<T> Default for ConsList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for ConsList<T> {
    fn clone(&self) -> Self {
        Self {
            head: self.head.clone(),
            len: self.len,
        }
    }
}

impl<T> Drop for ConsList<T> {
    fn drop(&mut self) {
        // unlink uniquely owned nodes one at a time, stop at the first shared one
        let mut cur = self.head.take();
        while let Some(node) = cur {
            match Arc::try_unwrap(node) {
                Ok(mut n) => cur = n.next.take(),
                Err(_) => break,
            }
        }
    }
}

impl<T> FromIterator<T> for ConsList<T> {
    /// Builds a list whose iteration order matches the input order.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let items = iter.into_iter().collect::<Vec<_>>();
        items
            .into_iter()
            .rev()
            .fold(ConsList::new(), |acc, v| acc.push(v))
    }
}

pub struct Iter<'a, T> {
    next: Option<&'a Node<T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.next.map(|n| {
            self.next = n.next.as_deref();
            &n.value
        })
    }
}

impl<'a, T> IntoIterator for &'a ConsList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
