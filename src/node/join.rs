use crate::RsRes;
use crate::node::{BoxCursor, Node};
use rustc_hash::FxHashMap;
use std::hash::Hash;
use std::rc::Rc;

/// 哈希连接节点：首次推进时抽干内侧建立键->桶映射，外侧保持流式，
/// 按外侧顺序产出每个匹配对，无匹配的外侧元素被丢弃。
pub(crate) struct JoinNode<T, U, K, R> {
    pub(crate) outer: Rc<dyn Node<T>>,
    pub(crate) inner: Rc<dyn Node<U>>,
    pub(crate) outer_key: Rc<dyn Fn(&T) -> K>,
    pub(crate) inner_key: Rc<dyn Fn(&U) -> K>,
    pub(crate) result: Rc<dyn Fn(&T, &U) -> R>,
}

impl<T: 'static, U: 'static, K: Eq + Hash + 'static, R: 'static> Node<R> for JoinNode<T, U, K, R> {
    fn cursor(&self) -> RsRes<BoxCursor<R>> {
        Ok(Box::new(JoinCursor {
            outer: self.outer.cursor()?,
            inner: Some(self.inner.cursor()?),
            outer_key: Rc::clone(&self.outer_key),
            inner_key: Rc::clone(&self.inner_key),
            result: Rc::clone(&self.result),
            table: FxHashMap::default(),
            pending: Vec::new().into_iter(),
        }))
    }
}

struct JoinCursor<T, U, K, R> {
    outer: BoxCursor<T>,
    inner: Option<BoxCursor<U>>,
    outer_key: Rc<dyn Fn(&T) -> K>,
    inner_key: Rc<dyn Fn(&U) -> K>,
    result: Rc<dyn Fn(&T, &U) -> R>,
    table: FxHashMap<K, Vec<U>>,
    pending: std::vec::IntoIter<R>,
}

impl<T, U, K: Eq + Hash, R> Iterator for JoinCursor<T, U, K, R> {
    type Item = R;

    fn next(&mut self) -> Option<R> {
        if let Some(inner) = self.inner.take() {
            for item in inner {
                self.table.entry((self.inner_key)(&item)).or_default().push(item);
            }
        }
        loop {
            if let Some(matched) = self.pending.next() {
                return Some(matched);
            }
            let item = self.outer.next()?;
            if let Some(bucket) = self.table.get(&(self.outer_key)(&item)) {
                self.pending = bucket.iter().map(|other| (self.result)(&item, other)).collect::<Vec<_>>().into_iter();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::Seq;

    #[test]
    fn test_join_matches_by_key() {
        let owners = Seq::of(vec![(1, "alice"), (2, "bob"), (3, "carol")]);
        let pets = Seq::of(vec![(1, "cat"), (3, "dog"), (1, "fish"), (4, "bird")]);
        let pairs = owners
            .join(pets, |owner| owner.0, |pet| pet.0, |owner, pet| format!("{}:{}", owner.1, pet.1))
            .to_vec()
            .unwrap();
        assert_eq!(pairs, vec!["alice:cat", "alice:fish", "carol:dog"]);
    }

    #[test]
    fn test_join_duplicate_keys_yield_cross_product() {
        let left = Seq::of(vec![1, 2, 1]);
        let right = Seq::of(vec![1, 1]);
        let pairs = left.join(right, |l| *l, |r| *r, |l, r| (*l, *r)).to_vec().unwrap();
        assert_eq!(pairs, vec![(1, 1), (1, 1), (1, 1), (1, 1)]);
    }

    #[test]
    fn test_join_empty_inner() {
        let left = Seq::of(vec![1, 2]);
        let right = Seq::of(Vec::<i64>::new());
        assert_eq!(left.join(right, |l| *l, |r| *r, |l, r| *l + *r).to_vec().unwrap(), Vec::<i64>::new());
    }

    #[test]
    fn test_join_is_lazy_until_first_advance() {
        let owners = Seq::of(vec![(1, "alice")]);
        let pets = Seq::of(vec![(1, "cat")]);
        let seq = owners.join(pets, |owner| owner.0, |pet| pet.0, |owner, pet| (owner.1, pet.1));
        // 仅链接不触发任何拉取，终结时才建表
        assert_eq!(seq.to_vec().unwrap(), vec![("alice", "cat")]);
    }
}
