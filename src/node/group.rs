use crate::RsRes;
use crate::node::{BoxCursor, Node};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::hash_map::Entry;
use std::hash::Hash;
use std::rc::Rc;

/// 一组具有相同键的元素，组按键的首次出现顺序产出，组内保持输入顺序。
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Group<K, V> {
    pub key: K,
    pub values: Vec<V>,
}

/// 分组节点：首次推进时抽干上游，按键装桶。
pub(crate) struct GroupNode<T, K> {
    pub(crate) up: Rc<dyn Node<T>>,
    pub(crate) key: Rc<dyn Fn(&T) -> K>,
}

impl<T: 'static, K: Eq + Hash + Clone + 'static> Node<Group<K, T>> for GroupNode<T, K> {
    fn cursor(&self) -> RsRes<BoxCursor<Group<K, T>>> {
        Ok(Box::new(GroupCursor { up: Some(self.up.cursor()?), key: Rc::clone(&self.key), buf: None }))
    }
}

struct GroupCursor<T, K> {
    up: Option<BoxCursor<T>>,
    key: Rc<dyn Fn(&T) -> K>,
    buf: Option<std::vec::IntoIter<Group<K, T>>>,
}

impl<T, K: Eq + Hash + Clone> Iterator for GroupCursor<T, K> {
    type Item = Group<K, T>;

    fn next(&mut self) -> Option<Group<K, T>> {
        if self.buf.is_none() {
            let mut index: FxHashMap<K, usize> = FxHashMap::default();
            let mut groups: Vec<Group<K, T>> = Vec::new();
            for item in self.up.take()? {
                match index.entry((self.key)(&item)) {
                    Entry::Occupied(occupied) => groups[*occupied.get()].values.push(item),
                    Entry::Vacant(vacant) => {
                        groups.push(Group { key: vacant.key().clone(), values: vec![item] });
                        vacant.insert(groups.len() - 1);
                    }
                }
            }
            self.buf = Some(groups.into_iter());
        }
        self.buf.as_mut()?.next()
    }
}

/// 去重节点：首次推进时抽干上游，按键保留首个出现的元素。
pub(crate) struct DistinctNode<T, K> {
    pub(crate) up: Rc<dyn Node<T>>,
    pub(crate) key: Rc<dyn Fn(&T) -> K>,
}

impl<T: 'static, K: Eq + Hash + 'static> Node<T> for DistinctNode<T, K> {
    fn cursor(&self) -> RsRes<BoxCursor<T>> {
        Ok(Box::new(DistinctCursor { up: Some(self.up.cursor()?), key: Rc::clone(&self.key), buf: None }))
    }
}

struct DistinctCursor<T, K> {
    up: Option<BoxCursor<T>>,
    key: Rc<dyn Fn(&T) -> K>,
    buf: Option<std::vec::IntoIter<T>>,
}

impl<T, K: Eq + Hash> Iterator for DistinctCursor<T, K> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.buf.is_none() {
            let mut seen = FxHashSet::default();
            let kept = self.up.take()?.filter(|item| seen.insert((self.key)(item))).collect::<Vec<_>>();
            self.buf = Some(kept.into_iter());
        }
        self.buf.as_mut()?.next()
    }
}

#[cfg(test)]
mod tests {
    use super::Group;
    use crate::Seq;

    #[test]
    fn test_group_by_first_seen_key_order() {
        let seq = Seq::of(vec![("b", 1), ("a", 2), ("b", 3), ("c", 4), ("a", 5)]);
        let groups = seq.group_by(|pair| pair.0).to_vec().unwrap();
        assert_eq!(
            groups,
            vec![
                Group { key: "b", values: vec![("b", 1), ("b", 3)] },
                Group { key: "a", values: vec![("a", 2), ("a", 5)] },
                Group { key: "c", values: vec![("c", 4)] },
            ]
        );
    }

    #[test]
    fn test_group_by_empty() {
        let groups = Seq::of(Vec::<(&str, i64)>::new()).group_by(|pair| pair.0).to_vec().unwrap();
        assert!(groups.is_empty());
    }

    #[test]
    fn test_group_then_project() {
        let seq = Seq::of(vec![1, 2, 3, 4, 5, 6]);
        let sizes = seq.group_by(|value| value % 3).select(|group| (group.key, group.values.len())).to_vec().unwrap();
        assert_eq!(sizes, vec![(1, 2), (2, 2), (0, 2)]);
    }

    #[test]
    fn test_distinct_keeps_first_occurrence() {
        assert_eq!(Seq::of(vec![3, 1, 3, 2, 1]).distinct().to_vec().unwrap(), vec![3, 1, 2]);
        assert_eq!(Seq::of(Vec::<i64>::new()).distinct().to_vec().unwrap(), Vec::<i64>::new());
    }

    #[test]
    fn test_distinct_by_ignore_case() {
        let seq = Seq::of(vec!["Abc", "aBC", "xyz", "ABC"]);
        let kept = seq.distinct_by(|word| word.to_ascii_uppercase()).to_vec().unwrap();
        assert_eq!(kept, vec!["Abc", "xyz"]);
    }

    #[test]
    fn test_distinct_re_walks_independently() {
        let seq = Seq::of(vec![1, 1, 2]).distinct();
        assert_eq!(seq.to_vec().unwrap(), vec![1, 2]);
        // 再次遍历使用全新的去重状态
        assert_eq!(seq.to_vec().unwrap(), vec![1, 2]);
    }
}
