use crate::RsRes;
use crate::node::{BoxCursor, Node};
use itertools::Itertools;
use ordered_float::OrderedFloat;
use std::cmp::Ordering;
use std::rc::Rc;

/// 排序节点：首次推进时整体抽干上游并稳定排序，之后从缓冲供数。
pub(crate) struct SortNode<T> {
    pub(crate) up: Rc<dyn Node<T>>,
    pub(crate) comparer: Rc<dyn Fn(&T, &T) -> Ordering>,
}

impl<T: 'static> Node<T> for SortNode<T> {
    fn cursor(&self) -> RsRes<BoxCursor<T>> {
        Ok(Box::new(SortCursor { up: Some(self.up.cursor()?), comparer: Rc::clone(&self.comparer), buf: None }))
    }
}

struct SortCursor<T> {
    up: Option<BoxCursor<T>>,
    comparer: Rc<dyn Fn(&T, &T) -> Ordering>,
    buf: Option<std::vec::IntoIter<T>>,
}

impl<T> Iterator for SortCursor<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.buf.is_none() {
            // OPT 2026-08-08 00:41 键比较器场景改用sort_by_cached_key减少键的重复计算
            let mut items = self.up.take()?.collect_vec();
            items.sort_by(|l, r| (self.comparer)(l, r)); // 稳定排序，相等键保持输入顺序
            self.buf = Some(items.into_iter());
        }
        self.buf.as_mut()?.next()
    }
}

pub(crate) fn key_comparer<T: 'static, K: Ord>(key: impl Fn(&T) -> K + 'static) -> Rc<dyn Fn(&T, &T) -> Ordering> {
    Rc::new(move |l: &T, r: &T| key(l).cmp(&key(r)))
}

/// 逆序通过交换比较器实参实现，不逆置缓冲，保证相等键仍按输入顺序产出。
pub(crate) fn key_comparer_desc<T: 'static, K: Ord>(key: impl Fn(&T) -> K + 'static) -> Rc<dyn Fn(&T, &T) -> Ordering> {
    Rc::new(move |l: &T, r: &T| key(r).cmp(&key(l)))
}

pub(crate) fn with_comparer<T: 'static, K>(
    key: impl Fn(&T) -> K + 'static,
    comparer: impl Fn(&K, &K) -> Ordering + 'static,
) -> Rc<dyn Fn(&T, &T) -> Ordering> {
    Rc::new(move |l: &T, r: &T| comparer(&key(l), &key(r)))
}

/// 浮点键按全序比较，NaN按最大值处理。
pub(crate) fn float_key_comparer<T: 'static>(key: impl Fn(&T) -> f64 + 'static) -> Rc<dyn Fn(&T, &T) -> Ordering> {
    Rc::new(move |l: &T, r: &T| OrderedFloat(key(l)).cmp(&OrderedFloat(key(r))))
}

pub(crate) struct ReverseNode<T> {
    pub(crate) up: Rc<dyn Node<T>>,
}

impl<T: 'static> Node<T> for ReverseNode<T> {
    fn cursor(&self) -> RsRes<BoxCursor<T>> {
        Ok(Box::new(ReverseCursor { up: Some(self.up.cursor()?), buf: None }))
    }
}

struct ReverseCursor<T> {
    up: Option<BoxCursor<T>>,
    buf: Option<std::iter::Rev<std::vec::IntoIter<T>>>,
}

impl<T> Iterator for ReverseCursor<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.buf.is_none() {
            self.buf = Some(self.up.take()?.collect_vec().into_iter().rev());
        }
        self.buf.as_mut()?.next()
    }
}
