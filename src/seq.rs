use crate::node::group::{DistinctNode, Group, GroupNode};
use crate::node::join::JoinNode;
use crate::node::sort::{ReverseNode, SortNode, float_key_comparer, key_comparer, key_comparer_desc, with_comparer};
use crate::node::{
    BoxCursor, ConcatNode, FilterNode, FlatMapNode, MapNode, Node, SkipNode, SkipWhileNode, TakeNode, TakeWhileNode,
    ZipNode,
};
use crate::source::{ArraySource, GenSource, StreamSource, range_to_iter};
use crate::{Integer, RsErr, RsRes};
use itertools::Itertools;
use rustc_hash::{FxHashMap, FxHashSet};
use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt::Display;
use std::hash::Hash;
use std::iter::Sum;
use std::rc::Rc;

/// 惰性序列流水线。
///
/// 链式调用只构建不可变节点链，不做任何计算；终结操作创建全新游标逐元素拉取。
/// `Seq`可克隆，同一前缀可以分叉出多条互不干扰的流水线。
pub struct Seq<T> {
    node: Rc<dyn Node<T>>,
}

impl<T> Clone for Seq<T> {
    fn clone(&self) -> Seq<T> {
        Seq { node: Rc::clone(&self.node) }
    }
}

impl<T: 'static> Seq<T> {
    fn wrap(node: impl Node<T> + 'static) -> Seq<T> {
        Seq { node: Rc::new(node) }
    }

    /// 包装已物化的数组，可重复遍历，游标按下标克隆元素。
    pub fn of(items: Vec<T>) -> Seq<T>
    where
        T: Clone,
    {
        Seq::wrap(ArraySource { items: Rc::new(items) })
    }

    /// 包装一次性外部迭代器，第二次遍历报`SourceConsumed`。
    pub fn stream<I>(iter: I) -> Seq<T>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: 'static,
    {
        Seq::wrap(StreamSource { iter: RefCell::new(Some(Box::new(iter.into_iter()))) })
    }

    /// 包装生成器工厂，每次遍历重新生成，支持无界序列。
    pub fn generate<I>(make: impl Fn() -> I + 'static) -> Seq<T>
    where
        I: Iterator<Item = T> + 'static,
    {
        Seq::wrap(GenSource { make: Rc::new(move || Box::new(make()) as BoxCursor<T>) })
    }

    pub fn empty() -> Seq<T> {
        Seq::generate(|| std::iter::empty())
    }

    /// 重复给定值，`count`为`None`时无限重复。
    pub fn repeat(value: T, count: Option<usize>) -> Seq<T>
    where
        T: Clone,
    {
        Seq::generate(move || match count {
            Some(count) => Box::new(std::iter::repeat_n(value.clone(), count)) as BoxCursor<T>,
            None => Box::new(std::iter::repeat(value.clone())),
        })
    }

    /* **************************************** 链式算子 **************************************** */

    /// 逐元素投影，元素类型可变。
    pub fn select<R: 'static>(self, projector: impl Fn(T) -> R + 'static) -> Seq<R> {
        Seq::wrap(MapNode { up: self.node, projector: Rc::new(projector) })
    }

    /// 按谓词过滤。
    pub fn filter(self, predicate: impl Fn(&T) -> bool + 'static) -> Seq<T> {
        Seq::wrap(FilterNode { up: self.node, predicate: Rc::new(predicate) })
    }

    /// 逐元素投影为子序列并展平。
    pub fn select_many<R: 'static, I>(self, projector: impl Fn(T) -> I + 'static) -> Seq<R>
    where
        I: IntoIterator<Item = R>,
        I::IntoIter: 'static,
    {
        let projector = move |item: T| Box::new(projector(item).into_iter()) as BoxCursor<R>;
        Seq::wrap(FlatMapNode { up: self.node, projector: Rc::new(projector) })
    }

    /// 保留前`count`个元素，数量到达后不再拉取上游。
    pub fn take(self, count: usize) -> Seq<T> {
        Seq::wrap(TakeNode { up: self.node, count })
    }

    /// 丢弃前`count`个元素。
    pub fn skip(self, count: usize) -> Seq<T> {
        Seq::wrap(SkipNode { up: self.node, count })
    }

    /// 持续保留元素，直到谓词首次不满足。
    pub fn take_while(self, predicate: impl Fn(&T) -> bool + 'static) -> Seq<T> {
        Seq::wrap(TakeWhileNode { up: self.node, predicate: Rc::new(predicate) })
    }

    /// 持续丢弃元素，直到谓词首次不满足。
    pub fn skip_while(self, predicate: impl Fn(&T) -> bool + 'static) -> Seq<T> {
        Seq::wrap(SkipWhileNode { up: self.node, predicate: Rc::new(predicate) })
    }

    /// 去重，保留首个出现的元素。缓冲算子：首次推进时抽干上游。
    pub fn distinct(self) -> Seq<T>
    where
        T: Eq + Hash + Clone,
    {
        self.distinct_by(|item: &T| item.clone())
    }

    /// 按键选择器定义的等价关系去重，例如忽略大小写场景按大写键去重。
    pub fn distinct_by<K: Eq + Hash + 'static>(self, key: impl Fn(&T) -> K + 'static) -> Seq<T> {
        Seq::wrap(DistinctNode { up: self.node, key: Rc::new(key) })
    }

    /// 按键升序稳定排序。缓冲算子：首次推进时抽干上游，首元素延迟为O(n log n)。
    pub fn order_by<K: Ord>(self, key: impl Fn(&T) -> K + 'static) -> Seq<T> {
        Seq::wrap(SortNode { up: self.node, comparer: key_comparer(key) })
    }

    /// 按键降序稳定排序。
    pub fn order_by_desc<K: Ord>(self, key: impl Fn(&T) -> K + 'static) -> Seq<T> {
        Seq::wrap(SortNode { up: self.node, comparer: key_comparer_desc(key) })
    }

    /// 按自定义比较器对键排序。
    pub fn order_by_with<K>(
        self,
        key: impl Fn(&T) -> K + 'static,
        comparer: impl Fn(&K, &K) -> Ordering + 'static,
    ) -> Seq<T> {
        Seq::wrap(SortNode { up: self.node, comparer: with_comparer(key, comparer) })
    }

    /// 按浮点键全序排序，NaN按最大值处理。
    pub fn order_by_float(self, key: impl Fn(&T) -> f64 + 'static) -> Seq<T> {
        Seq::wrap(SortNode { up: self.node, comparer: float_key_comparer(key) })
    }

    /// 按键分组，组按键首次出现顺序产出。缓冲算子：首次推进时抽干上游。
    pub fn group_by<K: Eq + Hash + Clone + 'static>(self, key: impl Fn(&T) -> K + 'static) -> Seq<Group<K, T>> {
        Seq::wrap(GroupNode { up: self.node, key: Rc::new(key) })
    }

    /// 逆置。缓冲算子：首次推进时抽干上游。
    pub fn reverse(self) -> Seq<T> {
        Seq::wrap(ReverseNode { up: self.node })
    }

    /// 与另一条序列逐位组合，较短一侧耗尽即结束。
    pub fn zip<U: 'static, R: 'static>(self, other: Seq<U>, combiner: impl Fn(T, U) -> R + 'static) -> Seq<R> {
        Seq::wrap(ZipNode { left: self.node, right: other.node, combiner: Rc::new(combiner) })
    }

    /// 串接另一条同元素类型的序列。
    pub fn concat(self, other: Seq<T>) -> Seq<T> {
        Seq::wrap(ConcatNode { first: self.node, second: other.node })
    }

    /// 哈希等值连接：内侧整体缓冲建表，外侧流式，按外侧顺序产出匹配对。
    pub fn join<U: 'static, K: Eq + Hash + 'static, R: 'static>(
        self,
        inner: Seq<U>,
        outer_key: impl Fn(&T) -> K + 'static,
        inner_key: impl Fn(&U) -> K + 'static,
        result: impl Fn(&T, &U) -> R + 'static,
    ) -> Seq<R> {
        Seq::wrap(JoinNode {
            outer: self.node,
            inner: inner.node,
            outer_key: Rc::new(outer_key),
            inner_key: Rc::new(inner_key),
            result: Rc::new(result),
        })
    }

    /* **************************************** 终结操作 **************************************** */

    /// 创建一次遍历的全新游标；重复遍历需要再次调用。
    pub fn walk(&self) -> RsRes<Walk<T>> {
        Ok(Walk { cursor: self.node.cursor()? })
    }

    /// 按产出顺序物化为数组。
    pub fn to_vec(&self) -> RsRes<Vec<T>> {
        Ok(self.walk()?.collect())
    }

    pub fn to_set(&self) -> RsRes<FxHashSet<T>>
    where
        T: Eq + Hash,
    {
        Ok(self.walk()?.collect())
    }

    /// 物化为映射，键值分别由选择器产生，重复键后者覆盖前者。
    pub fn to_map<K, V>(&self, key: impl Fn(&T) -> K, value: impl Fn(T) -> V) -> RsRes<FxHashMap<K, V>>
    where
        K: Eq + Hash,
    {
        Ok(self.walk()?.map(|item| (key(&item), value(item))).collect())
    }

    pub fn count(&self) -> RsRes<usize> {
        Ok(self.walk()?.count())
    }

    /// 取首个元素，空序列报`EmptySequence`。
    pub fn first(&self) -> RsRes<T> {
        self.walk()?.next().ok_or(RsErr::EmptySequence { op: "first" })
    }

    /// 取首个满足谓词的元素，找到即停止拉取。
    pub fn first_by(&self, mut predicate: impl FnMut(&T) -> bool) -> RsRes<T> {
        self.walk()?.find(|item| predicate(item)).ok_or(RsErr::EmptySequence { op: "first_by" })
    }

    pub fn last(&self) -> RsRes<T> {
        self.walk()?.last().ok_or(RsErr::EmptySequence { op: "last" })
    }

    pub fn last_by(&self, mut predicate: impl FnMut(&T) -> bool) -> RsRes<T> {
        self.walk()?.filter(|item| predicate(item)).last().ok_or(RsErr::EmptySequence { op: "last_by" })
    }

    /// 取指定下标的元素，越界报`IndexOutOfRange`。
    pub fn element_at(&self, index: usize) -> RsRes<T> {
        self.walk()?.nth(index).ok_or(RsErr::IndexOutOfRange { index })
    }

    /// 序列是否非空，至多拉取一个元素。
    pub fn any(&self) -> RsRes<bool> {
        Ok(self.walk()?.next().is_some())
    }

    /// 是否存在满足谓词的元素，找到即停止拉取。
    pub fn any_by(&self, mut predicate: impl FnMut(&T) -> bool) -> RsRes<bool> {
        Ok(self.walk()?.any(|item| predicate(&item)))
    }

    /// 是否全部元素满足谓词，反例即停止拉取。
    pub fn all(&self, mut predicate: impl FnMut(&T) -> bool) -> RsRes<bool> {
        Ok(self.walk()?.all(|item| predicate(&item)))
    }

    pub fn contains(&self, target: &T) -> RsRes<bool>
    where
        T: PartialEq,
    {
        Ok(self.walk()?.any(|item| &item == target))
    }

    /// 带初值的从左到右折叠。
    pub fn fold<A>(&self, seed: A, acc: impl FnMut(A, T) -> A) -> RsRes<A> {
        Ok(self.walk()?.fold(seed, acc))
    }

    /// 无初值的从左到右折叠，空序列报`EmptySequence`。
    pub fn reduce(&self, acc: impl FnMut(T, T) -> T) -> RsRes<T> {
        self.walk()?.reduce(acc).ok_or(RsErr::EmptySequence { op: "reduce" })
    }

    pub fn min(&self) -> RsRes<T>
    where
        T: Ord,
    {
        self.walk()?.min().ok_or(RsErr::EmptySequence { op: "min" })
    }

    pub fn max(&self) -> RsRes<T>
    where
        T: Ord,
    {
        self.walk()?.max().ok_or(RsErr::EmptySequence { op: "max" })
    }

    pub fn sum(&self) -> RsRes<T>
    where
        T: Sum<T>,
    {
        Ok(self.walk()?.sum())
    }

    /// 按产出顺序逐元素执行动作，动作内panic向上传播并中止遍历。
    pub fn for_each(&self, action: impl FnMut(T)) -> RsRes<()> {
        self.walk()?.for_each(action);
        Ok(())
    }

    /// 以分隔符合并为字符串。
    pub fn join_str(&self, sep: &str) -> RsRes<String>
    where
        T: Display,
    {
        Ok(self.walk()?.join(sep))
    }
}

impl Seq<Integer> {
    /// 生成`[start, end]`范围内步进为`step`的整数序列，`step`为负时逆序生成。
    pub fn range(start: Integer, end: Integer, step: Integer) -> Seq<Integer> {
        Seq::generate(move || range_to_iter(start, end, step))
    }
}

impl<T: Clone + 'static> From<Vec<T>> for Seq<T> {
    fn from(items: Vec<T>) -> Seq<T> {
        Seq::of(items)
    }
}

/// 单次遍历的游标。
pub struct Walk<T> {
    cursor: BoxCursor<T>,
}

impl<T> Iterator for Walk<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.cursor.next()
    }
}

impl<'a, T: 'static> IntoIterator for &'a Seq<T> {
    type Item = T;
    type IntoIter = Walk<T>;

    /// `for`循环无法返回`Result`，游标创建失败时panic上抛。
    fn into_iter(self) -> Walk<T> {
        match self.walk() {
            Ok(walk) => walk,
            Err(err) => err.raise(),
        }
    }
}

impl<T: 'static> IntoIterator for Seq<T> {
    type Item = T;
    type IntoIter = Walk<T>;

    fn into_iter(self) -> Walk<T> {
        (&self).into_iter()
    }
}
