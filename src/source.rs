use crate::node::{BoxCursor, Node};
use crate::{Integer, RsErr, RsRes};
use std::cell::RefCell;
use std::rc::Rc;

/// 可重复遍历的数组源，每次遍历产生全新游标，按下标克隆元素。
pub(crate) struct ArraySource<T> {
    pub(crate) items: Rc<Vec<T>>,
}

impl<T: Clone + 'static> Node<T> for ArraySource<T> {
    fn cursor(&self) -> RsRes<BoxCursor<T>> {
        Ok(Box::new(ArrayCursor { items: Rc::clone(&self.items), pos: 0 }))
    }
}

struct ArrayCursor<T> {
    items: Rc<Vec<T>>,
    pos: usize,
}

impl<T: Clone> Iterator for ArrayCursor<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let item = self.items.get(self.pos).cloned();
        if item.is_some() {
            self.pos += 1;
        }
        item
    }
}

/// 一次性外部迭代器源，游标只能取出一次，再次取出报错。
pub(crate) struct StreamSource<T> {
    pub(crate) iter: RefCell<Option<BoxCursor<T>>>,
}

impl<T: 'static> Node<T> for StreamSource<T> {
    fn cursor(&self) -> RsRes<BoxCursor<T>> {
        self.iter.borrow_mut().take().ok_or(RsErr::SourceConsumed)
    }
}

/// 生成器源，每次遍历由工厂重新生成游标，支持无界序列。
pub(crate) struct GenSource<T> {
    pub(crate) make: Rc<dyn Fn() -> BoxCursor<T>>,
}

impl<T: 'static> Node<T> for GenSource<T> {
    fn cursor(&self) -> RsRes<BoxCursor<T>> {
        Ok((self.make)())
    }
}

pub(crate) fn range_to_iter(start: Integer, end: Integer, step: Integer) -> Box<dyn DoubleEndedIterator<Item = Integer>> {
    let iter = RangeIter { start, end, step: Integer::abs(step), next: start, next_back: end };
    if step < 0 { Box::new(iter.rev()) } else { Box::new(iter) }
}

#[derive(Debug, Eq, PartialEq)]
struct RangeIter {
    start: Integer,
    end: Integer,
    step: Integer,
    next: Integer,
    next_back: Integer,
}

impl Iterator for RangeIter {
    type Item = Integer;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.start && self.next <= self.end && self.next <= self.next_back {
            let res = Some(self.next);
            self.next += self.step;
            res
        } else {
            None
        }
    }
}

impl DoubleEndedIterator for RangeIter {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.next_back >= self.start && self.next_back <= self.end && self.next_back >= self.next {
            let res = Some(self.next_back);
            self.next_back -= self.step;
            res
        } else {
            None
        }
    }
}
