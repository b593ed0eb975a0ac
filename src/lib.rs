//! 惰性序列流水线：链式算子只构建不可变节点链，终结操作创建游标逐元素拉取，
//! 中间不物化任何临时数组。
//!
//! ```
//! use rseq::Seq;
//!
//! let squares_of_even = Seq::of(vec![1, 2, 3, 4, 5])
//!     .filter(|value| value % 2 == 0)
//!     .select(|value| value * value)
//!     .to_vec()
//!     .unwrap();
//! assert_eq!(squares_of_even, vec![4, 16]);
//! ```

mod err;
mod node;
mod seq;
mod source;

pub use crate::err::RsErr;
pub use crate::node::group::Group;
pub use crate::seq::{Seq, Walk};

/// 整数类型
pub type Integer = i64;

pub type RsRes<T> = Result<T, RsErr>;
