use thiserror::Error;

#[derive(Error, Debug, Eq, PartialEq)]
pub enum RsErr {
    #[error("[Source] Sequence already consumed, a single-pass source cannot produce a new cursor")]
    SourceConsumed,

    #[error("[Terminal] No element for `{op}` on an exhausted sequence")]
    EmptySequence { op: &'static str },

    #[error("[Terminal] Index {index} out of range")]
    IndexOutOfRange { index: usize },
}

impl RsErr {
    /// 无法通过`Result`上抛时（例如`for`循环遍历），以panic方式上抛。
    pub(crate) fn raise(self) -> ! {
        panic!("{self}")
    }
}
