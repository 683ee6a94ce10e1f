pub mod backward_pass;
pub mod diagnostics;
pub mod float;
pub mod forward_pass;

/// Per-task day numbers, indexed like `ScheduleDag` nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateWindow {
    pub start: Vec<i64>,
    pub finish: Vec<i64>,
}

impl DateWindow {
    pub(crate) fn zeroed(len: usize) -> Self {
        Self {
            start: vec![0; len],
            finish: vec![0; len],
        }
    }
}
