/// LIFO used by the converter (operators) and the evaluator (values).
///
/// Popping an empty stack yields `None`; there is no fallback value.
#[derive(Debug, Clone)]
pub(crate) struct Stack<T> {
    values: Vec<T>,
}

impl<T> Stack<T> {
    pub fn new() -> Self {
        Stack { values: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Stack {
            values: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, value: T) {
        self.values.push(value);
    }

    pub fn pop(&mut self) -> Option<T> {
        self.values.pop()
    }

    pub fn peek(&self) -> Option<&T> {
        self.values.last()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Top first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.values.iter().rev()
    }
}
