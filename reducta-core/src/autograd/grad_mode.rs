//! Thread-local switch selecting second-order-capable backward formulas.

use std::cell::Cell;

thread_local! {
    static CREATE_GRAPH: Cell<bool> = const { Cell::new(false) };
}

/// Whether backward formulas must stay differentiable themselves.
pub fn is_create_graph_enabled() -> bool {
    CREATE_GRAPH.with(Cell::get)
}

/// Sets the switch for the current thread until the guard is dropped.
#[derive(Debug)]
pub struct CreateGraphGuard {
    previous: bool,
}

impl CreateGraphGuard {
    pub fn new(enabled: bool) -> Self {
        let previous = CREATE_GRAPH.with(|flag| flag.replace(enabled));
        CreateGraphGuard { previous }
    }
}

impl Drop for CreateGraphGuard {
    fn drop(&mut self) {
        CREATE_GRAPH.with(|flag| flag.set(self.previous));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_restores_previous_state() {
        assert!(!is_create_graph_enabled());
        {
            let _outer = CreateGraphGuard::new(true);
            assert!(is_create_graph_enabled());
            {
                let _inner = CreateGraphGuard::new(false);
                assert!(!is_create_graph_enabled());
            }
            assert!(is_create_graph_enabled());
        }
        assert!(!is_create_graph_enabled());
    }
}
