//! Stack growth for recursive tree walks

/// Remaining stack below which a new segment is allocated (128KB)
const STACK_RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated segment (4MB)
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024;

/// Run `f`, first switching to a fresh stack segment if the current one is
/// nearly exhausted.
///
/// Every recursive walk over the syntax tree (parsing, rendering, dropping
/// and evaluation) goes through here, so nesting depth is bounded by memory
/// rather than by the native thread stack.
#[inline]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, f)
}
