//! Problem summaries and remediation hints for the shipped rules.
//!
//! The bundle format carries five fields only, so the longer guidance that
//! diagnostics quote lives here, keyed by rule ID.

/// `(id, summary, fix)`
const GUIDANCE: &[(&str, &str, &str)] = &[
    (
        "perf_atomic_for_small_lock",
        "A mutex round-trip costs far more than a single atomic instruction on one word",
        "Replace the mutex-guarded field with a sync/atomic type such as atomic.Int64 or atomic.Bool",
    ),
    (
        "perf_avoid_linked_list",
        "Linked lists scatter nodes across the heap, defeating cache locality and adding a pointer chase per element",
        "Use a slice (or a ring buffer) and index into it",
    ),
    (
        "perf_avoid_reflection_dynamic",
        "Reflection and dynamic type checks bypass static dispatch and allocate on every iteration",
        "Hoist the reflective lookup out of the loop or switch to static types or generics",
    ),
    (
        "perf_avoid_rune_conversion",
        "Converting a string to []rune allocates and copies the whole string before the loop starts",
        "Range over the string directly; it already yields runes",
    ),
    (
        "perf_avoid_string_concat_loop",
        "Each concatenation allocates a new string and copies everything accumulated so far",
        "Accumulate into a strings.Builder (or bytes.Buffer) and call String() once after the loop",
    ),
    (
        "perf_bound_concurrency",
        "Spawning one task per item lets concurrency grow with the input and can exhaust memory and schedulers",
        "Bound the fan-out with a worker pool, a semaphore channel or errgroup.SetLimit",
    ),
    (
        "perf_borrow_instead_of_clone",
        "Cloning duplicates heap data that a borrow could have shared",
        "Pass a reference instead of cloning",
    ),
    (
        "perf_equal_fold_compare",
        "Case-converting both operands allocates two new strings just to compare them",
        "Use strings.EqualFold",
    ),
    (
        "perf_no_defer_in_loop",
        "Deferred calls run only when the function returns, so resources pile up across iterations",
        "Release the resource explicitly at the end of each iteration or move the body into a helper function",
    ),
    (
        "perf_preallocate_collections",
        "Appending to a slice without reserved capacity triggers repeated reallocation and copying as it grows",
        "Create the slice with make([]T, 0, n) when the final size is known or can be estimated",
    ),
    (
        "perf_prefer_stack_alloc",
        "Heap-allocating a tiny value costs an allocation and GC pressure for something that fits in registers",
        "Keep the value by value (on the stack) and pass it by value or take the address of a local only when needed",
    ),
    (
        "perf_regex_compile_once",
        "Compiling a regular expression parses and builds an automaton on every call",
        "Compile the pattern once into a package-level variable and reuse it",
    ),
    (
        "perf_syncpool_store_pointers",
        "Storing a non-pointer value in sync.Pool boxes it into an interface, allocating on every Put",
        "Store pointers (for example *bytes.Buffer or *[N]byte) in the pool",
    ),
    (
        "perf_use_buffered_io",
        "Small writes inside a loop each hit the underlying writer, often one syscall per call",
        "Wrap the destination in bufio.NewWriter and Flush after the loop",
    ),
    (
        "perf_vec_reserve_capacity",
        "Growing a Vec without reserved capacity reallocates repeatedly",
        "Call Vec::with_capacity or reserve before the loop",
    ),
    (
        "perf_writer_prefer_bytes",
        "Converting a byte slice to a string copies it only for the writer to treat it as bytes again",
        "Call Write with the byte slice directly",
    ),
];

/// Summary and fix hint for `id`, falling back to the description and a
/// pointer at `perfcheck explain`.
pub(super) fn lookup(id: &str, description: &str) -> (String, String) {
    match GUIDANCE.iter().find(|(rule, _, _)| *rule == id) {
        Some((_, summary, fix)) => ((*summary).to_string(), (*fix).to_string()),
        None => (
            description.to_string(),
            format!("Run `perfcheck explain {}` for guidance", id),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_rule() {
        let (summary, fix) = lookup("perf_equal_fold_compare", "ignored");
        assert!(summary.contains("allocates"));
        assert_eq!(fix, "Use strings.EqualFold");
    }

    #[test]
    fn test_unknown_rule_falls_back() {
        let (summary, fix) = lookup("perf_custom", "Custom description");
        assert_eq!(summary, "Custom description");
        assert!(fix.contains("perfcheck explain perf_custom"));
    }

    #[test]
    fn test_table_is_sorted_and_unique() {
        let ids: Vec<&str> = GUIDANCE.iter().map(|(id, _, _)| *id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(ids, sorted);
    }
}
