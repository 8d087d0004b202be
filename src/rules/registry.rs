use super::atomic_small_lock::AtomicSmallLockRule;
use super::io_rules::{BufferedIoRule, WriterPreferBytesRule};
use super::loop_rules::{
    BoundConcurrencyRule, DeferInLoopRule, ReflectionLoopRule, RegexCompileLoopRule,
    StringConcatLoopRule,
};
use super::memory_rules::{EqualFoldRule, LinkedListRule, RuneConversionRule, SyncPoolPointerRule};
use super::preallocate::PreallocateCollectionsRule;
use super::stack_alloc::StackAllocRule;
use super::Rule;

/// Get all registered rules
pub fn all_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(PreallocateCollectionsRule),
        Box::new(AtomicSmallLockRule),
        Box::new(StackAllocRule),
        Box::new(StringConcatLoopRule),
        Box::new(RegexCompileLoopRule),
        Box::new(ReflectionLoopRule),
        Box::new(BoundConcurrencyRule),
        Box::new(EqualFoldRule),
        Box::new(SyncPoolPointerRule),
        Box::new(WriterPreferBytesRule),
        Box::new(LinkedListRule),
        Box::new(DeferInLoopRule),
        Box::new(RuneConversionRule),
        Box::new(BufferedIoRule),
    ]
}
