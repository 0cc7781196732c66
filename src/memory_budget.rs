use sysinfo::System;

/// Fixed budget used by the CLI when none is given (8 GB)
pub const DEFAULT_MEMORY_BUDGET_BYTES: u64 = 8_000_000_000;

/// Smallest budget `auto_budget` will hand out
pub const MIN_AUTO_BUDGET_BYTES: u64 = 64 * 1_048_576;

/// Derive a budget from the memory currently available on this machine.
///
/// Policy:
/// - take half of available memory (the unique-line set carries hashing
///   and allocation overhead on top of the raw line bytes it counts)
/// - clamp to [MIN_AUTO_BUDGET_BYTES, DEFAULT_MEMORY_BUDGET_BYTES]
pub fn auto_budget() -> u64 {
    let mut sys = System::new();
    sys.refresh_memory();

    let available = sys.available_memory();
    let budget = budget_from_available(available);

    tracing::info!(
        "[memory_budget] Available RAM: {} MB, chunk budget: {} MB",
        available / 1_048_576,
        budget / 1_048_576
    );

    budget
}

fn budget_from_available(available_bytes: u64) -> u64 {
    (available_bytes / 2).clamp(MIN_AUTO_BUDGET_BYTES, DEFAULT_MEMORY_BUDGET_BYTES)
}
