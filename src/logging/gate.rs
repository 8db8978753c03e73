//! Level gate: decides whether a record is emitted under the current run mode.
use super::types::{Level, RunMode};

/// Return `true` if a record at `level` should be emitted in `mode`.
///
/// DEBUG is suppressed in release mode; everything else always passes.
#[must_use]
pub const fn should_emit(level: Level, mode: RunMode) -> bool {
    !matches!((level, mode), (Level::Debug, RunMode::Release))
}
