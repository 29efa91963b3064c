use chrono::NaiveDateTime;

/// Age, in whole days, at which the stored aggregate is considered stale.
pub const MAX_AGE_DAYS: i64 = 1;

/// Decide whether a run should fetch at all.
///
/// Age is measured in whole days: 23h59m old is fresh, 24h is stale. A
/// missing timestamp (first run, or one the state store could not read)
/// always asks for a refresh.
pub fn needs_refresh(last_updated: Option<NaiveDateTime>, now: NaiveDateTime, force: bool) -> bool {
    if force {
        return true;
    }
    match last_updated {
        None => true,
        Some(ts) => (now - ts).num_days() >= MAX_AGE_DAYS,
    }
}
