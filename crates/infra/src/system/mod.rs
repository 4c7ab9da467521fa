use chrono::Utc;

/// Clock seam for the dispatcher. Every run reads its evaluation time through
/// this trait instead of the wall clock, so tests can pin `now` and assert
/// which reminders count as due deterministically.
pub trait ISys: Send + Sync {
    /// Current unix timestamp in millis
    fn get_timestamp_millis(&self) -> i64;
}

/// Wall-clock implementation, used everywhere outside of tests
pub struct RealSys {}
impl ISys for RealSys {
    fn get_timestamp_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}
