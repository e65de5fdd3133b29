/// Renders elapsed seconds as an `MM:SS` clock.
///
/// Minutes keep growing past an hour: `3661` renders as `61:01`.
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
