//! Points awarded for a leaderboard placement.

/// Points for finishing at `place` on a level leaderboard.
///
/// The podium gets 100 / 97 / 95, everyone else `98 - place`, floored at
/// zero (so place 98 and beyond score nothing). Non-positive places are not
/// validated and fall through to the same formula.
pub fn points_for_place(place: i64) -> i64 {
    match place {
        1 => 100,
        2 => 97,
        3 => 95,
        _ => (98 - place).max(0),
    }
}
