use super::{BASELINE_SPEED, MAX_LADDER_LEN, SpeedLadder, SpeedOp, format_speed};
use crate::error::ValidationError;

fn approx(left: f64, right: f64) -> bool {
    (left - right).abs() < 1e-9
}

#[test]
fn default_ladder_spans_one_to_three_in_quarters() -> Result<(), String> {
    let ladder = SpeedLadder::default();
    let expected = [1.0, 1.25, 1.5, 1.75, 2.0, 2.25, 2.5, 2.75, 3.0];
    if ladder.len() != expected.len() {
        return Err(format!("Unexpected ladder length: {}", ladder.len()));
    }
    for (speed, want) in ladder.speeds().iter().zip(expected) {
        if !approx(*speed, want) {
            return Err(format!("Unexpected rung {} (want {})", speed, want));
        }
    }
    Ok(())
}

#[test]
fn ladder_length_matches_bounds() -> Result<(), String> {
    let ladder = SpeedLadder::new(0.5, 2.0, 0.1).map_err(|err| err.to_string())?;
    if ladder.len() != 16 {
        return Err(format!("Unexpected ladder length: {}", ladder.len()));
    }
    if !approx(ladder.max(), 2.0) {
        return Err(format!("Unexpected max: {}", ladder.max()));
    }
    let increasing = ladder
        .speeds()
        .windows(2)
        .all(|pair| matches!(pair, [low, high] if low < high));
    if !increasing {
        return Err("Expected strictly increasing ladder".to_owned());
    }
    Ok(())
}

#[test]
fn ladder_rejects_invalid_bounds() -> Result<(), String> {
    if !matches!(
        SpeedLadder::new(0.0, 2.0, 0.25),
        Err(ValidationError::LadderMinNotPositive { .. })
    ) {
        return Err("Expected min rejection".to_owned());
    }
    if !matches!(
        SpeedLadder::new(1.0, 2.0, 0.0),
        Err(ValidationError::LadderStepNotPositive { .. })
    ) {
        return Err("Expected step rejection".to_owned());
    }
    if !matches!(
        SpeedLadder::new(2.0, 1.0, 0.25),
        Err(ValidationError::LadderMaxBelowMin { .. })
    ) {
        return Err("Expected max rejection".to_owned());
    }
    if !matches!(
        SpeedLadder::new(1.0, f64::INFINITY, 0.25),
        Err(ValidationError::LadderNotFinite { field: "max" })
    ) {
        return Err("Expected finite rejection".to_owned());
    }
    Ok(())
}

#[test]
fn ladder_rejects_oversized_bounds() -> Result<(), String> {
    for (min, max, step) in [(1.0, 1e18, 0.001), (1.0, 3.0, 1e-12)] {
        match SpeedLadder::new(min, max, step) {
            Err(ValidationError::LadderTooLong { max: cap, .. }) if cap == MAX_LADDER_LEN => {}
            other => {
                return Err(format!(
                    "({}, {}, {}): unexpected result {:?}",
                    min, max, step, other
                ));
            }
        }
    }
    let widest = SpeedLadder::new(1.0, 1.0 + 0.5 * (MAX_LADDER_LEN - 1) as f64, 0.5)
        .map_err(|err| err.to_string())?;
    if widest.len() != MAX_LADDER_LEN {
        return Err(format!("Unexpected ladder length: {}", widest.len()));
    }
    if !matches!(
        SpeedLadder::new(1.0, 1.0 + 0.5 * MAX_LADDER_LEN as f64, 0.5),
        Err(ValidationError::LadderTooLong { .. })
    ) {
        return Err("Expected one rung past the cap to be rejected".to_owned());
    }
    Ok(())
}

#[test]
fn closest_returns_nearest_member() -> Result<(), String> {
    let ladder = SpeedLadder::default();
    let mut sample = 1.0;
    while sample <= 3.0 {
        let picked = ladder.closest(sample);
        if !ladder.speeds().iter().any(|speed| approx(*speed, picked)) {
            return Err(format!("closest({}) = {} is not a rung", sample, picked));
        }
        let distance = (picked - sample).abs();
        if let Some(better) = ladder
            .speeds()
            .iter()
            .find(|speed| (**speed - sample).abs() < distance)
        {
            return Err(format!(
                "closest({}) = {} but {} is nearer",
                sample, picked, better
            ));
        }
        sample += 0.01;
    }
    Ok(())
}

#[test]
fn closest_breaks_ties_downward() -> Result<(), String> {
    let ladder = SpeedLadder::default();
    if !approx(ladder.closest(1.125), 1.0) {
        return Err(format!("Unexpected tie: {}", ladder.closest(1.125)));
    }
    if !approx(ladder.closest(2.875), 2.75) {
        return Err(format!("Unexpected tie: {}", ladder.closest(2.875)));
    }
    if !approx(ladder.closest(0.1), 1.0) || !approx(ladder.closest(9.0), 3.0) {
        return Err("Expected out-of-range rates to snap to the ends".to_owned());
    }
    Ok(())
}

#[test]
fn next_saturates_at_max() -> Result<(), String> {
    let ladder = SpeedLadder::default();
    let mut rate = 1.0;
    for _ in 1..ladder.len() {
        rate = ladder.next(rate);
    }
    if !approx(rate, 3.0) {
        return Err(format!("Expected 3.0 after full climb, got {}", rate));
    }
    if !approx(ladder.next(rate), 3.0) {
        return Err("Expected next to saturate".to_owned());
    }
    if !approx(ladder.next(7.5), 3.0) {
        return Err("Expected rates above the ladder to saturate".to_owned());
    }
    Ok(())
}

#[test]
fn prev_saturates_at_min() -> Result<(), String> {
    let ladder = SpeedLadder::default();
    let mut rate = 3.0;
    for _ in 1..ladder.len() {
        rate = ladder.prev(rate);
    }
    if !approx(rate, 1.0) {
        return Err(format!("Expected 1.0 after full descent, got {}", rate));
    }
    if !approx(ladder.prev(rate), 1.0) || !approx(ladder.prev(0.25), 1.0) {
        return Err("Expected prev to saturate".to_owned());
    }
    if !approx(ladder.prev(4.0), 3.0) {
        return Err(format!("Expected prev above ladder to hit max, got {}", ladder.prev(4.0)));
    }
    Ok(())
}

#[test]
fn off_ladder_rate_steps_from_next_rung() -> Result<(), String> {
    let ladder = SpeedLadder::default();
    let raised = ladder.apply(SpeedOp::Increase, 1.83);
    if !approx(raised, 2.25) {
        return Err(format!("Expected 2.25, got {}", raised));
    }
    if format_speed(raised) != "2.25x" {
        return Err(format!("Unexpected label: {}", format_speed(raised)));
    }
    let lowered = ladder.apply(SpeedOp::Decrease, 1.83);
    if !approx(lowered, 1.75) {
        return Err(format!("Expected 1.75, got {}", lowered));
    }
    Ok(())
}

#[test]
fn reset_ignores_ladder_bounds() -> Result<(), String> {
    let ladder = SpeedLadder::new(1.5, 4.0, 0.5).map_err(|err| err.to_string())?;
    for rate in [1.5, 2.5, 4.0, f64::NAN] {
        if !approx(ladder.apply(SpeedOp::Reset, rate), BASELINE_SPEED) {
            return Err(format!("Expected reset from {} to 1.0", rate));
        }
    }
    Ok(())
}

#[test]
fn nan_rate_saturates_upward() -> Result<(), String> {
    let ladder = SpeedLadder::default();
    if !approx(ladder.next(f64::NAN), 3.0) || !approx(ladder.prev(f64::NAN), 3.0) {
        return Err("Expected NaN to find no rung and saturate at max".to_owned());
    }
    Ok(())
}
