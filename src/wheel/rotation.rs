/// Minimum extra rotation added on top of the normalization to the next whole
/// turn: five full revolutions, enough for a visually convincing spin.
pub const MIN_EXTRA_ROTATION_DEGREES: f64 = 1800.0;

/// Compute the absolute rotation that lands the selected segment's center
/// under the fixed pointer at 12 o'clock.
///
/// Segment `i` spans `[i * span, (i + 1) * span)` clockwise, so rotating the
/// wheel clockwise by `360 - (i * span + span / 2)` brings its center to the
/// pointer. The current rotation is first normalized forward to the next
/// whole turn, then five extra revolutions and the target angle are added.
/// The result is therefore strictly greater than `current_rotation`, and
/// reduced modulo 360 it equals the target angle; the wheel never appears to
/// reverse or under-rotate across consecutive spins.
pub fn plan_rotation(current_rotation: f64, selected_index: usize, segment_count: usize) -> f64 {
    let span = 360.0 / segment_count as f64;
    let target_angle = 360.0 - (selected_index as f64 * span + span / 2.0);
    let normalized = current_rotation.rem_euclid(360.0);
    current_rotation + (360.0 - normalized) + MIN_EXTRA_ROTATION_DEGREES + target_angle
}
