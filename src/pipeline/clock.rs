//! Stream time helpers for the progress overlay and seeking

use std::time::Duration;

/// Format a stream time as `H:MM:SS.mmm`
pub fn format_clock_time(time: Duration) -> String {
    let total_millis = time.as_millis();
    let millis = total_millis % 1000;
    let total_secs = total_millis / 1000;
    let secs = total_secs % 60;
    let minutes = (total_secs / 60) % 60;
    let hours = total_secs / 3600;
    format!("{hours}:{minutes:02}:{secs:02}.{millis:03}")
}

/// Text shown in the time overlay, `None` until the source reports a position
pub fn time_label(position: Option<Duration>, duration: Option<Duration>) -> Option<String> {
    let position = position?;
    match duration.filter(|d| !d.is_zero()) {
        Some(duration) => Some(format!(
            "Time: {} / {}",
            format_clock_time(position),
            format_clock_time(duration)
        )),
        None => Some(format!("Time: {}", format_clock_time(position))),
    }
}

/// Fraction of the stream already played, `None` without a usable duration
pub fn progress_fraction(position: Option<Duration>, duration: Option<Duration>) -> Option<f32> {
    let duration = duration.filter(|d| !d.is_zero())?;
    let position = position.unwrap_or_default();
    Some((position.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0) as f32)
}

/// Seek target for a fraction along the progress bar
///
/// Never negative and never past `duration`.
pub fn seek_target(fraction: f32, duration: Duration) -> Duration {
    let fraction = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
    duration.mul_f64(fraction as f64).min(duration)
}
