//! Pose sampler: plays one animation over a shared pose at a fixed rate.
//!
//! The pose is borrowed through a [`PlaybackScope`] which captures the track
//! state on acquisition and puts it back on release. Release happens explicitly
//! on every normal and error path; `Drop` covers unwinding.

use std::ops::{Deref, DerefMut};

use crate::config::DEFAULT_SAMPLE_RATE_HZ;
use crate::error::{AnalyzerError, Result};
use crate::model::{AnimationDescriptor, PlaybackError, PosePlayback, TrackState};

/// Upper bound on samples taken for one animation.
pub const MAX_SAMPLES: usize = 1 << 20;

/// Number of samples taken for `duration` seconds at `rate_hz`, both endpoints
/// included, capped at [`MAX_SAMPLES`].
pub fn sample_count(duration: f32, rate_hz: f32) -> usize {
    let rate = effective_rate(rate_hz);
    if !(duration.is_finite() && duration > 0.0) {
        return 1;
    }
    let steps = (duration * rate).ceil();
    if !steps.is_finite() || steps >= (MAX_SAMPLES - 1) as f32 {
        log::debug!("{duration}s at {rate}Hz exceeds the sample cap; taking {MAX_SAMPLES}");
        return MAX_SAMPLES;
    }
    steps as usize + 1
}

/// Evenly spaced sample times over `[0, duration]`.
pub fn sample_times(duration: f32, rate_hz: f32) -> impl Iterator<Item = f32> {
    let count = sample_count(duration, rate_hz);
    let duration = if duration.is_finite() { duration.max(0.0) } else { 0.0 };
    (0..count).map(move |i| {
        if count == 1 {
            0.0
        } else if i + 1 == count {
            duration
        } else {
            duration * (i as f32 / (count - 1) as f32)
        }
    })
}

fn effective_rate(rate_hz: f32) -> f32 {
    if rate_hz.is_finite() && rate_hz > 0.0 {
        rate_hz
    } else {
        DEFAULT_SAMPLE_RATE_HZ
    }
}

/// Exclusive borrow of a pose whose track state is restored when the scope ends.
pub struct PlaybackScope<'a, P: PosePlayback + ?Sized> {
    pose: &'a mut P,
    saved: Option<TrackState>,
}

impl<'a, P: PosePlayback + ?Sized> PlaybackScope<'a, P> {
    pub fn acquire(pose: &'a mut P) -> Self {
        let saved = pose.track_state();
        Self {
            pose,
            saved: Some(saved),
        }
    }

    /// Track state captured on acquisition.
    pub fn saved_state(&self) -> Option<&TrackState> {
        self.saved.as_ref()
    }

    /// Restore the captured state and end the scope.
    pub fn release(mut self) -> std::result::Result<(), PlaybackError> {
        match self.saved.take() {
            Some(state) => restore(&mut *self.pose, &state),
            None => Ok(()),
        }
    }
}

impl<P: PosePlayback + ?Sized> Deref for PlaybackScope<'_, P> {
    type Target = P;

    fn deref(&self) -> &P {
        self.pose
    }
}

impl<P: PosePlayback + ?Sized> DerefMut for PlaybackScope<'_, P> {
    fn deref_mut(&mut self) -> &mut P {
        self.pose
    }
}

impl<P: PosePlayback + ?Sized> Drop for PlaybackScope<'_, P> {
    fn drop(&mut self) {
        if let Some(state) = self.saved.take() {
            log::warn!("playback scope dropped without release; restoring track state");
            if let Err(err) = restore(&mut *self.pose, &state) {
                log::warn!("failed to restore track state on drop: {err}");
            }
        }
    }
}

fn restore<P: PosePlayback + ?Sized>(
    pose: &mut P,
    state: &TrackState,
) -> std::result::Result<(), PlaybackError> {
    pose.set_animation(state.animation.as_deref(), state.looping)?;
    pose.set_track_time(state.time)?;
    pose.apply()?;
    pose.update_world_transforms()
}

fn drive<P, F>(
    pose: &mut P,
    animation: &AnimationDescriptor,
    rate_hz: f32,
    on_sample: &mut F,
) -> std::result::Result<usize, PlaybackError>
where
    P: PosePlayback + ?Sized,
    F: FnMut(f32, &P),
{
    pose.set_animation(Some(&animation.name), false)?;
    let mut taken = 0usize;
    for time in sample_times(animation.duration, rate_hz) {
        pose.set_track_time(time)?;
        pose.apply()?;
        pose.update_world_transforms()?;
        log::trace!("sample '{}' t={time}", animation.name);
        on_sample(time, &*pose);
        taken += 1;
    }
    Ok(taken)
}

/// Drive `pose` through `animation` from 0 to its duration, calling `on_sample`
/// once per sample. Returns the number of samples taken.
///
/// The pose's track state is restored before returning, including when
/// playback fails. Calls on the same pose must not be interleaved.
pub fn sample<P, F>(
    pose: &mut P,
    animation: &AnimationDescriptor,
    rate_hz: f32,
    mut on_sample: F,
) -> Result<usize>
where
    P: PosePlayback + ?Sized,
    F: FnMut(f32, &P),
{
    let mut scope = PlaybackScope::acquire(pose);
    let driven = drive(&mut *scope, animation, rate_hz, &mut on_sample);
    let restored = scope.release();

    match (driven, restored) {
        (Ok(count), Ok(())) => Ok(count),
        (Err(source), restored) => {
            if let Err(err) = restored {
                log::warn!(
                    "restore after failed sampling of '{}' also failed: {err}",
                    animation.name
                );
            }
            Err(AnalyzerError::Playback {
                animation: animation.name.clone(),
                source,
            })
        }
        (Ok(_), Err(source)) => Err(AnalyzerError::Restore {
            animation: animation.name.clone(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_include_both_endpoints() {
        assert_eq!(sample_count(1.0, 30.0), 31);
        assert_eq!(sample_count(0.0, 30.0), 1);
        assert_eq!(sample_count(0.5, 4.0), 3);
        assert_eq!(sample_count(0.01, 30.0), 2);
    }

    #[test]
    fn huge_spans_are_capped() {
        assert_eq!(sample_count(f32::MAX, 30.0), MAX_SAMPLES);
        assert_eq!(sample_count(1.0, f32::MAX), MAX_SAMPLES);
        assert_eq!(sample_count(1.0e6, 1.0e6), MAX_SAMPLES);
        let times: Vec<f32> = sample_times(f32::MAX, 30.0).take(3).collect();
        assert_eq!(times[0], 0.0);
        assert!(times.iter().all(|t| t.is_finite()));
    }

    #[test]
    fn invalid_rate_falls_back() {
        assert_eq!(sample_count(1.0, 0.0), 31);
        assert_eq!(sample_count(1.0, f32::NAN), 31);
    }

    #[test]
    fn times_are_even_and_hit_the_end() {
        let times: Vec<f32> = sample_times(0.5, 4.0).collect();
        assert_eq!(times, vec![0.0, 0.25, 0.5]);
        let zero: Vec<f32> = sample_times(0.0, 30.0).collect();
        assert_eq!(zero, vec![0.0]);
    }
}
