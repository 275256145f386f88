use crate::math::Vec3;
use crate::spatial::listener::ListenerPose;
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};

/// Distance in engine meters inside which a source plays at full volume.
/// Beyond it, gain falls off as `CURVE_DISTANCE_SCALER / distance`.
pub const CURVE_DISTANCE_SCALER: f32 = 4.0;

/// Widest output layout a voice's gain matrix can address.
pub const MAX_OUTPUT_CHANNELS: usize = 8;

/// Mild boost applied to non-spatial playback so flat cues sit above the
/// attenuated 3D mix.
const FLAT_GAIN_BOOST: f32 = 1.1;

/// Front-left/front-right pair.
const RING_STEREO: [(usize, f32); 2] = [(0, -FRAC_PI_2), (1, FRAC_PI_2)];

/// FL, FR, BL, BR.
const RING_QUAD: [(usize, f32); 4] = [
    (2, -3.0 * FRAC_PI_4),
    (0, -FRAC_PI_4),
    (1, FRAC_PI_4),
    (3, 3.0 * FRAC_PI_4),
];

/// 5.1: FL, FR, FC, LFE, BL, BR. The LFE channel is not part of the ring.
const RING_5_1: [(usize, f32); 5] = [
    (4, -3.0 * FRAC_PI_4),
    (0, -FRAC_PI_4),
    (2, 0.0),
    (1, FRAC_PI_4),
    (5, 3.0 * FRAC_PI_4),
];

/// 7.1: FL, FR, FC, LFE, BL, BR, SL, SR. The LFE channel is not part of
/// the ring.
const RING_7_1: [(usize, f32); 7] = [
    (4, -3.0 * FRAC_PI_4),
    (6, -FRAC_PI_2),
    (0, -FRAC_PI_4),
    (2, 0.0),
    (1, FRAC_PI_4),
    (7, FRAC_PI_2),
    (5, 3.0 * FRAC_PI_4),
];

/// Fills `matrix` for non-spatial playback: every destination channel gets
/// the same boosted even share.
pub fn fill_flat_matrix(matrix: &mut [f32; MAX_OUTPUT_CHANNELS], dest_channels: u16) {
    matrix.fill(0.0);
    let dest = (dest_channels as usize).clamp(1, MAX_OUTPUT_CHANNELS);
    let gain = FLAT_GAIN_BOOST / dest as f32;
    for value in &mut matrix[..dest] {
        *value = gain;
    }
}

/// Fills `matrix` with per-channel gains for a source at `source_position`.
///
/// Gain combines distance attenuation with a constant-power pan between the
/// two ring speakers bracketing the source's azimuth. Positions and the
/// listener pose are both in engine space.
pub fn fill_spatial_matrix(
    matrix: &mut [f32; MAX_OUTPUT_CHANNELS],
    dest_channels: u16,
    listener: &ListenerPose,
    source_position: Vec3,
) {
    matrix.fill(0.0);
    let dest = (dest_channels as usize).clamp(1, MAX_OUTPUT_CHANNELS);

    let offset = source_position - listener.position;
    let distance = offset.length();
    let attenuation = if distance <= CURVE_DISTANCE_SCALER {
        1.0
    } else {
        CURVE_DISTANCE_SCALER / distance
    };

    if dest == 1 {
        matrix[0] = attenuation;
        return;
    }

    // Angle around the listener: 0 is dead ahead, positive is to the right.
    // atan2 of the two projections keeps this independent of distance.
    let azimuth = offset
        .dot(listener.right())
        .atan2(offset.dot(listener.forward));

    let (ring, count) = speaker_ring(dest);
    let ring = &ring[..count];

    // Last ring entry at or below the azimuth; sources past the seam wrap
    // onto the final speaker.
    let mut lower = count - 1;
    for (i, &(_, speaker_azimuth)) in ring.iter().enumerate() {
        if speaker_azimuth <= azimuth {
            lower = i;
        }
    }
    let upper = (lower + 1) % count;
    let (lower_channel, lower_azimuth) = ring[lower];
    let (upper_channel, upper_azimuth) = ring[upper];

    let mut arc = upper_azimuth - lower_azimuth;
    if arc <= 0.0 {
        arc += TAU;
    }
    let mut swept = azimuth - lower_azimuth;
    if swept < 0.0 {
        swept += TAU;
    }
    let pan = (swept / arc).clamp(0.0, 1.0) * FRAC_PI_2;

    matrix[lower_channel] = attenuation * pan.cos();
    matrix[upper_channel] = attenuation * pan.sin();
}

/// Speaker azimuths for a layout, sorted left-to-right through the front.
///
/// Standard layouts place speakers at their conventional positions and leave
/// LFE out; anything else gets an evenly spaced ring in channel order.
fn speaker_ring(dest_channels: usize) -> ([(usize, f32); MAX_OUTPUT_CHANNELS], usize) {
    let mut ring = [(0usize, 0.0f32); MAX_OUTPUT_CHANNELS];
    let known: &[(usize, f32)] = match dest_channels {
        2 => &RING_STEREO,
        4 => &RING_QUAD,
        6 => &RING_5_1,
        8 => &RING_7_1,
        _ => &[],
    };
    if !known.is_empty() {
        ring[..known.len()].copy_from_slice(known);
        return (ring, known.len());
    }
    for (i, slot) in ring.iter_mut().take(dest_channels).enumerate() {
        *slot = (i, -PI + TAU * i as f32 / dest_channels as f32);
    }
    (ring, dest_channels)
}
