//! Spin energy model
//!
//! Closed-form pieces of the shaking feel: how energy maps to rotation speed,
//! how fast it bleeds off, and how a trigger press tops it up.

use crate::shaker::types::EnergySettings;

/// Energy at or below this counts as depleted.
pub const ENERGY_EPSILON: f32 = 1e-4;

pub(crate) fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

pub(crate) fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    if (b - a).abs() < f32::EPSILON {
        return 0.0;
    }
    ((value - a) / (b - a)).clamp(0.0, 1.0)
}

/// Frame-rate independent blend weight for exponential smoothing.
pub fn smoothing_weight(rate: f32, dt: f32) -> f32 {
    1.0 - (-rate * dt).exp()
}

impl EnergySettings {
    /// Saturating map from energy to a speed multiplier: `A * (1 - e^(-B*E))`.
    pub fn speed_factor(&self, energy: f32) -> f32 {
        if energy <= 0.0 {
            return 0.0;
        }
        self.speed_cap * (1.0 - (-self.speed_rate * energy).exp())
    }

    /// Energy after one trigger press.
    pub fn add_press(&self, energy: f32) -> f32 {
        (energy + self.energy_per_press).min(self.max_energy)
    }

    /// Uncapped decay rate in energy per second.
    ///
    /// `idle_time` is the time since the last trigger and `avg_speed` the
    /// average die speed in degrees per second.
    pub fn decay_rate(&self, energy: f32, idle_time: f32, avg_speed: f32) -> f32 {
        let mut ramp = 0.0;
        if idle_time > self.idle_threshold {
            ramp = ((idle_time - self.idle_threshold) / self.ramp_duration.max(0.01)).clamp(0.0, 1.0);
        }

        let mut decay = lerp(self.decay_base, self.decay_idle, ramp);
        if energy > self.energy_threshold {
            decay += self.energy_decay_k * (energy - self.energy_threshold);
        }
        decay += self.speed_friction_k * avg_speed.max(0.0);
        decay.max(0.0)
    }

    /// Raise `decay` so the estimated time to zero stays within `max_stop_time`.
    pub fn cap_decay(&self, energy: f32, decay: f32) -> f32 {
        if decay > ENERGY_EPSILON && energy / decay > self.max_stop_time {
            return energy / self.max_stop_time.max(0.1);
        }
        decay
    }

    /// Advance energy by `dt` seconds of decay.
    pub fn step(&self, energy: f32, idle_time: f32, avg_speed: f32, dt: f32) -> f32 {
        if energy <= 0.0 {
            return 0.0;
        }
        let decay = self.cap_decay(energy, self.decay_rate(energy, idle_time, avg_speed));
        (energy - decay * dt).max(0.0)
    }
}
