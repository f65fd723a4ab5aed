//! Roll stage and per-round session state

use serde::Serialize;

/// The four phases of a roll round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum RollStage {
    #[default]
    Ready,
    Shaking,
    Revealed,
    TotalShown,
}

impl RollStage {
    /// The stage that follows this one in the round cycle.
    pub fn next(self) -> Self {
        match self {
            Self::Ready => Self::Shaking,
            Self::Shaking => Self::Revealed,
            Self::Revealed => Self::TotalShown,
            Self::TotalShown => Self::Ready,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Ready => "Ready",
            Self::Shaking => "Shaking",
            Self::Revealed => "Revealed",
            Self::TotalShown => "TotalShown",
        }
    }
}

/// Mutable state of the current round. Owned by the roll controller.
#[derive(Debug, Clone, PartialEq)]
pub struct RollSession {
    pub stage: RollStage,
    pub spin_energy: f32,
    /// Controller clock time of the most recent trigger.
    pub last_trigger_time: f32,
    /// One face per die, in die order. Empty outside Revealed / TotalShown.
    pub die_faces: Vec<u32>,
    pub reveal_timer: f32,
    pub shake_buffer_timer: f32,
    /// Fade-in progress of the results overlay, 0..=1.
    pub overlay_progress: f32,
}

impl Default for RollSession {
    fn default() -> Self {
        Self {
            stage: RollStage::Ready,
            spin_energy: 0.0,
            last_trigger_time: f32::NEG_INFINITY,
            die_faces: Vec::new(),
            reveal_timer: 0.0,
            shake_buffer_timer: 0.0,
            overlay_progress: 0.0,
        }
    }
}

impl RollSession {
    pub fn total(&self) -> u32 {
        self.die_faces.iter().sum()
    }

    pub fn has_faces(&self) -> bool {
        !self.die_faces.is_empty()
    }

    /// Clear everything the round accumulated. The stage is left for the
    /// caller to change.
    pub fn clear_round(&mut self) {
        *self = Self {
            stage: self.stage,
            ..Self::default()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_cycle() {
        let mut stage = RollStage::Ready;
        let mut seen = Vec::new();
        for _ in 0..4 {
            stage = stage.next();
            seen.push(stage);
        }
        assert_eq!(
            seen,
            vec![
                RollStage::Shaking,
                RollStage::Revealed,
                RollStage::TotalShown,
                RollStage::Ready
            ]
        );
    }

    #[test]
    fn test_session_default() {
        let session = RollSession::default();
        assert_eq!(session.stage, RollStage::Ready);
        assert_eq!(session.spin_energy, 0.0);
        assert!(!session.has_faces());
        assert_eq!(session.total(), 0);
    }

    #[test]
    fn test_clear_round_keeps_stage() {
        let mut session = RollSession {
            stage: RollStage::TotalShown,
            spin_energy: 0.5,
            last_trigger_time: 2.0,
            die_faces: vec![4, 2],
            reveal_timer: 0.3,
            overlay_progress: 1.0,
            ..Default::default()
        };
        session.clear_round();
        assert_eq!(session.stage, RollStage::TotalShown);
        assert_eq!(
            session,
            RollSession {
                stage: RollStage::TotalShown,
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_total_sums_faces() {
        let session = RollSession {
            die_faces: vec![1, 6, 3],
            ..Default::default()
        };
        assert_eq!(session.total(), 10);
    }
}
