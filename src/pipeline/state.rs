//! Stage lifecycle and session state management

use std::time::Duration;

/// Lifecycle state of a single media stage
///
/// Mirrors the four states every stage moves through. A stage may be asked to
/// jump to any state; the media runtime walks the intermediate ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StageState {
    /// Not allocated, no resources held
    #[default]
    Null,

    /// Resources allocated, not processing
    Ready,

    /// Prerolled, delivery halted
    Paused,

    /// Actively processing media
    Playing,
}

impl StageState {
    /// Get a human-readable description of this state
    pub fn description(&self) -> &'static str {
        match self {
            StageState::Null => "NULL",
            StageState::Ready => "READY",
            StageState::Paused => "PAUSED",
            StageState::Playing => "PLAYING",
        }
    }

    /// Check if the stage is playing
    pub fn is_playing(&self) -> bool {
        matches!(self, StageState::Playing)
    }

    /// Check if a `start` request is acceptable from this state
    pub fn can_start(&self) -> bool {
        matches!(self, StageState::Null | StageState::Ready)
    }

    /// State a pause toggle moves to from this state
    pub fn toggled(&self) -> StageState {
        if self.is_playing() {
            StageState::Paused
        } else {
            StageState::Playing
        }
    }
}

impl std::fmt::Display for StageState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Session state machine of the coordinator
///
/// Recording is an orthogonal axis tracked by [`PlaybackState::recording`];
/// use [`SessionState::describe`] to render the combined state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Stages built, not yet started
    #[default]
    Initializing,

    /// Preview running
    Previewing,

    /// Preview halted by the operator
    Paused,

    /// Teardown in progress or finished
    ShuttingDown,
}

impl SessionState {
    /// Check if this state transition is valid
    pub fn can_transition_to(&self, target: &SessionState) -> bool {
        use SessionState::*;

        match (self, target) {
            (Initializing, Previewing) => true,
            (Initializing, ShuttingDown) => true,

            (Previewing, Paused) => true,
            (Paused, Previewing) => true,

            (Previewing, ShuttingDown) => true,
            (Paused, ShuttingDown) => true,

            // no way back once teardown began
            (ShuttingDown, _) => false,

            (a, b) if a == b => true,

            _ => false,
        }
    }

    /// Get a human-readable description of this state
    pub fn description(&self) -> &'static str {
        match self {
            SessionState::Initializing => "Initializing",
            SessionState::Previewing => "Previewing",
            SessionState::Paused => "Paused",
            SessionState::ShuttingDown => "ShuttingDown",
        }
    }

    /// Describe the state combined with the recording axis
    pub fn describe(&self, recording: bool) -> String {
        match self {
            SessionState::Previewing | SessionState::Paused if recording => {
                format!("{}+Recording", self.description())
            }
            _ => self.description().to_string(),
        }
    }

    pub fn is_shutting_down(&self) -> bool {
        matches!(self, SessionState::ShuttingDown)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Operator-visible playback state
///
/// Mutated only by the coordinator, in response to input events or the
/// per-tick position/duration queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaybackState {
    pub pausing: bool,
    pub recording: bool,
    /// Last known stream position, `None` if the source could not answer
    pub position: Option<Duration>,
    /// Last known stream duration, `None` for live sources
    pub duration: Option<Duration>,
}

impl PlaybackState {
    /// Duration usable for the progress overlay and seeking
    ///
    /// A zero duration is as good as none: nothing can be drawn or sought.
    pub fn known_duration(&self) -> Option<Duration> {
        self.duration.filter(|d| !d.is_zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_round_trip() {
        let playing = StageState::Playing;
        assert_eq!(playing.toggled(), StageState::Paused);
        assert_eq!(playing.toggled().toggled(), StageState::Playing);

        // anything not playing resumes
        assert_eq!(StageState::Ready.toggled(), StageState::Playing);
        assert_eq!(StageState::Null.toggled(), StageState::Playing);
    }

    #[test]
    fn test_can_start() {
        assert!(StageState::Null.can_start());
        assert!(StageState::Ready.can_start());
        assert!(!StageState::Paused.can_start());
        assert!(!StageState::Playing.can_start());
    }

    #[test]
    fn test_valid_session_transitions() {
        use SessionState::*;

        assert!(Initializing.can_transition_to(&Previewing));
        assert!(Previewing.can_transition_to(&Paused));
        assert!(Paused.can_transition_to(&Previewing));
        assert!(Paused.can_transition_to(&ShuttingDown));
        assert!(Initializing.can_transition_to(&ShuttingDown));

        assert!(Previewing.can_transition_to(&Previewing));
    }

    #[test]
    fn test_invalid_session_transitions() {
        use SessionState::*;

        assert!(!Initializing.can_transition_to(&Paused));
        assert!(!ShuttingDown.can_transition_to(&Previewing));
        assert!(!ShuttingDown.can_transition_to(&ShuttingDown));
        assert!(!Previewing.can_transition_to(&Initializing));
    }

    #[test]
    fn test_describe_cross_product() {
        assert_eq!(SessionState::Previewing.describe(false), "Previewing");
        assert_eq!(SessionState::Previewing.describe(true), "Previewing+Recording");
        assert_eq!(SessionState::Paused.describe(true), "Paused+Recording");
        assert_eq!(SessionState::ShuttingDown.describe(true), "ShuttingDown");
    }

    #[test]
    fn test_known_duration() {
        let mut playback = PlaybackState::default();
        assert_eq!(playback.known_duration(), None);

        playback.duration = Some(Duration::ZERO);
        assert_eq!(playback.known_duration(), None);

        playback.duration = Some(Duration::from_secs(3));
        assert_eq!(playback.known_duration(), Some(Duration::from_secs(3)));
    }
}
