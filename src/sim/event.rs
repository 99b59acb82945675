/// Events emitted during a simulation step.
/// The presentation layer consumes these for sound and HUD flashes.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameEvent {
    GoldCollected { level: usize },
    Bounced,
    LifeLost { lives_left: u32 },
    LevelCompleted { level: usize },
    GameWon,
    GameLost,
}
