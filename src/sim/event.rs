/// Events emitted during a simulation step.
/// The shell consumes these for sound and for ending the process;
/// the simulation itself never performs a side effect directly.

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    TreasureFound { item: String },
    DoorOpened,
    /// A faced door refused to open for lack of its key.
    DoorLocked,
    Dialogue,
    HeroDied,
    /// The hero warped onto another map; the shell switches music.
    MapEntered { map: usize },
    GameWon,
    /// The post-win countdown expired; the shell exits its loop.
    Quit,
}
