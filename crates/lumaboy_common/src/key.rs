/// Keyboard keys the frontends know how to forward.
///
/// Runners map their native keycodes onto this enum; anything else becomes
/// `Key::None`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Z,
    X,
    A,
    S,
    Enter,
    Backspace,
    Escape,
    F5,
    F8,
    None,
}
