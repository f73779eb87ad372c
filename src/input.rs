/// Page actions reachable from the keyboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    /// Blow the candles out by hand.
    Blow,
    Relight,
    MakeWish,
    Share,
    ClosePanel,
}

#[inline]
pub fn action_for_key(key: &str) -> Option<KeyAction> {
    match key {
        " " | "b" | "B" => Some(KeyAction::Blow),
        "r" | "R" => Some(KeyAction::Relight),
        "w" | "W" => Some(KeyAction::MakeWish),
        "s" | "S" => Some(KeyAction::Share),
        "Escape" => Some(KeyAction::ClosePanel),
        _ => None,
    }
}
