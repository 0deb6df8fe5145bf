use crate::library::Track;

/// A persistent "now playing" indicator.
///
/// `show` is called the first time a track enters Playing, `update` on every
/// later track change; the surface stays up across pause/resume until
/// `dismiss`.
pub trait StatusSurface {
    fn show(&mut self, track: &Track);

    fn update(&mut self, track: &Track);

    fn set_paused(&mut self, paused: bool);

    fn dismiss(&mut self);
}
