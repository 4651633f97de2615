use crate::key::Key;

/// A frontend-agnostic emulator application.
///
/// Runners (such as the SDL2 one) own the window and the audio device and
/// drive an `App` once per presented frame.
pub trait App {
    fn init(&mut self);
    /// Advance the emulation and write the next frame as RGB24 into `screen`.
    fn update(&mut self, screen: &mut [u8]);
    fn handle_key_event(&mut self, key: Key, is_down: bool);
    /// Interleaved stereo samples produced since the last call.
    fn audio_samples(&mut self) -> Vec<f32> {
        Vec::new()
    }
    fn should_exit(&self) -> bool;
    fn exit(&mut self);

    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn scale(&self) -> u32;
    fn title(&self) -> String;
    fn sample_rate(&self) -> u32 {
        48_000
    }
}
