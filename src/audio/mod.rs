//! Sound output
//!
//! The game talks to sound through [`SoundPort`]. [`Silent`] is used when the
//! player muted the game, the crate was built without the `audio` feature, or no
//! output device could be opened.

#[cfg(feature = "audio")]
mod player;

use log::info;
#[cfg(feature = "audio")]
use log::warn;
use std::path::Path;

#[cfg(feature = "audio")]
pub use player::RodioSound;

/// One-shot sound effects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    Eat,
    GameOver,
}

/// Everything the game asks of the sound system; every call is fire-and-forget
pub trait SoundPort {
    fn play(&mut self, effect: SoundEffect);
    /// Start the looping background track from the beginning
    fn start_music(&mut self);
    fn pause_music(&mut self);
    fn resume_music(&mut self);
    fn stop_music(&mut self);
}

impl<T: SoundPort + ?Sized> SoundPort for Box<T> {
    fn play(&mut self, effect: SoundEffect) {
        (**self).play(effect)
    }

    fn start_music(&mut self) {
        (**self).start_music()
    }

    fn pause_music(&mut self) {
        (**self).pause_music()
    }

    fn resume_music(&mut self) {
        (**self).resume_music()
    }

    fn stop_music(&mut self) {
        (**self).stop_music()
    }
}

/// Sound port that plays nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl SoundPort for Silent {
    fn play(&mut self, _effect: SoundEffect) {}
    fn start_music(&mut self) {}
    fn pause_music(&mut self) {}
    fn resume_music(&mut self) {}
    fn stop_music(&mut self) {}
}

/// Open the best available sound output for the assets in `assets_dir`
pub fn open(assets_dir: &Path, muted: bool) -> Box<dyn SoundPort> {
    if muted {
        info!("Sound muted");
        return Box::new(Silent);
    }

    #[cfg(feature = "audio")]
    {
        match RodioSound::open(assets_dir) {
            Ok(sound) => return Box::new(sound),
            Err(e) => warn!("No audio output, playing silently: {:#}", e),
        }
    }

    #[cfg(not(feature = "audio"))]
    info!(
        "Built without the audio feature; ignoring assets in {:?}",
        assets_dir
    );

    Box::new(Silent)
}
