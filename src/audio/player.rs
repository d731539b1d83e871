use anyhow::{Context, Result};
use log::{debug, warn};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use super::{SoundEffect, SoundPort};

const EAT_FILE: &str = "eat.wav";
const GAME_OVER_FILE: &str = "game_over.wav";
const MUSIC_FILE: &str = "music.wav";

/// Encoded audio kept in memory and decoded afresh for every playback
type Clip = Arc<[u8]>;

/// Sound port backed by the default rodio output device
///
/// Each clip is optional; a missing or undecodable file just stays silent.
pub struct RodioSound {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    eat: Option<Clip>,
    game_over: Option<Clip>,
    music: Option<Clip>,
    music_sink: Option<Sink>,
}

impl RodioSound {
    /// Open the default output device and load clips from `assets_dir`
    pub fn open(assets_dir: &Path) -> Result<Self> {
        let (stream, handle) =
            OutputStream::try_default().context("Failed to open audio output device")?;

        Ok(Self {
            _stream: stream,
            handle,
            eat: load_clip(assets_dir, EAT_FILE),
            game_over: load_clip(assets_dir, GAME_OVER_FILE),
            music: load_clip(assets_dir, MUSIC_FILE),
            music_sink: None,
        })
    }

    fn play_clip(&self, clip: &Clip) -> Result<()> {
        let source = Decoder::new(Cursor::new(Arc::clone(clip)))?;
        let sink = Sink::try_new(&self.handle)?;
        sink.append(source);
        sink.detach();
        Ok(())
    }

    fn loop_clip(&self, clip: &Clip) -> Result<Sink> {
        let source = Decoder::new(Cursor::new(Arc::clone(clip)))?.repeat_infinite();
        let sink = Sink::try_new(&self.handle)?;
        sink.append(source);
        Ok(sink)
    }
}

impl SoundPort for RodioSound {
    fn play(&mut self, effect: SoundEffect) {
        let clip = match effect {
            SoundEffect::Eat => &self.eat,
            SoundEffect::GameOver => &self.game_over,
        };
        if let Some(clip) = clip {
            if let Err(e) = self.play_clip(clip) {
                warn!("Failed to play {:?}: {:#}", effect, e);
            }
        }
    }

    fn start_music(&mut self) {
        self.stop_music();
        if let Some(clip) = &self.music {
            match self.loop_clip(clip) {
                Ok(sink) => self.music_sink = Some(sink),
                Err(e) => warn!("Failed to start music: {:#}", e),
            }
        }
    }

    fn pause_music(&mut self) {
        if let Some(sink) = &self.music_sink {
            sink.pause();
        }
    }

    fn resume_music(&mut self) {
        if let Some(sink) = &self.music_sink {
            sink.play();
        }
    }

    fn stop_music(&mut self) {
        if let Some(sink) = self.music_sink.take() {
            sink.stop();
        }
    }
}

/// Read a clip and make sure it decodes; `None` means play nothing for it
fn load_clip(dir: &Path, name: &str) -> Option<Clip> {
    let path = dir.join(name);
    let bytes: Clip = match std::fs::read(&path) {
        Ok(bytes) => bytes.into(),
        Err(e) => {
            warn!("Sound {:?} unavailable: {}", path, e);
            return None;
        }
    };

    if let Err(e) = Decoder::new(Cursor::new(Arc::clone(&bytes))) {
        warn!("Sound {:?} could not be decoded: {}", path, e);
        return None;
    }

    debug!("Loaded sound {:?} ({} bytes)", path, bytes.len());
    Some(bytes)
}
