//! Sound playback for `GameEvent::PlaySound`.
//!
//! The simulation only queues sound handles. A sink plays them between
//! frames; a sink that fails or has no device never affects gameplay.

use crate::assets::{AssetCatalog, SoundHandle};
use crate::error::AssetError;
use log::{debug, warn};
use rodio::source::Buffered;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Source};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub trait AudioSink {
    fn play(&mut self, sound: SoundHandle);
}

/// Discards sounds, counting them (headless runs and tests)
#[derive(Debug, Default)]
pub struct NullAudio {
    pub played: Vec<SoundHandle>,
}

impl AudioSink for NullAudio {
    fn play(&mut self, sound: SoundHandle) {
        self.played.push(sound);
    }
}

type Clip = Buffered<Decoder<BufReader<File>>>;

/// Extensions tried, in order, when looking for a sound file
const SOUND_EXTENSIONS: [&str; 3] = ["ogg", "wav", "mp3"];

/// Plays decoded clips on the default output device
pub struct RodioAudio {
    // Dropping the stream stops all playback
    _stream: OutputStream,
    handle: OutputStreamHandle,
    clips: HashMap<SoundHandle, Clip>,
}

impl RodioAudio {
    pub fn new() -> Result<Self, AssetError> {
        let (stream, handle) =
            OutputStream::try_default().map_err(|e| AssetError::Device(e.to_string()))?;
        Ok(Self {
            _stream: stream,
            handle,
            clips: HashMap::new(),
        })
    }

    /// Decode `<dir>/<name>.<ext>` for every sound in the catalog.
    /// Returns how many loaded; misses are logged and skipped.
    pub fn load_dir(&mut self, dir: &Path, catalog: &AssetCatalog) -> usize {
        for (name, handle) in catalog.sounds() {
            match load_clip(dir, name) {
                Ok(clip) => {
                    self.clips.insert(handle, clip);
                }
                Err(e) => warn!("{e}"),
            }
        }
        debug!("loaded {} sound clips from {}", self.clips.len(), dir.display());
        self.clips.len()
    }
}

fn load_clip(dir: &Path, name: &str) -> Result<Clip, AssetError> {
    let path = SOUND_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{name}.{ext}")))
        .find(|p| p.exists())
        .ok_or_else(|| AssetError::Missing(name.to_string()))?;
    let file = File::open(&path).map_err(|source| AssetError::Io {
        name: name.to_string(),
        source,
    })?;
    let decoder = Decoder::new(BufReader::new(file)).map_err(|e| AssetError::Decode {
        name: name.to_string(),
        reason: e.to_string(),
    })?;
    Ok(decoder.buffered())
}

impl AudioSink for RodioAudio {
    fn play(&mut self, sound: SoundHandle) {
        let Some(clip) = self.clips.get(&sound) else {
            return;
        };
        if let Err(e) = self.handle.play_raw(clip.clone().convert_samples()) {
            warn!("sound {sound:?} failed to play: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_audio_records() {
        let mut sink = NullAudio::default();
        sink.play(SoundHandle(3));
        sink.play(SoundHandle(3));
        assert_eq!(sink.played, vec![SoundHandle(3), SoundHandle(3)]);
    }

    #[test]
    fn test_missing_clip_is_reported() {
        let dir = std::env::temp_dir().join("dungeon-delve-no-such-sounds");
        assert!(matches!(load_clip(&dir, "walk_0"), Err(AssetError::Missing(_))));
    }
}
