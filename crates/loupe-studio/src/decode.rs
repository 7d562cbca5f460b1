use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::thread;

use anyhow::{Context, Result};

/// One finished decode, straight-alpha RGBA8.
pub struct Decoded {
    pub index: usize,
    pub result: Result<(u32, u32, Vec<u8>)>,
}

fn decode(path: &PathBuf) -> Result<(u32, u32, Vec<u8>)> {
    let img = image::open(path).with_context(|| format!("failed to decode {}", path.display()))?;
    let rgba = img.to_rgba8();
    let (w, h) = rgba.dimensions();
    Ok((w, h, rgba.into_raw()))
}

/// Decodes `paths` in order on a background thread.
///
/// Results arrive on the returned channel; the channel closes when all paths are done.
pub fn spawn(paths: Vec<PathBuf>) -> Result<Receiver<Decoded>> {
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("loupe-decode".into())
        .spawn(move || {
            for (index, path) in paths.iter().enumerate() {
                let result = decode(path);
                if tx.send(Decoded { index, result }).is_err() {
                    break;
                }
            }
        })
        .context("failed to spawn decoder thread")?;
    Ok(rx)
}
