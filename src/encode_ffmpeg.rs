//! Frame sink backed by the system `ffmpeg` binary: raw RGBA frames are
//! piped to stdin and muxed to MP4 or GIF. Using the subprocess avoids
//! native FFmpeg dev header/lib requirements.

use std::{
    path::{Path, PathBuf},
    process::{Child, ChildStdin, Command, Stdio},
};

use crate::{
    core::Color,
    error::{PostweaveError, PostweaveResult},
    sequencer::{FrameSink, SequencedFrame},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoContainer {
    Mp4,
    Gif,
}

#[derive(Clone, Debug)]
pub struct FfmpegConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub out_path: PathBuf,
    pub container: VideoContainer,
    pub overwrite: bool,
}

impl FfmpegConfig {
    pub fn validate(&self) -> PostweaveResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(PostweaveError::validation(
                "encode width/height must be non-zero",
            ));
        }
        if self.fps == 0 {
            return Err(PostweaveError::validation("encode fps must be non-zero"));
        }
        if self.container == VideoContainer::Mp4
            && (!self.width.is_multiple_of(2) || !self.height.is_multiple_of(2))
        {
            // Default settings target yuv420p output for maximum compatibility.
            return Err(PostweaveError::validation(
                "encode width/height must be even (required for yuv420p mp4 output)",
            ));
        }
        Ok(())
    }
}

pub fn default_mp4_config(
    out_path: impl Into<PathBuf>,
    width: u32,
    height: u32,
    fps: u32,
) -> FfmpegConfig {
    FfmpegConfig {
        width,
        height,
        fps,
        out_path: out_path.into(),
        container: VideoContainer::Mp4,
        overwrite: true,
    }
}

pub fn default_gif_config(
    out_path: impl Into<PathBuf>,
    width: u32,
    height: u32,
    fps: u32,
) -> FfmpegConfig {
    FfmpegConfig {
        width,
        height,
        fps,
        out_path: out_path.into(),
        container: VideoContainer::Gif,
        overwrite: true,
    }
}

pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

fn ensure_parent_dir(path: &Path) -> PostweaveResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

pub struct FfmpegSink {
    cfg: FfmpegConfig,
    bg_rgb: [u8; 3],
    child: Child,
    stdin: Option<ChildStdin>,
    scratch: Vec<u8>,
}

impl FfmpegSink {
    pub fn new(cfg: FfmpegConfig, background: Color) -> PostweaveResult<Self> {
        cfg.validate()?;
        ensure_parent_dir(&cfg.out_path)?;

        if !cfg.overwrite && cfg.out_path.exists() {
            return Err(PostweaveError::validation(format!(
                "output file '{}' already exists",
                cfg.out_path.display()
            )));
        }

        if !is_ffmpeg_on_path() {
            return Err(PostweaveError::encode(
                "ffmpeg is required for video/gif encoding, but was not found on PATH",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        if cfg.overwrite {
            cmd.arg("-y");
        } else {
            cmd.arg("-n");
        }

        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
            "-r",
            &cfg.fps.to_string(),
            "-i",
            "pipe:0",
        ]);

        match cfg.container {
            VideoContainer::Mp4 => {
                cmd.args([
                    "-an",
                    "-c:v",
                    "libx264",
                    "-pix_fmt",
                    "yuv420p",
                    "-movflags",
                    "+faststart",
                ]);
            }
            VideoContainer::Gif => {
                cmd.args([
                    "-vf",
                    "split[s0][s1];[s0]palettegen[p];[s1][p]paletteuse",
                    "-loop",
                    "0",
                ]);
            }
        }
        cmd.arg(&cfg.out_path);

        let mut child = cmd.spawn().map_err(|e| {
            PostweaveError::encode(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| PostweaveError::encode("failed to open ffmpeg stdin (unexpected)"))?;

        Ok(Self {
            scratch: vec![0u8; (cfg.width * cfg.height * 4) as usize],
            cfg,
            bg_rgb: [background.r, background.g, background.b],
            child,
            stdin: Some(stdin),
        })
    }

    fn wait_for_exit(&mut self) -> PostweaveResult<()> {
        drop(self.stdin.take());

        let status = self
            .child
            .wait()
            .map_err(|e| PostweaveError::encode(format!("failed to wait for ffmpeg: {e}")))?;

        if !status.success() {
            let mut stderr = String::new();
            if let Some(mut pipe) = self.child.stderr.take() {
                use std::io::Read as _;
                let _ = pipe.read_to_string(&mut stderr);
            }
            return Err(PostweaveError::encode(format!(
                "ffmpeg exited with status {status}: {}",
                stderr.trim()
            )));
        }
        Ok(())
    }
}

impl FrameSink for FfmpegSink {
    fn submit(&mut self, frame: &SequencedFrame) -> PostweaveResult<()> {
        let surface = &frame.surface;
        if surface.width() != self.cfg.width || surface.height() != self.cfg.height {
            return Err(PostweaveError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                surface.width(),
                surface.height(),
                self.cfg.width,
                self.cfg.height
            )));
        }

        flatten_premul_to_opaque(&mut self.scratch, surface.data(), self.bg_rgb)?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(PostweaveError::encode("ffmpeg sink is already finalized"));
        };

        use std::io::Write as _;
        stdin.write_all(&self.scratch).map_err(|e| {
            PostweaveError::encode(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn finish(&mut self) -> PostweaveResult<()> {
        self.wait_for_exit()
    }
}

/// Composites premultiplied frames over an opaque background; the raw
/// stream ffmpeg receives has no alpha to carry.
fn flatten_premul_to_opaque(dst: &mut [u8], src: &[u8], bg_rgb: [u8; 3]) -> PostweaveResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(PostweaveError::validation(
            "flatten_premul_to_opaque expects equal-length rgba8 buffers",
        ));
    }

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            d[3] = 255;
            continue;
        }

        let inv = 255u16 - a;
        for c in 0..3 {
            d[c] = (u16::from(s[c]) + mul_div255(u16::from(bg_rgb[c]), inv)).min(255) as u8;
        }
        d[3] = 255;
    }
    Ok(())
}

fn mul_div255(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}
