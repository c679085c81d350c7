//! Pipeline tests against small shell scripts standing in for ffmpeg.
//!
//! Each script is written into a scratch directory and passed to
//! [`FfmpegExtractor::new`], so these tests exercise the real subprocess
//! path without needing a decoder installed.

#![cfg(unix)]

use std::fs;
use std::io::Cursor;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use image::{DynamicImage, ImageFormat, RgbImage};
use posterframe_av::{
    CancellationToken, Error, FfmpegExtractor, OutputFormat, ThumbnailOptions, ThumbnailPipeline,
    VideoSource,
};
use serial_test::serial;
use tempfile::TempDir;

struct Stub {
    dir: TempDir,
    temp_root: TempDir,
}

impl Stub {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
            temp_root: tempfile::tempdir().unwrap(),
        }
    }

    fn script(&self, name: &str, body: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    /// A decoder that logs its arguments and copies a `width` x `height`
    /// PNG to the output path (its last argument).
    fn frame_writer(&self, width: u32, height: u32) -> PathBuf {
        let frame = self.dir.path().join("frame.png");
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(RgbImage::new(width, height))
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        fs::write(&frame, buf.into_inner()).unwrap();

        let log = self.args_log();
        self.script(
            "decoder",
            &format!(
                "printf '%s\\n' \"$@\" > '{}'\nfor last; do :; done\ncp '{}' \"$last\"",
                log.display(),
                frame.display()
            ),
        )
    }

    fn args_log(&self) -> PathBuf {
        self.dir.path().join("args.log")
    }

    fn logged_args(&self) -> Vec<String> {
        fs::read_to_string(self.args_log())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn pipeline(&self, program: &Path) -> ThumbnailPipeline {
        ThumbnailPipeline::new(FfmpegExtractor::new(program)).with_temp_root(self.temp_root.path())
    }

    fn leftover_workspaces(&self) -> usize {
        fs::read_dir(self.temp_root.path()).unwrap().count()
    }
}

#[tokio::test]
#[serial]
async fn path_source_end_to_end() {
    let stub = Stub::new();
    let decoder = stub.frame_writer(640, 360);
    let video = tempfile::NamedTempFile::new().unwrap();

    let result = stub
        .pipeline(&decoder)
        .generate(
            &VideoSource::from_path(video.path()),
            &ThumbnailOptions::new().at(2.0).width(320),
        )
        .await
        .unwrap()
        .expect("thumbnail");

    assert_eq!(result.width, 320);
    assert_eq!(result.height, 180);
    assert_eq!(result.format, OutputFormat::Jpeg);
    assert_eq!(result.timestamp_seconds, 2.0);
    assert_eq!(image::guess_format(&result.bytes).unwrap(), ImageFormat::Jpeg);

    let args = stub.logged_args();
    assert_eq!(&args[..3], ["-y", "-ss", "2.000"]);
    assert!(args.contains(&video.path().display().to_string()));
    assert!(args.contains(&"scale=320:-1:flags=lanczos".to_string()));
    assert_eq!(stub.leftover_workspaces(), 0);
}

#[tokio::test]
#[serial]
async fn bytes_source_uses_defaults() {
    let stub = Stub::new();
    let decoder = stub.frame_writer(96, 54);

    let result = stub
        .pipeline(&decoder)
        .generate(&VideoSource::from_bytes(vec![7u8; 1024]), &ThumbnailOptions::new())
        .await
        .unwrap()
        .expect("thumbnail");

    assert_eq!(result.format, OutputFormat::Jpeg);
    assert_eq!(result.timestamp_seconds, 1.0);
    assert_eq!((result.width, result.height), (96, 54));
    assert!(!stub.logged_args().iter().any(|a| a == "-vf"));
    assert_eq!(stub.leftover_workspaces(), 0);
}

#[tokio::test]
#[serial]
async fn webp_default_quality_matches_explicit_75() {
    let stub = Stub::new();
    let decoder = stub.frame_writer(32, 32);

    let result = stub
        .pipeline(&decoder)
        .generate(
            &VideoSource::from_bytes(vec![0u8; 16]),
            &ThumbnailOptions::new().format(OutputFormat::Webp),
        )
        .await
        .unwrap()
        .expect("thumbnail");

    assert_eq!(result.format, OutputFormat::Webp);
    assert_eq!(result.quality, Some(75));
    assert_eq!(&result.bytes[8..12], b"WEBP");

    let explicit = stub
        .pipeline(&decoder)
        .generate(
            &VideoSource::from_bytes(vec![0u8; 16]),
            &ThumbnailOptions::new()
                .format(OutputFormat::Webp)
                .quality(0.75),
        )
        .await
        .unwrap()
        .expect("thumbnail");
    assert_eq!(result.bytes, explicit.bytes);
}

#[tokio::test]
#[serial]
async fn failing_decoder_yields_none() {
    let stub = Stub::new();
    let decoder = stub.script("decoder", "exit 1");
    let pipeline = stub.pipeline(&decoder);
    let source = VideoSource::from_bytes(vec![0u8; 16]);

    let result = pipeline.generate(&source, &ThumbnailOptions::new()).await.unwrap();
    assert!(result.is_none());

    let err = pipeline
        .try_generate(&source, &ThumbnailOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::DecoderFailed { code: Some(1), .. }), "got: {err}");
    assert_eq!(stub.leftover_workspaces(), 0);
}

#[tokio::test]
#[serial]
async fn missing_decoder_yields_none() {
    let stub = Stub::new();
    let pipeline = stub.pipeline(&stub.dir.path().join("no-such-decoder"));
    let source = VideoSource::from_bytes(vec![0u8; 16]);

    assert!(pipeline
        .generate(&source, &ThumbnailOptions::new())
        .await
        .unwrap()
        .is_none());

    let err = pipeline
        .try_generate(&source, &ThumbnailOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::SpawnFailed { .. }), "got: {err}");
    assert_eq!(stub.leftover_workspaces(), 0);
}

#[tokio::test]
#[serial]
async fn cancellation_aborts_and_cleans_up() {
    let stub = Stub::new();
    let decoder = stub.script("decoder", "exec sleep 10");

    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let start = Instant::now();
    let err = stub
        .pipeline(&decoder)
        .generate(
            &VideoSource::from_bytes(vec![0u8; 16]),
            &ThumbnailOptions::new().cancellation(token),
        )
        .await
        .unwrap_err();

    assert!(err.is_aborted(), "got: {err}");
    assert!(start.elapsed() < Duration::from_secs(5));
    assert_eq!(stub.leftover_workspaces(), 0);
}

#[tokio::test]
#[serial]
async fn cancelling_after_completion_has_no_effect() {
    let stub = Stub::new();
    let decoder = stub.frame_writer(16, 16);
    let token = CancellationToken::new();

    let result = stub
        .pipeline(&decoder)
        .generate(
            &VideoSource::from_bytes(vec![0u8; 16]),
            &ThumbnailOptions::new().cancellation(token.clone()),
        )
        .await
        .unwrap();
    token.cancel();

    assert!(result.is_some());
}
