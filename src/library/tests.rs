use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::tempdir;

use super::*;
use crate::config::LibrarySettings;
use crate::error::PlayerError;

/// Probe answering from a fixed table; unknown paths fail.
struct TableProbe(HashMap<PathBuf, Duration>);

impl DurationProbe for TableProbe {
    fn probe(&self, path: &Path) -> Option<Duration> {
        self.0.get(path).copied()
    }
}

fn no_probe() -> TableProbe {
    TableProbe(HashMap::new())
}

#[test]
fn is_audio_file_matches_configured_extensions_case_insensitive() {
    let settings = LibrarySettings::default();
    for name in ["a.mp3", "a.MP3", "a.flac", "a.wav", "a.ogg", "a.m4a", "a.aac", "a.WMA"] {
        assert!(is_audio_file(Path::new(name), &settings), "{name}");
    }
    assert!(!is_audio_file(Path::new("a.txt"), &settings));
    assert!(!is_audio_file(Path::new("a"), &settings));
}

#[test]
fn is_audio_file_tolerates_dotted_extensions_in_config() {
    let settings = LibrarySettings {
        extensions: vec![".opus".into(), "  ".into()],
        ..LibrarySettings::default()
    };
    assert!(is_audio_file(Path::new("x.opus"), &settings));
    assert!(!is_audio_file(Path::new("x.mp3"), &settings));
}

#[test]
fn scan_filters_non_audio_and_sorts_lexicographically() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("b.mp3"), b"not a real mp3").unwrap();
    fs::write(dir.path().join("A.ogg"), b"not a real ogg").unwrap();
    fs::write(dir.path().join("c.txt"), b"ignore me").unwrap();
    fs::write(dir.path().join("a.flac"), b"not real").unwrap();

    let tracks = scan(dir.path(), &LibrarySettings::default(), &no_probe()).unwrap();
    let names: Vec<&str> = tracks.iter().map(|t| t.name.as_str()).collect();
    // byte order: uppercase sorts before lowercase
    assert_eq!(names, vec!["A.ogg", "a.flac", "b.mp3"]);
}

#[test]
fn scan_does_not_descend_into_subfolders() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("root.mp3"), b"x").unwrap();
    let sub = dir.path().join("sub");
    fs::create_dir_all(&sub).unwrap();
    fs::write(sub.join("child.mp3"), b"x").unwrap();

    let tracks = scan(dir.path(), &LibrarySettings::default(), &no_probe()).unwrap();
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].name, "root.mp3");
}

#[test]
fn scan_uses_probed_durations_and_degrades_to_zero() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.mp3");
    let b = dir.path().join("b.mp3");
    fs::write(&a, b"x").unwrap();
    fs::write(&b, b"x").unwrap();

    let probe = TableProbe(HashMap::from([(a.clone(), Duration::from_secs(30))]));
    let tracks = scan(dir.path(), &LibrarySettings::default(), &probe).unwrap();
    assert_eq!(tracks[0].duration, Duration::from_secs(30));
    assert!(tracks[0].has_duration());
    assert_eq!(tracks[1].duration, Duration::ZERO);
    assert!(!tracks[1].has_duration());
}

#[test]
fn scan_reports_missing_folder_and_empty_folder() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope");
    assert!(matches!(
        scan(&missing, &LibrarySettings::default(), &no_probe()),
        Err(PlayerError::FolderNotFound(p)) if p == missing
    ));

    fs::write(dir.path().join("notes.txt"), b"x").unwrap();
    assert!(matches!(
        scan(dir.path(), &LibrarySettings::default(), &no_probe()),
        Err(PlayerError::NoAudioFilesFound(_))
    ));
}

#[test]
fn lofty_probe_returns_none_for_garbage() {
    let dir = tempdir().unwrap();
    let p = dir.path().join("fake.mp3");
    fs::write(&p, b"definitely not audio").unwrap();
    assert_eq!(LoftyProbe.probe(&p), None);
}

#[test]
fn scan_files_keeps_only_existing_audio_files() {
    let dir = tempdir().unwrap();
    let song = dir.path().join("song.wav");
    let text = dir.path().join("readme.txt");
    fs::write(&song, b"x").unwrap();
    fs::write(&text, b"x").unwrap();
    let missing = dir.path().join("gone.mp3");

    let tracks = scan_files(
        &[song.clone(), text, missing],
        &LibrarySettings::default(),
        &no_probe(),
    );
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].path, song);
}

#[test]
fn playlist_extend_unique_skips_duplicates() {
    let mut pl = Playlist::new(vec![Track::new("/m/a.mp3", Duration::ZERO)]);
    let added = pl.extend_unique(vec![
        Track::new("/m/a.mp3", Duration::ZERO),
        Track::new("/m/b.mp3", Duration::ZERO),
    ]);
    assert_eq!(added, 1);
    assert_eq!(pl.len(), 2);
    assert_eq!(pl.get(1).map(|t| t.name.as_str()), Some("b.mp3"));
    assert!(pl.get(2).is_none());
}
