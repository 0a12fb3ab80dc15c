use std::fmt;
use std::fs;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use crate::error::MappingError;

/// Field separator in the movie list.
pub const DELIMITER: char = '|';

// ---------------------------------------------------------------------------
// Movie list records
// ---------------------------------------------------------------------------

/// One `image|targets|command|args` line of the movie list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingEntry {
    pub image: String,
    pub targets: Vec<String>,
    pub command: String,
    pub args: String,
}

impl MappingEntry {
    /// Parse one line. Blank lines, `#` comments and lines with fewer than
    /// three fields give `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            return None;
        }
        let mut fields = line.splitn(4, DELIMITER);
        let image = fields.next()?;
        let targets = fields.next()?;
        let command = fields.next()?.trim();
        let args = fields.next().unwrap_or("");
        if command.is_empty() {
            return None;
        }
        Some(Self {
            image: image.to_string(),
            targets: targets.split_whitespace().map(str::to_string).collect(),
            command: command.to_string(),
            args: args.to_string(),
        })
    }

    pub fn resolve(&self, base: Option<&Path>) -> Resolved {
        let targets = self
            .targets
            .iter()
            .map(|t| {
                let p = PathBuf::from(t);
                match base {
                    Some(base) if !p.is_absolute() => base.join(p),
                    _ => p,
                }
            })
            .collect();
        Resolved {
            command: self.command.clone(),
            args: self.args.split_whitespace().map(str::to_string).collect(),
            targets,
        }
    }
}

/// A ready-to-run player invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub command: String,
    pub args: Vec<String>,
    pub targets: Vec<PathBuf>,
}

impl Resolved {
    pub fn argv(&self) -> Vec<String> {
        let mut argv = Vec::with_capacity(1 + self.args.len() + self.targets.len());
        argv.push(self.command.clone());
        argv.extend(self.args.iter().cloned());
        argv.extend(self.targets.iter().map(|t| t.display().to_string()));
        argv
    }
}

impl fmt::Display for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.argv().join(" "))
    }
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// Finds the video for an image name. The movie list is re-read on every
/// lookup so edits take effect without a restart.
pub struct VideoLookup {
    movie_list: PathBuf,
    video_dir: Option<PathBuf>,
}

impl VideoLookup {
    pub fn new(movie_list: PathBuf, video_dir: Option<PathBuf>) -> Self {
        Self {
            movie_list,
            video_dir,
        }
    }

    /// First record whose image field equals `image`, or `None`.
    pub fn lookup(&self, image: &str) -> Result<Option<Resolved>, MappingError> {
        let unreadable = |source: io::Error| MappingError::Unreadable {
            path: self.movie_list.clone(),
            source,
        };
        let file = fs::File::open(&self.movie_list).map_err(unreadable)?;
        let reader = io::BufReader::new(file);

        for (lineno, raw) in reader.split(b'\n').enumerate() {
            let raw = raw.map_err(unreadable)?;
            let line = String::from_utf8_lossy(&raw);
            let Some(entry) = MappingEntry::parse(&line) else {
                if !line.trim().is_empty() && !line.trim_start().starts_with('#') {
                    log::warn!(
                        "{}:{}: skipping malformed record",
                        self.movie_list.display(),
                        lineno + 1
                    );
                }
                continue;
            };
            if entry.image == image {
                return Ok(Some(entry.resolve(self.video_dir.as_deref())));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn movie_list(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_lookup_found_and_not_found() {
        let file = movie_list("A|movA.mp4|mplayer|-fs\nB|movB.mp4|vlc|\n");
        let lookup = VideoLookup::new(file.path().to_path_buf(), None);

        let a = lookup.lookup("A").unwrap().unwrap();
        assert_eq!(a.to_string(), "mplayer -fs movA.mp4");
        assert_eq!(a.argv(), vec!["mplayer", "-fs", "movA.mp4"]);

        let b = lookup.lookup("B").unwrap().unwrap();
        assert_eq!(b.argv(), vec!["vlc", "movB.mp4"]);

        assert_eq!(lookup.lookup("C").unwrap(), None);
    }

    #[test]
    fn test_first_match_wins() {
        let file = movie_list("A|one.mkv|mpv|\nA|two.mkv|vlc|\n");
        let lookup = VideoLookup::new(file.path().to_path_buf(), None);
        let a = lookup.lookup("A").unwrap().unwrap();
        assert_eq!(a.command, "mpv");
        assert_eq!(a.targets, vec![PathBuf::from("one.mkv")]);
    }

    #[test]
    fn test_targets_qualified_against_video_dir() {
        let file = movie_list("cover.jpg|disc1.avi /abs/disc2.avi|mplayer|-fs -zoom\n");
        let lookup = VideoLookup::new(file.path().to_path_buf(), Some(PathBuf::from("/films")));
        let r = lookup.lookup("cover.jpg").unwrap().unwrap();
        assert_eq!(
            r.targets,
            vec![PathBuf::from("/films/disc1.avi"), PathBuf::from("/abs/disc2.avi")]
        );
        assert_eq!(
            r.argv(),
            vec!["mplayer", "-fs", "-zoom", "/films/disc1.avi", "/abs/disc2.avi"]
        );
    }

    #[test]
    fn test_skips_comments_blank_and_short_lines() {
        let file = movie_list("# covers\n\nbroken line\nA|x.mp4\nA|a.mp4|mpv\r\n");
        let lookup = VideoLookup::new(file.path().to_path_buf(), None);
        let a = lookup.lookup("A").unwrap().unwrap();
        assert_eq!(a.argv(), vec!["mpv", "a.mp4"]);
    }

    #[test]
    fn test_image_field_is_exact() {
        let file = movie_list("a.jpg|a.mp4|mpv|\n");
        let lookup = VideoLookup::new(file.path().to_path_buf(), None);
        assert_eq!(lookup.lookup("A.JPG").unwrap(), None);
        assert_eq!(lookup.lookup("a.jp").unwrap(), None);
    }

    #[test]
    fn test_parse_keeps_delimiter_in_args() {
        let e = MappingEntry::parse("A|t.mp4|sh|-c echo|x").unwrap();
        assert_eq!(e.args, "-c echo|x");
    }

    #[test]
    fn test_non_utf8_line_does_not_end_lookup() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"caf\xe9.jpg|x.avi|mpv|\nA|movA.mp4|mplayer|-fs\n")
            .unwrap();
        let lookup = VideoLookup::new(file.path().to_path_buf(), None);
        let a = lookup.lookup("A").unwrap().unwrap();
        assert_eq!(a.argv(), vec!["mplayer", "-fs", "movA.mp4"]);
        assert_eq!(lookup.lookup("caf.jpg").unwrap(), None);
    }

    #[test]
    fn test_relative_targets_resolve_under_image_dir() {
        let covers = tempfile::tempdir().unwrap();
        let file = movie_list("A|movA.mp4|mplayer|\n");
        let lookup = VideoLookup::new(file.path().to_path_buf(), Some(covers.path().to_path_buf()));
        let a = lookup.lookup("A").unwrap().unwrap();
        assert_eq!(a.targets, vec![covers.path().join("movA.mp4")]);
    }

    #[test]
    fn test_unreadable_movie_list() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("movie-list");
        let lookup = VideoLookup::new(missing.clone(), None);
        match lookup.lookup("A") {
            Err(MappingError::Unreadable { path, .. }) => assert_eq!(path, missing),
            other => panic!("expected unreadable error, got {other:?}"),
        }
    }
}
