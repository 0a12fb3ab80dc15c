use clap::Parser;
use std::path::PathBuf;

pub const HELP_KEYS: &str = "\
Key Bindings:
  Esc / q                  : Quit
  Right / Down / l / j     : Next page
  Space / PageDown         : Next page
  Left / Up / h / k        : Previous page
  Backspace / PageUp       : Previous page
  Home                     : First page
  End                      : Last page
  1 - 9                    : Play video for that cell
  Left click               : Play video for the clicked cell
  i                        : Toggle status line
  ?                        : Toggle help overlay
";

#[derive(Parser)]
#[command(
    name = "sodium",
    about = "Browse a directory of cover art and play the matching video",
    after_help = HELP_KEYS
)]
pub struct Cli {
    /// Directory of cover images
    pub image_dir: PathBuf,

    /// Movie list mapping images to players (default: ~/.sodium/movie-list)
    #[arg(short, long, value_name = "FILE")]
    pub movie_list: Option<PathBuf>,

    /// Base directory for relative video paths in the movie list
    #[arg(short, long, value_name = "DIR")]
    pub video_dir: Option<PathBuf>,

    /// Grid dimensions as COLSxROWS (each at most 64)
    #[arg(short, long, default_value = "3x3", value_parser = parse_grid_size)]
    pub size: (usize, usize),

    /// Edge length of one grid cell in pixels
    #[arg(short, long, default_value = "300", value_parser = clap::value_parser!(u32).range(16..))]
    pub cell_size: u32,

    /// Initial delay in ms before key-hold paging begins (default: 500)
    #[arg(long, default_value = "500")]
    pub initial_delay: u64,

    /// Key-hold paging interval in milliseconds (default: 250)
    #[arg(long, default_value = "250")]
    pub repeat_delay: u64,
}

pub const MAX_GRID_DIM: usize = 64;

/// Parse `COLSxROWS`, e.g. `4x2`.
pub fn parse_grid_size(s: &str) -> Result<(usize, usize), String> {
    let s = s.trim().to_lowercase();
    let (cols, rows) = s
        .split_once('x')
        .ok_or_else(|| format!("expected COLSxROWS, got `{s}`"))?;
    let cols: usize = cols
        .trim()
        .parse()
        .map_err(|_| format!("bad column count `{cols}`"))?;
    let rows: usize = rows
        .trim()
        .parse()
        .map_err(|_| format!("bad row count `{rows}`"))?;
    if cols == 0 || rows == 0 {
        return Err("grid needs at least one row and one column".to_string());
    }
    if cols > MAX_GRID_DIM || rows > MAX_GRID_DIM {
        return Err(format!("grid is limited to {MAX_GRID_DIM}x{MAX_GRID_DIM}"));
    }
    Ok((cols, rows))
}

/// `~/.sodium/movie-list`, or `None` when there is no home directory.
pub fn default_movie_list() -> Option<PathBuf> {
    directories::UserDirs::new().map(|dirs| dirs.home_dir().join(".sodium").join("movie-list"))
}

impl Cli {
    /// Base directory for relative video targets: `--video-dir`, else the
    /// image directory.
    pub fn video_base(&self) -> PathBuf {
        self.video_dir.clone().unwrap_or_else(|| self.image_dir.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_grid_size() {
        assert_eq!(parse_grid_size("3x3"), Ok((3, 3)));
        assert_eq!(parse_grid_size("4X2"), Ok((4, 2)));
        assert_eq!(parse_grid_size(" 5 x 1 "), Ok((5, 1)));
        assert!(parse_grid_size("0x3").is_err());
        assert!(parse_grid_size("3").is_err());
        assert!(parse_grid_size("ax3").is_err());
        assert_eq!(parse_grid_size("64x64"), Ok((64, 64)));
        assert!(parse_grid_size("20000000x1").is_err());
        assert!(parse_grid_size("1x65").is_err());
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["sodium", "/covers"]).unwrap();
        assert_eq!(cli.image_dir, PathBuf::from("/covers"));
        assert_eq!(cli.size, (3, 3));
        assert_eq!(cli.cell_size, 300);
        assert!(cli.movie_list.is_none());
        assert!(cli.video_dir.is_none());
    }

    #[test]
    fn test_cli_options() {
        let cli = Cli::try_parse_from([
            "sodium", "-m", "/tmp/list", "-v", "/films", "-s", "4x2", "-c", "200", "/covers",
        ])
        .unwrap();
        assert_eq!(cli.movie_list, Some(PathBuf::from("/tmp/list")));
        assert_eq!(cli.video_dir, Some(PathBuf::from("/films")));
        assert_eq!(cli.size, (4, 2));
        assert_eq!(cli.cell_size, 200);
    }

    #[test]
    fn test_cli_requires_directory() {
        assert!(Cli::try_parse_from(["sodium"]).is_err());
    }

    #[test]
    fn test_default_movie_list_name() {
        if let Some(path) = default_movie_list() {
            assert!(path.is_absolute());
            assert!(path.ends_with(".sodium/movie-list"));
        }
    }

    #[test]
    fn test_video_base_defaults_to_image_dir() {
        let cli = Cli::try_parse_from(["sodium", "/covers"]).unwrap();
        assert_eq!(cli.video_base(), PathBuf::from("/covers"));
        let cli = Cli::try_parse_from(["sodium", "-v", "/films", "/covers"]).unwrap();
        assert_eq!(cli.video_base(), PathBuf::from("/films"));
    }
}
