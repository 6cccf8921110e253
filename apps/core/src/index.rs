//! Line index - Every recallable line across the void's archives.

use crate::entry::MARKER_LINE;
use crate::error::Result;
use crate::void::Void;
use rand::seq::SliceRandom;
use rand::Rng;
use rayon::prelude::*;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Trimmed, non-empty, non-marker lines from all archives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineIndex {
    lines: Vec<String>,
}

impl LineIndex {
    /// Read every archive of `void`. The active file is never indexed.
    ///
    /// Archives that vanish or fail to decode between listing and reading
    /// are skipped.
    pub fn build(void: &Void) -> Result<Self> {
        let archives = void.archives()?;

        let lines: Vec<String> = archives
            .par_iter()
            .map(|path| read_lines(path))
            .collect::<Vec<_>>()
            .into_iter()
            .flatten()
            .collect();

        debug!(
            "Indexed {} line(s) from {} archive(s)",
            lines.len(),
            archives.len()
        );
        Ok(Self { lines })
    }

    /// Index in-memory lines, applying the same filtering as `build`.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            lines: lines.into_iter().filter_map(|l| recallable(l.as_ref())).collect(),
        }
    }

    pub fn random_line<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        self.lines.choose(rng).map(String::as_str)
    }

    /// All recallable lines, in archive order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

fn recallable(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() || line == MARKER_LINE {
        None
    } else {
        Some(line.to_string())
    }
}

/// Recallable lines of a single file, empty if it cannot be read.
fn read_lines(path: &Path) -> Vec<String> {
    match fs::read_to_string(path) {
        Ok(content) => content.lines().filter_map(recallable).collect(),
        Err(e) => {
            warn!("Skipping {:?}: {}", path, e);
            Vec::new()
        }
    }
}

/// Count recallable lines per archive, in archive order.
pub fn line_counts(void: &Void) -> Result<Vec<(std::path::PathBuf, usize)>> {
    let archives = void.archives()?;
    Ok(archives
        .into_par_iter()
        .map(|path| {
            let count = read_lines(&path).len();
            (path, count)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tempfile::TempDir;

    #[test]
    fn test_build_skips_active_markers_and_blanks() {
        let temp = TempDir::new().unwrap();
        let void = Void::open(temp.path(), "0.txt").unwrap();
        void.commit("not yet archived").unwrap();
        fs::write(temp.path().join("a.txt"), "  first \n.\n\n   \n.\nsecond\n").unwrap();
        fs::write(temp.path().join("b.txt"), "third\n.\n").unwrap();
        fs::write(temp.path().join("c.md"), "ignored\n").unwrap();

        let index = LineIndex::build(&void).unwrap();
        let mut lines = index.lines().to_vec();
        lines.sort();
        assert_eq!(lines, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_build_skips_undecodable_archive() {
        let temp = TempDir::new().unwrap();
        let void = Void::open(temp.path(), "0.txt").unwrap();
        fs::write(temp.path().join("bad.txt"), [0xff, 0xfe, 0x00, 0xc3]).unwrap();
        fs::write(temp.path().join("good.txt"), "fine\n").unwrap();

        let index = LineIndex::build(&void).unwrap();
        assert_eq!(index.lines(), ["fine".to_string()]);
    }

    #[test]
    fn test_empty_void() {
        let temp = TempDir::new().unwrap();
        let void = Void::open(temp.path(), "0.txt").unwrap();

        let index = LineIndex::build(&void).unwrap();
        assert!(index.is_empty());
        assert_eq!(index.random_line(&mut StdRng::seed_from_u64(1)), None);
    }

    #[test]
    fn test_random_line_comes_from_index() {
        let index = LineIndex::from_lines(["alpha", ".", "beta", "  "]);
        assert_eq!(index.len(), 2);

        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..20 {
            let line = index.random_line(&mut rng).unwrap();
            assert!(line == "alpha" || line == "beta");
        }
    }

    #[test]
    fn test_line_counts() {
        let temp = TempDir::new().unwrap();
        let void = Void::open(temp.path(), "0.txt").unwrap();
        fs::write(temp.path().join("a.txt"), "one\n.\ntwo\n.\n").unwrap();
        fs::write(temp.path().join("b.txt"), "").unwrap();

        let counts = line_counts(&void).unwrap();
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].1, 2);
        assert_eq!(counts[1].1, 0);
    }
}
