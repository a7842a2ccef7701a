//! Ordered play queue with a cursor.
//!
//! Navigation resolves entries through a [`TrackSource`] and steps over the
//! ones that are not audio. Neither end wraps around.

use std::path::{Path, PathBuf};

use crate::library::TrackStream;

use super::engine::TrackSource;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

#[derive(Debug, Default)]
pub struct PlayQueue {
    entries: Vec<PathBuf>,
    cursor: Option<usize>,
}

impl PlayQueue {
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = None;
    }

    pub fn push(&mut self, path: PathBuf) {
        self.entries.push(path);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn current(&self) -> Option<&Path> {
        self.cursor.map(|i| self.entries[i].as_path())
    }

    /// Open the first audio entry of the queue.
    pub fn begin(
        &mut self,
        source: &mut dyn TrackSource,
        previous: TrackStream,
    ) -> Option<TrackStream> {
        self.cursor = None;
        self.scan(source, previous, 0..self.entries.len())
    }

    /// Open the nearest audio entry in `dir` from the cursor.
    ///
    /// When there is none the cursor stays where it was. If entries were
    /// resolved on the way, the current one is resolved again so the
    /// published metadata matches what is still playing.
    pub fn advance(
        &mut self,
        source: &mut dyn TrackSource,
        previous: TrackStream,
        dir: Direction,
    ) -> Option<TrackStream> {
        let cur = self.cursor?;
        let candidates: Vec<usize> = match dir {
            Direction::Forward => (cur + 1..self.entries.len()).collect(),
            Direction::Backward => (0..cur).rev().collect(),
        };
        if candidates.is_empty() {
            return None;
        }

        let found = self.scan(source, previous, candidates);
        if found.is_none() {
            let (mut restored, _) = source.resolve(&self.entries[cur], TrackStream::empty());
            restored.close();
        }
        found
    }

    fn scan(
        &mut self,
        source: &mut dyn TrackSource,
        mut previous: TrackStream,
        indices: impl IntoIterator<Item = usize>,
    ) -> Option<TrackStream> {
        for i in indices {
            let (stream, is_audio) = source.resolve(&self.entries[i], previous);
            if is_audio {
                self.cursor = Some(i);
                return Some(stream);
            }
            previous = stream;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Treats `.mp3` names as audio and records every path it is asked for.
    #[derive(Default)]
    struct ByName {
        seen: Vec<PathBuf>,
    }

    impl TrackSource for ByName {
        fn resolve(&mut self, path: &Path, _previous: TrackStream) -> (TrackStream, bool) {
            self.seen.push(path.to_path_buf());
            let audio = path.extension().is_some_and(|e| e == "mp3");
            (TrackStream::empty(), audio)
        }

        fn reject(&mut self, _path: &Path) {}
    }

    fn queue(names: &[&str]) -> PlayQueue {
        let mut q = PlayQueue::default();
        for n in names {
            q.push(PathBuf::from(n));
        }
        q
    }

    #[test]
    fn begin_skips_leading_non_audio() {
        let mut q = queue(&["cover.jpg", "notes.txt", "01.mp3", "02.mp3"]);
        let mut src = ByName::default();
        assert!(q.begin(&mut src, TrackStream::empty()).is_some());
        assert_eq!(q.cursor(), Some(2));
        assert_eq!(q.current(), Some(Path::new("01.mp3")));
        assert_eq!(src.seen.len(), 3);
    }

    #[test]
    fn begin_on_queue_without_audio_leaves_no_cursor() {
        let mut q = queue(&["a.txt", "b.png"]);
        let mut src = ByName::default();
        assert!(q.begin(&mut src, TrackStream::empty()).is_none());
        assert_eq!(q.cursor(), None);
    }

    #[test]
    fn advance_steps_over_non_audio_both_ways() {
        let mut q = queue(&["01.mp3", "x.txt", "02.mp3", "y.txt", "03.mp3"]);
        let mut src = ByName::default();
        q.begin(&mut src, TrackStream::empty());

        assert!(q.advance(&mut src, TrackStream::empty(), Direction::Forward).is_some());
        assert_eq!(q.cursor(), Some(2));
        assert!(q.advance(&mut src, TrackStream::empty(), Direction::Forward).is_some());
        assert_eq!(q.cursor(), Some(4));
        assert!(q.advance(&mut src, TrackStream::empty(), Direction::Backward).is_some());
        assert_eq!(q.cursor(), Some(2));
    }

    #[test]
    fn ends_do_not_wrap() {
        let mut q = queue(&["01.mp3", "02.mp3"]);
        let mut src = ByName::default();
        q.begin(&mut src, TrackStream::empty());

        assert!(q.advance(&mut src, TrackStream::empty(), Direction::Backward).is_none());
        assert_eq!(q.cursor(), Some(0));

        q.advance(&mut src, TrackStream::empty(), Direction::Forward);
        let before = src.seen.len();
        assert!(q.advance(&mut src, TrackStream::empty(), Direction::Forward).is_none());
        assert_eq!(q.cursor(), Some(1));
        // Nothing beyond the last entry, so nothing was resolved.
        assert_eq!(src.seen.len(), before);
    }

    #[test]
    fn failed_scan_re_resolves_current_entry() {
        let mut q = queue(&["01.mp3", "a.txt", "b.txt"]);
        let mut src = ByName::default();
        q.begin(&mut src, TrackStream::empty());
        src.seen.clear();

        assert!(q.advance(&mut src, TrackStream::empty(), Direction::Forward).is_none());
        assert_eq!(q.cursor(), Some(0));
        assert_eq!(
            src.seen,
            vec![
                PathBuf::from("a.txt"),
                PathBuf::from("b.txt"),
                PathBuf::from("01.mp3")
            ]
        );
    }

    #[test]
    fn advance_before_begin_is_a_no_op() {
        let mut q = queue(&["01.mp3"]);
        let mut src = ByName::default();
        assert!(q.advance(&mut src, TrackStream::empty(), Direction::Forward).is_none());
        assert!(src.seen.is_empty());
    }

    #[test]
    fn clear_drops_entries_and_cursor() {
        let mut q = queue(&["01.mp3"]);
        q.begin(&mut ByName::default(), TrackStream::empty());
        q.clear();
        assert_eq!(q.len(), 0);
        assert_eq!(q.current(), None);
        assert_eq!(q.cursor(), None);
    }
}
