//! Picking the album art for a folder from its file names.
//!
//! Names are matched by case-sensitive suffix. Both `Cover.jpg` and
//! `cover.jpg` count, `COVER.JPG` does not.

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum ImageKind {
    #[default]
    None,
    Png,
    Jpg,
}

/// Ranking between cover files; a later variant beats an earlier one.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum CoverPriority {
    #[default]
    None,
    CoverPng,
    CoverJpg,
    SmallCover,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverCandidate {
    pub path: String,
    pub kind: ImageKind,
    pub priority: CoverPriority,
}

fn classify(name: &str) -> Option<(CoverPriority, ImageKind)> {
    if name.ends_with("AlbumArtSmall.jpg") {
        Some((CoverPriority::SmallCover, ImageKind::Jpg))
    } else if name.ends_with("Cover.jpg") || name.ends_with("cover.jpg") {
        Some((CoverPriority::CoverJpg, ImageKind::Jpg))
    } else if name.ends_with("Cover.png") || name.ends_with("cover.png") {
        Some((CoverPriority::CoverPng, ImageKind::Png))
    } else {
        None
    }
}

impl CoverCandidate {
    /// Consider `entry`; it replaces the held candidate only when it ranks
    /// strictly higher. Returns whether it was taken.
    pub fn offer(&mut self, entry: &str) -> bool {
        match classify(entry) {
            Some((priority, kind)) if priority > self.priority => {
                *self = Self {
                    path: entry.to_string(),
                    kind,
                    priority,
                };
                true
            }
            _ => false,
        }
    }

    pub fn is_none(&self) -> bool {
        self.kind == ImageKind::None
    }
}

/// Best cover among `entries`, starting from the empty candidate.
pub fn select_cover<I, S>(entries: I) -> CoverCandidate
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut best = CoverCandidate::default();
    for entry in entries {
        best.offer(entry.as_ref());
    }
    best
}
