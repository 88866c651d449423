//! Source table and location suffix dispatch.

use std::fmt;

/// How a location is loaded, decided by its suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// `.mid` - fetched and kept as raw bytes
    Midi,
    /// `.ogg` / `.mp3` - fetched and decoded to PCM
    Audio,
    /// Anything else - loaded as an image
    Image,
}

impl ResourceKind {
    /// Dispatch a location by suffix.
    ///
    /// Matching is a literal, case-sensitive suffix test, so `Theme.MID`
    /// is treated as an image.
    pub fn from_location(location: &str) -> Self {
        if location.ends_with(".mid") {
            ResourceKind::Midi
        } else if location.ends_with(".ogg") || location.ends_with(".mp3") {
            ResourceKind::Audio
        } else {
            ResourceKind::Image
        }
    }
}

/// Container extension of an audio location, used as a format hint.
pub fn audio_extension(location: &str) -> Option<&'static str> {
    if location.ends_with(".ogg") {
        Some("ogg")
    } else if location.ends_with(".mp3") {
        Some("mp3")
    } else {
        None
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Midi => "midi",
            ResourceKind::Audio => "audio",
            ResourceKind::Image => "image",
        };
        f.write_str(name)
    }
}

/// Input table of a batch: ordered `(key, location)` pairs with unique keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceMap {
    entries: Vec<(String, String)>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, keeping insertion order.
    ///
    /// Re-inserting an existing key replaces its location in place and
    /// returns the previous one.
    pub fn insert(&mut self, key: impl Into<String>, location: impl Into<String>) -> Option<String> {
        let key = key.into();
        let location = location.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, location)),
            None => {
                self.entries.push((key, location));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, location)| location.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl IntoIterator for SourceMap {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SourceMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = SourceMap::new();
        for (key, location) in iter {
            map.insert(key, location);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_extension() {
        assert_eq!(audio_extension("sfx/Missile.ogg"), Some("ogg"));
        assert_eq!(audio_extension("https://cdn.example.com/Boom.mp3"), Some("mp3"));
        assert_eq!(audio_extension("Music.mid"), None);
        assert_eq!(audio_extension("Boom.MP3"), None);
    }

    #[test]
    fn test_kind_dispatch_by_suffix() {
        assert_eq!(ResourceKind::from_location("Music.mid"), ResourceKind::Midi);
        assert_eq!(ResourceKind::from_location("Missile.ogg"), ResourceKind::Audio);
        assert_eq!(ResourceKind::from_location("Music.mp3"), ResourceKind::Audio);
        assert_eq!(ResourceKind::from_location("Car.png"), ResourceKind::Image);
        assert_eq!(ResourceKind::from_location("splash"), ResourceKind::Image);
    }

    #[test]
    fn test_kind_dispatch_is_case_sensitive() {
        assert_eq!(ResourceKind::from_location("THEME.MID"), ResourceKind::Image);
        assert_eq!(ResourceKind::from_location("boom.OGG"), ResourceKind::Image);
    }

    #[test]
    fn test_kind_dispatch_urls() {
        assert_eq!(
            ResourceKind::from_location("https://cdn.example.com/a/b/theme.mid"),
            ResourceKind::Midi
        );
        // Query strings hide the suffix
        assert_eq!(
            ResourceKind::from_location("https://cdn.example.com/theme.mid?v=2"),
            ResourceKind::Image
        );
    }

    #[test]
    fn test_source_map_preserves_order() {
        let map: SourceMap = [("b", "b.png"), ("a", "a.mid"), ("c", "c.ogg")]
            .into_iter()
            .collect();
        let keys: Vec<&str> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_source_map_replaces_duplicate_key() {
        let mut map = SourceMap::new();
        assert_eq!(map.insert("car", "Car.png"), None);
        map.insert("missile", "Missile.png");
        assert_eq!(map.insert("car", "SmCar.png"), Some("Car.png".to_string()));

        assert_eq!(map.len(), 2);
        assert_eq!(map.get("car"), Some("SmCar.png"));
        assert_eq!(map.iter().next(), Some(("car", "SmCar.png")));
    }

    #[test]
    fn test_source_map_empty() {
        let map = SourceMap::new();
        assert!(map.is_empty());
        assert_eq!(map.get("anything"), None);
    }
}
