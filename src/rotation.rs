//! Timer-driven display state: the sponsor carousel and the
//! "new fastest lap" banner.
//!
//! Both types are plain values; the page owns the actual timers and
//! feeds ticks and expiries back into them.

/// Split sponsor text into image URLs, one per non-blank line.
pub fn parse_sponsor_urls(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Index of the sponsor currently on screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SponsorRotation {
    index: usize,
}

impl SponsorRotation {
    pub fn index(&self) -> usize {
        self.index
    }

    /// Move to the next sponsor. A list of zero or one URLs never rotates.
    pub fn advance(&mut self, len: usize) {
        if len > 1 {
            self.index = (self.index + 1) % len;
        }
    }

    /// The URL to show. The index survives list edits, so it wraps here.
    pub fn current<'a>(&self, urls: &'a [String]) -> Option<&'a str> {
        if urls.is_empty() {
            None
        } else {
            Some(urls[self.index % urls.len()].as_str())
        }
    }
}

/// Transient "new fastest lap" banner.
///
/// Each trigger starts a new generation; an expiry only lowers the banner
/// when it belongs to the latest generation, so a timer left over from an
/// earlier record cannot cut a newer banner short.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlashSignal {
    generation: u32,
    active: bool,
}

impl FlashSignal {
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Raise the banner and return the generation its expiry must carry.
    pub fn trigger(&mut self) -> u32 {
        self.generation = self.generation.wrapping_add(1);
        self.active = true;
        self.generation
    }

    /// Lower the banner if `generation` is still current. Returns whether it changed.
    pub fn expire(&mut self, generation: u32) -> bool {
        if self.active && generation == self.generation {
            self.active = false;
            true
        } else {
            false
        }
    }

    /// Lower the banner immediately and invalidate pending expiries.
    pub fn clear(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sponsor_text_is_split_trimmed_and_filtered() {
        let urls = parse_sponsor_urls("  https://a.png \n\n\t\nhttps://b.png\r\n   ");
        assert_eq!(urls, vec!["https://a.png", "https://b.png"]);
        assert!(parse_sponsor_urls("").is_empty());
    }

    #[test]
    fn rotation_cycles_and_wraps() {
        let urls = parse_sponsor_urls("a\nb\nc");
        let mut rotation = SponsorRotation::default();
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(rotation.current(&urls).unwrap().to_string());
            rotation.advance(urls.len());
        }
        assert_eq!(seen, vec!["a", "b", "c", "a"]);
    }

    #[test]
    fn short_lists_never_rotate() {
        let mut rotation = SponsorRotation::default();
        for len in [0, 1] {
            for _ in 0..5 {
                rotation.advance(len);
            }
            assert_eq!(rotation.index(), 0);
        }
        assert_eq!(rotation.current(&[]), None);
    }

    #[test]
    fn shrunk_list_still_yields_a_url() {
        let mut rotation = SponsorRotation::default();
        rotation.advance(4);
        rotation.advance(4);
        rotation.advance(4);
        let urls = parse_sponsor_urls("x\ny");
        assert_eq!(rotation.current(&urls), Some("y"));
        rotation.advance(urls.len());
        assert_eq!(rotation.index(), 0);
    }

    #[test]
    fn flash_expires_after_its_own_timer() {
        let mut flash = FlashSignal::default();
        assert!(!flash.is_active());
        let generation = flash.trigger();
        assert!(flash.is_active());
        assert!(flash.expire(generation));
        assert!(!flash.is_active());
        assert!(!flash.expire(generation));
    }

    #[test]
    fn stale_expiry_leaves_newer_flash_up() {
        let mut flash = FlashSignal::default();
        let first = flash.trigger();
        let second = flash.trigger();
        assert!(!flash.expire(first));
        assert!(flash.is_active());
        assert!(flash.expire(second));
    }

    #[test]
    fn clear_invalidates_pending_expiry() {
        let mut flash = FlashSignal::default();
        let generation = flash.trigger();
        flash.clear();
        assert!(!flash.is_active());
        let next = flash.trigger();
        assert!(!flash.expire(generation));
        assert!(flash.is_active());
        assert!(flash.expire(next));
    }
}
