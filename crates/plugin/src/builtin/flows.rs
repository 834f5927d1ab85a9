//! Lyric flow transforms.

use rapgen_core::LyricTransform;

/// Upper-cases every line.
#[derive(Debug, Clone, Copy, Default)]
pub struct Shout;

impl LyricTransform for Shout {
    fn transform_lyrics(&self, lyrics: &str) -> String {
        lyrics.to_uppercase()
    }
}

/// Echoes the last word of each bar in parentheses.
///
/// Section headers such as `[Chorus]` and blank lines pass through.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoLastWord;

impl LyricTransform for EchoLastWord {
    fn transform_lyrics(&self, lyrics: &str) -> String {
        map_lines(lyrics, |line| {
            let last = line
                .split_whitespace()
                .last()
                .map(|w| w.trim_end_matches(|c: char| !c.is_alphanumeric()))
                .filter(|w| !w.is_empty());

            match last {
                Some(word) => format!("{} ({})", line.trim_end(), word),
                None => line.to_string(),
            }
        })
    }
}

/// Regroups bars into stanzas of a fixed size separated by one blank line.
#[derive(Debug, Clone, Copy)]
pub struct StanzaBreak {
    pub bars: usize,
}

impl Default for StanzaBreak {
    fn default() -> Self {
        Self { bars: 4 }
    }
}

impl LyricTransform for StanzaBreak {
    fn transform_lyrics(&self, lyrics: &str) -> String {
        let bars: Vec<&str> = lyrics.lines().filter(|l| !l.trim().is_empty()).collect();

        bars.chunks(self.bars.max(1))
            .map(|stanza| stanza.join("\n"))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Drops an ad-lib at the end of every `every`-th bar, cycling through a list.
#[derive(Debug, Clone)]
pub struct AdLib {
    pub every: usize,
    pub shouts: Vec<String>,
}

impl Default for AdLib {
    fn default() -> Self {
        Self {
            every: 2,
            shouts: ["(yeah!)", "(uh)", "(let's go)"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl LyricTransform for AdLib {
    fn transform_lyrics(&self, lyrics: &str) -> String {
        let every = self.every.max(1);
        let mut bar = 0;
        let mut used = 0;

        map_lines(lyrics, |line| {
            bar += 1;
            if bar % every != 0 || self.shouts.is_empty() {
                return line.to_string();
            }

            let shout = &self.shouts[used % self.shouts.len()];
            used += 1;
            format!("{} {}", line.trim_end(), shout)
        })
    }
}

/// Applies `f` to every bar, leaving blank lines and section headers alone.
fn map_lines(lyrics: &str, mut f: impl FnMut(&str) -> String) -> String {
    let mapped: Vec<String> = lyrics
        .lines()
        .map(|line| {
            let trimmed = line.trim();
            if trimmed.is_empty() || (trimmed.starts_with('[') && trimmed.ends_with(']')) {
                line.to_string()
            } else {
                f(line)
            }
        })
        .collect();

    let mut out = mapped.join("\n");
    if lyrics.ends_with('\n') {
        out.push('\n');
    }
    out
}
