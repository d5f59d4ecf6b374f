// Parser configuration

/// How the literal interpreter picks the radix of a NUMBER lexeme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RadixDetection {
    /// Look for `.`/`E`, then `X`, `O`, `B` anywhere in the text, in that
    /// order. Compatible with existing token producers; note that a hex
    /// literal whose digits contain `E` is read as a (malformed) float.
    #[default]
    Substring,
    /// Only a leading `0X`/`0O`/`0B` (either case) selects a radix, and it
    /// is checked before the float markers.
    Prefix,
}

/// Default for [`ParseOptions::max_depth`]
pub const DEFAULT_MAX_DEPTH: usize = 1_000;

/// Options for a [`super::parse::Parser`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    pub radix_detection: RadixDetection,
    /// Deepest expression nesting a parse may build. Each operator adds a
    /// level (`!~` adds two), and operator chains nest to the right, so this
    /// bounds the length of a chain. Rendering, comparing and cloning a tree
    /// recurse once per level.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            radix_detection: RadixDetection::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParseOptions {
    pub fn with_radix_detection(mut self, radix_detection: RadixDetection) -> Self {
        self.radix_detection = radix_detection;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
