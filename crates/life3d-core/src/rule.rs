//! Birth/survive rules.
//!
//! A rule is a pair of neighbor-count sets over `[0, 26]`:
//!
//! ```text
//! next_alive = (alive && count in survive) || (!alive && count in birth)
//! ```
//!
//! Rules are written in the usual `B6/S5-7` notation. Each section is a
//! comma-separated list of counts and inclusive ranges, so `B5,6,7` and
//! `B5-7` are the same set.

use core::fmt;
use core::str::FromStr;

/// Largest possible Moore-neighborhood count.
pub const MAX_COUNT: u8 = 26;

/// Errors from parsing a rule string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    /// A section did not start with `B` or `S`.
    #[error("unknown rule section {section:?}; expected B or S")]
    UnknownSection {
        /// The offending section text.
        section: String,
    },

    /// The same section appeared twice.
    #[error("rule section {prefix} appears more than once")]
    DuplicateSection {
        /// Section prefix (`B` or `S`).
        prefix: char,
    },

    /// A required section is absent.
    #[error("rule has no {prefix} section")]
    MissingSection {
        /// Section prefix (`B` or `S`).
        prefix: char,
    },

    /// A token was neither a count nor a range.
    #[error("invalid rule token {token:?}")]
    InvalidToken {
        /// The offending token.
        token: String,
    },

    /// A range ran backwards.
    #[error("reversed rule range {start}-{end}")]
    ReversedRange {
        /// Range start.
        start: u8,
        /// Range end.
        end: u8,
    },

    /// A count exceeded the Moore-neighborhood size.
    #[error("rule count {count} exceeds {MAX_COUNT}")]
    CountOutOfRange {
        /// The offending count.
        count: u32,
    },
}

// ---------------------------------------------------------------------------
// Count sets
// ---------------------------------------------------------------------------

/// A set of neighbor counts in `[0, 26]`, stored as a bitmask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CountSet(u32);

impl CountSet {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// Whether `count` is a member.
    pub fn contains(self, count: u8) -> bool {
        count <= MAX_COUNT && bit(count) & self.0 != 0
    }

    /// Add `count` to the set. Counts above 26 are ignored.
    pub fn insert(&mut self, count: u8) {
        if count <= MAX_COUNT {
            self.0 |= bit(count);
        }
    }

    /// Whether the set is empty.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Members in ascending order.
    pub fn iter(self) -> impl Iterator<Item = u8> {
        (0..=MAX_COUNT).filter(move |c| self.contains(*c))
    }

    /// Parse a comma-separated list of counts and inclusive ranges.
    ///
    /// Whitespace around tokens is ignored. An empty list is the empty set.
    pub fn parse_list(list: &str) -> Result<Self, RuleError> {
        let mut set = Self::EMPTY;
        let list = list.trim();
        if list.is_empty() {
            return Ok(set);
        }
        for token in list.split(',') {
            let token = token.trim();
            let (start, end) = match token.split_once('-') {
                Some((a, b)) => (parse_count(a, token)?, parse_count(b, token)?),
                None => {
                    let c = parse_count(token, token)?;
                    (c, c)
                }
            };
            if start > end {
                return Err(RuleError::ReversedRange { start, end });
            }
            for c in start..=end {
                set.insert(c);
            }
        }
        Ok(set)
    }
}

fn bit(count: u8) -> u32 {
    1_u32.checked_shl(u32::from(count)).unwrap_or(0)
}

fn parse_count(text: &str, token: &str) -> Result<u8, RuleError> {
    let text = text.trim();
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RuleError::InvalidToken {
            token: token.to_owned(),
        });
    }
    // All digits, so the only parse failure left is overflow.
    let value = text.parse::<u32>().unwrap_or(u32::MAX);
    u8::try_from(value)
        .ok()
        .filter(|c| *c <= MAX_COUNT)
        .ok_or(RuleError::CountOutOfRange { count: value })
}

impl fmt::Display for CountSet {
    /// Runs of three or more consecutive counts render as ranges.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let members: Vec<u8> = self.iter().collect();
        let mut first = true;
        let mut i = 0_usize;
        while let Some(&start) = members.get(i) {
            let mut j = i;
            while let (Some(&cur), Some(&next)) = (members.get(j), members.get(j.saturating_add(1))) {
                if next != cur.saturating_add(1) {
                    break;
                }
                j = j.saturating_add(1);
            }
            let end = members.get(j).copied().unwrap_or(start);
            if !first {
                f.write_str(",")?;
            }
            first = false;
            if end.saturating_sub(start) >= 2 {
                write!(f, "{start}-{end}")?;
                i = j.saturating_add(1);
            } else {
                write!(f, "{start}")?;
                i = i.saturating_add(1);
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Rule
// ---------------------------------------------------------------------------

/// A birth/survive rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rule {
    birth: CountSet,
    survive: CountSet,
}

impl Default for Rule {
    /// `B6/S5-7`.
    fn default() -> Self {
        let mut birth = CountSet::EMPTY;
        birth.insert(6);
        let mut survive = CountSet::EMPTY;
        for c in 5..=7 {
            survive.insert(c);
        }
        Self { birth, survive }
    }
}

impl Rule {
    /// Build a rule from explicit count sets.
    pub const fn new(birth: CountSet, survive: CountSet) -> Self {
        Self { birth, survive }
    }

    /// Parse `B<list>/S<list>` notation. Sections may come in either order
    /// and the prefixes are case-insensitive.
    pub fn parse(text: &str) -> Result<Self, RuleError> {
        let mut birth = None;
        let mut survive = None;
        for section in text.split('/') {
            let section = section.trim();
            let mut chars = section.chars();
            let prefix = chars.next().map(|c| c.to_ascii_uppercase());
            let body = chars.as_str();
            let slot = match prefix {
                Some('B') => &mut birth,
                Some('S') => &mut survive,
                _ => {
                    return Err(RuleError::UnknownSection {
                        section: section.to_owned(),
                    });
                }
            };
            if slot.is_some() {
                return Err(RuleError::DuplicateSection {
                    prefix: prefix.unwrap_or('?'),
                });
            }
            *slot = Some(CountSet::parse_list(body)?);
        }
        Ok(Self {
            birth: birth.ok_or(RuleError::MissingSection { prefix: 'B' })?,
            survive: survive.ok_or(RuleError::MissingSection { prefix: 'S' })?,
        })
    }

    /// Build a rule from separate birth and survive lists such as `"6"` and
    /// `"5,6,7"`.
    pub fn from_lists(birth: &str, survive: &str) -> Result<Self, RuleError> {
        Ok(Self {
            birth: CountSet::parse_list(birth)?,
            survive: CountSet::parse_list(survive)?,
        })
    }

    /// Counts that bring a dead cell to life.
    pub const fn birth(&self) -> CountSet {
        self.birth
    }

    /// Counts that keep a live cell alive.
    pub const fn survive(&self) -> CountSet {
        self.survive
    }

    /// Next alive state of one cell.
    pub fn next(&self, alive: bool, count: u8) -> bool {
        if alive {
            self.survive.contains(count)
        } else {
            self.birth.contains(count)
        }
    }

    /// Next alive mask for a whole grid.
    pub fn apply(&self, alive: &[bool], counts: &[u8]) -> Vec<bool> {
        alive
            .iter()
            .zip(counts)
            .map(|(a, c)| self.next(*a, *c))
            .collect()
    }
}

impl FromStr for Rule {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "B{}/S{}", self.birth, self.survive)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_is_b6_s5_7() {
        assert_eq!(Rule::default(), Rule::parse("B6/S5-7").unwrap());
        assert_eq!(Rule::default().to_string(), "B6/S5-7");
    }

    #[test]
    fn sections_in_any_order_and_case() {
        let a = Rule::parse("s5,6,7/b6").unwrap();
        assert_eq!(a, Rule::default());
        let b = Rule::parse(" B 6 / S 5 - 7 ").unwrap();
        assert_eq!(b, Rule::default());
    }

    #[test]
    fn from_lists_matches_notation() {
        assert_eq!(Rule::from_lists("6", "5,6,7").unwrap(), Rule::default());
        let r = Rule::from_lists("", "").unwrap();
        assert!(r.birth().is_empty());
        assert!(r.survive().is_empty());
        assert_eq!(r.to_string(), "B/S");
    }

    #[test]
    fn display_mixes_lists_and_ranges() {
        let r = Rule::parse("B4,5,9/S0-3,26").unwrap();
        assert_eq!(r.to_string(), "B4,5,9/S0-3,26");
    }

    #[test]
    fn rejects_malformed_rules() {
        assert!(matches!(
            Rule::parse("B27/S5"),
            Err(RuleError::CountOutOfRange { count: 27 })
        ));
        assert!(matches!(
            Rule::parse("B7-5/S5"),
            Err(RuleError::ReversedRange { start: 7, end: 5 })
        ));
        assert!(matches!(
            Rule::parse("Bx/S5"),
            Err(RuleError::InvalidToken { .. })
        ));
        assert!(matches!(
            Rule::parse("B6/S5/B7"),
            Err(RuleError::DuplicateSection { prefix: 'B' })
        ));
        assert!(matches!(
            Rule::parse("B6"),
            Err(RuleError::MissingSection { prefix: 'S' })
        ));
        assert!(matches!(
            Rule::parse("X6/S5"),
            Err(RuleError::UnknownSection { .. })
        ));
        assert!(matches!(
            Rule::from_lists("5,,6", "1"),
            Err(RuleError::InvalidToken { .. })
        ));
        assert!(Rule::from_lists("-3", "1").is_err());
    }

    #[test]
    fn next_state_follows_sets() {
        let r = Rule::default();
        assert!(r.next(false, 6));
        assert!(!r.next(false, 5));
        assert!(r.next(true, 5));
        assert!(r.next(true, 7));
        assert!(!r.next(true, 4));
        assert!(!r.next(true, 8));
        assert_eq!(
            r.apply(&[false, true, true], &[6, 6, 0]),
            vec![true, true, false]
        );
    }
}
