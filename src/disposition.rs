//! Disposition parsing
//!
//! A project, section or task name may end in a run of marker characters that
//! says how its descendants are worked on: `-` (sequential, one at a time) or
//! `=` (parallel, all at once). Projects look at up to three trailing markers,
//! sections at two and tasks at one; each marker addresses one level further
//! down the hierarchy.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of slots in every [`DispositionCode`].
pub const SLOTS: usize = 3;

/// How the children at one level of the hierarchy are worked on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Disposition {
    /// One child at a time, in order.
    #[serde(rename = "s")]
    Sequential,
    /// All children at once.
    #[serde(rename = "p")]
    Parallel,
    /// No marker declared for this level.
    #[default]
    #[serde(rename = "x")]
    Unset,
}

impl Disposition {
    /// Whether a marker was declared.
    pub fn is_set(self) -> bool {
        self != Disposition::Unset
    }

    /// First declared disposition, searching from the nearest candidate outwards.
    ///
    /// # Examples
    /// ```
    /// use gtd_autolabel::Disposition;
    /// let d = Disposition::nearest([Disposition::Unset, Disposition::Parallel, Disposition::Sequential]);
    /// assert_eq!(d, Disposition::Parallel);
    /// ```
    pub fn nearest(candidates: impl IntoIterator<Item = Disposition>) -> Disposition {
        candidates
            .into_iter()
            .find(|d| d.is_set())
            .unwrap_or(Disposition::Unset)
    }

    fn code_char(self) -> char {
        match self {
            Disposition::Sequential => 's',
            Disposition::Parallel => 'p',
            Disposition::Unset => 'x',
        }
    }

    fn from_code_char(c: char) -> Option<Self> {
        match c {
            's' => Some(Disposition::Sequential),
            'p' => Some(Disposition::Parallel),
            'x' => Some(Disposition::Unset),
            _ => None,
        }
    }
}

impl FromStr for Disposition {
    type Err = String;

    /// Accepts the long names used on the command line and in config files.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" | "s" => Ok(Disposition::Sequential),
            "parallel" | "p" => Ok(Disposition::Parallel),
            _ => Err(format!(
                "Invalid disposition '{}'. Valid options are: sequential, parallel",
                s
            )),
        }
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Disposition::Sequential => "sequential",
            Disposition::Parallel => "parallel",
            Disposition::Unset => "unset",
        };
        f.write_str(name)
    }
}

/// Hierarchy level of a node. Determines how many trailing markers are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Project,
    Section,
    Task,
}

impl NodeKind {
    /// Levels below this node that a marker can address.
    pub fn slot_count(self) -> usize {
        match self {
            NodeKind::Project => 3,
            NodeKind::Section => 2,
            NodeKind::Task => 1,
        }
    }
}

/// Three-slot disposition of a node.
///
/// Slot 0 is the node's own marker and governs its direct children; slots 1
/// and 2 address the levels below that. Serialized as three characters from
/// `s`, `p` and the neutral placeholder `x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DispositionCode([Disposition; SLOTS]);

impl DispositionCode {
    /// Code with nothing declared.
    pub const UNSET: DispositionCode = DispositionCode([Disposition::Unset; SLOTS]);

    /// The same disposition in every slot (used for the inbox override).
    pub fn uniform(disposition: Disposition) -> Self {
        Self([disposition; SLOTS])
    }

    /// Disposition at `slot`; out-of-range slots read as unset.
    pub fn slot(&self, slot: usize) -> Disposition {
        self.0.get(slot).copied().unwrap_or(Disposition::Unset)
    }

    /// The node's own marker.
    pub fn own(&self) -> Disposition {
        self.0[0]
    }

    pub fn is_unset(&self) -> bool {
        self.0.iter().all(|d| !d.is_set())
    }

    /// Rebuild the trailing marker run that would parse back into this code.
    pub fn to_suffix(&self, markers: &Markers) -> String {
        self.0
            .iter()
            .filter_map(|d| markers.char_for(*d))
            .collect()
    }
}

impl fmt::Display for DispositionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for d in self.0 {
            write!(f, "{}", d.code_char())?;
        }
        Ok(())
    }
}

impl FromStr for DispositionCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = s.chars().collect();
        if chars.len() != SLOTS {
            return Err(format!("Disposition code '{}' must have {} slots", s, SLOTS));
        }
        let mut slots = [Disposition::Unset; SLOTS];
        for (slot, c) in slots.iter_mut().zip(chars) {
            *slot = Disposition::from_code_char(c)
                .ok_or_else(|| format!("Invalid slot '{}' in disposition code '{}'", c, s))?;
        }
        Ok(Self(slots))
    }
}

impl TryFrom<String> for DispositionCode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DispositionCode> for String {
    fn from(code: DispositionCode) -> Self {
        code.to_string()
    }
}

/// The two suffix characters recognised as markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Markers {
    pub sequential: char,
    pub parallel: char,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            sequential: '-',
            parallel: '=',
        }
    }
}

impl Markers {
    fn disposition_of(&self, c: char) -> Option<Disposition> {
        if c == self.sequential {
            Some(Disposition::Sequential)
        } else if c == self.parallel {
            Some(Disposition::Parallel)
        } else {
            None
        }
    }

    fn char_for(&self, d: Disposition) -> Option<char> {
        match d {
            Disposition::Sequential => Some(self.sequential),
            Disposition::Parallel => Some(self.parallel),
            Disposition::Unset => None,
        }
    }

    /// Parse the trailing marker run of `name` for a node of the given kind.
    ///
    /// The run is cut to the last `kind.slot_count()` markers; a shorter run is
    /// extended by repeating its final marker. A name without markers yields
    /// [`DispositionCode::UNSET`]. Never fails.
    ///
    /// # Examples
    /// ```
    /// use gtd_autolabel::{Markers, NodeKind};
    /// let markers = Markers::default();
    /// assert_eq!(markers.parse("Launch-", NodeKind::Project).to_string(), "sss");
    /// assert_eq!(markers.parse("Errands=-", NodeKind::Section).to_string(), "psx");
    /// assert_eq!(markers.parse("Plan", NodeKind::Task).to_string(), "xxx");
    /// ```
    pub fn parse(&self, name: &str, kind: NodeKind) -> DispositionCode {
        let wanted = kind.slot_count();

        let mut run: Vec<Disposition> = name
            .chars()
            .rev()
            .map_while(|c| self.disposition_of(c))
            .take(wanted)
            .collect();
        run.reverse();

        let Some(&last) = run.last() else {
            return DispositionCode::UNSET;
        };
        run.resize(wanted, last);

        let mut slots = [Disposition::Unset; SLOTS];
        for (slot, d) in slots.iter_mut().zip(run) {
            *slot = d;
        }
        DispositionCode(slots)
    }
}
