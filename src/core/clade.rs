//! Clade model and exclusivity thresholds

use crate::core::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

/// A genome together with the genomes below it in the tree.
///
/// The first name is the representative (root) genome of the clade, the
/// remaining names are its descendants. Names are unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clade {
    members: Vec<String>,
}

impl Clade {
    /// Build a clade from an ordered member list, rejecting empty lists
    /// and repeated genome names
    pub fn new<I, S>(members: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let members: Vec<String> = members.into_iter().map(Into::into).collect();
        if members.is_empty() {
            return Err(PipelineError::InvalidClade("clade has no members".to_string()));
        }

        let mut seen = HashSet::new();
        for name in &members {
            if name.is_empty() {
                return Err(PipelineError::InvalidClade(format!(
                    "empty genome name in clade rooted at '{}'",
                    members[0]
                )));
            }
            if !seen.insert(name.as_str()) {
                return Err(PipelineError::InvalidClade(format!(
                    "genome '{}' appears more than once in clade rooted at '{}'",
                    name, members[0]
                )));
            }
        }

        Ok(Self { members })
    }

    /// The representative genome
    pub fn root(&self) -> &str {
        &self.members[0]
    }

    pub fn descendants(&self) -> &[String] {
        &self.members[1..]
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always false for a clade built through `new`
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Whether there is anything to lift over to
    pub fn has_descendants(&self) -> bool {
        self.members.len() > 1
    }

    /// Comma-joined member list, as the region tool expects it
    pub fn joined(&self) -> String {
        self.members.join(",")
    }
}

impl fmt::Display for Clade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.members.join(", "))
    }
}

/// Caller-supplied limits on outgroup and ingroup membership
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusivityThresholds {
    /// Maximum number of outgroup genomes a region may appear in
    pub max_outgroup: usize,

    /// Minimum number of ingroup genomes a region must appear in.
    /// `None` means every member of the clade.
    pub min_ingroup: Option<usize>,
}

/// Thresholds after clamping against a concrete clade size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveThresholds {
    pub max_outgroup: usize,
    pub min_ingroup: usize,
}

impl ExclusivityThresholds {
    pub fn new(max_outgroup: usize, min_ingroup: Option<usize>) -> Self {
        Self {
            max_outgroup,
            min_ingroup,
        }
    }

    /// Clamp the thresholds so that `max_outgroup <= min_ingroup <= clade_size`.
    ///
    /// An unset or zero `min_ingroup` means the whole clade. Values that are
    /// too large are corrected rather than rejected.
    pub fn normalize(&self, clade_size: usize) -> EffectiveThresholds {
        let min_ingroup = match self.min_ingroup {
            Some(min_in) if min_in > 0 => min_in.min(clade_size),
            _ => clade_size,
        };
        let effective = EffectiveThresholds {
            max_outgroup: self.max_outgroup.min(min_ingroup),
            min_ingroup,
        };

        if self.lowered_by(&effective) {
            debug!(
                "Thresholds adjusted for clade of size {}: maxOut {} -> {}, minIn {:?} -> {}",
                clade_size,
                self.max_outgroup,
                effective.max_outgroup,
                self.min_ingroup,
                effective.min_ingroup
            );
        }

        effective
    }

    /// Whether `effective` is below a value the caller actually set
    fn lowered_by(&self, effective: &EffectiveThresholds) -> bool {
        let min_lowered = matches!(
            self.min_ingroup,
            Some(min_in) if min_in > 0 && effective.min_ingroup < min_in
        );
        effective.max_outgroup < self.max_outgroup || min_lowered
    }
}
