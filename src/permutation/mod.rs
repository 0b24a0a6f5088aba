//! Permutations of orbital indices.

use std::collections::HashSet;
use std::fmt;

use derive_builder::Builder;
use indexmap::IndexSet;
use itertools::Itertools;
use num_traits::Inv;
use serde::{Deserialize, Serialize};


/// A structure to manage permutation actions of a finite set of orbital indices.
///
/// If the permutation acts on the ordered sequence $`0, 1, \ldots, n-1`$ where $`n`$ is the
/// rank, then [`Self::image`] gives the result of the action: `image[i]` is the element now
/// sitting at position `i`.
#[derive(Builder, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct Permutation {
    /// The rank of the permutation, *i.e.* the number of elements in the finite set on which the
    /// permutation acts.
    rank: usize,

    /// The image of the permutation.
    #[builder(setter(custom))]
    image: Vec<usize>,

    /// The cycle representation of the permutation, longest cycles first.
    #[builder(setter(skip), default = "self.calc_cycles()")]
    cycles: Vec<Vec<usize>>,
}

impl PermutationBuilder {
    fn image(&mut self, perm: &[usize]) -> &mut Self {
        self.image = Some(perm.to_vec());
        self
    }

    fn validate(&self) -> Result<(), String> {
        let rank = self
            .rank
            .ok_or_else(|| "The rank for this permutation has not been set.".to_string())?;
        let image = self
            .image
            .as_ref()
            .ok_or_else(|| "The image for this permutation has not been set.".to_string())?;
        if image.len() != rank {
            return Err(format!(
                "The permutation image `{image:?}` does not contain the expected number of elements ({rank})."
            ));
        }
        if let Some(&out_of_range) = image.iter().find(|&&i| i >= rank) {
            return Err(format!(
                "The permutation image `{image:?}` contains `{out_of_range}`, which is out of range for rank {rank}."
            ));
        }
        if image.iter().collect::<HashSet<_>>().len() != rank {
            return Err(format!(
                "The permutation image `{image:?}` contains repeated elements and is not a bijection."
            ));
        }
        Ok(())
    }

    fn calc_cycles(&self) -> Vec<Vec<usize>> {
        let (rank, image) = match (self.rank, self.image.as_ref()) {
            (Some(rank), Some(image)) => (rank, image),
            _ => return vec![],
        };
        if image.len() != rank || image.iter().any(|&i| i >= rank) {
            // The build will be rejected by `validate`.
            return vec![];
        }
        let mut remaining_indices = (0..rank).rev().collect::<IndexSet<usize>>();
        let mut cycles: Vec<Vec<usize>> = Vec::with_capacity(rank);
        while let Some(start) = remaining_indices.pop() {
            let mut cycle: Vec<usize> = vec![start];
            let mut idx = start;
            while image[idx] != start {
                idx = image[idx];
                if !remaining_indices.shift_remove(&idx) {
                    // Repeated element; the build will be rejected by `validate`.
                    return vec![];
                }
                cycle.push(idx);
            }
            cycles.push(cycle);
        }
        cycles.sort_by_key(|cycle| (!cycle.len(), cycle.clone()));
        cycles
    }
}

impl Permutation {
    /// Returns a builder to construct a new permutation.
    #[must_use]
    fn builder() -> PermutationBuilder {
        PermutationBuilder::default()
    }

    /// Constructs a permutation from its image.
    ///
    /// # Errors
    ///
    /// Errors if `image` is not a bijection on $`\{0, \ldots, n-1\}`$.
    pub fn from_image(image: &[usize]) -> Result<Self, PermutationBuilderError> {
        Self::builder().rank(image.len()).image(image).build()
    }

    /// The rank of the permutation.
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// The image of the permutation.
    pub fn image(&self) -> &Vec<usize> {
        &self.image
    }

    /// Obtains the cycle representation of the permutation.
    pub fn cycles(&self) -> &Vec<Vec<usize>> {
        &self.cycles
    }

    /// Obtains the cycles of length greater than one, *i.e.* the indices actually moved.
    pub fn nontrivial_cycles(&self) -> Vec<&Vec<usize>> {
        self.cycles.iter().filter(|cycle| cycle.len() > 1).collect()
    }

    /// Returns `true` if this permutation is the identity permutation for this rank.
    pub fn is_identity(&self) -> bool {
        self.image.iter().enumerate().all(|(i, &j)| i == j)
    }
}

impl fmt::Display for Permutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nontrivial = self.nontrivial_cycles();
        if nontrivial.is_empty() {
            write!(f, "()")
        } else {
            write!(
                f,
                "{}",
                nontrivial
                    .iter()
                    .map(|cycle| format!("({})", cycle.iter().map(|i| i + 1).join(" ")))
                    .join("")
            )
        }
    }
}

// ---
// Inv
// ---
impl Inv for &Permutation {
    type Output = Permutation;

    fn inv(self) -> Self::Output {
        let mut image_inv = (0..self.rank).collect::<Vec<_>>();
        image_inv.sort_by_key(|&i| self.image[i]);
        Permutation::from_image(&image_inv).expect("Unable to construct an inverse `Permutation`.")
    }
}

impl Inv for Permutation {
    type Output = Permutation;

    fn inv(self) -> Self::Output {
        (&self).inv()
    }
}
