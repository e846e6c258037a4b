//! Community models, several organisms sharing one environment
//!
//! Each member keeps its own model. Ids of member variables, metabolites and genes are
//! namespaced as `member#local`. Every environmental link adds a balance row
//! `ENV_<metabolite>` which ties the abundance weighted exchange fluxes of the members to
//! one environmental exchange variable:
//!
//! `sum_i(abundance_i * member_i#exchange) - exchange = 0`
pub mod member;

use std::collections::HashSet;

use nalgebra::DVector;
use nalgebra_sparse::{CooMatrix, CscMatrix};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::configuration;
use crate::metabolic_model::gpr::Isozyme;
use crate::metabolic_model::MetabolicModel;
use member::{CommunityMember, EnvironmentalLink};

/// Separates the member id from the local id in namespaced ids
pub const MEMBER_SEPARATOR: char = '#';
/// Prefix of the environmental balance rows
pub const ENVIRONMENT_PREFIX: &str = "ENV_";
/// Variable shared by all members when they are forced to grow equally
pub const COMMUNITY_BIOMASS_ID: &str = "community_biomass";
/// Prefix of the rows forcing a member's growth to the community growth
pub const EQUAL_GROWTH_PREFIX: &str = "equal_growth_";

/// Several member models coupled through shared environmental metabolites
///
/// Abundances are non-negative and sum to 1. Every method changing the community checks
/// the result before committing it, so a failed change leaves the model as it was.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CommunityModel {
    members: Vec<CommunityMember>,
    abundances: Vec<f64>,
    links: Vec<EnvironmentalLink>,
    equal_growth: bool,
}

impl CommunityModel {
    /// Create a community, `abundances` are parallel to `members`
    pub fn new(
        members: Vec<CommunityMember>,
        abundances: Vec<f64>,
        links: Vec<EnvironmentalLink>,
    ) -> Result<CommunityModel, CommunityError> {
        let community = CommunityModel {
            members,
            abundances,
            links,
            equal_growth: false,
        };
        community.validate()?;
        Ok(community)
    }

    // region Accessors
    pub fn members(&self) -> &[CommunityMember] {
        &self.members
    }

    pub fn member(&self, id: &str) -> Option<&CommunityMember> {
        self.members.iter().find(|m| m.id() == id)
    }

    pub fn abundances(&self) -> &[f64] {
        &self.abundances
    }

    pub fn links(&self) -> &[EnvironmentalLink] {
        &self.links
    }

    /// Whether all members are forced to grow at the same rate
    pub fn equal_growth(&self) -> bool {
        self.equal_growth
    }
    // endregion Accessors

    // region Mutation
    /// Replace the abundances
    pub fn set_abundances(&mut self, abundances: Vec<f64>) -> Result<(), CommunityError> {
        self.commit(|c| c.abundances = abundances)
    }

    /// Add a member, together with the new abundances of every member
    pub fn add_member(
        &mut self,
        member: CommunityMember,
        abundances: Vec<f64>,
    ) -> Result<(), CommunityError> {
        self.commit(|c| {
            c.members.push(member);
            c.abundances = abundances;
        })
    }

    /// Add a shared environmental metabolite
    pub fn add_environmental_link(&mut self, link: EnvironmentalLink) -> Result<(), CommunityError> {
        self.commit(|c| c.links.push(link))
    }

    /// Switch between optimizing the abundance weighted growth of the members, and forcing
    /// every member to grow at one shared, maximized rate
    pub fn set_equal_growth(&mut self, equal_growth: bool) -> Result<(), CommunityError> {
        self.commit(|c| c.equal_growth = equal_growth)
    }

    /// Apply `change` to a copy, and keep the copy only if it is valid
    fn commit<F: FnOnce(&mut CommunityModel)>(&mut self, change: F) -> Result<(), CommunityError> {
        let mut candidate = self.clone();
        change(&mut candidate);
        candidate.validate()?;
        *self = candidate;
        Ok(())
    }
    // endregion Mutation

    // region Validation
    fn validate(&self) -> Result<(), CommunityError> {
        if self.abundances.len() != self.members.len() {
            return Err(CommunityError::AbundanceCountMismatch {
                members: self.members.len(),
                abundances: self.abundances.len(),
            });
        }
        if let Some((index, value)) = self
            .abundances
            .iter()
            .enumerate()
            .find(|(_, a)| !a.is_finite() || **a < 0.)
        {
            return Err(CommunityError::InvalidAbundance {
                index,
                value: *value,
            });
        }
        let total: f64 = self.abundances.iter().sum();
        if !self.members.is_empty()
            && (total - 1.).abs() > configuration::current().abundance_tolerance
        {
            return Err(CommunityError::AbundanceSum(total));
        }

        let mut member_ids = HashSet::new();
        for member in &self.members {
            if !member_ids.insert(member.id()) {
                return Err(CommunityError::DuplicateMember(member.id().to_string()));
            }
        }

        let mut link_reactions = HashSet::new();
        let mut link_metabolites = HashSet::new();
        for link in &self.links {
            if !link_reactions.insert(link.reaction_id.as_str())
                || !link_metabolites.insert(link.metabolite_id.as_str())
                || link.reaction_id == COMMUNITY_BIOMASS_ID
            {
                return Err(CommunityError::DuplicateLink(link.reaction_id.clone()));
            }
            if link.lower_bound.is_nan()
                || link.upper_bound.is_nan()
                || link.lower_bound > link.upper_bound
            {
                return Err(CommunityError::InvalidLinkBounds {
                    reaction: link.reaction_id.clone(),
                    lower_bound: link.lower_bound,
                    upper_bound: link.upper_bound,
                });
            }
            if !self.members.iter().any(|m| m.exchanges(&link.reaction_id)) {
                return Err(CommunityError::UnknownLinkReaction(
                    link.reaction_id.clone(),
                ));
            }
        }
        Ok(())
    }
    // endregion Validation

    /// Member owning a namespaced id, and the local part of the id
    fn split_id<'a>(&self, id: &'a str) -> Option<(&CommunityMember, &'a str)> {
        let (member_id, local) = id.split_once(MEMBER_SEPARATOR)?;
        self.member(member_id).map(|m| (m, local))
    }

    fn n_member_variables(&self) -> usize {
        self.members.iter().map(|m| m.model().reactions().len()).sum()
    }

    fn n_member_metabolites(&self) -> usize {
        self.members
            .iter()
            .map(|m| m.model().metabolites().len())
            .sum()
    }

    fn community_biomass_index(&self) -> usize {
        self.n_member_variables() + self.links.len()
    }
}

impl MetabolicModel for CommunityModel {
    /// Member variables in member order, then one variable per environmental link, then
    /// the community growth variable when growth is equal
    fn variables(&self) -> Vec<String> {
        let mut variables: Vec<String> = self
            .members
            .iter()
            .flat_map(|m| m.model().reactions().keys().map(|r| m.namespaced(r)))
            .collect();
        variables.extend(self.links.iter().map(|l| l.reaction_id.clone()));
        if self.equal_growth {
            variables.push(COMMUNITY_BIOMASS_ID.to_string());
        }
        variables
    }

    fn reactions(&self) -> Vec<String> {
        let mut reactions = self.variables();
        if self.equal_growth {
            reactions.pop();
        }
        reactions
    }

    fn metabolites(&self) -> Vec<String> {
        let mut metabolites: Vec<String> = self
            .members
            .iter()
            .flat_map(|m| m.model().metabolites().keys().map(|met| m.namespaced(met)))
            .collect();
        metabolites.extend(
            self.links
                .iter()
                .map(|l| format!("{}{}", ENVIRONMENT_PREFIX, l.metabolite_id)),
        );
        metabolites
    }

    fn genes(&self) -> Vec<String> {
        self.members
            .iter()
            .flat_map(|m| m.model().genes().keys().map(|g| m.namespaced(g)))
            .collect()
    }

    fn stoichiometry(&self) -> CscMatrix<f64> {
        let n_rows = self.n_member_metabolites() + self.links.len();
        let mut coo = CooMatrix::new(n_rows, self.n_variables());

        // Block diagonal member matrices
        let mut row_offset = 0;
        let mut col_offset = 0;
        let mut member_offsets = Vec::with_capacity(self.members.len());
        for member in &self.members {
            member_offsets.push(col_offset);
            let model = member.model();
            for (row, col, value) in model.stoichiometry().triplet_iter() {
                coo.push(row_offset + row, col_offset + col, *value);
            }
            row_offset += model.metabolites().len();
            col_offset += model.reactions().len();
        }

        // Environmental balance rows
        for (k, link) in self.links.iter().enumerate() {
            let row = row_offset + k;
            for ((member, abundance), offset) in self
                .members
                .iter()
                .zip(&self.abundances)
                .zip(&member_offsets)
            {
                if !member.exchanges(&link.reaction_id) {
                    continue;
                }
                if let Some(local) = member.model().reactions().get_index_of(&link.reaction_id) {
                    coo.push(row, offset + local, *abundance);
                }
            }
            coo.push(row, col_offset + k, -1.);
        }
        debug!(
            members = self.members.len(),
            links = self.links.len(),
            "Built community stoichiometry"
        );
        CscMatrix::from(&coo)
    }

    fn bounds(&self) -> (DVector<f64>, DVector<f64>) {
        let mut lower = Vec::with_capacity(self.n_variables());
        let mut upper = Vec::with_capacity(self.n_variables());
        for member in &self.members {
            let (lb, ub) = member.model().bounds();
            lower.extend(lb.iter());
            upper.extend(ub.iter());
        }
        for link in &self.links {
            lower.push(link.lower_bound);
            upper.push(link.upper_bound);
        }
        if self.equal_growth {
            lower.push(0.);
            upper.push(f64::INFINITY);
        }
        (DVector::from_vec(lower), DVector::from_vec(upper))
    }

    fn objective(&self) -> DVector<f64> {
        let mut objective = DVector::zeros(self.n_variables());
        if self.equal_growth {
            objective[self.community_biomass_index()] = 1.;
            return objective;
        }
        let mut offset = 0;
        for (member, abundance) in self.members.iter().zip(&self.abundances) {
            let member_objective = member.model().objective();
            for (i, coef) in member_objective.iter().enumerate() {
                objective[offset + i] = abundance * coef;
            }
            offset += member_objective.len();
        }
        objective
    }

    fn coupling_ids(&self) -> Vec<String> {
        if !self.equal_growth {
            return Vec::new();
        }
        self.members
            .iter()
            .map(|m| format!("{}{}", EQUAL_GROWTH_PREFIX, m.id()))
            .collect()
    }

    /// One row per member, `member#biomass - community_biomass`
    fn coupling(&self) -> CscMatrix<f64> {
        if !self.equal_growth {
            return CscMatrix::zeros(0, self.n_variables());
        }
        let community_biomass = self.community_biomass_index();
        let mut coo = CooMatrix::new(self.members.len(), self.n_variables());
        let mut offset = 0;
        for (row, member) in self.members.iter().enumerate() {
            let reactions = member.model().reactions();
            if let Some(local) = reactions.get_index_of(member.biomass_reaction()) {
                coo.push(row, offset + local, 1.);
            }
            coo.push(row, community_biomass, -1.);
            offset += reactions.len();
        }
        CscMatrix::from(&coo)
    }

    fn coupling_bounds(&self) -> (DVector<f64>, DVector<f64>) {
        let n = self.coupling_ids().len();
        (DVector::zeros(n), DVector::zeros(n))
    }

    fn reaction_gene_association(&self, reaction_id: &str) -> Option<Vec<Isozyme>> {
        let (member, local) = self.split_id(reaction_id)?;
        let association = member.model().reaction_gene_association(local)?;
        Some(
            association
                .into_iter()
                .map(|isozyme| Isozyme {
                    gene_product_stoichiometry: isozyme
                        .gene_product_stoichiometry
                        .into_iter()
                        .map(|(gene, stoich)| (member.namespaced(&gene), stoich))
                        .collect(),
                    ..isozyme
                })
                .collect(),
        )
    }
}

/// Errors from building or changing a [`CommunityModel`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommunityError {
    #[error("Got {abundances} abundances for {members} members")]
    AbundanceCountMismatch { members: usize, abundances: usize },
    #[error("Abundance {value} of member {index} is negative or not finite")]
    InvalidAbundance { index: usize, value: f64 },
    #[error("Abundances sum to {0} instead of 1")]
    AbundanceSum(f64),
    #[error("More than one member has the id {0}")]
    DuplicateMember(String),
    #[error("Member id {0} is empty or contains the namespace separator")]
    InvalidMemberId(String),
    #[error("Member {member} has no reaction {reaction}")]
    MissingReaction { member: String, reaction: String },
    #[error("Environmental link {0} duplicates the reaction or metabolite of another link")]
    DuplicateLink(String),
    #[error("No member lists {0} as an exchange reaction")]
    UnknownLinkReaction(String),
    #[error("Invalid bounds for environmental link {reaction}: lower_bound ({lower_bound}) > upper_bound ({upper_bound})")]
    InvalidLinkBounds {
        reaction: String,
        lower_bound: f64,
        upper_bound: f64,
    },
}
