//! Members of a community and the links between them and the shared environment
use serde::{Deserialize, Serialize};

use crate::community::{CommunityError, MEMBER_SEPARATOR};
use crate::metabolic_model::model::Model;

/// A single organism of a community
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CommunityMember {
    id: String,
    model: Model,
    exchange_reactions: Vec<String>,
    biomass_reaction: String,
}

impl CommunityMember {
    /// Create a member, all exchange reactions and the biomass reaction must be in `model`
    ///
    /// # Examples
    /// ```rust
    /// use metaflux_core::community::member::CommunityMember;
    /// use metaflux_core::metabolic_model::model::Model;
    /// use metaflux_core::metabolic_model::reaction::ReactionBuilder;
    /// let mut model = Model::new_empty();
    /// model.add_reaction(ReactionBuilder::default().id("growth").build().unwrap()).unwrap();
    /// let member = CommunityMember::new("ecoli", model, vec![], "growth").unwrap();
    /// assert_eq!(member.id(), "ecoli");
    /// ```
    pub fn new(
        id: &str,
        model: Model,
        exchange_reactions: Vec<String>,
        biomass_reaction: &str,
    ) -> Result<CommunityMember, CommunityError> {
        if id.is_empty() || id.contains(MEMBER_SEPARATOR) {
            return Err(CommunityError::InvalidMemberId(id.to_string()));
        }
        if let Some(missing) = exchange_reactions
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(biomass_reaction))
            .find(|r| model.reaction(r).is_none())
        {
            return Err(CommunityError::MissingReaction {
                member: id.to_string(),
                reaction: missing.to_string(),
            });
        }
        Ok(CommunityMember {
            id: id.to_string(),
            model,
            exchange_reactions,
            biomass_reaction: biomass_reaction.to_string(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Ids of the reactions exchanging metabolites with the environment
    pub fn exchange_reactions(&self) -> &[String] {
        &self.exchange_reactions
    }

    pub fn biomass_reaction(&self) -> &str {
        &self.biomass_reaction
    }

    /// Whether `reaction` is one of the member's exchange reactions
    pub fn exchanges(&self, reaction: &str) -> bool {
        self.exchange_reactions.iter().any(|r| r == reaction)
    }

    /// Prefix a local id with the member id
    pub fn namespaced(&self, local_id: &str) -> String {
        format!("{}{}{}", self.id, MEMBER_SEPARATOR, local_id)
    }
}

/// A pool of one metabolite shared by all members through an exchange reaction
///
/// Every member listing `reaction_id` as an exchange reaction takes part in the pool.
/// The net exchange of the pool with the outside world is a variable named
/// `reaction_id`, bounded by `lower_bound` and `upper_bound`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentalLink {
    pub reaction_id: String,
    pub metabolite_id: String,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

impl EnvironmentalLink {
    pub fn new(
        reaction_id: &str,
        metabolite_id: &str,
        lower_bound: f64,
        upper_bound: f64,
    ) -> EnvironmentalLink {
        EnvironmentalLink {
            reaction_id: reaction_id.to_string(),
            metabolite_id: metabolite_id.to_string(),
            lower_bound,
            upper_bound,
        }
    }
}
