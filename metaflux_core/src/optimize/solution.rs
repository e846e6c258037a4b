//! Map solver output back onto model identifiers
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::community::{COMMUNITY_BIOMASS_ID, MEMBER_SEPARATOR};
use crate::optimize::problem::Problem;
use crate::optimize::{OptimizationStatus, ProblemSolution};

/// Solution of a problem, keyed by variable and constraint ids
///
/// Fluxes are in the column order of the problem, duals in its row order (mass balances
/// first). Both are None unless the solver found an optimal solution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FluxSolution {
    pub status: OptimizationStatus,
    pub objective_value: Option<f64>,
    pub fluxes: Option<IndexMap<String, f64>>,
    pub duals: Option<IndexMap<String, f64>>,
}

impl FluxSolution {
    /// Pair the values of a solver solution with the ids of `problem`
    pub fn extract(problem: &Problem, solution: ProblemSolution) -> FluxSolution {
        if !solution.status.is_optimal() {
            return FluxSolution {
                status: solution.status,
                objective_value: None,
                fluxes: None,
                duals: None,
            };
        }
        let fluxes = solution.variable_values.and_then(|values| {
            if values.len() != problem.n_variables() {
                warn!(
                    expected = problem.n_variables(),
                    found = values.len(),
                    "Solver returned the wrong number of variable values"
                );
                return None;
            }
            Some(problem.variable_ids().into_iter().zip(values).collect())
        });
        let duals = solution.dual_values.and_then(|values| {
            if values.len() != problem.n_constraints() {
                return None;
            }
            Some(problem.constraint_ids().into_iter().zip(values).collect())
        });
        FluxSolution {
            status: solution.status,
            objective_value: solution.objective_value,
            fluxes,
            duals,
        }
    }

    /// Flux of a single variable
    pub fn flux(&self, id: &str) -> Option<f64> {
        self.fluxes.as_ref().and_then(|f| f.get(id).copied())
    }

    /// Dual value of a single constraint
    pub fn dual(&self, id: &str) -> Option<f64> {
        self.duals.as_ref().and_then(|d| d.get(id).copied())
    }

    /// Fluxes of one community member, with the member prefix removed from the ids
    pub fn member(&self, member_id: &str) -> Option<IndexMap<String, f64>> {
        let prefix = format!("{}{}", member_id, MEMBER_SEPARATOR);
        self.fluxes.as_ref().map(|fluxes| {
            fluxes
                .iter()
                .filter_map(|(id, value)| {
                    id.strip_prefix(prefix.as_str())
                        .map(|local| (local.to_string(), *value))
                })
                .collect()
        })
    }

    /// Fluxes of every community member, keyed by member id then local id
    pub fn members(&self) -> IndexMap<String, IndexMap<String, f64>> {
        let mut members: IndexMap<String, IndexMap<String, f64>> = IndexMap::new();
        for (id, value) in self.fluxes.iter().flatten() {
            if let Some((member, local)) = id.split_once(MEMBER_SEPARATOR) {
                members
                    .entry(member.to_string())
                    .or_default()
                    .insert(local.to_string(), *value);
            }
        }
        members
    }

    /// Fluxes of the environmental exchange variables, which belong to no community member
    ///
    /// The shared community biomass variable of equal growth is not part of the environment.
    pub fn environment(&self) -> Option<IndexMap<String, f64>> {
        self.fluxes.as_ref().map(|fluxes| {
            fluxes
                .iter()
                .filter(|(id, _)| !id.contains(MEMBER_SEPARATOR) && *id != COMMUNITY_BIOMASS_ID)
                .map(|(id, value)| (id.clone(), *value))
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn problem() -> Problem {
        let mut problem = Problem::new_maximization();
        for id in ["a#r1", "a#r2", "b#r1", "EX_glc"] {
            problem.add_new_variable(id, -10., 10.).unwrap();
        }
        problem
            .add_new_equality_constraint("a#m", &[0, 1], &[1., -1.], 0.)
            .unwrap();
        problem
    }

    #[test]
    fn extract_and_filter() {
        let problem = problem();
        let solution = FluxSolution::extract(
            &problem,
            ProblemSolution {
                status: OptimizationStatus::Optimal,
                objective_value: Some(1.),
                variable_values: Some(vec![1., 2., 3., 4.]),
                dual_values: Some(vec![0.5]),
            },
        );
        // Order follows the problem columns
        assert_eq!(
            solution.fluxes.as_ref().unwrap().keys().collect::<Vec<_>>(),
            vec!["a#r1", "a#r2", "b#r1", "EX_glc"]
        );
        assert_eq!(solution.flux("b#r1"), Some(3.));
        assert_eq!(solution.dual("a#m"), Some(0.5));

        let a = solution.member("a").unwrap();
        assert_eq!(a.keys().collect::<Vec<_>>(), vec!["r1", "r2"]);
        assert_eq!(a.get("r2"), Some(&2.));
        let members = solution.members();
        assert_eq!(members.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(members["b"].get("r1"), Some(&3.));
        let env = solution.environment().unwrap();
        assert_eq!(env.len(), 1);
        assert_eq!(env.get("EX_glc"), Some(&4.));
    }

    #[test]
    fn environment_skips_community_biomass() {
        let mut problem = problem();
        problem
            .add_new_variable(COMMUNITY_BIOMASS_ID, 0., f64::INFINITY)
            .unwrap();
        let solution = FluxSolution::extract(
            &problem,
            ProblemSolution {
                status: OptimizationStatus::Optimal,
                objective_value: Some(5.),
                variable_values: Some(vec![1., 2., 3., 4., 5.]),
                dual_values: Some(vec![0.5]),
            },
        );
        assert_eq!(solution.flux(COMMUNITY_BIOMASS_ID), Some(5.));
        let env = solution.environment().unwrap();
        assert_eq!(env.keys().collect::<Vec<_>>(), vec!["EX_glc"]);
    }

    #[test]
    fn infeasible_has_no_values() {
        let problem = problem();
        let solution =
            FluxSolution::extract(&problem, ProblemSolution::without_values(OptimizationStatus::Infeasible));
        assert_eq!(solution.status, OptimizationStatus::Infeasible);
        assert!(solution.fluxes.is_none());
        assert!(solution.member("a").is_none());
        assert!(solution.members().is_empty());
    }
}
